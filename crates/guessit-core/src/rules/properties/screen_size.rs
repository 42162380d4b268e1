use crate::error::Result;
use crate::rebulk::{Pattern, Rebulk};
use crate::rules::common::validators::seps_surround;
use crate::types::Value;

const INTERLACED: &[u32] = &[480, 576, 900, 1080];
const PROGRESSIVE: &[u32] = &[360, 368, 480, 540, 576, 720, 900, 1080, 1440, 2160, 4320];

/// `1280x720p` / `720p` / `1080i`.
fn scan_type(raw: &str) -> Option<Value> {
    let lower = raw.to_ascii_lowercase();
    let height_scan = lower.rsplit(['x', '*']).next()?;
    let (height, scan) = height_scan.split_at(height_scan.len().checked_sub(1)?);
    let height: u32 = height.parse().ok()?;
    matches!(scan, "p" | "i").then(|| Value::Str(format!("{height}{scan}")))
}

/// `1920x1080` reads as `1080p` for standard heights, `WxH` otherwise.
fn resolution(raw: &str) -> Option<Value> {
    let lower = raw.to_ascii_lowercase();
    let (width, height) = lower.split_once(['x', '*'])?;
    let width: u32 = width.parse().ok()?;
    let height: u32 = height.parse().ok()?;
    if PROGRESSIVE.contains(&height) && width * 3 >= height * 4 {
        Some(Value::Str(format!("{height}p")))
    } else {
        Some(Value::Str(format!("{width}x{height}")))
    }
}

pub fn screen_size() -> Result<Rebulk> {
    let declared = PROGRESSIVE
        .iter()
        .map(|h| Value::Str(format!("{h}p")))
        .chain(INTERLACED.iter().map(|h| Value::Str(format!("{h}i"))));
    Ok(Rebulk::new("screen_size")
        .disabled(|o| o.is_disabled("screen_size"))
        .pattern(
            Pattern::regex("screen_size", &[r"(?:\d{3,4}[x*])?\d{3,4}[pi]"])?
                .formatter(scan_type)
                .validator(seps_surround)
                .values(declared),
        )
        .pattern(
            Pattern::regex("screen_size", &[r"\d{3,4}[x*]\d{3,4}"])?
                .formatter(resolution)
                .validator(seps_surround),
        )
        .pattern(
            Pattern::string("screen_size", &["4k"])
                .value("2160p")
                .validator(seps_surround),
        )
        .pattern(
            Pattern::string("screen_size", &["8k"])
                .value("4320p")
                .validator(seps_surround),
        ))
}
