use regex::escape;

use crate::config::Config;
use crate::error::Result;
use crate::rebulk::{ConflictOutcome, Match, Matches, Pattern, Rebulk, Tags};
use crate::rules::common::validators::seps_surround;
use crate::types::Value;

fn extension(raw: &str) -> Option<Value> {
    Some(Value::Str(raw.trim_start_matches('.').to_lowercase()))
}

/// Bare container words yield to everything else.
fn weak_container(_: &Matches, _: &Match, _: &Match) -> ConflictOutcome {
    ConflictOutcome::RemoveMatch
}

fn alternation(exts: &[String]) -> String {
    exts.iter().map(|e| escape(e)).collect::<Vec<_>>().join("|")
}

pub fn container(config: &Config) -> Result<Rebulk> {
    let c = &config.container;
    let families: [(&[String], Tags); 5] = [
        (&c.subtitles, Tags::SUBTITLE_EXTENSION),
        (&c.info, Tags::INFO_EXTENSION),
        (&c.videos, Tags::empty()),
        (&c.torrent, Tags::empty()),
        (&c.nzb, Tags::empty()),
    ];

    let mut rebulk = Rebulk::new("container").disabled(|o| o.is_disabled("container"));
    for (exts, tags) in families {
        if exts.is_empty() {
            continue;
        }
        let declared = exts.iter().map(|e| Value::Str(e.to_lowercase()));
        rebulk = rebulk.pattern(
            Pattern::regex("container", &[format!(r"\.(?:{})$", alternation(exts)).as_str()])?
                .formatter(extension)
                .tags(Tags::EXTENSION | tags)
                .values(declared),
        );
    }

    // Extensions also show up as plain words (`Movie.MKV.x264`), except the
    // short ones that collide with ordinary tokens.
    let words: Vec<String> = c
        .videos
        .iter()
        .chain(&c.torrent)
        .chain(&c.nzb)
        .filter(|e| e.len() >= 3 && !matches!(e.as_str(), "ram" | "iso" | "wav" | "ogg"))
        .cloned()
        .collect();
    if !words.is_empty() {
        rebulk = rebulk.pattern(
            Pattern::regex("container", &[alternation(&words).as_str()])?
                .formatter(extension)
                .validator(seps_surround)
                .conflict_solver(weak_container)
                .origin("container_word"),
        );
    }
    Ok(rebulk)
}
