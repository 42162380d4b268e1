use crate::error::Result;
use crate::rebulk::Rebulk;
use crate::rules::properties::surrounded_table;

const VIDEO_CODECS: &[(&str, &str)] = &[
    (r"Mpe?g-?2|[hx]-?262", "Mpeg2"),
    (r"DVDivX|DivX", "DivX"),
    (r"XviD", "XviD"),
    (r"VC-?1", "VC1"),
    (r"VP-?8|VP80", "VP8"),
    (r"VP-?9", "VP9"),
    (r"[hx]\.?-?264(?:-?AVC(?:HD)?)?|(?:MPEG-?4[ ._-]?)?AVC(?:HD)?", "h264"),
    (r"[hx]\.?-?265(?:-?HEVC)?|HEVC", "h265"),
    (r"AV1", "AV1"),
];

const COLOR_DEPTHS: &[(&str, &str)] = &[
    (r"8-?bits?", "8-bit"),
    (r"Hi10P?|10-?bits?|YUV420P10", "10-bit"),
    (r"12-?bits?|YUV420P12", "12-bit"),
];

pub fn video_codec() -> Result<Rebulk> {
    Ok(Rebulk::new("video_codec")
        .disabled(|o| o.is_disabled("video_codec"))
        .patterns(surrounded_table("video_codec", VIDEO_CODECS)?))
}

pub fn color_depth() -> Result<Rebulk> {
    Ok(Rebulk::new("color_depth")
        .disabled(|o| o.is_disabled("color_depth"))
        .patterns(surrounded_table("color_depth", COLOR_DEPTHS)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::rebulk::Engine;
    use crate::types::Value;

    fn first(input: &str, name: &str) -> Option<Value> {
        let engine = Engine::new(vec![video_codec().unwrap(), color_depth().unwrap()]).unwrap();
        let matches = engine.run(input, &Options::default()).unwrap();
        matches.named(name).first().map(|m| m.value.clone())
    }

    #[test]
    fn h264_spellings() {
        for input in ["Movie.x264-GRP", "Movie.H.264.mkv", "Movie h264", "Movie.AVC.mkv"] {
            assert_eq!(first(input, "video_codec"), Some(Value::from("h264")), "{input}");
        }
    }

    #[test]
    fn hevc_and_depth() {
        assert_eq!(first("Movie.HEVC.10bit", "video_codec"), Some(Value::from("h265")));
        assert_eq!(first("Movie.HEVC.10bit", "color_depth"), Some(Value::from("10-bit")));
        assert_eq!(first("Movie.Hi10P", "color_depth"), Some(Value::from("10-bit")));
    }
}
