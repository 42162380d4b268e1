use crate::error::Result;
use crate::rebulk::{Match, Matches, Pattern, Rebulk};
use crate::rules::common::validators::seps_surround;

/// Eight hex digits mixing letters and digits.
fn crc32_validator(matches: &Matches, m: &Match) -> bool {
    let text = matches.text(m);
    seps_surround(matches, m)
        && text.chars().any(|c| c.is_ascii_digit())
        && text.chars().any(|c| c.is_ascii_alphabetic())
}

pub fn crc() -> Result<Rebulk> {
    Ok(Rebulk::new("crc32")
        .disabled(|o| o.is_disabled("crc32"))
        .pattern(Pattern::regex("crc32", &[r"[0-9a-f]{8}"])?.validator(crc32_validator)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::rebulk::Engine;
    use crate::types::Value;

    fn values(input: &str) -> Vec<Value> {
        let engine = Engine::new(vec![crc().unwrap()]).unwrap();
        let matches = engine.run(input, &Options::default()).unwrap();
        matches.named("crc32").iter().map(|m| m.value.clone()).collect()
    }

    #[test]
    fn bracketed_checksum() {
        assert_eq!(
            values("[Group] Title - 01 [A1B2C3D4].mkv"),
            vec![Value::from("A1B2C3D4")]
        );
    }

    #[test]
    fn digits_only_or_letters_only_are_rejected() {
        assert!(values("Show.20200101.mkv").is_empty());
        assert!(values("Show.deadbeef.mkv").is_empty());
        assert!(values("Show.A1B2C3D4E5.mkv").is_empty());
    }
}
