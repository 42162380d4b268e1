use regex::Regex;

use crate::error::Result;
use crate::rebulk::{Found, Pattern, Rebulk};
use crate::rules::common::is_sep;
use crate::rules::common::validators::seps_surround;
use crate::types::Value;

/// `1.4 gb` -> `1.4GB`.
fn size_value(raw: &str) -> Option<Value> {
    let unit_at = raw.find(|c: char| c.is_ascii_alphabetic())?;
    let number = raw[..unit_at].trim_end_matches(is_sep);
    number.parse::<f64>().ok()?;
    Some(Value::Str(format!("{number}{}", raw[unit_at..].to_uppercase())))
}

/// A decimal needs at most three integer digits, and the number must not
/// continue a previous one, so `2010.700MB` leaves the year alone.
const SIZE: &str = r"(?i)(?:^|[^0-9])(?P<size>(?:\d{1,3}(?:\.\d+)?|\d+)[ ._-]?[KMGT]i?B)";

fn find_sizes(re: &Regex, input: &str) -> Vec<Found> {
    re.captures_iter(input)
        .filter_map(|caps| caps.name("size"))
        .map(|size| Found::new(size.start(), size.end()))
        .collect()
}

pub fn size() -> Result<Rebulk> {
    let re = Regex::new(SIZE)?;
    Ok(Rebulk::new("size")
        .disabled(|o| o.is_disabled("size"))
        .pattern(
            Pattern::functional("size", move |input, _| find_sizes(&re, input))
                .formatter(size_value)
                .validator(seps_surround),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::rebulk::Engine;

    fn first(input: &str) -> Option<Value> {
        let engine = Engine::new(vec![size().unwrap()]).unwrap();
        let matches = engine.run(input, &Options::default()).unwrap();
        matches.named("size").first().map(|m| m.value.clone())
    }

    #[test]
    fn sizes() {
        assert_eq!(first("Movie.2010.700MB.avi"), Some(Value::from("700MB")));
        assert_eq!(first("Movie.2010.1.4GB.mkv"), Some(Value::from("1.4GB")));
        assert_eq!(first("Movie [4.37 GiB]"), Some(Value::from("4.37GIB")));
        assert_eq!(first("Movie.MB.x"), None);
    }

    #[test]
    fn year_is_not_a_decimal_part() {
        assert_eq!(first("Movie.Name.2010.700MB.mkv"), Some(Value::from("700MB")));
        assert_eq!(first("Movie.4096MB.mkv"), Some(Value::from("4096MB")));
        assert_eq!(first("Movie_2010_700MB_x264"), Some(Value::from("700MB")));
    }
}
