use std::collections::HashMap;

use crate::error::Result;
use crate::options::Options;
use crate::rebulk::{Action, Match, Matches, POST_PROCESS, Pattern, Rebulk, Rule, Tags};
use crate::rules::common::formatters::raw_cleanup;
use crate::rules::common::validators::seps_surround;
use crate::rules::properties::surrounded_table;
use crate::types::Value;

const OTHERS: &[(&str, &str)] = &[
    (r"PROPER|REPACK|RERIP", "Proper"),
    (r"Remux", "Remux"),
    (r"HDR(?:10)?", "HDR10"),
    (r"Dual[ ._-]?Audio", "Dual Audio"),
    (r"Limited", "Limited"),
    (r"Internal", "Internal"),
    (r"Read[ ._-]?NFO", "Read NFO"),
    (r"(?:DVD|BD|BR|WEB)?-?Screener|(?:DVD|BD|BR)-?SCR", "Screener"),
    (r"3D", "3D"),
    (r"WS|Wide-?screen", "Widescreen"),
    (r"HC|Hard-?coded(?:[ ._-]?Subs?)?", "Hardcoded Subtitles"),
    (r"Fan-?Sub(?:bed|s)?", "Fan Subtitled"),
    (r"Fast-?Sub(?:bed|s)?", "Fast Subtitled"),
    (r"Retail", "Retail"),
    (r"UHD|Ultra-?HD", "Ultra HD"),
];

/// Sources that may be suffixed with `Rip`; the `other` match spans the
/// same text as the source one.
const RIP: &str = r"(?:DVD|HD-?DVD|BD|BR|Blu-?ray|UHD-?Blu-?ray|HD|SD|TV|HD-?TV|SD-?TV|PD-?TV|DTV|DVB|SAT|DSR|DTH|PPV|VHS|CAM|HD-?CAM|WEB|WEB-?DL|VOD)?-?Rip|Rip-?(?:SD-?)?TV|TV-?Rip-?HD";

pub fn other() -> Result<Rebulk> {
    Ok(Rebulk::new("other")
        .disabled(|o| o.is_disabled("other"))
        .patterns(surrounded_table("other", OTHERS)?)
        .pattern(Pattern::regex("other", &[RIP])?.value("Rip").validator(seps_surround))
        .pattern(
            Pattern::regex_cased("other", &["REAL"])?
                .value("Proper")
                .tags(Tags::REAL)
                .validator(seps_surround),
        )
        .pattern(
            Pattern::regex("other", &[r"Complete|Full[ ._-]?(?:Season|Series)|Integrale"])?
                .value("Complete")
                .tags(Tags::RELEASE_GROUP_PREFIX)
                .validator(seps_surround),
        )
        .rule(ProperCountRule))
}

/// Adds `proper_count`, the number of distinct proper markers. `REAL`
/// counts twice.
pub struct ProperCountRule;

impl Rule for ProperCountRule {
    fn name(&self) -> &'static str {
        "ProperCountRule"
    }

    fn priority(&self) -> i32 {
        POST_PROCESS
    }

    fn properties(&self) -> &'static [&'static str] {
        &["proper_count"]
    }

    fn enabled(&self, context: &Options) -> bool {
        !context.is_disabled("proper_count")
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let propers = matches.named_where("other", |m| m.value.as_str() == Some("Proper"));
        let Some(last) = propers.last() else {
            return Vec::new();
        };
        let mut raws: HashMap<String, &Match> = HashMap::new();
        for proper in &propers {
            raws.insert(raw_cleanup(matches.raw(proper)), *proper);
        }
        let count: i64 = raws
            .values()
            .map(|m| if m.tags.contains(Tags::REAL) { 2 } else { 1 })
            .sum();

        let mut proper_count = Match::new(last.start, last.end, "proper_count", Value::Int(count));
        proper_count.tags = last.tags;
        vec![Action::Append(proper_count)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rebulk::Engine;

    fn run(input: &str) -> Matches {
        let engine = Engine::new(vec![other().unwrap()]).unwrap();
        engine.run(input, &Options::default()).unwrap()
    }

    fn values(matches: &Matches, name: &str) -> Vec<Value> {
        matches.named(name).iter().map(|m| m.value.clone()).collect()
    }

    #[test]
    fn rip_and_proper() {
        let matches = run("Movie.2010.PROPER.DVDRip.XviD");
        assert_eq!(
            values(&matches, "other"),
            vec![Value::from("Proper"), Value::from("Rip")]
        );
        assert_eq!(values(&matches, "proper_count"), vec![Value::Int(1)]);
    }

    #[test]
    fn real_counts_twice() {
        let matches = run("Show.S01E01.REAL.PROPER.720p");
        assert_eq!(values(&matches, "proper_count"), vec![Value::Int(3)]);
        let matches = run("Real.Steel.2011.720p");
        assert!(values(&matches, "other").is_empty());
    }

    #[test]
    fn repeated_proper_is_counted_once() {
        let matches = run("Show.PROPER.S01E01.PROPER");
        assert_eq!(values(&matches, "proper_count"), vec![Value::Int(1)]);
    }

    #[test]
    fn complete_is_a_group_prefix() {
        let matches = run("Show.Season.1.Complete-GRP");
        let complete = matches.named("other");
        assert_eq!(complete[0].value, Value::from("Complete"));
        assert!(complete[0].tags.contains(Tags::RELEASE_GROUP_PREFIX));
    }
}
