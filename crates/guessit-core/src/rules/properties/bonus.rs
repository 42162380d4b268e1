use crate::error::Result;
use crate::options::Options;
use crate::rebulk::{
    Action, ConflictOutcome, HoleOptions, Match, Matches, Pattern, Rebulk, Rule, Tags,
};
use crate::rules::common::formatters::{cleanup, int, lower};
use crate::rules::common::validators::seps_surround;

/// `x01` loses against codecs (`x264`) and strong episode numbers.
fn bonus_conflict_solver(_: &Matches, _bonus: &Match, other: &Match) -> ConflictOutcome {
    let strong = matches!(other.name, "video_codec" | "episode")
        && !other.tags.contains(Tags::WEAK_EPISODE);
    if strong {
        ConflictOutcome::RemoveMatch
    } else {
        ConflictOutcome::Default
    }
}

fn bonus_pattern() -> Result<Pattern> {
    Ok(Pattern::regex("bonus", &[r"(?P<bonusMarker>x)(?P<bonus>\d+)"])?
        .children(&["bonusMarker", "bonus"])
        .private_children(&["bonusMarker"])
        .formatter(int)
        .child_formatter("bonusMarker", lower)
        .validator(seps_surround)
        .conflict_solver(bonus_conflict_solver))
}

/// `bonus_title`: the text following a bonus number.
pub struct BonusTitleRule;

impl Rule for BonusTitleRule {
    fn name(&self) -> &'static str {
        "BonusTitleRule"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["TitleFromPosition"]
    }

    fn properties(&self) -> &'static [&'static str] {
        &["bonus_title"]
    }

    fn enabled(&self, context: &Options) -> bool {
        !context.is_disabled("bonus_title")
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let Some(bonus) = matches.named_where("bonus", |m| !m.private).into_iter().next() else {
            return Vec::new();
        };
        let Some(filepart) = matches.filepart_of(bonus) else {
            return Vec::new();
        };
        let options = HoleOptions {
            formatter: Some(cleanup),
            ignore: None,
            seps: None,
        };
        let Some(mut hole) = matches
            .holes(bonus.end, filepart.end, &options)
            .into_iter()
            .next()
        else {
            return Vec::new();
        };
        if hole.value.is_empty() {
            return Vec::new();
        }
        hole.name = "bonus_title";
        vec![Action::Append(hole)]
    }
}

pub fn bonus() -> Result<Rebulk> {
    Ok(Rebulk::new("bonus")
        .disabled(|o| o.is_disabled("bonus"))
        .pattern(bonus_pattern()?)
        .rule(BonusTitleRule))
}
