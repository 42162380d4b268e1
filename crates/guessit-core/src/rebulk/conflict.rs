use std::collections::HashSet;

use tracing::trace;

use crate::options::Options;
use crate::rebulk::matches::{Match, MatchId, Matches};
use crate::rebulk::rules::{Action, PRE_PROCESS, POST_PROCESS, Rule};

/// Verdict of a conflict solver called as `solver(matches, a, b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictOutcome {
    /// Remove `a`.
    RemoveMatch,
    /// Remove `b`.
    RemoveOther,
    /// Both stay.
    KeepBoth,
    /// Defer to the next solver in the chain.
    Default,
}

/// Per-pattern conflict solver.
pub type ConflictSolver = fn(&Matches, &Match, &Match) -> ConflictOutcome;

/// Generic fallback: the match with the shorter initiator loses, ties keep
/// both.
pub fn default_conflict_solver(matches: &Matches, m: &Match, other: &Match) -> ConflictOutcome {
    let len = matches.initiator(m).len();
    let other_len = matches.initiator(other).len();
    if len < other_len {
        ConflictOutcome::RemoveMatch
    } else if other_len < len {
        ConflictOutcome::RemoveOther
    } else {
        ConflictOutcome::KeepBoth
    }
}

/// Resolves overlapping public matches. First rule to run.
pub struct ConflictSolverRule;

impl Rule for ConflictSolverRule {
    fn name(&self) -> &'static str {
        "ConflictSolver"
    }

    fn priority(&self) -> i32 {
        PRE_PROCESS
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let mut to_remove: Vec<MatchId> = Vec::new();
        let mut seen: HashSet<MatchId> = HashSet::new();

        let mut public = matches.filter(|m| !m.private);
        public.sort_by_key(|m| m.len());

        for m in public {
            let initiator = matches.initiator(m).id();
            let mut conflicting: Vec<&Match> = matches
                .conflicting(m)
                .into_iter()
                .filter(|o| !o.private && matches.initiator(o).id() != initiator)
                .collect();
            conflicting.sort_by_key(|o| o.len());

            for other in conflicting {
                let Some(loser) = solve(matches, m, other) else {
                    continue;
                };
                let winner = if loser.id() == m.id() { other } else { m };
                if seen.contains(&winner.id()) {
                    continue;
                }
                if seen.insert(loser.id()) {
                    trace!(
                        removed = loser.name,
                        raw = matches.text(loser),
                        kept = winner.name,
                        "conflicting match removed"
                    );
                    to_remove.push(loser.id());
                }
            }
        }

        to_remove.into_iter().map(Action::Remove).collect()
    }
}

/// Runs the solver chain: the other match's solver (reversed), the match's
/// own solver, then the default.
fn solve<'a>(matches: &Matches, m: &'a Match, other: &'a Match) -> Option<&'a Match> {
    if let Some(solver) = other.conflict_solver {
        match solver(matches, other, m) {
            ConflictOutcome::RemoveMatch => return Some(other),
            ConflictOutcome::RemoveOther => return Some(m),
            ConflictOutcome::KeepBoth => return None,
            ConflictOutcome::Default => {}
        }
    }
    if let Some(solver) = m.conflict_solver {
        match solver(matches, m, other) {
            ConflictOutcome::RemoveMatch => return Some(m),
            ConflictOutcome::RemoveOther => return Some(other),
            ConflictOutcome::KeepBoth => return None,
            ConflictOutcome::Default => {}
        }
    }
    match default_conflict_solver(matches, m, other) {
        ConflictOutcome::RemoveMatch => Some(m),
        ConflictOutcome::RemoveOther => Some(other),
        _ => None,
    }
}

/// Drops every private match. Registered last.
pub struct PrivateRemover;

impl Rule for PrivateRemover {
    fn name(&self) -> &'static str {
        "PrivateRemover"
    }

    fn priority(&self) -> i32 {
        POST_PROCESS
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        matches
            .filter(|m| m.private)
            .into_iter()
            .map(|m| Action::Remove(m.id()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn run(matches: &mut Matches) {
        let actions = ConflictSolverRule.when(matches, &Options::default());
        matches.apply(actions).unwrap();
    }

    #[test]
    fn shorter_match_loses() {
        let mut matches = Matches::new("HDTVRip");
        matches.push(Match::new(0, 4, "source", Value::from("HDTV")));
        matches.push(Match::new(0, 7, "other", Value::from("Rip")));
        matches.push(Match::new(2, 7, "title", Value::from("TVRip")));
        run(&mut matches);
        let names: Vec<&str> = matches.all().iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["other"]);
    }

    #[test]
    fn equal_lengths_keep_both() {
        let mut matches = Matches::new("BDRip");
        matches.push(Match::new(0, 5, "source", Value::from("Blu-ray")));
        matches.push(Match::new(0, 5, "other", Value::from("Rip")));
        run(&mut matches);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn custom_solver_overrides_default() {
        fn keep_short(_: &Matches, _: &Match, _: &Match) -> ConflictOutcome {
            ConflictOutcome::RemoveOther
        }
        let mut matches = Matches::new("2020x");
        matches.push(
            Match::new(0, 4, "year", Value::Int(2020)).with_conflict_solver(Some(keep_short)),
        );
        matches.push(Match::new(0, 5, "title", Value::from("2020x")));
        run(&mut matches);
        let names: Vec<&str> = matches.all().iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["year"]);
    }

    #[test]
    fn removed_match_cannot_win_later() {
        fn strong(_: &Matches, _: &Match, _: &Match) -> ConflictOutcome {
            ConflictOutcome::RemoveOther
        }
        fn weak(_: &Matches, _: &Match, _: &Match) -> ConflictOutcome {
            ConflictOutcome::RemoveMatch
        }
        let mut matches = Matches::new("201x.Extra");
        matches.push(Match::new(0, 2, "year", Value::Int(20)).with_conflict_solver(Some(strong)));
        matches.push(Match::new(1, 5, "episode", Value::Int(1)));
        matches.push(
            Match::new(3, 9, "other", Value::from("Extra")).with_conflict_solver(Some(weak)),
        );
        run(&mut matches);
        let names: Vec<&str> = matches.all().iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["year", "other"]);
    }

    #[test]
    fn private_matches_are_ignored_then_removed() {
        let mut matches = Matches::new("S01");
        matches.push(Match::new(0, 1, "seasonMarker", Value::from("S")).with_private(true));
        matches.push(Match::new(0, 3, "title", Value::from("S01")));
        run(&mut matches);
        assert_eq!(matches.len(), 2);

        let actions = PrivateRemover.when(&matches, &Options::default());
        matches.apply(actions).unwrap();
        assert_eq!(matches.len(), 1);
    }
}
