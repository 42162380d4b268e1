//! # Rule engine
//!
//! Rules refine the candidate matches once every pattern has run. A rule
//! inspects the collection in [`Rule::when`] and answers with a list of
//! [`Action`]s; [`Rule::then`] hands them to the single reducer
//! [`Matches::apply`].
//!
//! Execution order: ascending priority tier, then a stable topological order
//! of declared dependencies inside each tier.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::error::{GuessitError, Result};
use crate::options::Options;
use crate::rebulk::matches::{Match, MatchId, Matches};
use crate::rebulk::pattern::Disabled;

/// Runs before everything else.
pub const PRE_PROCESS: i32 = -2048;
/// Default tier.
pub const DEFAULT: i32 = 0;
/// Runs after everything else.
pub const POST_PROCESS: i32 = 2048;

/// Consequence of a rule.
#[derive(Debug, Clone)]
pub enum Action {
    /// Drop a match from the collection.
    Remove(MatchId),
    /// Add a new match.
    Append(Match),
    /// Change the property name of a match.
    Rename(MatchId, &'static str),
    /// Replace span, value, tags... of a match, keeping its id and links.
    Update(MatchId, Match),
}

/// A refinement step over the match collection.
pub trait Rule: Send + Sync {
    /// Unique rule name, used for dependencies and logs.
    fn name(&self) -> &'static str;

    fn priority(&self) -> i32 {
        DEFAULT
    }

    /// Names of rules that must run first.
    fn dependencies(&self) -> &'static [&'static str] {
        &[]
    }

    fn enabled(&self, _context: &Options) -> bool {
        true
    }

    /// Properties this rule can produce, for introspection.
    fn properties(&self) -> &'static [&'static str] {
        &[]
    }

    /// Inspects the collection and returns the consequences.
    fn when(&self, matches: &Matches, context: &Options) -> Vec<Action>;

    /// Applies consequences.
    ///
    /// # Errors
    ///
    /// Fails when an action references an unknown match.
    fn then(&self, matches: &mut Matches, actions: Vec<Action>, _context: &Options) -> Result<()> {
        matches.apply(actions)
    }
}

/// A rule tagged with the property module that declared it.
pub struct RuleEntry {
    pub module: &'static str,
    /// Switch of the declaring module.
    pub disabled: Option<Disabled>,
    pub rule: Box<dyn Rule>,
}

impl RuleEntry {
    /// `true` when the rule should run for `context`.
    #[must_use]
    pub fn is_active(&self, context: &Options) -> bool {
        !self.disabled.is_some_and(|d| d(context)) && self.rule.enabled(context)
    }
}

/// Rules in execution order.
pub struct RuleSet {
    rules: Vec<RuleEntry>,
}

impl RuleSet {
    /// Orders rules by priority tier and dependency.
    ///
    /// # Errors
    ///
    /// Returns `GuessitError::Configuration` for duplicate names, unknown
    /// dependencies, dependencies on a later tier and cycles.
    pub fn new(entries: Vec<RuleEntry>) -> Result<Self> {
        let mut tiers: BTreeMap<i32, Vec<RuleEntry>> = BTreeMap::new();
        let mut tier_of: HashMap<&'static str, i32> = HashMap::new();
        for entry in entries {
            let name = entry.rule.name();
            let priority = entry.rule.priority();
            if tier_of.insert(name, priority).is_some() {
                return Err(GuessitError::Configuration(format!(
                    "duplicate rule name {name}"
                )));
            }
            tiers.entry(priority).or_default().push(entry);
        }

        for tier in tiers.values() {
            for entry in tier {
                for dep in entry.rule.dependencies() {
                    match tier_of.get(dep) {
                        None => {
                            return Err(GuessitError::Configuration(format!(
                                "rule {} depends on unknown rule {dep}",
                                entry.rule.name()
                            )));
                        }
                        Some(p) if *p > entry.rule.priority() => {
                            return Err(GuessitError::Configuration(format!(
                                "rule {} depends on {dep} which runs in a later tier",
                                entry.rule.name()
                            )));
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        let mut rules = Vec::new();
        for (_, tier) in tiers {
            rules.extend(toposort(tier)?);
        }
        debug!(count = rules.len(), "rule set built");
        Ok(Self { rules })
    }

    /// Rule names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|e| e.rule.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleEntry> {
        self.rules.iter()
    }

    /// Runs every enabled rule over the collection.
    ///
    /// # Errors
    ///
    /// Propagates reducer failures.
    pub fn execute(&self, matches: &mut Matches, context: &Options) -> Result<()> {
        for entry in &self.rules {
            if !entry.is_active(context) {
                continue;
            }
            let actions = entry.rule.when(matches, context);
            if actions.is_empty() {
                continue;
            }
            trace!(
                module = entry.module,
                rule = entry.rule.name(),
                actions = actions.len(),
                "rule applied"
            );
            entry.rule.then(matches, actions, context)?;
        }
        Ok(())
    }
}

/// Stable topological sort of one tier (Kahn, picking the earliest declared
/// ready rule each round).
fn toposort(tier: Vec<RuleEntry>) -> Result<Vec<RuleEntry>> {
    let names: Vec<&'static str> = tier.iter().map(|e| e.rule.name()).collect();
    let mut slots: Vec<Option<RuleEntry>> = tier.into_iter().map(Some).collect();
    let mut done = vec![false; slots.len()];
    let mut ordered = Vec::with_capacity(slots.len());

    while ordered.len() < slots.len() {
        let ready = (0..slots.len()).find(|&i| {
            !done[i]
                && slots[i].as_ref().is_some_and(|e| {
                    e.rule.dependencies().iter().all(|dep| {
                        names
                            .iter()
                            .position(|n| n == dep)
                            .is_none_or(|j| done[j])
                    })
                })
        });
        let Some(i) = ready else {
            let pending: Vec<&str> = (0..names.len())
                .filter(|i| !done[*i])
                .map(|i| names[i])
                .collect();
            return Err(GuessitError::Configuration(format!(
                "cyclic rule dependencies between {}",
                pending.join(", ")
            )));
        };
        done[i] = true;
        if let Some(entry) = slots[i].take() {
            ordered.push(entry);
        }
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named {
        name: &'static str,
        priority: i32,
        deps: &'static [&'static str],
    }

    impl Rule for Named {
        fn name(&self) -> &'static str {
            self.name
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        fn dependencies(&self) -> &'static [&'static str] {
            self.deps
        }
        fn when(&self, _matches: &Matches, _context: &Options) -> Vec<Action> {
            Vec::new()
        }
    }

    fn entry(name: &'static str, priority: i32, deps: &'static [&'static str]) -> RuleEntry {
        RuleEntry {
            module: "test",
            disabled: None,
            rule: Box::new(Named {
                name,
                priority,
                deps,
            }),
        }
    }

    #[test]
    fn orders_by_tier_then_dependencies() {
        let set = RuleSet::new(vec![
            entry("post", POST_PROCESS, &[]),
            entry("b", DEFAULT, &["c"]),
            entry("a", DEFAULT, &[]),
            entry("c", DEFAULT, &[]),
            entry("pre", PRE_PROCESS, &[]),
        ])
        .unwrap();
        assert_eq!(set.names(), vec!["pre", "a", "c", "b", "post"]);
    }

    #[test]
    fn earlier_tier_dependency_is_allowed() {
        let set = RuleSet::new(vec![
            entry("late", POST_PROCESS, &["early"]),
            entry("early", DEFAULT, &[]),
        ])
        .unwrap();
        assert_eq!(set.names(), vec!["early", "late"]);
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let err = RuleSet::new(vec![entry("a", DEFAULT, &["missing"])]).err();
        assert!(matches!(err, Some(GuessitError::Configuration(_))));
    }

    #[test]
    fn later_tier_dependency_is_rejected() {
        let err = RuleSet::new(vec![
            entry("a", DEFAULT, &["b"]),
            entry("b", POST_PROCESS, &[]),
        ])
        .err();
        assert!(matches!(err, Some(GuessitError::Configuration(_))));
    }

    #[test]
    fn disabled_module_skips_rule() {
        let mut e = entry("a", DEFAULT, &[]);
        assert!(e.is_active(&Options::default()));
        e.disabled = Some(|o| o.is_disabled("test"));
        assert!(!e.is_active(&Options::new().with_exclude("test")));
    }

    #[test]
    fn cycle_is_rejected() {
        let err = RuleSet::new(vec![
            entry("a", DEFAULT, &["b"]),
            entry("b", DEFAULT, &["a"]),
        ])
        .err();
        match err {
            Some(GuessitError::Configuration(msg)) => assert!(msg.contains("cyclic")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
