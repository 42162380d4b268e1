//! # Rebulk match engine
//!
//! Generic machinery behind the guessit rules: a match arena, pattern
//! matchers, conflict solving and an ordered rule engine. Nothing in this
//! module knows about video properties.

pub mod chain;
pub mod conflict;
pub mod matches;
pub mod pattern;
pub mod rules;
pub mod tags;

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::Result;
use crate::options::Options;
use crate::types::Value;

pub use chain::Chain;
pub use conflict::{ConflictOutcome, ConflictSolver, ConflictSolverRule, PrivateRemover};
pub use matches::{HoleOptions, Match, MatchId, Matches};
pub use pattern::{Disabled, Formatter, Found, Pattern, Validator};
pub use rules::{Action, DEFAULT, POST_PROCESS, PRE_PROCESS, Rule, RuleEntry, RuleSet};
pub use tags::Tags;

/// A property module: patterns plus the rules refining their matches.
///
/// A module with a `disabled` predicate is switched off as a whole,
/// patterns and rules alike.
pub struct Rebulk {
    name: &'static str,
    disabled: Option<Disabled>,
    patterns: Vec<Pattern>,
    rules: Vec<Box<dyn Rule>>,
}

impl Rebulk {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            disabled: None,
            patterns: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn disabled(mut self, disabled: Disabled) -> Self {
        self.disabled = Some(disabled);
        self
    }

    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    pub fn patterns(mut self, patterns: impl IntoIterator<Item = Pattern>) -> Self {
        self.patterns.extend(patterns);
        self
    }

    pub fn rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

struct CompiledModule {
    name: &'static str,
    disabled: Option<Disabled>,
    patterns: Vec<Pattern>,
}

impl CompiledModule {
    fn is_disabled(&self, context: &Options) -> bool {
        self.disabled.is_some_and(|d| d(context))
    }
}

/// Compiled pipeline: every module's patterns and the ordered rule set.
pub struct Engine {
    modules: Vec<CompiledModule>,
    rules: RuleSet,
}

impl Engine {
    /// Builds the engine. The conflict solver runs first and the private
    /// remover last.
    ///
    /// # Errors
    ///
    /// Returns `GuessitError::Configuration` when the rule graph is invalid.
    pub fn new(modules: Vec<Rebulk>) -> Result<Self> {
        let mut entries = vec![RuleEntry {
            module: "rebulk",
            disabled: None,
            rule: Box::new(ConflictSolverRule),
        }];
        let mut compiled = Vec::with_capacity(modules.len());
        for module in modules {
            let (name, disabled) = (module.name, module.disabled);
            entries.extend(module.rules.into_iter().map(|rule| RuleEntry {
                module: name,
                disabled,
                rule,
            }));
            compiled.push(CompiledModule {
                name,
                disabled,
                patterns: module.patterns,
            });
        }
        entries.push(RuleEntry {
            module: "rebulk",
            disabled: None,
            rule: Box::new(PrivateRemover),
        });

        let rules = RuleSet::new(entries)?;
        debug!(
            modules = compiled.len(),
            rules = rules.names().len(),
            "engine built"
        );
        Ok(Self {
            modules: compiled,
            rules,
        })
    }

    /// Runs every pattern then every rule over `input`.
    ///
    /// # Errors
    ///
    /// Propagates rule reducer failures.
    pub fn run(&self, input: &str, context: &Options) -> Result<Matches> {
        let mut matches = Matches::new(input);
        for module in self.modules.iter().filter(|m| !m.is_disabled(context)) {
            for pattern in &module.patterns {
                pattern.find(&mut matches, context);
            }
        }
        self.rules.execute(&mut matches, context)?;
        Ok(matches)
    }

    /// Names of the rules in execution order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.names()
    }

    /// Names of the modules in declaration order.
    #[must_use]
    pub fn module_names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name).collect()
    }

    /// Every property the enabled modules may produce, with known values.
    #[must_use]
    pub fn properties(&self, context: &Options) -> BTreeMap<String, Vec<Value>> {
        let mut ret: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        let mut add = |name: &str, values: Vec<Value>| {
            let entry = ret.entry(name.to_string()).or_default();
            for value in values {
                if !entry.contains(&value) {
                    entry.push(value);
                }
            }
        };
        for module in self.modules.iter().filter(|m| !m.is_disabled(context)) {
            for pattern in module.patterns.iter().filter(|p| !p.is_disabled(context)) {
                for (name, values) in pattern.properties() {
                    add(name, values);
                }
            }
        }
        for entry in self.rules.iter() {
            if !entry.is_active(context) {
                continue;
            }
            for name in entry.rule.properties() {
                add(name, Vec::new());
            }
        }
        ret
    }
}
