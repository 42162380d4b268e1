//! # Pattern matchers
//!
//! A [`Pattern`] scans the whole input and stores candidate matches in the
//! arena. Three matcher kinds exist: case-insensitive strings, regexes
//! (optionally turning named groups into children) and functional matchers
//! returning [`Found`] regions.

use regex::Regex;

use crate::error::Result;
use crate::options::Options;
use crate::rebulk::conflict::ConflictSolver;
use crate::rebulk::matches::{Match, Matches};
use crate::rebulk::tags::Tags;
use crate::types::Value;

/// Turns raw text into a value. `None` discards the candidate.
pub type Formatter = fn(&str) -> Option<Value>;
/// Accepts or rejects a candidate match.
pub type Validator = fn(&Matches, &Match) -> bool;
/// Turns a pattern off for a given context.
pub type Disabled = fn(&Options) -> bool;
/// Custom matcher body.
pub type Functional = Box<dyn Fn(&str, &Options) -> Vec<Found> + Send + Sync>;

/// Region returned by a functional matcher.
#[derive(Debug, Clone, Default)]
pub struct Found {
    pub start: usize,
    pub end: usize,
    /// Overrides the pattern name.
    pub name: Option<&'static str>,
    /// Overrides the formatted value.
    pub value: Option<Value>,
    pub tags: Tags,
    pub private: bool,
    /// Non-empty children turn this region into a detached parent.
    pub children: Vec<Found>,
}

impl Found {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            ..Self::default()
        }
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags |= tags;
        self
    }
}

enum Matcher {
    Strings(Vec<String>),
    Regex(Vec<Regex>),
    Functional(Functional),
}

/// Declarative matcher producing candidate matches.
pub struct Pattern {
    name: &'static str,
    origin: &'static str,
    matcher: Matcher,
    value: Option<Value>,
    formatter: Option<Formatter>,
    child_formatters: Vec<(&'static str, Formatter)>,
    validator: Option<Validator>,
    tags: Tags,
    private: bool,
    children: &'static [&'static str],
    private_children: &'static [&'static str],
    conflict_solver: Option<ConflictSolver>,
    disabled: Option<Disabled>,
    values: Vec<Value>,
    marker: bool,
}

impl Pattern {
    fn with_matcher(name: &'static str, matcher: Matcher) -> Self {
        Self {
            name,
            origin: name,
            matcher,
            value: None,
            formatter: None,
            child_formatters: Vec::new(),
            validator: None,
            tags: Tags::empty(),
            private: false,
            children: &[],
            private_children: &[],
            conflict_solver: None,
            disabled: None,
            values: Vec::new(),
            marker: false,
        }
    }

    /// Case-insensitive literal matcher.
    pub fn string(name: &'static str, needles: &[&str]) -> Self {
        let needles = needles.iter().map(|s| s.to_ascii_lowercase()).collect();
        Self::with_matcher(name, Matcher::Strings(needles))
    }

    /// Regex matcher, case-insensitive unless the pattern sets its own flags.
    ///
    /// # Errors
    ///
    /// Returns `GuessitError::RegexError` if a pattern does not compile.
    pub fn regex(name: &'static str, patterns: &[&str]) -> Result<Self> {
        let regexes = patterns
            .iter()
            .map(|p| Regex::new(&format!("(?i){p}")))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::with_matcher(name, Matcher::Regex(regexes)))
    }

    /// Regex matcher honouring case.
    ///
    /// # Errors
    ///
    /// Returns `GuessitError::RegexError` if a pattern does not compile.
    pub fn regex_cased(name: &'static str, patterns: &[&str]) -> Result<Self> {
        let regexes = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::with_matcher(name, Matcher::Regex(regexes)))
    }

    pub fn functional(
        name: &'static str,
        f: impl Fn(&str, &Options) -> Vec<Found> + Send + Sync + 'static,
    ) -> Self {
        Self::with_matcher(name, Matcher::Functional(Box::new(f)))
    }

    /// Fixed value for every match, also declared for introspection.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        if !self.values.contains(&value) {
            self.values.push(value.clone());
        }
        self.value = Some(value);
        self
    }

    pub fn formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn child_formatter(mut self, name: &'static str, formatter: Formatter) -> Self {
        self.child_formatters.push((name, formatter));
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags |= tags;
        self
    }

    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Named regex groups that become children; the whole match becomes a
    /// detached parent.
    pub fn children(mut self, names: &'static [&'static str]) -> Self {
        self.children = names;
        self
    }

    /// Child names stored as private matches.
    pub fn private_children(mut self, names: &'static [&'static str]) -> Self {
        self.private_children = names;
        self
    }

    pub fn conflict_solver(mut self, solver: ConflictSolver) -> Self {
        self.conflict_solver = Some(solver);
        self
    }

    pub fn disabled(mut self, disabled: Disabled) -> Self {
        self.disabled = Some(disabled);
        self
    }

    pub fn origin(mut self, origin: &'static str) -> Self {
        self.origin = origin;
        self
    }

    /// Declares the value space for introspection.
    pub fn values(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        for value in values {
            if !self.values.contains(&value) {
                self.values.push(value);
            }
        }
        self
    }

    /// Produces markers instead of matches.
    pub fn marker(mut self) -> Self {
        self.marker = true;
        self
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Property names and declared values this pattern can emit.
    #[must_use]
    pub fn properties(&self) -> Vec<(&'static str, Vec<Value>)> {
        if self.marker || self.private {
            return Vec::new();
        }
        if self.children.is_empty() {
            return vec![(self.name, self.values.clone())];
        }
        self.children
            .iter()
            .filter(|c| !self.private_children.contains(c))
            .map(|c| (*c, Vec::new()))
            .collect()
    }

    #[must_use]
    pub fn is_disabled(&self, context: &Options) -> bool {
        self.disabled.is_some_and(|d| d(context))
    }

    /// Scans the input and stores every valid candidate.
    pub fn find(&self, matches: &mut Matches, context: &Options) {
        if self.is_disabled(context) {
            return;
        }
        let input = matches.input().to_string();
        match &self.matcher {
            Matcher::Strings(needles) => {
                let haystack = input.to_ascii_lowercase();
                for needle in needles.iter().filter(|n| !n.is_empty()) {
                    for (start, _) in haystack.match_indices(needle.as_str()) {
                        self.store_single(matches, Found::new(start, start + needle.len()));
                    }
                }
            }
            Matcher::Regex(regexes) => {
                for re in regexes {
                    for caps in re.captures_iter(&input) {
                        let Some(whole) = caps.get(0) else { continue };
                        if whole.is_empty() {
                            continue;
                        }
                        if self.children.is_empty() {
                            self.store_single(matches, Found::new(whole.start(), whole.end()));
                            continue;
                        }
                        let mut parent = Found::new(whole.start(), whole.end());
                        for name in self.children {
                            if let Some(group) = caps.name(name) {
                                parent
                                    .children
                                    .push(Found::new(group.start(), group.end()).named(name));
                            }
                        }
                        parent.children.sort_by_key(|c| c.start);
                        self.store_parent(matches, parent);
                    }
                }
            }
            Matcher::Functional(f) => {
                for found in f(&input, context) {
                    if found.children.is_empty() {
                        self.store_single(matches, found);
                    } else {
                        self.store_parent(matches, found);
                    }
                }
            }
        }
    }

    fn build(
        &self,
        matches: &Matches,
        found: &Found,
        formatter: Option<Formatter>,
    ) -> Option<Match> {
        let name = found.name.unwrap_or(self.name);
        let raw = matches.slice(found.start, found.end);
        let value = match (&found.value, &self.value) {
            (Some(v), _) => v.clone(),
            (None, Some(v)) if found.name.is_none() => v.clone(),
            _ => match formatter {
                Some(f) => f(raw)?,
                None => Value::Str(raw.to_string()),
            },
        };
        let mut m = if self.marker {
            Match::marker(found.start, found.end, name, value)
        } else {
            Match::new(found.start, found.end, name, value)
        };
        m.tags = self.tags | found.tags;
        m.private = self.private || found.private || self.private_children.contains(&name);
        m.origin = self.origin;
        m.conflict_solver = self.conflict_solver;
        Some(m)
    }

    fn store_single(&self, matches: &mut Matches, found: Found) {
        let Some(m) = self.build(matches, &found, self.formatter) else {
            return;
        };
        if self.validator.is_some_and(|v| !v(matches, &m)) {
            return;
        }
        matches.push(m);
    }

    fn store_parent(&self, matches: &mut Matches, found: Found) {
        let mut parent = Match::new(
            found.start,
            found.end,
            found.name.unwrap_or(self.name),
            Value::Str(matches.slice(found.start, found.end).to_string()),
        );
        parent.tags = self.tags | found.tags;
        parent.origin = self.origin;
        parent.conflict_solver = self.conflict_solver;
        if self.validator.is_some_and(|v| !v(matches, &parent)) {
            return;
        }

        let mut children = Vec::with_capacity(found.children.len());
        for child in &found.children {
            let name = child.name.unwrap_or(self.name);
            let formatter = self
                .child_formatters
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, f)| *f)
                .or(self.formatter);
            match self.build(matches, child, formatter) {
                Some(m) => children.push(m),
                None => return,
            }
        }
        if children.is_empty() {
            return;
        }

        let parent_id = matches.push_detached(parent);
        for child in children {
            matches.push_child(parent_id, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(raw: &str) -> Option<Value> {
        raw.parse().ok().map(Value::Int)
    }

    fn surrounded(matches: &Matches, m: &Match) -> bool {
        let input = matches.input();
        let before = input[..m.start].chars().next_back();
        let after = input[m.end..].chars().next();
        before.is_none_or(|c| !c.is_alphanumeric()) && after.is_none_or(|c| !c.is_alphanumeric())
    }

    #[test]
    fn string_pattern_is_case_insensitive() {
        let pattern = Pattern::string("source", &["hdtv"]).value("HDTV");
        let mut matches = Matches::new("Show.HdTv.avi");
        pattern.find(&mut matches, &Options::default());
        let found = matches.named("source");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, Value::from("HDTV"));
        assert_eq!(found[0].span(), (5, 9));
    }

    #[test]
    fn regex_pattern_applies_formatter_and_validator() {
        let pattern = Pattern::regex("year", &[r"\d{4}"])
            .unwrap()
            .formatter(int)
            .validator(surrounded);
        let mut matches = Matches::new("Movie 2010 x20201");
        pattern.find(&mut matches, &Options::default());
        let years = matches.named("year");
        assert_eq!(years.len(), 1);
        assert_eq!(years[0].value, Value::Int(2010));
    }

    #[test]
    fn regex_children_get_detached_parent() {
        let pattern = Pattern::regex("episode", &[r"S(?P<season>\d+)E(?P<episode>\d+)"])
            .unwrap()
            .children(&["season", "episode"])
            .formatter(int);
        let mut matches = Matches::new("Show.S01E02");
        pattern.find(&mut matches, &Options::default());
        assert_eq!(matches.named("season")[0].value, Value::Int(1));
        let episode = matches.named("episode")[0].clone();
        assert_eq!(episode.value, Value::Int(2));
        let initiator = matches.initiator(&episode);
        assert_eq!(initiator.span(), (5, 11));
        assert!(!matches.is_live(initiator.id()));
    }

    #[test]
    fn disabled_pattern_finds_nothing() {
        let pattern = Pattern::string("source", &["hdtv"]).disabled(|_| true);
        let mut matches = Matches::new("HDTV");
        pattern.find(&mut matches, &Options::default());
        assert!(matches.is_empty());
    }

    #[test]
    fn functional_pattern_with_children() {
        let pattern = Pattern::functional("bonus", |input, _| {
            input
                .find('x')
                .map(|i| {
                    let mut parent = Found::new(i, input.len());
                    parent.children.push(Found::new(i + 1, input.len()).named("bonus"));
                    vec![parent]
                })
                .unwrap_or_default()
        })
        .formatter(int);
        let mut matches = Matches::new("x03");
        pattern.find(&mut matches, &Options::default());
        assert_eq!(matches.named("bonus")[0].value, Value::Int(3));
    }

    #[test]
    fn properties_list_children_or_values() {
        let pattern = Pattern::string("source", &["hdtv"]).value("HDTV");
        assert_eq!(pattern.properties(), vec![("source", vec![Value::from("HDTV")])]);
        let pattern = Pattern::regex("x", &[r"(?P<a>\d)(?P<b>\d)"])
            .unwrap()
            .children(&["a", "b"])
            .private_children(&["b"]);
        assert_eq!(pattern.properties(), vec![("a", vec![])]);
    }
}
