//! # Match arena
//!
//! All candidate matches of one input live in a single [`Matches`] arena and
//! are addressed by [`MatchId`]. Removing a match flips its live flag; ids
//! stay valid for the whole run so parent/child links never dangle.

use tracing::trace;

use crate::error::{GuessitError, Result};
use crate::rebulk::conflict::ConflictSolver;
use crate::rebulk::rules::Action;
use crate::rebulk::tags::Tags;
use crate::types::Value;

/// Stable index of a match inside a [`Matches`] arena.
pub type MatchId = usize;

const DETACHED: MatchId = usize::MAX;

/// A named, typed span of the input.
#[derive(Debug, Clone)]
pub struct Match {
    /// Start offset (inclusive, bytes).
    pub start: usize,
    /// End offset (exclusive, bytes).
    pub end: usize,
    /// Property name. Holes are unnamed (`""`) until a rule names them.
    pub name: &'static str,
    /// Typed value.
    pub value: Value,
    /// Start of the raw region reported in advanced output.
    pub raw_start: usize,
    /// End of the raw region reported in advanced output.
    pub raw_end: usize,
    /// Private matches steer rules but never reach the output.
    pub private: bool,
    /// Markers describe regions (fileparts, bracket groups) only.
    pub marker: bool,
    pub tags: Tags,
    /// Identifier of the pattern that produced the match.
    pub origin: &'static str,
    pub conflict_solver: Option<ConflictSolver>,
    pub(crate) id: MatchId,
    pub(crate) parent: Option<MatchId>,
    pub(crate) children: Vec<MatchId>,
}

impl Match {
    pub fn new(start: usize, end: usize, name: &'static str, value: Value) -> Self {
        Self {
            start,
            end,
            name,
            value,
            raw_start: start,
            raw_end: end,
            private: false,
            marker: false,
            tags: Tags::empty(),
            origin: name,
            conflict_solver: None,
            id: DETACHED,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Region-only match used for fileparts and bracket groups.
    pub fn marker(start: usize, end: usize, name: &'static str, value: Value) -> Self {
        let mut m = Self::new(start, end, name, value);
        m.marker = true;
        m
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags |= tags;
        self
    }

    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    pub fn with_origin(mut self, origin: &'static str) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_conflict_solver(mut self, solver: Option<ConflictSolver>) -> Self {
        self.conflict_solver = solver;
        self
    }

    /// Arena id, or `usize::MAX` for matches not stored in a collection.
    #[must_use]
    pub fn id(&self) -> MatchId {
        self.id
    }

    #[must_use]
    pub fn parent(&self) -> Option<MatchId> {
        self.parent
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[must_use]
    pub fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Strict overlap of two spans.
    #[must_use]
    pub fn overlaps(&self, other: &Match) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Rebuilds the match over a new span, keeping name, tags and links.
    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.start = start;
        self.end = end;
        self.raw_start = start;
        self.raw_end = end;
        self
    }
}

/// Optional knobs for [`Matches::holes`].
#[derive(Default)]
pub struct HoleOptions<'a> {
    /// Turns the raw hole text into its value.
    pub formatter: Option<fn(&str) -> String>,
    /// Matches accepted by this predicate do not claim their span.
    pub ignore: Option<&'a dyn Fn(&Match) -> bool>,
    /// When set, holes are split on these characters.
    pub seps: Option<&'a str>,
}

/// Arena of matches and markers for a single input.
#[derive(Debug, Clone)]
pub struct Matches {
    input: String,
    arena: Vec<Match>,
    live: Vec<bool>,
}

impl Matches {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            arena: Vec::new(),
            live: Vec::new(),
        }
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Raw text of a match (its raw region, which may differ from the span).
    #[must_use]
    pub fn raw(&self, m: &Match) -> &str {
        self.input.get(m.raw_start..m.raw_end).unwrap_or("")
    }

    /// Text covered by the span of a match.
    #[must_use]
    pub fn text(&self, m: &Match) -> &str {
        self.slice(m.start, m.end)
    }

    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> &str {
        self.input.get(start..end).unwrap_or("")
    }

    /// Stores a match and returns its id. A match with a parent is also
    /// registered as a child of that parent.
    pub fn push(&mut self, mut m: Match) -> MatchId {
        let id = self.arena.len();
        m.id = id;
        if let Some(parent) = m.parent {
            if let Some(p) = self.arena.get_mut(parent) {
                p.children.push(id);
            }
        }
        self.arena.push(m);
        self.live.push(true);
        id
    }

    /// Stores a match that is never visible to queries (regex parents).
    pub fn push_detached(&mut self, m: Match) -> MatchId {
        let id = self.push(m);
        self.live[id] = false;
        id
    }

    /// Stores `child` under `parent`.
    pub fn push_child(&mut self, parent: MatchId, mut child: Match) -> MatchId {
        child.parent = Some(parent);
        self.push(child)
    }

    /// Looks up any match, live or not.
    #[must_use]
    pub fn get(&self, id: MatchId) -> Option<&Match> {
        self.arena.get(id)
    }

    #[must_use]
    pub fn is_live(&self, id: MatchId) -> bool {
        self.live.get(id).copied().unwrap_or(false)
    }

    /// Top-most ancestor of a match, or the match itself.
    #[must_use]
    pub fn initiator<'a>(&'a self, m: &'a Match) -> &'a Match {
        let mut current = m;
        while let Some(parent) = current.parent.and_then(|p| self.arena.get(p)) {
            current = parent;
        }
        current
    }

    /// Live children of a match.
    #[must_use]
    pub fn children(&self, m: &Match) -> Vec<&Match> {
        let mut ret: Vec<&Match> = m
            .children
            .iter()
            .filter(|id| self.is_live(**id))
            .filter_map(|id| self.arena.get(*id))
            .collect();
        sort_by_position(&mut ret);
        ret
    }

    /// Number of live, non-marker matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter_live().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter_live(&self) -> impl Iterator<Item = &Match> {
        self.arena
            .iter()
            .filter(|m| !m.marker && self.live[m.id])
    }

    fn iter_markers(&self) -> impl Iterator<Item = &Match> {
        self.arena.iter().filter(|m| m.marker && self.live[m.id])
    }

    /// Every live match, sorted by position.
    #[must_use]
    pub fn all(&self) -> Vec<&Match> {
        self.filter(|_| true)
    }

    /// Live matches accepted by `pred`, sorted by position.
    pub fn filter(&self, pred: impl Fn(&Match) -> bool) -> Vec<&Match> {
        let mut ret: Vec<&Match> = self.iter_live().filter(|m| pred(m)).collect();
        sort_by_position(&mut ret);
        ret
    }

    #[must_use]
    pub fn named(&self, name: &str) -> Vec<&Match> {
        self.filter(|m| m.name == name)
    }

    pub fn named_where(&self, name: &str, pred: impl Fn(&Match) -> bool) -> Vec<&Match> {
        self.filter(|m| m.name == name && pred(m))
    }

    /// Live matches carrying every flag of `tags`.
    #[must_use]
    pub fn tagged(&self, tags: Tags) -> Vec<&Match> {
        self.filter(|m| m.tags.contains(tags))
    }

    /// Live matches overlapping `[start, end)`. Empty matches count when
    /// their position lies inside the range.
    pub fn range(&self, start: usize, end: usize, pred: impl Fn(&Match) -> bool) -> Vec<&Match> {
        self.filter(|m| in_range(m, start, end) && pred(m))
    }

    pub fn starting(&self, pos: usize, pred: impl Fn(&Match) -> bool) -> Vec<&Match> {
        self.filter(|m| m.start == pos && pred(m))
    }

    pub fn ending(&self, pos: usize, pred: impl Fn(&Match) -> bool) -> Vec<&Match> {
        self.filter(|m| m.end == pos && pred(m))
    }

    /// Matches ending at or before `m.start`, nearest first.
    pub fn previous(&self, m: &Match, pred: impl Fn(&Match) -> bool) -> Vec<&Match> {
        let mut ret: Vec<&Match> = self
            .iter_live()
            .filter(|o| o.id != m.id && o.end <= m.start && pred(o))
            .collect();
        ret.sort_by(|a, b| (b.end, b.start, b.id).cmp(&(a.end, a.start, a.id)));
        ret
    }

    /// Matches starting at or after `m.end`, nearest first.
    pub fn next(&self, m: &Match, pred: impl Fn(&Match) -> bool) -> Vec<&Match> {
        let mut ret: Vec<&Match> = self
            .iter_live()
            .filter(|o| o.id != m.id && o.start >= m.end && pred(o))
            .collect();
        sort_by_position(&mut ret);
        ret
    }

    /// Live matches whose span strictly overlaps the span of `m`.
    #[must_use]
    pub fn conflicting(&self, m: &Match) -> Vec<&Match> {
        self.filter(|o| o.id != m.id && o.overlaps(m))
    }

    /// Unclaimed regions of `[start, end)`, as detached unnamed matches.
    #[must_use]
    pub fn holes(&self, start: usize, end: usize, options: &HoleOptions<'_>) -> Vec<Match> {
        let end = end.min(self.input.len());
        if start >= end {
            return Vec::new();
        }
        let mut claimed: Vec<(usize, usize)> = self
            .iter_live()
            .filter(|m| !m.is_empty() && m.start < end && m.end > start)
            .filter(|m| options.ignore.is_none_or(|ignore| !ignore(m)))
            .map(|m| (m.start, m.end))
            .collect();
        claimed.sort_unstable();

        let mut gaps = Vec::new();
        let mut cursor = start;
        for (s, e) in claimed {
            if s > cursor {
                gaps.push((cursor, s.min(end)));
            }
            cursor = cursor.max(e);
            if cursor >= end {
                break;
            }
        }
        if cursor < end {
            gaps.push((cursor, end));
        }

        let gaps = match options.seps {
            Some(seps) => gaps
                .into_iter()
                .flat_map(|(s, e)| split_on(self.slice(s, e), s, seps))
                .collect(),
            None => gaps,
        };

        gaps.into_iter()
            .map(|(s, e)| self.hole(s, e, options.formatter))
            .collect()
    }

    /// Builds a detached unnamed match over `[start, end)`.
    #[must_use]
    pub fn hole(&self, start: usize, end: usize, formatter: Option<fn(&str) -> String>) -> Match {
        let raw = self.slice(start, end);
        let value = match formatter {
            Some(f) => f(raw),
            None => raw.to_string(),
        };
        Match::new(start, end, "", Value::Str(value))
    }

    #[must_use]
    pub fn markers_named(&self, name: &str) -> Vec<&Match> {
        let mut ret: Vec<&Match> = self.iter_markers().filter(|m| m.name == name).collect();
        sort_by_position(&mut ret);
        ret
    }

    pub fn markers_range(
        &self,
        start: usize,
        end: usize,
        pred: impl Fn(&Match) -> bool,
    ) -> Vec<&Match> {
        let mut ret: Vec<&Match> = self
            .iter_markers()
            .filter(|m| in_range(m, start, end) && pred(m))
            .collect();
        sort_by_position(&mut ret);
        ret
    }

    /// Markers enclosing (or overlapping) the span of `m`.
    pub fn markers_at_match(&self, m: &Match, pred: impl Fn(&Match) -> bool) -> Vec<&Match> {
        let mut ret: Vec<&Match> = self
            .iter_markers()
            .filter(|marker| {
                if m.is_empty() {
                    marker.start <= m.start && m.start <= marker.end
                } else {
                    marker.overlaps(m)
                }
            })
            .filter(|marker| pred(marker))
            .collect();
        sort_by_position(&mut ret);
        ret
    }

    /// Filepart (path marker) containing a match.
    #[must_use]
    pub fn filepart_of(&self, m: &Match) -> Option<&Match> {
        self.markers_at_match(m, |marker| marker.name == "path")
            .into_iter()
            .next()
    }

    fn check(&self, id: MatchId) -> Result<()> {
        if id < self.arena.len() {
            Ok(())
        } else {
            Err(GuessitError::UnknownMatch(id))
        }
    }

    /// Applies rule consequences in order.
    ///
    /// # Errors
    ///
    /// Returns `GuessitError::UnknownMatch` when an action references an id
    /// that was never stored.
    pub fn apply(&mut self, actions: Vec<Action>) -> Result<()> {
        for action in actions {
            match action {
                Action::Remove(id) => {
                    self.check(id)?;
                    if self.live[id] {
                        trace!(name = self.arena[id].name, id, "remove match");
                        self.live[id] = false;
                    }
                }
                Action::Append(m) => {
                    trace!(name = m.name, start = m.start, end = m.end, "append match");
                    self.push(m);
                }
                Action::Rename(id, name) => {
                    self.check(id)?;
                    self.arena[id].name = name;
                }
                Action::Update(id, mut m) => {
                    self.check(id)?;
                    let old = &self.arena[id];
                    m.id = id;
                    m.parent = old.parent;
                    m.children = old.children.clone();
                    self.arena[id] = m;
                }
            }
        }
        Ok(())
    }
}

fn in_range(m: &Match, start: usize, end: usize) -> bool {
    if m.is_empty() {
        start <= m.start && m.start < end.max(start + 1)
    } else {
        m.start < end && m.end > start
    }
}

fn sort_by_position(v: &mut [&Match]) {
    v.sort_by_key(|m| (m.start, m.end, m.id));
}

/// Splits `text` (located at `offset`) on any char of `seps`.
pub(crate) fn split_on(text: &str, offset: usize, seps: &str) -> Vec<(usize, usize)> {
    let mut ret = Vec::new();
    let mut current: Option<usize> = None;
    for (idx, c) in text.char_indices() {
        if seps.contains(c) {
            if let Some(s) = current.take() {
                ret.push((offset + s, offset + idx));
            }
        } else if current.is_none() {
            current = Some(idx);
        }
    }
    if let Some(s) = current {
        ret.push((offset + s, offset + text.len()));
    }
    ret
}
