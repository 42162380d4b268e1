//! # Chain matcher
//!
//! A head regex followed by any number of tail regexes applied one after
//! the other at the end of the previous piece (`S01E01E02-04v2`). The whole
//! chain becomes one detached parent whose children are the named groups of
//! every piece.

use regex::{Captures, Regex};

use crate::error::Result;
use crate::rebulk::pattern::Found;

/// Head plus repeatable tails.
#[derive(Debug, Clone)]
pub struct Chain {
    head: Regex,
    tails: Vec<Regex>,
    groups: &'static [&'static str],
}

impl Chain {
    /// Compiles a case-insensitive chain. `groups` lists the capture names
    /// turned into children.
    ///
    /// # Errors
    ///
    /// Returns `GuessitError::RegexError` if a piece does not compile.
    pub fn new(head: &str, tails: &[String], groups: &'static [&'static str]) -> Result<Self> {
        let head = Regex::new(&format!("(?i){head}"))?;
        let tails = tails
            .iter()
            .map(|t| Regex::new(&format!("(?i){t}")))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            head,
            tails,
            groups,
        })
    }

    /// Every chain found in `input`, leftmost first, non-overlapping.
    #[must_use]
    pub fn find(&self, input: &str) -> Vec<Found> {
        let mut ret = Vec::new();
        let mut cursor = 0;
        while cursor <= input.len() {
            let Some(caps) = self.head.captures_at(input, cursor) else {
                break;
            };
            let Some(whole) = caps.get(0) else { break };
            if whole.is_empty() {
                cursor = next_char(input, whole.end());
                continue;
            }

            let mut parent = Found::new(whole.start(), whole.end());
            self.collect(&caps, &mut parent);
            while let Some(caps) = self.tail_at(input, parent.end) {
                self.collect(&caps, &mut parent);
                parent.end = caps.get(0).map_or(parent.end, |m| m.end());
            }
            cursor = parent.end;
            if !parent.children.is_empty() {
                ret.push(parent);
            }
        }
        ret
    }

    /// Non-empty match of `tail` starting exactly at `pos`.
    fn piece_at<'h>(tail: &Regex, input: &'h str, pos: usize) -> Option<Captures<'h>> {
        let caps = tail.captures_at(input, pos)?;
        let whole = caps.get(0)?;
        (whole.start() == pos && !whole.is_empty()).then_some(caps)
    }

    /// First tail matching at `pos` that ends on a word boundary or is
    /// followed by another tail.
    fn tail_at<'h>(&self, input: &'h str, pos: usize) -> Option<Captures<'h>> {
        self.tails.iter().find_map(|tail| {
            let caps = Self::piece_at(tail, input, pos)?;
            let end = caps.get(0)?.end();
            let bounded = input[end..].chars().next().is_none_or(|c| !c.is_alphanumeric());
            let continued = self
                .tails
                .iter()
                .any(|t| Self::piece_at(t, input, end).is_some());
            (bounded || continued).then_some(caps)
        })
    }

    /// Children of one piece, in input order.
    fn collect(&self, caps: &Captures<'_>, parent: &mut Found) {
        let mut piece: Vec<Found> = self
            .groups
            .iter()
            .filter_map(|&name| {
                caps.name(name)
                    .map(|group| Found::new(group.start(), group.end()).named(name))
            })
            .collect();
        piece.sort_by_key(|c| c.start);
        parent.children.extend(piece);
    }
}

fn next_char(input: &str, pos: usize) -> usize {
    input[pos..]
        .chars()
        .next()
        .map_or(input.len() + 1, |c| pos + c.len_utf8())
}
