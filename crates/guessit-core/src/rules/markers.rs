//! Path (filepart) and bracket group markers.

use crate::config::Config;
use crate::rebulk::{Found, Pattern, Rebulk};

/// Splits on `/` and `\`. Each separator stays with the segment it ends so
/// the segments partition the whole input.
#[must_use]
pub fn path_spans(input: &str, name_only: bool) -> Vec<(usize, usize)> {
    if name_only || input.is_empty() {
        return vec![(0, input.len())];
    }
    let mut ret = Vec::new();
    let mut start = 0;
    for (idx, c) in input.char_indices() {
        if c == '/' || c == '\\' {
            ret.push((start, idx + 1));
            start = idx + 1;
        }
    }
    if start < input.len() {
        ret.push((start, input.len()));
    }
    ret
}

/// Bracketed regions, one stack per bracket pair. Unmatched closers are
/// dropped, unclosed openers never produce a region.
#[must_use]
pub fn group_spans(input: &str, pairs: &[(char, char)]) -> Vec<(usize, usize)> {
    let mut stacks: Vec<Vec<usize>> = vec![Vec::new(); pairs.len()];
    let mut ret = Vec::new();
    for (idx, c) in input.char_indices() {
        if let Some(i) = pairs.iter().position(|(open, _)| *open == c) {
            stacks[i].push(idx);
        } else if let Some(i) = pairs.iter().position(|(_, close)| *close == c) {
            if let Some(start) = stacks[i].pop() {
                ret.push((start, idx + c.len_utf8()));
            }
        }
    }
    ret
}

pub fn markers(config: &Config) -> Rebulk {
    let pairs = config.groups.pairs();
    Rebulk::new("markers")
        .pattern(
            Pattern::functional("path", |input, context| {
                path_spans(input, context.name_only)
                    .into_iter()
                    .map(|(start, end)| Found::new(start, end))
                    .collect()
            })
            .marker(),
        )
        .pattern(
            Pattern::functional("group", move |input, _| {
                group_spans(input, &pairs)
                    .into_iter()
                    .map(|(start, end)| Found::new(start, end))
                    .collect()
            })
            .marker(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIRS: &[(char, char)] = &[('(', ')'), ('[', ']'), ('{', '}')];

    fn assert_partition(input: &str, spans: &[(usize, usize)]) {
        let mut cursor = 0;
        for (start, end) in spans {
            assert_eq!(*start, cursor);
            assert!(start <= end);
            cursor = *end;
        }
        assert_eq!(cursor, input.len());
    }

    #[test]
    fn path_segments_partition_input() {
        for input in [
            "Series/Show/Season 1/Show.S01E02.mkv",
            "C:\\Movies\\Movie (2010).avi",
            "/root/",
            "a//b",
            "name.mkv",
            "",
        ] {
            assert_partition(input, &path_spans(input, false));
        }
        assert_eq!(path_spans("a/b", false), vec![(0, 2), (2, 3)]);
        assert_eq!(path_spans("a/b", true), vec![(0, 3)]);
    }

    #[test]
    fn groups_are_balanced_per_bracket_type() {
        let input = "[Group] Title (2010) {x}";
        let spans = group_spans(input, PAIRS);
        assert_eq!(spans, vec![(0, 7), (14, 20), (21, 24)]);
        for (start, end) in spans {
            let open = input[start..].chars().next().unwrap();
            let close = input[..end].chars().next_back().unwrap();
            assert!(PAIRS.contains(&(open, close)));
        }
    }

    #[test]
    fn unmatched_closers_are_dropped() {
        assert_eq!(group_spans("a)b]c", PAIRS), vec![]);
        assert_eq!(group_spans("[a(b]c)", PAIRS), vec![(0, 5), (2, 7)]);
        assert_eq!(group_spans("((a)", PAIRS), vec![(1, 4)]);
    }
}
