use bitflags::bitflags;

bitflags! {
    /// Closed set of labels attached to matches.
    ///
    /// Rules query tags to decide precedence; the advanced output lists
    /// them in kebab-case.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Tags: u32 {
        const EXTENSION = 1 << 0;
        const SUBTITLE_EXTENSION = 1 << 1;
        const INFO_EXTENSION = 1 << 2;
        const WEAK_EPISODE = 1 << 3;
        const WEAK_DUPLICATE = 1 << 4;
        const SXXEXX = 1 << 5;
        const ANIME = 1 << 6;
        const SCENE = 1 << 7;
        const RELEASE_GROUP_PREFIX = 1 << 8;
        const NO_RELEASE_GROUP_PREFIX = 1 << 9;
        const WEAK_LANGUAGE = 1 << 10;
        const WEAK_AUDIO_CHANNELS = 1 << 11;
        const REAL = 1 << 12;
        const EXPECTED = 1 << 13;
        const TITLE = 1 << 14;
        const EQUIVALENT_IGNORE = 1 << 15;
    }
}

impl Tags {
    /// Kebab-case names of the set flags, in declaration order.
    #[must_use]
    pub fn labels(self) -> Vec<String> {
        self.iter_names()
            .map(|(name, _)| match name {
                "SXXEXX" => "SxxExx".to_string(),
                other => other.to_ascii_lowercase().replace('_', "-"),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_kebab_case() {
        let tags = Tags::WEAK_EPISODE | Tags::SXXEXX | Tags::ANIME;
        assert_eq!(tags.labels(), vec!["weak-episode", "SxxExx", "anime"]);
        assert!(Tags::empty().labels().is_empty());
    }
}
