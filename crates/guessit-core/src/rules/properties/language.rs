//! # Languages
//!
//! `language` and `subtitle_language` are found word by word against the
//! language table of the [`Config`]. A word is either a language name or
//! code (`french`, `fr`, `fre`), a synonym (`vff`, `dl`), or a language
//! glued to a subtitle prefix or suffix (`vostfr`, `engsub`). Separate
//! prefix and suffix words (`sub.french`, `french.subs`) are emitted as
//! private markers and resolved by the subtitle rules.
//!
//! Word resolution is memoized in a [`LanguageCache`] shared by every call
//! of one pipeline.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::{Config, LanguageEntry};
use crate::error::Result;
use crate::options::Options;
use crate::rebulk::matches::split_on;
use crate::rebulk::{Action, Found, Match, Matches, Pattern, Rebulk, Rule, Tags};
use crate::rules::common::{SEPS, only_seps};

const PREFIX_MARKER: &str = "subtitlePrefix";
const SUFFIX_MARKER: &str = "subtitleSuffix";

/// How a single word resolved against the language table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolved {
    Language(usize),
    Subtitle(usize),
}

/// Thread-safe memo of word resolutions.
#[derive(Debug, Clone, Default)]
pub struct LanguageCache {
    inner: Arc<RwLock<HashMap<String, Option<Resolved>>>>,
}

impl LanguageCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn resolve(&self, word: &str, f: impl FnOnce() -> Option<Resolved>) -> Option<Resolved> {
        if let Some(hit) = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(word)
        {
            return *hit;
        }
        let resolved = f();
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(word.to_string(), resolved);
        resolved
    }
}

struct LanguageTable {
    entries: Vec<LanguageEntry>,
    words: HashMap<String, usize>,
    /// Longest first.
    prefixes: Vec<String>,
    suffixes: Vec<String>,
    default_allowed: Vec<String>,
}

impl LanguageTable {
    fn from_config(config: &Config) -> Self {
        let language = &config.language;
        let mut words = HashMap::new();
        for (index, entry) in language.languages.iter().enumerate() {
            let spellings = [&entry.code, &entry.alpha3]
                .into_iter()
                .chain(&entry.names)
                .chain(language.synonyms.get(&entry.alpha3).into_iter().flatten());
            for word in spellings {
                words.entry(word.to_lowercase()).or_insert(index);
            }
        }
        let sorted = |list: &[String]| {
            let mut list: Vec<String> = list.iter().map(|w| w.to_lowercase()).collect();
            list.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
            list
        };
        Self {
            entries: language.languages.clone(),
            words,
            prefixes: sorted(&language.subtitle_prefixes),
            suffixes: sorted(&language.subtitle_suffixes),
            default_allowed: language.default_allowed.clone(),
        }
    }

    fn lookup(&self, word: &str) -> Option<usize> {
        self.words.get(word).copied()
    }

    fn resolve(&self, word: &str) -> Option<Resolved> {
        if let Some(index) = self.lookup(word) {
            return Some(Resolved::Language(index));
        }
        let glued = |rest: &str| (rest.len() >= 2).then(|| self.lookup(rest)).flatten();
        self.prefixes
            .iter()
            .filter_map(|p| word.strip_prefix(p.as_str()))
            .chain(self.suffixes.iter().filter_map(|s| word.strip_suffix(s.as_str())))
            .find_map(glued)
            .map(Resolved::Subtitle)
    }

    fn is_allowed(&self, index: usize, options: &Options) -> bool {
        let allowed = options
            .allowed_languages
            .as_deref()
            .unwrap_or(&self.default_allowed);
        let entry = &self.entries[index];
        let primary = entry.code.split('-').next().unwrap_or(&entry.code);
        allowed.iter().any(|a| {
            a.eq_ignore_ascii_case(&entry.code)
                || a.eq_ignore_ascii_case(primary)
                || a.eq_ignore_ascii_case(&entry.alpha3)
        })
    }

    fn code(&self, index: usize) -> &str {
        &self.entries[index].code
    }
}

fn find_languages(
    table: &LanguageTable,
    cache: &LanguageCache,
    input: &str,
    options: &Options,
) -> Vec<Found> {
    let tokens = split_on(input, 0, SEPS);
    let lowered: Vec<String> = tokens.iter().map(|&(s, e)| input[s..e].to_lowercase()).collect();
    let resolved: Vec<Option<Resolved>> = lowered
        .iter()
        .map(|word| {
            cache
                .resolve(word, || table.resolve(word))
                .filter(|r| match r {
                    Resolved::Language(i) | Resolved::Subtitle(i) => table.is_allowed(*i, options),
                })
        })
        .collect();

    let adjacent_language = |i: usize, j: usize| {
        let (a, b) = (tokens[i.min(j)], tokens[i.max(j)]);
        matches!(resolved[j], Some(Resolved::Language(_))) && only_seps(&input[a.1..b.0])
    };

    let mut ret = Vec::new();
    for (i, &(start, end)) in tokens.iter().enumerate() {
        match resolved[i] {
            Some(Resolved::Subtitle(index)) => ret.push(
                Found::new(start, end)
                    .named("subtitle_language")
                    .value(table.code(index)),
            ),
            Some(Resolved::Language(index)) => {
                let mut found = Found::new(start, end).value(table.code(index));
                if end - start <= 3 {
                    found = found.tags(Tags::WEAK_LANGUAGE | Tags::NO_RELEASE_GROUP_PREFIX);
                }
                ret.push(found);
            }
            None => {
                let word = lowered[i].as_str();
                let marker = if table.suffixes.iter().any(|s| s == word)
                    && i > 0
                    && adjacent_language(i, i - 1)
                {
                    Some(SUFFIX_MARKER)
                } else if table.prefixes.iter().any(|p| p == word)
                    && i + 1 < tokens.len()
                    && adjacent_language(i, i + 1)
                {
                    Some(PREFIX_MARKER)
                } else {
                    None
                };
                if let Some(name) = marker {
                    let mut found = Found::new(start, end).named(name).value(word);
                    found.private = true;
                    ret.push(found);
                }
            }
        }
    }
    ret
}

fn is_language(m: &Match) -> bool {
    matches!(m.name, "language" | "subtitle_language")
}

/// Drops languages spelled like common words (`it`, `no`, `de`) unless
/// they stand alone in a bracket group.
pub struct RemoveInvalidLanguages {
    common_words: Vec<String>,
}

impl RemoveInvalidLanguages {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            common_words: config.common_words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }
}

impl Rule for RemoveInvalidLanguages {
    fn name(&self) -> &'static str {
        "RemoveInvalidLanguages"
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        matches
            .filter(is_language)
            .into_iter()
            .filter(|m| self.common_words.contains(&matches.raw(m).to_lowercase()))
            .filter(|m| {
                let alone = matches
                    .markers_at_match(m, |marker| marker.name == "group")
                    .first()
                    .is_some_and(|group| {
                        let inner = (group.start + 1, group.end.saturating_sub(1));
                        matches.range(inner.0, inner.1, |o| !is_language(o)).is_empty()
                            && only_seps(
                                &matches.slice(inner.0, inner.1).replace(matches.raw(m), ""),
                            )
                    });
                !alone
            })
            .map(|m| Action::Remove(m.id()))
            .collect()
    }
}

/// `sub.french`: a language after a subtitle prefix word.
pub struct SubtitlePrefixLanguageRule;

impl Rule for SubtitlePrefixLanguageRule {
    fn name(&self) -> &'static str {
        "SubtitlePrefixLanguageRule"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["RemoveInvalidLanguages"]
    }

    fn properties(&self) -> &'static [&'static str] {
        &["subtitle_language"]
    }

    fn enabled(&self, context: &Options) -> bool {
        !context.is_disabled("subtitle_language")
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let mut actions = Vec::new();
        for prefix in matches.named(PREFIX_MARKER) {
            let language = matches
                .next(prefix, |m| m.name == "language")
                .into_iter()
                .next()
                .filter(|m| only_seps(matches.slice(prefix.end, m.start)));
            if let Some(language) = language {
                actions.push(Action::Rename(language.id(), "subtitle_language"));
                actions.push(Action::Remove(prefix.id()));
            }
        }
        actions
    }
}

/// `french.subs`: a language before a subtitle suffix word.
pub struct SubtitleSuffixLanguageRule;

impl Rule for SubtitleSuffixLanguageRule {
    fn name(&self) -> &'static str {
        "SubtitleSuffixLanguageRule"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["SubtitlePrefixLanguageRule"]
    }

    fn properties(&self) -> &'static [&'static str] {
        &["subtitle_language"]
    }

    fn enabled(&self, context: &Options) -> bool {
        !context.is_disabled("subtitle_language")
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let mut actions = Vec::new();
        for suffix in matches.named(SUFFIX_MARKER) {
            let language = matches
                .previous(suffix, |m| m.name == "language")
                .into_iter()
                .next()
                .filter(|m| only_seps(matches.slice(m.end, suffix.start)));
            if let Some(language) = language {
                actions.push(Action::Rename(language.id(), "subtitle_language"));
                actions.push(Action::Remove(suffix.id()));
            }
        }
        actions
    }
}

/// `Movie.en.srt`: the language closest before a subtitle extension is the
/// subtitle language.
pub struct SubtitleExtensionRule;

impl Rule for SubtitleExtensionRule {
    fn name(&self) -> &'static str {
        "SubtitleExtensionRule"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["SubtitleSuffixLanguageRule"]
    }

    fn properties(&self) -> &'static [&'static str] {
        &["subtitle_language"]
    }

    fn enabled(&self, context: &Options) -> bool {
        !context.is_disabled("subtitle_language")
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let Some(extension) = matches
            .tagged(Tags::EXTENSION | Tags::SUBTITLE_EXTENSION)
            .into_iter()
            .find(|m| m.name == "container")
        else {
            return Vec::new();
        };
        let Some(language) = matches
            .previous(extension, |m| m.name == "language")
            .into_iter()
            .next()
        else {
            return Vec::new();
        };
        let mut actions: Vec<Action> = matches
            .named_where("subtitle_language", |m| m.tags.contains(Tags::WEAK_LANGUAGE))
            .iter()
            .map(|m| Action::Remove(m.id()))
            .collect();
        actions.push(Action::Rename(language.id(), "subtitle_language"));
        actions
    }
}

pub fn language(config: &Config, cache: LanguageCache) -> Result<Rebulk> {
    let table = LanguageTable::from_config(config);
    Ok(Rebulk::new("language")
        .disabled(|o| o.is_disabled("language") && o.is_disabled("subtitle_language"))
        .pattern(Pattern::functional("language", move |input, options| {
            find_languages(&table, &cache, input, options)
        }))
        .rule(RemoveInvalidLanguages::new(config))
        .rule(SubtitlePrefixLanguageRule)
        .rule(SubtitleSuffixLanguageRule)
        .rule(SubtitleExtensionRule))
}
