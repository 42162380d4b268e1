//! # Pattern tables
//!
//! Declarative tables consumed by the property modules. The default tables
//! ship embedded in the binary; custom tables can be loaded from JSON.
//! Tables are validated eagerly so a bad entry fails the pipeline build,
//! never a guess.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{GuessitError, Result};

const DEFAULT_CONFIG: &str = include_str!("../config/default.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Words never read as a language or country on their own.
    pub common_words: Vec<String>,
    pub groups: GroupsConfig,
    pub container: ContainerConfig,
    pub episodes: EpisodesConfig,
    pub language: LanguageConfig,
    pub country: CountryConfig,
    pub release_group: ReleaseGroupConfig,
}

/// Bracket pairs; `starting[i]` closes with `ending[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupsConfig {
    pub starting: String,
    pub ending: String,
}

impl GroupsConfig {
    /// Opening/closing pairs.
    #[must_use]
    pub fn pairs(&self) -> Vec<(char, char)> {
        self.starting.chars().zip(self.ending.chars()).collect()
    }
}

/// File extensions by family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerConfig {
    pub subtitles: Vec<String>,
    pub info: Vec<String>,
    pub videos: Vec<String>,
    pub torrent: Vec<String>,
    pub nzb: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodesConfig {
    pub season_max_range: i64,
    pub episode_max_range: i64,
    /// Separators expanding `1-3` into `1, 2, 3`.
    pub range_separators: Vec<String>,
    /// Separators listing values without expansion (`1+3`).
    pub discrete_separators: Vec<String>,
    pub season_words: Vec<String>,
    pub episode_words: Vec<String>,
    pub of_words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageEntry {
    /// Output code (`en`, `pt-BR`, `mul`).
    pub code: String,
    pub alpha3: String,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub languages: Vec<LanguageEntry>,
    /// Extra words keyed by `alpha3`.
    pub synonyms: BTreeMap<String, Vec<String>>,
    pub subtitle_prefixes: Vec<String>,
    pub subtitle_suffixes: Vec<String>,
    pub default_allowed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryEntry {
    pub code: String,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryConfig {
    pub countries: Vec<CountryEntry>,
    pub default_allowed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseGroupConfig {
    /// Words that never form a release group on their own.
    pub forbidden_names: Vec<String>,
    /// Characters trimmed from group names.
    pub ignored_seps: String,
}

impl Config {
    /// The embedded default tables.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded document is broken.
    pub fn default_config() -> Result<Self> {
        Self::from_json(DEFAULT_CONFIG)
    }

    /// Decode and validate tables from JSON.
    ///
    /// # Errors
    ///
    /// Returns `GuessitError::Json` for malformed documents and
    /// `GuessitError::Configuration` for invalid tables.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks table consistency.
    ///
    /// # Errors
    ///
    /// Returns `GuessitError::Configuration` describing the first problem.
    pub fn validate(&self) -> Result<()> {
        let starting = self.groups.starting.chars().count();
        let ending = self.groups.ending.chars().count();
        if starting != ending || starting == 0 {
            return Err(GuessitError::Configuration(format!(
                "groups.starting ({starting} chars) and groups.ending ({ending} chars) must pair up"
            )));
        }

        let episodes = &self.episodes;
        if episodes.range_separators.is_empty() || episodes.discrete_separators.is_empty() {
            return Err(GuessitError::Configuration(
                "episode separator lists must not be empty".into(),
            ));
        }
        if let Some(sep) = episodes
            .range_separators
            .iter()
            .find(|s| episodes.discrete_separators.contains(s))
        {
            return Err(GuessitError::Configuration(format!(
                "separator {sep:?} is both a range and a discrete separator"
            )));
        }
        if episodes.season_max_range <= 0 || episodes.episode_max_range <= 0 {
            return Err(GuessitError::Configuration(
                "max ranges must be positive".into(),
            ));
        }
        if let Some(sep) = episodes
            .range_separators
            .iter()
            .chain(&episodes.discrete_separators)
            .find(|s| s.is_empty())
        {
            return Err(GuessitError::Configuration(format!(
                "empty episode separator {sep:?}"
            )));
        }

        let mut alpha3 = HashSet::new();
        for entry in &self.language.languages {
            if entry.code.is_empty() || entry.alpha3.is_empty() {
                return Err(GuessitError::Configuration(format!(
                    "language entry {entry:?} needs a code and an alpha3"
                )));
            }
            alpha3.insert(entry.alpha3.as_str());
        }
        if let Some(key) = self
            .language
            .synonyms
            .keys()
            .find(|k| !alpha3.contains(k.as_str()))
        {
            return Err(GuessitError::Configuration(format!(
                "language synonyms reference unknown language {key}"
            )));
        }
        if let Some(entry) = self.country.countries.iter().find(|c| c.code.is_empty()) {
            return Err(GuessitError::Configuration(format!(
                "country entry {entry:?} needs a code"
            )));
        }
        Ok(())
    }

    /// `true` when `word` is in the common-word blacklist.
    #[must_use]
    pub fn is_common_word(&self, word: &str) -> bool {
        self.common_words.iter().any(|w| w.eq_ignore_ascii_case(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = Config::default_config().unwrap();
        assert_eq!(config.groups.pairs(), vec![('(', ')'), ('[', ']'), ('{', '}')]);
        assert!(config.container.videos.iter().any(|e| e == "mkv"));
        assert_eq!(config.episodes.episode_max_range, 100);
        assert!(config.is_common_word("IT"));
    }

    #[test]
    fn mismatched_groups_are_rejected() {
        let mut config = Config::default_config().unwrap();
        config.groups.ending = ")]".into();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, GuessitError::Configuration(_)));
    }

    #[test]
    fn overlapping_separators_are_rejected() {
        let mut config = Config::default_config().unwrap();
        config.episodes.discrete_separators.push("-".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_synonym_language_is_rejected() {
        let mut config = Config::default_config().unwrap();
        config
            .language
            .synonyms
            .insert("xxx".into(), vec!["nope".into()]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = Config::from_json("{").unwrap_err();
        assert!(matches!(err, GuessitError::Json(_)));
    }
}
