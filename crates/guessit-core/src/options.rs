//! # Options
//!
//! Per-call settings. Every pattern and rule receives the same immutable
//! [`Options`] as its context.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::MediaType;

/// Settings for a single guess.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Media type hint. Forces the `type` output and tunes episode patterns.
    #[serde(rename = "type")]
    pub media_type: Option<MediaType>,
    /// Treat the input as a bare file name, not a path.
    pub name_only: bool,
    /// Prefer year-first reading of ambiguous dates.
    pub date_year_first: bool,
    /// Prefer day-first reading of ambiguous dates.
    pub date_day_first: bool,
    /// Allowed language codes; the configured default list when `None`.
    pub allowed_languages: Option<Vec<String>>,
    /// Allowed country codes; the configured default list when `None`.
    pub allowed_countries: Option<Vec<String>>,
    /// Read `Show 112` as episode 112 rather than season 1 episode 12.
    pub episode_prefer_number: bool,
    /// Known titles, literal or `re:` prefixed regexes.
    pub expected_title: Vec<String>,
    /// Known release groups, literal or `re:` prefixed regexes.
    pub expected_group: Vec<String>,
    /// Property names to skip.
    pub excludes: Vec<String>,
    /// When non-empty, only these property names are produced.
    pub includes: Vec<String>,
    /// Emit raw/span/tags details for each value.
    pub advanced: bool,
    /// Keep only the first value of multi-valued properties.
    pub single_value: bool,
    /// Always emit lists.
    pub enforce_list: bool,
}

impl Options {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode options from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `GuessitError::Json` for malformed documents.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    pub fn with_name_only(mut self, enabled: bool) -> Self {
        self.name_only = enabled;
        self
    }

    pub fn with_date_year_first(mut self, enabled: bool) -> Self {
        self.date_year_first = enabled;
        self
    }

    pub fn with_date_day_first(mut self, enabled: bool) -> Self {
        self.date_day_first = enabled;
        self
    }

    pub fn with_allowed_languages<S: Into<String>>(
        mut self,
        codes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.allowed_languages = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_allowed_countries<S: Into<String>>(
        mut self,
        codes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.allowed_countries = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_episode_prefer_number(mut self, enabled: bool) -> Self {
        self.episode_prefer_number = enabled;
        self
    }

    pub fn with_expected_title(mut self, title: impl Into<String>) -> Self {
        self.expected_title.push(title.into());
        self
    }

    pub fn with_expected_group(mut self, group: impl Into<String>) -> Self {
        self.expected_group.push(group.into());
        self
    }

    pub fn with_exclude(mut self, name: impl Into<String>) -> Self {
        self.excludes.push(name.into());
        self
    }

    pub fn with_include(mut self, name: impl Into<String>) -> Self {
        self.includes.push(name.into());
        self
    }

    pub fn with_advanced(mut self, enabled: bool) -> Self {
        self.advanced = enabled;
        self
    }

    pub fn with_single_value(mut self, enabled: bool) -> Self {
        self.single_value = enabled;
        self
    }

    pub fn with_enforce_list(mut self, enabled: bool) -> Self {
        self.enforce_list = enabled;
        self
    }

    /// `true` when `name` is excluded, or when includes are given and do not
    /// list it.
    #[must_use]
    pub fn is_disabled(&self, name: &str) -> bool {
        if self.excludes.iter().any(|e| e == name) {
            return true;
        }
        !self.includes.is_empty() && !self.includes.iter().any(|i| i == name)
    }

    #[must_use]
    pub fn is_type(&self, media_type: MediaType) -> bool {
        self.media_type == Some(media_type)
    }

    /// Layers `other` over `self`: flags are or-ed, lists appended and
    /// `other`'s optional values win.
    pub fn merge(mut self, other: Options) -> Self {
        self.media_type = other.media_type.or(self.media_type);
        self.name_only |= other.name_only;
        self.date_year_first |= other.date_year_first;
        self.date_day_first |= other.date_day_first;
        self.allowed_languages = other.allowed_languages.or(self.allowed_languages);
        self.allowed_countries = other.allowed_countries.or(self.allowed_countries);
        self.episode_prefer_number |= other.episode_prefer_number;
        self.expected_title.extend(other.expected_title);
        self.expected_group.extend(other.expected_group);
        self.excludes.extend(other.excludes);
        self.includes.extend(other.includes);
        self.advanced |= other.advanced;
        self.single_value |= other.single_value;
        self.enforce_list |= other.enforce_list;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excludes_and_includes() {
        let options = Options::new().with_exclude("country");
        assert!(options.is_disabled("country"));
        assert!(!options.is_disabled("title"));

        let options = Options::new().with_include("title");
        assert!(!options.is_disabled("title"));
        assert!(options.is_disabled("season"));
    }

    #[test]
    fn decodes_from_json() {
        let options = Options::from_json(
            r#"{"type": "episode", "episode_prefer_number": true, "expected_title": ["OSS 117"]}"#,
        )
        .unwrap();
        assert_eq!(options.media_type, Some(MediaType::Episode));
        assert!(options.episode_prefer_number);
        assert_eq!(options.expected_title, vec!["OSS 117"]);
        assert!(!options.name_only);
    }

    #[test]
    fn merge_layers_flags_and_lists() {
        let base = Options::new().with_type(MediaType::Movie).with_exclude("a");
        let top = Options::new().with_exclude("b").with_advanced(true);
        let merged = base.merge(top);
        assert_eq!(merged.media_type, Some(MediaType::Movie));
        assert_eq!(merged.excludes, vec!["a", "b"]);
        assert!(merged.advanced);
    }
}
