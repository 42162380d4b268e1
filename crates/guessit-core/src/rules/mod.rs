//! The guessit rule set: markers, property modules and processors, in
//! pipeline order.

pub mod common;
pub mod markers;
pub mod processors;
pub mod properties;

use crate::config::Config;
use crate::error::Result;
use crate::rebulk::{Engine, Rebulk};
use crate::rules::properties::language::LanguageCache;
use crate::rules::properties::{
    audio_codec, bonus, container, country, crc, date, edition, episode_title, episodes, film,
    language, media_type, other, release_group, screen_size, size, source, title, video_codec,
    year,
};

/// Every module of the pipeline, in declaration order.
///
/// # Errors
///
/// Fails when a pattern does not compile.
pub fn rebulk_builder(config: &Config, cache: LanguageCache) -> Result<Vec<Rebulk>> {
    Ok(vec![
        markers::markers(config),
        episodes::episodes(config)?,
        container::container(config)?,
        source::source()?,
        video_codec::video_codec()?,
        video_codec::color_depth()?,
        audio_codec::audio_codec()?,
        audio_codec::audio_channels()?,
        screen_size::screen_size()?,
        date::date()?,
        year::year()?,
        title::title()?,
        episode_title::episode_title()?,
        language::language(config, cache)?,
        country::country(config)?,
        release_group::release_group(config)?,
        other::other()?,
        edition::edition()?,
        size::size()?,
        crc::crc()?,
        bonus::bonus()?,
        film::film()?,
        media_type::media_type()?,
        processors::processors(),
    ])
}

/// Compiles the full pipeline.
///
/// # Errors
///
/// Fails on invalid patterns or an inconsistent rule graph.
pub fn engine(config: &Config, cache: LanguageCache) -> Result<Engine> {
    Engine::new(rebulk_builder(config, cache)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_builds_in_order() {
        let config = Config::default_config().unwrap();
        let engine = engine(&config, LanguageCache::new()).unwrap();
        let names = engine.rule_names();
        let position = |name: &str| names.iter().position(|n| *n == name).unwrap();

        assert_eq!(names.first(), Some(&"ConflictSolver"));
        assert_eq!(names.last(), Some(&"PrivateRemover"));
        assert!(position("FilmTitleRule") < position("TitleFromPosition"));
        assert!(position("TitleFromPosition") < position("SceneReleaseGroup"));
        assert!(position("SceneReleaseGroup") < position("EpisodeTitleFromPosition"));
        assert!(position("RemoveAmbiguous") < position("TypeProcessor"));
        assert!(position("TypeProcessor") < position("RenameEpisodeTitleWhenMovieType"));
        assert_eq!(engine.module_names()[0], "markers");
    }
}
