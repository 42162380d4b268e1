//! Property modules. Each function returns the [`Rebulk`] module holding the
//! patterns and rules of one property family.

pub mod audio_codec;
pub mod bonus;
pub mod container;
pub mod country;
pub mod crc;
pub mod date;
pub mod edition;
pub mod episode_title;
pub mod episodes;
pub mod film;
pub mod language;
pub mod media_type;
pub mod other;
pub mod release_group;
pub mod screen_size;
pub mod size;
pub mod source;
pub mod title;
pub mod video_codec;
pub mod year;

use crate::error::Result;
use crate::rebulk::{Pattern, Validator};
use crate::rules::common::validators::seps_surround;

/// One regex per `(pattern, value)` entry, all sharing `name` and validator.
pub(crate) fn value_table(
    name: &'static str,
    entries: &[(&str, &'static str)],
    validator: Validator,
) -> Result<Vec<Pattern>> {
    entries
        .iter()
        .map(|(re, value)| Ok(Pattern::regex(name, &[re])?.value(*value).validator(validator)))
        .collect()
}

/// [`value_table`] with the usual separator validation.
pub(crate) fn surrounded_table(
    name: &'static str,
    entries: &[(&str, &'static str)],
) -> Result<Vec<Pattern>> {
    value_table(name, entries, seps_surround)
}
