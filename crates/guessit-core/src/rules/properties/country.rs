use std::collections::HashMap;

use crate::config::Config;
use crate::error::Result;
use crate::options::Options;
use crate::rebulk::matches::split_on;
use crate::rebulk::{ConflictOutcome, Found, Match, Matches, Pattern, Rebulk};
use crate::rules::common::SEPS;
use crate::rules::common::validators::seps_surround;

/// A country spelled exactly like a language code wins over it.
fn country_conflict_solver(_: &Matches, country: &Match, other: &Match) -> ConflictOutcome {
    if other.name == "language" && other.span() == country.span() {
        ConflictOutcome::RemoveOther
    } else {
        ConflictOutcome::Default
    }
}

fn find_countries(
    names: &HashMap<String, String>,
    default_allowed: &[String],
    input: &str,
    options: &Options,
) -> Vec<Found> {
    let allowed = options.allowed_countries.as_deref().unwrap_or(default_allowed);
    split_on(input, 0, SEPS)
        .into_iter()
        .filter_map(|(start, end)| {
            let code = names.get(&input[start..end].to_lowercase())?;
            allowed
                .iter()
                .any(|a| a.eq_ignore_ascii_case(code))
                .then(|| Found::new(start, end).value(code.as_str()))
        })
        .collect()
}

pub fn country(config: &Config) -> Result<Rebulk> {
    let names: HashMap<String, String> = config
        .country
        .countries
        .iter()
        .flat_map(|entry| {
            entry
                .names
                .iter()
                .map(|name| (name.to_lowercase(), entry.code.to_uppercase()))
        })
        .collect();
    let default_allowed = config.country.default_allowed.clone();

    Ok(Rebulk::new("country")
        .disabled(|o| o.is_disabled("country"))
        .pattern(
            Pattern::functional("country", move |input, options| {
                find_countries(&names, &default_allowed, input, options)
            })
            .validator(seps_surround)
            .conflict_solver(country_conflict_solver),
        ))
}
