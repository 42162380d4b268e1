use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::options::Options;
use crate::rebulk::{Match, Matches};
use crate::types::value::{MediaType, Value};

/// Match details reported in advanced mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    pub value: Value,
    /// Input text of the match, separators trimmed.
    pub raw: String,
    pub start: usize,
    pub end: usize,
    pub tags: Vec<String>,
}

/// Output value of one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Property {
    Value(Value),
    List(Vec<Value>),
    Detailed(Detail),
    DetailedList(Vec<Detail>),
}

impl Property {
    /// Every value carried, in order.
    #[must_use]
    pub fn values(&self) -> Vec<&Value> {
        match self {
            Self::Value(v) => vec![v],
            Self::List(list) => list.iter().collect(),
            Self::Detailed(d) => vec![&d.value],
            Self::DetailedList(list) => list.iter().map(|d| &d.value).collect(),
        }
    }
}

/// The property map returned by a guess.
///
/// Properties keep the order in which they first appear in the input;
/// `type` always comes last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Guess {
    properties: Vec<(String, Property)>,
}

impl Guess {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property, replacing any previous value in place.
    pub fn insert(&mut self, name: impl Into<String>, property: Property) {
        let name = name.into();
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = property,
            None => self.properties.push((name, property)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }

    /// First value of a property.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(|p| p.values().into_iter().next())
    }

    /// All values of a property; empty when absent.
    #[must_use]
    pub fn values(&self, name: &str) -> Vec<&Value> {
        self.get(name).map(Property::values).unwrap_or_default()
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.properties.iter().map(|(n, p)| (n.as_str(), p))
    }

    /// The inferred `type`.
    #[must_use]
    pub fn media_type(&self) -> Option<MediaType> {
        match self.value("type")?.as_str()? {
            "movie" => Some(MediaType::Movie),
            "episode" => Some(MediaType::Episode),
            _ => None,
        }
    }

    /// Builds the public map from the refined matches.
    pub(crate) fn from_matches(matches: &Matches, options: &Options) -> Self {
        let mut grouped: Vec<(&'static str, Vec<&Match>)> = Vec::new();
        for m in matches.filter(|m| !m.private && !options.is_disabled(m.name)) {
            match grouped.iter_mut().find(|(name, _)| *name == m.name) {
                Some((_, found)) => {
                    if !found.iter().any(|f| f.value == m.value) {
                        found.push(m);
                    }
                }
                None => grouped.push((m.name, vec![m])),
            }
        }

        let mut guess = Self::new();
        for (name, mut found) in grouped {
            if options.single_value {
                found.truncate(1);
            }
            let list = options.enforce_list || found.len() > 1;
            let property = if options.advanced {
                let mut details: Vec<Detail> = found.iter().map(|m| detail(matches, m)).collect();
                match details.pop() {
                    Some(only) if !list => Property::Detailed(only),
                    Some(last) => {
                        details.push(last);
                        Property::DetailedList(details)
                    }
                    None => continue,
                }
            } else {
                let mut values: Vec<Value> = found.iter().map(|m| m.value.clone()).collect();
                match values.pop() {
                    Some(only) if !list => Property::Value(only),
                    Some(last) => {
                        values.push(last);
                        Property::List(values)
                    }
                    None => continue,
                }
            };
            guess.insert(name, property);
        }
        guess
    }
}

fn detail(matches: &Matches, m: &Match) -> Detail {
    Detail {
        value: m.value.clone(),
        raw: matches.raw(m).to_string(),
        start: m.start,
        end: m.end,
        tags: m.tags.labels(),
    }
}

impl Serialize for Guess {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.properties.len()))?;
        for (name, property) in &self.properties {
            map.serialize_entry(name, property)?;
        }
        map.end()
    }
}

impl<'a> IntoIterator for &'a Guess {
    type Item = (&'a str, &'a Property);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a Property)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl fmt::Display for Guess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guess(")?;
        for (i, (name, property)) in self.properties.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let values: Vec<String> = property.values().iter().map(ToString::to_string).collect();
            write!(f, "{name}={}", values.join("|"))?;
        }
        write!(f, ")")
    }
}
