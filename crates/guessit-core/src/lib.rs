//! # guessit core
//!
//! Extracts metadata from video release names. Pattern matchers find
//! candidate matches over the input, an ordered rule set refines them and
//! the survivors become a property map.
//!
//! ## Quick Start
//!
//! ```rust
//! use guessit_core::{Options, Value, guessit};
//!
//! let guess = guessit("Show.Name.S01E02.720p.HDTV.x264-GROUP.mkv", &Options::default()).unwrap();
//!
//! assert_eq!(guess.value("title"), Some(&Value::from("Show Name")));
//! assert_eq!(guess.value("season"), Some(&Value::Int(1)));
//! assert_eq!(guess.value("episode"), Some(&Value::Int(2)));
//! assert_eq!(guess.value("release_group"), Some(&Value::from("GROUP")));
//! assert_eq!(guess.value("type"), Some(&Value::from("episode")));
//! ```
pub mod api;
pub mod config;
pub mod error;
pub mod options;
pub mod rebulk;
pub mod rules;
pub mod types;

// Re-export primary API
pub use api::{Guessit, guessit, properties};
pub use config::Config;
pub use error::{GuessitError, Result};
pub use options::Options;
pub use rules::properties::language::LanguageCache;
pub use types::{Detail, Guess, MediaType, Property, Value};
