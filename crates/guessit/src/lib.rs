//! # guessit
//!
//! Extracts as much information as possible from a video release name.
//! This crate re-exports [`guessit_core`] and ships the `guessit` command
//! line tool.
//!
//! ```rust
//! use guessit::{Options, Value, guessit};
//!
//! let input = "Movie.Title.2020.1080p.BluRay.x264-GROUP.mkv";
//! let guess = guessit(input, &Options::default()).unwrap();
//! assert_eq!(guess.value("year"), Some(&Value::Int(2020)));
//! ```
pub use guessit_core::*;
