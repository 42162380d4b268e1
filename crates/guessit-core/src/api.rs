//! # Guessing entry points
//!
//! [`Guessit`] owns a built pipeline and can be shared across threads. The
//! free functions [`guessit`] and [`properties`] use a lazily built
//! default instance.

use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe, catch_unwind};
use std::sync::{Once, OnceLock};

use tracing::debug;

use crate::config::Config;
use crate::error::{GuessitError, Result};
use crate::options::Options;
use crate::rebulk::Engine;
use crate::rules::{engine, properties::language::LanguageCache};
use crate::types::{Guess, Value};

/// A built guessit pipeline.
pub struct Guessit {
    engine: Engine,
    cache: LanguageCache,
}

impl Guessit {
    /// Builds the pipeline from the embedded default tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded tables or the rule graph are invalid.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default_config()?)
    }

    /// Builds the pipeline from custom tables.
    ///
    /// # Errors
    ///
    /// Returns [`GuessitError::Configuration`] for invalid tables or rule
    /// dependencies, and [`GuessitError::RegexError`] for bad patterns.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let cache = LanguageCache::new();
        let engine = engine(&config, cache.clone())?;
        debug!(
            modules = engine.module_names().len(),
            rules = engine.rule_names().len(),
            "pipeline built"
        );
        Ok(Self { engine, cache })
    }

    /// Guesses the properties of `input`.
    ///
    /// # Errors
    ///
    /// Any failure, including a panic inside a rule, is reported as
    /// [`GuessitError::Internal`] carrying the input and options.
    pub fn guess(&self, input: &str, options: &Options) -> Result<Guess> {
        debug!(input, "guess");
        install_trace_hook();
        PANIC_TRACE.with(|slot| slot.borrow_mut().take());
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.engine
                .run(input, options)
                .map(|matches| Guess::from_matches(&matches, options))
        }));
        let guess = match outcome {
            Ok(Ok(guess)) => guess,
            Ok(Err(err)) => {
                let traceback = Backtrace::force_capture().to_string();
                return Err(internal(input, options, err.to_string(), traceback));
            }
            Err(payload) => {
                let traceback = PANIC_TRACE
                    .with(|slot| slot.borrow_mut().take())
                    .unwrap_or_else(|| "no backtrace captured".to_string());
                return Err(internal(input, options, panic_message(payload.as_ref()), traceback));
            }
        };
        debug!(input, properties = guess.len(), "guessed");
        Ok(guess)
    }

    /// Every property the pipeline can produce for these options, with the
    /// values known up front.
    #[must_use]
    pub fn properties(&self, options: &Options) -> BTreeMap<String, Vec<Value>> {
        self.engine.properties(options)
    }

    /// Rule names in execution order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.engine.rule_names()
    }

    /// Drops memoized language lookups.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

thread_local! {
    /// Backtrace of the last panic raised on this thread.
    static PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static TRACE_HOOK: Once = Once::new();

/// Chains a panic hook recording the backtrace of the panicking thread.
fn install_trace_hook() {
    TRACE_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let trace = Backtrace::force_capture().to_string();
            let _ = PANIC_TRACE.try_with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

fn internal(input: &str, options: &Options, message: String, traceback: String) -> GuessitError {
    GuessitError::Internal {
        version: env!("CARGO_PKG_VERSION"),
        input: input.to_string(),
        options: serde_json::to_string(options).unwrap_or_default(),
        message,
        traceback,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic during guess".to_string()
    }
}

static DEFAULT: OnceLock<std::result::Result<Guessit, String>> = OnceLock::new();

fn default_instance() -> Result<&'static Guessit> {
    DEFAULT
        .get_or_init(|| Guessit::new().map_err(|err| err.to_string()))
        .as_ref()
        .map_err(|msg| GuessitError::Configuration(msg.clone()))
}

/// Guesses `input` with the default pipeline.
///
/// # Errors
///
/// See [`Guessit::guess`].
pub fn guessit(input: &str, options: &Options) -> Result<Guess> {
    default_instance()?.guess(input, options)
}

/// Property value space of the default pipeline.
///
/// # Errors
///
/// Fails only if the default pipeline cannot be built.
pub fn properties(options: &Options) -> Result<BTreeMap<String, Vec<Value>>> {
    Ok(default_instance()?.properties(options))
}
