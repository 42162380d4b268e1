pub mod guess;
pub mod value;

pub use guess::{Detail, Guess, Property};
pub use value::{MediaType, Value};
