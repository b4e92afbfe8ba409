//! # kindred-shared
//!
//! Data model exchanged with the Kindred backend, plus the validation rules
//! the client applies before submitting anything.

pub mod constants;
pub mod error;
pub mod types;
pub mod validate;

pub use error::{Field, IdentityError, ValidationError};
pub use types::*;
