//! Validation and identifier helpers

pub mod ident;

pub use ident::{is_uuid, random_suffix};
