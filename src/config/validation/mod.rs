//! Configuration validation
//!
//! - `trait_def`: the `Validate` trait
//! - `validators`: implementations for every configuration section
//! - `ssrf`: destination checks shared with webhook registration

mod ssrf;
mod trait_def;
mod validators;

pub use ssrf::validate_url_against_ssrf;
pub use trait_def::Validate;
