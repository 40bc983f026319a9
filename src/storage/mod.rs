//! Storage module
//!
//! Thin handle over `object_store` used by both the record source and the
//! relation sink. A [`Location`] is opened from a URL and explicit
//! credentials; every path it deals in is relative to its root.

mod location;

pub use location::{percent_decode, Location};

#[cfg(test)]
mod tests;
