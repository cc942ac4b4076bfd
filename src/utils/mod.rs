//! Shortcut-code building blocks and request helpers.
//!
//! - [`letter_generator`] - Seed-driven (and random) letter suffixes
//! - [`text_entropier`] - Random upper/lower-case scrambling
//! - [`host_prefix`] - Host-derived base codes and partition keys
//! - [`request_param`] - Parameter lookup in query string or JSON body

pub mod host_prefix;
pub mod letter_generator;
pub mod request_param;
pub mod text_entropier;
