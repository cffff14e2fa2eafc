//! Pure prediction and classification helpers for leadloom.
//!
//! Everything in this crate is deterministic and free of I/O: domain
//! prediction from display names, niche classification from profile text,
//! and candidate-domain extraction from free text.

mod domain;
mod extract;
mod niche;

pub use domain::predict;
pub use extract::extract_domains;
pub use niche::{UNCATEGORIZED, classify};
