//! Source provenance policy for email overwrites.
//!
//! Decides whether an incoming email may replace the one already on a lead.
//! The decision depends only on where the existing lead came from, what its
//! email currently is, and how confident the incoming source is. Rules apply
//! in order; the first that matches wins.

use leadloom_shared::{LeadSource, is_placeholder_email};

/// Whether an incoming email may replace the existing one on a lead.
///
/// Rules, in order:
/// 1. A protected existing source (operator-entered email) never loses its
///    email, no matter the incoming confidence.
/// 2. A placeholder existing email is always worth replacing.
/// 3. An enrichable existing source accepts an email from an enrichment
///    source at or above `min_confidence`.
/// 4. Everything else is refused.
pub fn may_overwrite_email(
    existing_source: LeadSource,
    existing_email: &str,
    incoming_source: LeadSource,
    incoming_confidence: u8,
    min_confidence: u8,
) -> bool {
    if existing_source.is_protected() {
        return false;
    }
    if is_placeholder_email(existing_email) {
        return true;
    }
    incoming_source.is_enrichment() && incoming_confidence >= min_confidence
}
