//! Lead reconciliation: provenance policy, scoring and the merge engine.
//!
//! The reconciler is the only component that writes leads. Discovery
//! collaborators and the enrichment orchestrator hand it transient records;
//! it decides whether they create, update or leave a lead untouched.

pub mod policy;
pub mod reconciler;
pub mod score;

pub use policy::may_overwrite_email;
pub use reconciler::{IngestOutcome, Reconciler};
pub use score::compute_score;
