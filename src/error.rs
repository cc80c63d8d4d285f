//! Typed failures surfaced by the simulator itself, as opposed to the
//! `anyhow` wrapping used by callers that merely propagate them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("entity `{entity}` has no data for timestamp `{timestamp}`")]
    MisalignedInput { entity: String, timestamp: String },

    #[error("entity `{entity}` (id `{id}`) is missing required parameter `{parameter}`")]
    MissingParameter { entity: String, id: String, parameter: String },

    /// Part of the named failure taxonomy only: this crate's own
    /// `relative()` (in `policy::optimizer`) resolves an empty range by
    /// treating the feature's relative value as `0.0` rather than raising
    /// this variant. It's kept constructible for callers who'd rather treat
    /// an empty range as a hard failure than a silent zero-fill.
    #[error("relative-feature range for `{feature}` is empty (min == max)")]
    EmptyRange { feature: &'static str },
}
