//! Error types for the rendition planner.

use thiserror::Error;

/// Errors raised while planning renditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanningError {
    /// No video rendition survived filtering.
    #[error("No video renditions to build (requested: {requested}, source height: {source_height})")]
    Empty {
        requested: String,
        source_height: String,
    },
}
