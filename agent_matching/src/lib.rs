pub extern crate nalgebra as na;
use na::Vector2;
use thiserror::Error;

pub mod distance;
pub mod matchers;
pub mod store;
pub mod top_k;

pub use crate::matchers::bucket_grid::{BucketGridMatcher, DEFAULT_BUCKET_SIZE};
pub use crate::matchers::full_scan::FullScanMatcher;
pub use crate::matchers::ring_grid::RingGridMatcher;
pub use crate::matchers::Matcher;
pub use crate::store::AgentStore;
pub use crate::top_k::{TopK, K};

/// Agent ID. Callers are expected to hand out positive ids.
pub type AgentId = u32;

/// A cell coordinate on the bounded grid.
pub type GridPoint = Vector2<i32>;

/// One entry of a nearest-agent query result. A snapshot of the agent at
/// query time; it does not track later moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NearestResult {
    /// Unique agent ID
    pub id: AgentId,
    /// Cell the agent occupied when the query ran
    pub position: GridPoint,
    /// Squared euclidean distance from the query point
    pub dist2: i64,
}

/// Errors surfaced by matcher construction and mutation. Queries never fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatcherError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("position ({x}, {y}) is out of bounds for a {width}x{height} grid")]
    OutOfBounds { x: i32, y: i32, width: i32, height: i32 },

    #[error("cell ({x}, {y}) is already occupied by agent {occupant}")]
    CellConflict { x: i32, y: i32, occupant: AgentId },
}
