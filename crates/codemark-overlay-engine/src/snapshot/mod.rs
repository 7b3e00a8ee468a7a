//! # Snapshot Testing Support
//!
//! Utilities for checking layout output via snapshot assertions and invariant checks.
//!
//! ## Modules
//!
//! - **`normalize`**: Flattens a render pass and its resolution into a stable,
//!   line-oriented `Snap` for `insta` snapshots and the scenario runner
//! - **`invariants`**: Runtime checks that hold for every pass (one line per
//!   codemark, markers inside the column, no overlap after resolution)

pub mod invariants;
pub mod normalize;

pub use invariants::check as invariants;
pub use normalize::{Snap, normalize};
