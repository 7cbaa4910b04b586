//! Scenario Catalog
//!
//! Loads recorded cut-in initial conditions and hands them out round-robin.
//!
//! # Critical Invariants
//!
//! 1. **Validated at load**: all four required columns exist and every value
//!    is a finite number, or loading fails
//! 2. **Total after load**: `next()` never fails; the cursor wraps to 0
//! 3. **File order**: records are returned in the order they appear
//!
//! # Example
//!
//! ```rust
//! use cut_in_simulator_core_rs::catalog::ScenarioCatalog;
//!
//! let csv = "x_diff_abs,xVelocity_cut_in,xVelocity_target,adjusted_laneId_diff\n\
//!            50.0,-30.0,-25.0,1\n";
//! let mut catalog = ScenarioCatalog::from_reader(csv.as_bytes()).unwrap();
//!
//! let record = catalog.next();
//! assert_eq!(record.aggressor_speed(), 30.0); // stored as magnitude
//! assert_eq!(record.lane_offset(), 1);
//! ```

pub mod scenario_catalog;
pub mod source;

// Re-export public API
pub use scenario_catalog::{Draw, ScenarioCatalog};
pub use source::{parse_records, CatalogError, REQUIRED_COLUMNS};
