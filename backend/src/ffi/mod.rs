//! Python bindings (`pyo3` feature)
//!
//! Vehicle snapshots cross the boundary as dicts with the
//! `VehicleKinematics` field names. Missing fields raise `ValueError`.

pub mod catalog;
pub mod controller;
pub mod orchestrator;
pub mod types;
