//! # Config Crate
//!
//! Centralized configuration constants for the corner-point tessellation
//! pipeline. Every tolerance, sentinel and capacity hint used by the mesh and
//! tessellator crates is defined here so the kernels stay free of literals.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{GlobalConfig, VERTEX_MERGE_EPSILON};
//!
//! let cfg = GlobalConfig::default();
//! assert_eq!(cfg.merge_epsilon, VERTEX_MERGE_EPSILON);
//!
//! // Two depths closer than the merge tolerance share one pillar vertex
//! let (z0, z1) = (1000.0_f64, 1000.00001_f64);
//! assert!((z0 - z1).abs() < cfg.merge_epsilon);
//! ```
//!
//! ## Categories
//!
//! - **Precision**: merge, snap and intersection tolerances
//! - **Sentinels**: the "no cell / no vertex" index
//! - **Capacity**: per-cell reservation hints for the mesh sink

pub mod constants;
