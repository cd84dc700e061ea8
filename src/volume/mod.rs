//! Volume abstraction layer.
//!
//! The pipeline only sees volumes through the [`VolumeReader`] trait, so the
//! container format stays a replaceable collaborator:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               Extractor                 │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │     VolumeSource / VolumeReader         │
//! │  (metadata tree, axis map, planes)      │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              OifReader                  │
//! │  (INI main file + per-plane TIFFs)      │
//! └─────────────────────────────────────────┘
//! ```

mod axes;
mod reader;

pub use axes::{Axis, AxisMap};
pub use reader::{Plane, PlaneIndex, VolumeReader, VolumeSource};
