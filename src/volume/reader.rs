//! Format-agnostic access to multi-dimensional microscopy volumes.
//!
//! A [`VolumeReader`] exposes the raw metadata tree, the declared axis order
//! and individual 2-D planes of the image array. A [`VolumeSource`] opens
//! readers from paths. Readers release their resources on drop, so a volume
//! is closed on every exit path of the pipeline.

use std::path::Path;

use image::{ImageBuffer, Luma};

use crate::error::OifError;
use crate::format::MetadataTree;

use super::axes::{Axis, AxisMap};

/// A single 2-D plane of raw 16-bit samples.
pub type Plane = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Index of one plane: one entry per non-spatial axis of the volume, in
/// [`VolumeReader::axes`] order, 0-based.
pub type PlaneIndex = Vec<usize>;

/// Read access to one opened volume.
pub trait VolumeReader {
    /// Raw key/value metadata of the container.
    fn metadata(&self) -> &MetadataTree;

    /// Axis-order declaration from the acquisition metadata (e.g. `"XYCZT"`).
    ///
    /// This describes the acquisition settings and is not necessarily the
    /// layout of the plane array; use [`axes`](Self::axes) for that.
    fn axis_order(&self) -> &str;

    /// Axes of the plane array, spatial `Y`/`X` last.
    fn axes(&self) -> &AxisMap;

    /// Length of every axis in [`axes`](Self::axes) order.
    fn shape(&self) -> &[usize];

    /// Read one plane.
    ///
    /// `index` addresses every non-spatial axis, in [`axes`](Self::axes) order.
    fn read_plane(&self, index: &[usize]) -> Result<Plane, OifError>;

    /// Length of an axis, or `None` if the volume does not have it.
    fn axis_len(&self, axis: Axis) -> Option<usize> {
        self.axes()
            .position(axis)
            .and_then(|p| self.shape().get(p).copied())
    }
}

/// Opens volumes by path.
pub trait VolumeSource {
    type Reader: VolumeReader;

    fn open(&self, path: &Path) -> Result<Self::Reader, OifError>;
}

impl<S: VolumeSource + ?Sized> VolumeSource for &S {
    type Reader = S::Reader;

    fn open(&self, path: &Path) -> Result<Self::Reader, OifError> {
        (**self).open(path)
    }
}
