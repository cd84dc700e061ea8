//! Per-channel slice writing.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{ExtractError, MetadataError};
use crate::volume::{Axis, PlaneIndex, VolumeReader};

use super::encoder::SliceEncoder;
use super::naming::slice_file_name;
use super::scale::rescale_plane;

// =============================================================================
// Slice Layout
// =============================================================================

/// Where the channel and depth axes sit in a volume's plane index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceLayout {
    /// Position of the channel axis in the plane index
    pub channel_axis: usize,

    /// Position of the Z axis in the plane index
    pub z_axis: usize,

    /// Number of channels
    pub channels: usize,

    /// Number of depth slices per channel
    pub depths: usize,

    /// Length of a plane index (number of non-spatial axes)
    pub rank: usize,
}

impl SliceLayout {
    /// Resolve the channel and Z axes of a volume.
    ///
    /// Any other non-spatial axis is pinned to index 0.
    pub fn resolve<V: VolumeReader + ?Sized>(volume: &V) -> Result<Self, MetadataError> {
        let axes = volume.axes();
        let channel_axis = axes.channel()?;
        let z_axis = axes.z()?;

        let rank = axes.axes().iter().filter(|a| !a.is_spatial()).count();
        let shape = volume.shape();
        let len_of = |position: usize, axis: Axis| {
            shape
                .get(position)
                .copied()
                .filter(|_| position < rank)
                .ok_or(MetadataError::MissingAxis { axis: axis.name() })
        };

        let channels = len_of(channel_axis, Axis::Channel)?;
        let depths = len_of(z_axis, Axis::Z)?;

        for (position, axis) in axes.axes().iter().enumerate().take(rank) {
            if position == channel_axis || position == z_axis {
                continue;
            }
            let len = shape.get(position).copied().unwrap_or(1);
            if len > 1 {
                warn!(axis = %axis, len, "Only the first index of axis {} is extracted", axis);
            }
        }

        Ok(Self {
            channel_axis,
            z_axis,
            channels,
            depths,
            rank,
        })
    }

    /// Plane index for a 0-based channel and depth.
    pub fn plane_index(&self, channel: usize, z: usize) -> PlaneIndex {
        let mut index = vec![0; self.rank];
        index[self.channel_axis] = channel;
        index[self.z_axis] = z;
        index
    }
}

// =============================================================================
// Slice Writer
// =============================================================================

/// Rescales and writes every depth slice of a channel.
#[derive(Debug, Clone)]
pub struct SliceWriter {
    bits: u32,
    base_name: String,
    encoder: SliceEncoder,
}

impl SliceWriter {
    /// Create a writer for `bits`-bit source samples and `<base_name>c..z...png` files.
    pub fn new(bits: u32, base_name: impl Into<String>) -> Self {
        Self {
            bits,
            base_name: base_name.into(),
            encoder: SliceEncoder::new(),
        }
    }

    pub fn with_encoder(mut self, encoder: SliceEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Write all depth slices of a 0-based channel into `dir`.
    ///
    /// Returns the number of slices written. The first failure aborts.
    pub fn write_channel<V: VolumeReader + ?Sized>(
        &self,
        volume: &V,
        layout: &SliceLayout,
        channel: usize,
        dir: &Path,
    ) -> Result<usize, ExtractError> {
        for z in 0..layout.depths {
            let plane = volume.read_plane(&layout.plane_index(channel, z))?;
            let slice = rescale_plane(&plane, self.bits);

            let name = slice_file_name(&self.base_name, channel + 1, z, layout.depths);
            let path = dir.join(&name);
            self.encoder.write(&path, &slice)?;

            debug!(file = %path.display(), "Wrote slice");
        }

        Ok(layout.depths)
    }
}
