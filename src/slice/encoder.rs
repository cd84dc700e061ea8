//! PNG slice encoder.
//!
//! Slices are 8-bit grayscale and encoded losslessly. Compression level is
//! configurable; filtering is left adaptive.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::GrayImage;

use crate::error::OutputError;

// =============================================================================
// PNG Encoder
// =============================================================================

/// Encodes rescaled slices as grayscale PNG.
#[derive(Debug, Clone, Copy)]
pub struct SliceEncoder {
    compression: CompressionType,
}

impl Default for SliceEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SliceEncoder {
    pub fn new() -> Self {
        Self {
            compression: CompressionType::Default,
        }
    }

    /// Trade file size for encoding speed.
    pub fn fast() -> Self {
        Self {
            compression: CompressionType::Fast,
        }
    }

    /// Encode a slice into any writer.
    pub fn encode<W: Write>(&self, slice: &GrayImage, writer: W) -> image::ImageResult<()> {
        let encoder = PngEncoder::new_with_quality(writer, self.compression, FilterType::Adaptive);
        slice.write_with_encoder(encoder)
    }

    /// Encode into memory.
    pub fn encode_to_vec(&self, slice: &GrayImage) -> Result<Vec<u8>, OutputError> {
        let mut out = Vec::new();
        self.encode(slice, &mut out)
            .map_err(|e| OutputError::Encode {
                path: Default::default(),
                message: e.to_string(),
            })?;
        Ok(out)
    }

    /// Write a slice to `path`, replacing any existing file.
    pub fn write(&self, path: &Path, slice: &GrayImage) -> Result<(), OutputError> {
        let file = File::create(path).map_err(|e| OutputError::io(path, e))?;
        let mut writer = BufWriter::new(file);

        self.encode(slice, &mut writer)
            .map_err(|e| OutputError::Encode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        writer.flush().map_err(|e| OutputError::io(path, e))
    }
}
