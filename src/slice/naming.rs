//! Output names for directories and slice files.
//!
//! Depth indices are zero-padded to the width of the largest index so that
//! lexicographic and numeric order agree within a channel directory.

use std::path::Path;

/// Extension of written slices.
pub const SLICE_EXTENSION: &str = "png";

/// `<prefix><file stem>` of the source file.
pub fn output_base_name(prefix: &str, source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    format!("{}{}", prefix, stem)
}

/// `Channel<c>` for a 1-based channel number.
pub fn channel_dir_name(channel: usize) -> String {
    format!("Channel{}", channel)
}

/// Digits needed for the largest index of an axis with `len` entries.
pub fn depth_width(len: usize) -> usize {
    len.saturating_sub(1).to_string().len()
}

/// Zero-padded depth index.
pub fn depth_suffix(z: usize, len: usize) -> String {
    format!("{:0width$}", z, width = depth_width(len))
}

/// `<base>c<channel>z<padded depth>.png`, channel 1-based, depth 0-based.
pub fn slice_file_name(base: &str, channel: usize, z: usize, depth_len: usize) -> String {
    format!(
        "{}c{}z{}.{}",
        base,
        channel,
        depth_suffix(z, depth_len),
        SLICE_EXTENSION
    )
}
