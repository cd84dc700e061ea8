//! Slice rescaling and writing.
//!
//! Every (channel, depth) plane of a volume becomes one 8-bit PNG:
//!
//! ```text
//! raw u16 plane ──► LinearScale (B bits → 0..255) ──► truncate ──► PNG
//! ```
//!
//! # Components
//!
//! - [`LinearScale`]: full-scale linear intensity map
//! - [`SliceEncoder`]: grayscale PNG encoder
//! - [`SliceLayout`]: channel/depth axis positions of a volume
//! - [`SliceWriter`]: writes all depth slices of a channel
//! - [`slice_file_name`] and friends: sortable output names

mod encoder;
mod naming;
mod scale;
mod writer;

pub use encoder::SliceEncoder;
pub use naming::{
    channel_dir_name, depth_suffix, depth_width, output_base_name, slice_file_name,
    SLICE_EXTENSION,
};
pub use scale::{full_scale, rescale_plane, scale_value, LinearScale, DISPLAY_MAX, DISPLAY_MIN};
pub use writer::{SliceLayout, SliceWriter};
