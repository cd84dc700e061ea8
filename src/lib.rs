//! # oif-extract
//!
//! Splits Olympus FluoView OIF microscopy acquisitions into a browsable
//! archive: one 8-bit PNG per channel and depth slice, plus a `metadata.json`
//! combining acquisition parameters with sample annotations.
//!
//! ## Architecture
//!
//! - [`config`] - CLI arguments and the JSON job descriptor
//! - [`mod@format`] - OIF main file (INI) parser and container reader
//! - [`volume`] - Format-agnostic volume traits and typed axis lookup
//! - [`metadata`] - Metadata record derivation
//! - [`slice`] - Intensity rescaling, slice naming and PNG encoding
//! - [`output`] - Output tree creation, overwrite policies, metadata writer
//! - [`extract`] - The pipeline tying it together
//!
//! ## Output Layout
//!
//! ```text
//! <out_dir>/<prefix><basename>/
//!   metadata.json
//!   Channel1/<prefix><basename>c1z0.png ... c1z<N-1>.png
//!   Channel2/...
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use oif_extract::{Extractor, InteractivePrompt, JobDescriptor, OifSource};
//!
//! let job = JobDescriptor::load("job.json")?;
//! let mut extractor = Extractor::new(OifSource, InteractivePrompt::stdio());
//! let summary = extractor.run(&job)?;
//! println!("Wrote {} slices", summary.slices_written);
//! # Ok::<(), oif_extract::ExtractError>(())
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod metadata;
pub mod output;
pub mod slice;
pub mod volume;

// Re-export commonly used types
pub use config::{parse_descriptor_path, Cli, JobDescriptor, DEFAULT_OUT_DIR};
pub use error::{
    ConfigError, ExtractError, MetadataError, OifError, OutputError, EXIT_DECLINED, EXIT_FAILURE,
};
pub use extract::{ExtractionSummary, Extractor};
pub use format::{IniValue, MetadataTree, OifReader, OifSource};
pub use metadata::{bit_depth, build_metadata, z_axis_section, MetadataRecord};
pub use output::{
    write_metadata, AlwaysOverwrite, InteractivePrompt, NeverOverwrite, OutputTree,
    OverwritePolicy, OverwriteScope, METADATA_FILE_NAME,
};
pub use slice::{
    rescale_plane, scale_value, slice_file_name, LinearScale, SliceEncoder, SliceLayout,
    SliceWriter,
};
pub use volume::{Axis, AxisMap, Plane, PlaneIndex, VolumeReader, VolumeSource};
