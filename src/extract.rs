//! Extraction pipeline.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         Extractor::run()                      │
//! │  1. Open volume            4. Per channel: ensure directory,  │
//! │  2. Build metadata,           rescale and write every slice   │
//! │     resolve C/Z axes       5. Write metadata.json             │
//! │  3. Ensure parent dir                                         │
//! └───────────────────────────────────────────────────────────────┘
//!            │                    │                     │
//!            ▼                    ▼                     ▼
//!     ┌──────────────┐   ┌────────────────┐   ┌──────────────────┐
//!     │ VolumeSource │   │   OutputTree   │   │   SliceWriter    │
//!     └──────────────┘   │ (+ Overwrite-  │   └──────────────────┘
//!                        │    Policy)     │
//!                        └────────────────┘
//! ```
//!
//! Everything that can fail on the source file alone (metadata keys, missing
//! axes, bit depth) is checked before the first directory is created.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::JobDescriptor;
use crate::error::ExtractError;
use crate::metadata::{bit_depth, build_metadata};
use crate::output::{write_metadata, OutputTree, OverwritePolicy};
use crate::slice::{SliceEncoder, SliceLayout, SliceWriter};
use crate::volume::{VolumeReader, VolumeSource};

// =============================================================================
// Extraction Summary
// =============================================================================

/// Result of a completed extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Parent directory of the written tree
    pub output_dir: PathBuf,

    /// Number of channel directories written
    pub channels: usize,

    /// Number of depth slices per channel
    pub depths: usize,

    /// Total number of images written
    pub slices_written: usize,

    /// Path of the written metadata file
    pub metadata_file: PathBuf,
}

// =============================================================================
// Extractor
// =============================================================================

/// Runs extraction jobs against a volume source.
///
/// # Type Parameters
///
/// * `S` - Opens volumes (e.g. [`crate::format::OifSource`])
/// * `P` - Decides about existing output directories
///
/// # Example
///
/// ```no_run
/// use oif_extract::{AlwaysOverwrite, Extractor, JobDescriptor, OifSource};
///
/// let job = JobDescriptor::load("job.json")?;
/// let mut extractor = Extractor::new(OifSource, AlwaysOverwrite);
/// let summary = extractor.run(&job)?;
/// println!("{} slices in {}", summary.slices_written, summary.output_dir.display());
/// # Ok::<(), oif_extract::ExtractError>(())
/// ```
pub struct Extractor<S: VolumeSource, P: OverwritePolicy> {
    source: S,
    policy: P,
    encoder: SliceEncoder,
}

impl<S: VolumeSource, P: OverwritePolicy> Extractor<S, P> {
    pub fn new(source: S, policy: P) -> Self {
        Self {
            source,
            policy,
            encoder: SliceEncoder::new(),
        }
    }

    /// Use a specific PNG encoder for slices.
    pub fn with_encoder(mut self, encoder: SliceEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn into_policy(self) -> P {
        self.policy
    }

    /// Extract one job.
    ///
    /// The volume is closed when this returns, whatever the outcome.
    pub fn run(&mut self, job: &JobDescriptor) -> Result<ExtractionSummary, ExtractError> {
        info!(file = %job.oif_file.display(), "Opening volume");
        let volume = self.source.open(&job.oif_file)?;

        let record = build_metadata(job, volume.metadata())?;
        let bits = bit_depth(volume.metadata())?;
        let layout = SliceLayout::resolve(&volume)?;

        info!(
            axis_order = volume.axis_order(),
            axes = %volume.axes(),
            channels = layout.channels,
            depths = layout.depths,
            bits,
            "Volume ready"
        );

        if job.stains.len() != layout.channels {
            warn!(
                stains = job.stains.len(),
                channels = layout.channels,
                "Stain count does not match channel count"
            );
        }

        let tree = OutputTree::new(&job.out_dir, &job.prefix, &job.oif_file);
        tree.ensure_parent(&mut self.policy)?;

        let writer = SliceWriter::new(bits, tree.base_name()).with_encoder(self.encoder);
        let mut slices_written = 0;

        for channel in 0..layout.channels {
            let dir = tree.ensure_channel(channel + 1, &mut self.policy)?;
            slices_written += writer.write_channel(&volume, &layout, channel, &dir)?;
            info!(
                channel = channel + 1,
                dir = %dir.display(),
                slices = layout.depths,
                "Wrote channel"
            );
        }

        let metadata_file = tree.metadata_path();
        write_metadata(&metadata_file, &record)?;

        Ok(ExtractionSummary {
            output_dir: tree.parent().to_path_buf(),
            channels: layout.channels,
            depths: layout.depths,
            slices_written,
            metadata_file,
        })
    }
}
