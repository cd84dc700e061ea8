//! Output tree and metadata persistence.
//!
//! - [`OutputTree`]: directory layout and confirmation-gated creation
//! - [`OverwritePolicy`]: injected decision for existing directories, with
//!   [`InteractivePrompt`], [`AlwaysOverwrite`] and [`NeverOverwrite`]
//! - [`write_metadata`]: `metadata.json` writer

mod persist;
mod tree;

pub use persist::write_metadata;
pub use tree::{
    is_affirmative, AlwaysOverwrite, InteractivePrompt, NeverOverwrite, OutputTree,
    OverwritePolicy, OverwriteScope, METADATA_FILE_NAME,
};
