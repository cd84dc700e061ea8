//! Container parsers for microscopy files.
//!
//! Currently supported:
//!
//! - **Olympus FluoView OIF**: INI main file plus a companion directory of
//!   per-plane TIFF images ([`OifReader`])

pub mod ini;
pub mod oif;

pub use ini::{format_float, IniValue, MetadataTree};
pub use oif::{companion_dir, parse_plane_name, OifReader, OifSource};
