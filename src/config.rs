//! Configuration for oif-extract.
//!
//! Two layers:
//! - Command-line arguments via clap ([`Cli`])
//! - The JSON job descriptor naming the input file, stains and annotations
//!   ([`JobDescriptor`])
//!
//! # Job Descriptor
//!
//! ```json
//! {
//!   "oif_file": "/data/embryo01.oif",
//!   "stains": {"1": "dapi", "2": "gfp"},
//!   "person": "A",
//!   "hpf": 6.5,
//!   "treatment": "none",
//!   "out_dir": "/tmp/out",
//!   "prefix": ""
//! }
//! ```
//!
//! `prefix` may be omitted or `null`. `out_dir` is required, but an empty or
//! `null` value means the current directory.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};
use tracing::warn;

use crate::error::ConfigError;

// =============================================================================
// Default Values
// =============================================================================

/// Output directory used when the descriptor leaves `out_dir` empty.
pub const DEFAULT_OUT_DIR: &str = ".";

/// Required extension of the job descriptor file.
pub const DESCRIPTOR_EXTENSION: &str = ".json";

const DESCRIPTOR_HELP: &str = "\
The job descriptor is a JSON file with the following keys:

  {
    \"oif_file\": <location of the .oif file>,
    \"stains\": {\"1\": <stain used in first channel>,
               \"2\": <stain used in second channel>},
    \"person\": <name of person who collected the data>,
    \"hpf\": <hours past fertilization>,
    \"treatment\": <treatment applied to the sample>,
    \"out_dir\": <directory to write output directories into>,
    \"prefix\": <optional string written in front of output names>
  }

Output layout:

  <out_dir>/<prefix><basename>/metadata.json
  <out_dir>/<prefix><basename>/Channel<c>/<prefix><basename>c<c>z<z>.png";

// =============================================================================
// CLI Arguments
// =============================================================================

/// oif-extract - Split an OIF microscopy file into per-channel PNG z-stacks.
///
/// Reads a job descriptor, writes one 8-bit PNG per channel and depth slice
/// and a metadata.json with acquisition and sample annotations.
#[derive(Parser, Debug, Clone)]
#[command(name = "oif-extract")]
#[command(author, version, about, long_about = None, after_help = DESCRIPTOR_HELP)]
pub struct Cli {
    /// Path to the JSON job descriptor.
    #[arg(value_name = "DESCRIPTOR", value_parser = parse_descriptor_path)]
    pub descriptor: PathBuf,

    /// Overwrite existing output directories without asking.
    #[arg(short, long, default_value_t = false, env = "OIF_EXTRACT_YES")]
    pub yes: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Accept only paths ending in `.json`.
pub fn parse_descriptor_path(value: &str) -> Result<PathBuf, String> {
    if value.ends_with(DESCRIPTOR_EXTENSION) {
        Ok(PathBuf::from(value))
    } else {
        Err(format!(
            "job descriptor must be a {} file, got '{}'",
            DESCRIPTOR_EXTENSION, value
        ))
    }
}

// =============================================================================
// Job Descriptor
// =============================================================================

/// On-disk shape of the descriptor, before validation.
#[derive(Debug, Deserialize)]
struct RawDescriptor {
    oif_file: Option<String>,
    stains: Option<BTreeMap<String, String>>,
    person: Option<String>,
    hpf: Option<Number>,
    treatment: Option<String>,
    /// `None` when absent, `Some(None)` when `null`
    #[serde(default, deserialize_with = "present")]
    out_dir: Option<Option<String>>,
    prefix: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

/// A validated extraction job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDescriptor {
    /// The `.oif` main file to extract
    pub oif_file: PathBuf,

    /// Stain labels in channel order (index 0 is Channel1)
    pub stains: Vec<String>,

    /// Person who imaged the sample
    pub person: String,

    /// Hours past fertilization, kept as written
    pub hpf: Number,

    /// Treatment the sample was exposed to
    pub treatment: String,

    /// Directory that receives the output tree
    pub out_dir: PathBuf,

    /// Prepended to the output directory and file names
    pub prefix: String,
}

impl JobDescriptor {
    /// Read and validate a descriptor file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse and validate descriptor JSON.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let raw: RawDescriptor = serde_json::from_str(text)?;

        for key in raw.extra.keys() {
            warn!(key = %key, "Ignoring unknown job descriptor key");
        }

        let oif_file = raw.oif_file.ok_or(ConfigError::MissingKey("oif_file"))?;
        if oif_file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "oif_file",
                message: "must not be empty".to_string(),
            });
        }

        let stains = raw.stains.ok_or(ConfigError::MissingKey("stains"))?;
        let person = raw.person.ok_or(ConfigError::MissingKey("person"))?;
        let hpf = raw.hpf.ok_or(ConfigError::MissingKey("hpf"))?;
        let treatment = raw.treatment.ok_or(ConfigError::MissingKey("treatment"))?;

        let out_dir = match raw.out_dir.ok_or(ConfigError::MissingKey("out_dir"))? {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => PathBuf::from(DEFAULT_OUT_DIR),
        };

        Ok(Self {
            oif_file: PathBuf::from(oif_file),
            stains: order_stains(stains),
            person,
            hpf,
            treatment,
            out_dir,
            prefix: raw.prefix.unwrap_or_default(),
        })
    }
}

/// Keeps a present-but-`null` field distinct from an absent one.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Order stain labels by channel key: numeric keys by value, then any other
/// keys lexicographically.
fn order_stains(stains: BTreeMap<String, String>) -> Vec<String> {
    let mut entries: Vec<(String, String)> = stains.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| match (a.trim().parse::<u64>(), b.trim().parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });
    entries.into_iter().map(|(_, stain)| stain).collect()
}

// =============================================================================
// Tests
// =============================================================================
