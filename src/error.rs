use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating the job descriptor.
///
/// These surface before anything is written to disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Descriptor file could not be read
    #[error("Cannot read job descriptor {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Descriptor is not valid JSON or has a wrongly typed field
    #[error("Malformed job descriptor: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required key is absent or empty
    #[error("Job descriptor is missing required key '{0}'")]
    MissingKey(&'static str),

    /// A key is present but its value cannot be used
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Errors raised while opening or reading an OIF container.
#[derive(Debug, Error)]
pub enum OifError {
    /// Filesystem error while reading the container
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The main file is not valid UTF-16LE/UTF-8 INI text
    #[error("Malformed OIF main file at line {line}: {message}")]
    MalformedIni { line: usize, message: String },

    /// The `<name>.oif.files` companion directory is absent
    #[error("Companion directory not found: {0}")]
    MissingCompanion(PathBuf),

    /// The companion directory holds no plane images
    #[error("No plane images found in {0}")]
    NoPlanes(PathBuf),

    /// Plane filenames disagree on axes or leave gaps in the index grid
    #[error("Inconsistent plane layout: {0}")]
    InconsistentLayout(String),

    /// A plane index lies outside the volume shape
    #[error("Plane index {index:?} out of bounds for shape {shape:?}")]
    PlaneOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    /// A plane image could not be decoded
    #[error("Failed to decode plane {path}: {message}")]
    Decode { path: PathBuf, message: String },
}

/// Errors raised while deriving metadata or resolving axes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetadataError {
    /// A required axis label is not declared
    #[error("No {axis} axis found")]
    MissingAxis { axis: &'static str },

    /// A required section/key pair is absent from the metadata tree
    #[error("Missing metadata key [{section}] {key}")]
    MissingKey { section: String, key: String },

    /// A metadata value has an unusable type or range
    #[error("Invalid metadata value for [{section}] {key}: {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

/// Errors raised while writing the output tree.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Filesystem error on a directory or file
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The slice could not be encoded or written
    #[error("Failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Metadata record could not be serialized
    #[error("Failed to serialize metadata to {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl OutputError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OutputError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Top-level error for a single extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Oif(#[from] OifError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Output(#[from] OutputError),

    /// The operator refused to overwrite an existing directory
    #[error("Overwrite of {} declined", .path.display())]
    Declined { path: PathBuf },
}

/// Exit status for runtime failures.
pub const EXIT_FAILURE: u8 = 1;

/// Exit status when the operator declines an overwrite.
pub const EXIT_DECLINED: u8 = 3;

impl ExtractError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ExtractError::Declined { .. } => EXIT_DECLINED,
            _ => EXIT_FAILURE,
        }
    }
}
