//! Olympus FluoView OIF container reader.
//!
//! An OIF acquisition is stored as several files:
//!
//! ```text
//! sample.oif                 INI main file (UTF-16LE) with all metadata
//! sample.oif.files/
//!   s_C001Z001.tif           one grayscale TIFF per plane
//!   s_C001Z002.tif
//!   ...
//!   s_C001.pty               per-plane property files, LUTs, ROIs (ignored)
//! ```
//!
//! Plane filenames carry 1-based indices for every non-spatial axis, in a
//! fixed letter order. That order followed by `YX` is the axis layout of the
//! plane array exposed through [`VolumeReader`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader};
use tracing::{debug, warn};

use crate::error::OifError;
use crate::volume::{AxisMap, Plane, VolumeReader, VolumeSource};

use super::ini::MetadataTree;

/// Suffix appended to the main file name to locate the companion directory.
pub const COMPANION_SUFFIX: &str = ".files";

/// Prefix of plane image filenames.
const PLANE_PREFIX: &str = "s_";

/// Companion files that are expected next to the planes and carry nothing
/// the extractor needs.
const BENIGN_EXTENSIONS: &[&str] = &["pty", "roi", "lut", "bmp", "txt"];

// =============================================================================
// Plane Names
// =============================================================================

/// Parse a plane file stem such as `s_C001Z003` into `[('C', 1), ('Z', 3)]`.
///
/// Returns `None` for stems that are not plane names.
pub fn parse_plane_name(stem: &str) -> Option<Vec<(char, usize)>> {
    let body = stem.strip_prefix(PLANE_PREFIX)?;
    let mut chars = body.chars().peekable();
    let mut parts = Vec::new();

    while let Some(label) = chars.next() {
        if !label.is_ascii_alphabetic() {
            return None;
        }
        let mut digits = String::new();
        while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
            digits.push(c);
            chars.next();
        }
        let index = digits.parse::<usize>().ok()?;
        parts.push((label.to_ascii_uppercase(), index));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts)
    }
}

fn has_extension(path: &Path, candidates: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| candidates.iter().any(|c| e.eq_ignore_ascii_case(c)))
        .unwrap_or(false)
}

// =============================================================================
// OIF Reader
// =============================================================================

/// An opened OIF container.
#[derive(Debug)]
pub struct OifReader {
    path: PathBuf,
    metadata: MetadataTree,
    axis_order: String,
    axes: AxisMap,
    shape: Vec<usize>,
    /// 0-based plane index to plane file
    planes: BTreeMap<Vec<usize>, PathBuf>,
}

impl OifReader {
    /// Open an OIF main file and index its companion planes.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OifError> {
        let path = path.as_ref().to_path_buf();

        let bytes = fs::read(&path).map_err(|source| OifError::Io {
            path: path.clone(),
            source,
        })?;
        let metadata = MetadataTree::from_bytes(&bytes)?;

        let axis_order = metadata
            .get("Axis Parameter Common", "AxisOrder")
            .map(|v| v.to_string())
            .unwrap_or_default();

        let companion = companion_dir(&path);
        if !companion.is_dir() {
            return Err(OifError::MissingCompanion(companion));
        }

        let (labels, planes) = index_planes(&companion)?;
        let mut shape = sequence_shape(&labels, &planes)?;

        let first = planes
            .values()
            .next()
            .ok_or_else(|| OifError::NoPlanes(companion.clone()))?;
        let (width, height) = plane_dimensions(first)?;
        shape.push(height as usize);
        shape.push(width as usize);

        let mut order: String = labels.iter().collect();
        order.push_str("YX");
        let axes = AxisMap::from_order(&order);

        debug!(
            path = %path.display(),
            axes = %axes,
            shape = ?shape,
            planes = planes.len(),
            "Opened OIF container"
        );

        Ok(Self {
            path,
            metadata,
            axis_order,
            axes,
            shape,
            planes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }
}

impl VolumeReader for OifReader {
    fn metadata(&self) -> &MetadataTree {
        &self.metadata
    }

    fn axis_order(&self) -> &str {
        &self.axis_order
    }

    fn axes(&self) -> &AxisMap {
        &self.axes
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn read_plane(&self, index: &[usize]) -> Result<Plane, OifError> {
        let out_of_bounds = || OifError::PlaneOutOfBounds {
            index: index.to_vec(),
            shape: self.shape.clone(),
        };

        let sequence_len = self.shape.len() - 2;
        if index.len() != sequence_len || index.iter().zip(&self.shape).any(|(i, n)| i >= n) {
            return Err(out_of_bounds());
        }

        let file = self.planes.get(index).ok_or_else(out_of_bounds)?;
        let image = image::open(file).map_err(|e| OifError::Decode {
            path: file.clone(),
            message: e.to_string(),
        })?;
        let plane = raw_plane(image, file);

        let expected = (self.shape[sequence_len + 1], self.shape[sequence_len]);
        if (plane.width() as usize, plane.height() as usize) != expected {
            return Err(OifError::InconsistentLayout(format!(
                "{} is {}x{}, expected {}x{}",
                file.display(),
                plane.width(),
                plane.height(),
                expected.0,
                expected.1
            )));
        }

        Ok(plane)
    }
}

/// [`VolumeSource`] for OIF files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OifSource;

impl VolumeSource for OifSource {
    type Reader = OifReader;

    fn open(&self, path: &Path) -> Result<OifReader, OifError> {
        OifReader::open(path)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// `<dir>/<name>.oif` -> `<dir>/<name>.oif.files`
pub fn companion_dir(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(COMPANION_SUFFIX);
    path.with_file_name(name)
}

type PlaneFiles = BTreeMap<Vec<usize>, PathBuf>;

/// Scan the companion directory and key every plane file by its 0-based index.
fn index_planes(dir: &Path) -> Result<(Vec<char>, PlaneFiles), OifError> {
    let io_err = |source| OifError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(io_err)?;
    entries.sort();

    let mut labels: Option<Vec<char>> = None;
    let mut planes = PlaneFiles::new();

    for file in entries {
        if !file.is_file() {
            continue;
        }

        let parsed = if has_extension(&file, &["tif", "tiff"]) {
            file.file_stem()
                .and_then(|s| s.to_str())
                .and_then(parse_plane_name)
        } else {
            None
        };

        let Some(parts) = parsed else {
            if has_extension(&file, BENIGN_EXTENSIONS) {
                debug!(file = %file.display(), "Skipping companion file");
            } else {
                warn!(file = %file.display(), "Skipping unrecognized file in OIF companion directory");
            }
            continue;
        };

        let file_labels: Vec<char> = parts.iter().map(|(l, _)| *l).collect();
        match &labels {
            Some(expected) if *expected != file_labels => {
                return Err(OifError::InconsistentLayout(format!(
                    "{} has axes {:?}, expected {:?}",
                    file.display(),
                    file_labels,
                    expected
                )));
            }
            Some(_) => {}
            None => labels = Some(file_labels),
        }

        let mut index = Vec::with_capacity(parts.len());
        for (label, one_based) in &parts {
            if *one_based == 0 {
                return Err(OifError::InconsistentLayout(format!(
                    "{} has zero index on axis {}",
                    file.display(),
                    label
                )));
            }
            index.push(one_based - 1);
        }

        if planes.insert(index, file.clone()).is_some() {
            return Err(OifError::InconsistentLayout(format!(
                "duplicate plane index for {}",
                file.display()
            )));
        }
    }

    match labels {
        Some(labels) => Ok((labels, planes)),
        None => Err(OifError::NoPlanes(dir.to_path_buf())),
    }
}

/// Shape of the non-spatial axes. Every index combination must be present.
fn sequence_shape(labels: &[char], planes: &PlaneFiles) -> Result<Vec<usize>, OifError> {
    let mut shape = vec![0usize; labels.len()];
    for index in planes.keys() {
        for (len, i) in shape.iter_mut().zip(index) {
            *len = (*len).max(i + 1);
        }
    }

    let expected: usize = shape.iter().product();
    if expected != planes.len() {
        return Err(OifError::InconsistentLayout(format!(
            "found {} planes, axes {:?} with shape {:?} need {}",
            planes.len(),
            labels,
            shape,
            expected
        )));
    }

    Ok(shape)
}

/// `(width, height)` of a plane file without decoding its pixels.
fn plane_dimensions(path: &Path) -> Result<(u32, u32), OifError> {
    let reader = ImageReader::open(path).map_err(|source| OifError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    reader.into_dimensions().map_err(|e| OifError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Convert a decoded plane to raw 16-bit samples without rescaling.
fn raw_plane(image: DynamicImage, path: &Path) -> Plane {
    match image {
        DynamicImage::ImageLuma16(plane) => plane,
        DynamicImage::ImageLuma8(plane) => {
            let (width, height) = plane.dimensions();
            let samples = plane.into_raw().into_iter().map(u16::from).collect();
            Plane::from_raw(width, height, samples)
                .unwrap_or_else(|| Plane::new(width, height))
        }
        other => {
            warn!(
                file = %path.display(),
                color = ?other.color(),
                "Plane is not grayscale, converting to 16-bit luma"
            );
            other.into_luma16()
        }
    }
}
