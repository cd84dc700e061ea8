//! Test utilities for integration tests.
//!
//! This module provides a builder for synthetic OIF containers on disk, an
//! in-memory volume source that tracks open/close, and scripted overwrite
//! policies.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::Luma;

use oif_extract::error::OifError;
use oif_extract::format::ini::encode_utf16le;
use oif_extract::{
    AxisMap, JobDescriptor, MetadataTree, OverwritePolicy, OverwriteScope, Plane, VolumeReader,
    VolumeSource,
};

/// Pixel generator: `(plane index, x, y) -> raw sample`.
pub type Fill = Box<dyn Fn(&[usize], u32, u32) -> u16>;

// =============================================================================
// Synthetic OIF Builder
// =============================================================================

/// Writes a minimal but structurally faithful OIF container.
pub struct OifBuilder {
    name: String,
    axis_order: String,
    plane_axes: Vec<(char, usize)>,
    width: u32,
    height: u32,
    bits: u32,
    omit: Vec<(String, String)>,
    extra_files: Vec<String>,
    fill: Fill,
}

impl OifBuilder {
    /// A `channels` x `depths` container with 12-bit samples.
    pub fn new(name: &str, channels: usize, depths: usize) -> Self {
        Self {
            name: name.to_string(),
            axis_order: "XYCZT".to_string(),
            plane_axes: vec![('C', channels), ('Z', depths)],
            width: 4,
            height: 3,
            bits: 12,
            omit: Vec::new(),
            extra_files: vec!["s_C001.pty".to_string(), "s_C001.lut".to_string()],
            fill: Box::new(default_fill),
        }
    }

    pub fn axis_order(mut self, order: &str) -> Self {
        self.axis_order = order.to_string();
        self
    }

    pub fn plane_axes(mut self, axes: &[(char, usize)]) -> Self {
        self.plane_axes = axes.to_vec();
        self
    }

    pub fn bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn fill(mut self, fill: impl Fn(&[usize], u32, u32) -> u16 + 'static) -> Self {
        self.fill = Box::new(fill);
        self
    }

    /// Leave a key out of the main file.
    pub fn omit(mut self, section: &str, key: &str) -> Self {
        self.omit.push((section.to_string(), key.to_string()));
        self
    }

    pub fn extra_file(mut self, name: &str) -> Self {
        self.extra_files.push(name.to_string());
        self
    }

    /// Main file text.
    pub fn main_file_text(&self) -> String {
        let mut sections: Vec<(String, Vec<(String, String)>)> = vec![
            (
                "Acquisition Parameters Common".to_string(),
                vec![(
                    "ImageCaputreDate".to_string(),
                    "'2015-03-04 12:34:56'".to_string(),
                )],
            ),
            (
                "Reference Image Parameter".to_string(),
                vec![
                    ("HeightConvertValue".to_string(), "0.207".to_string()),
                    ("HeightUnit".to_string(), "\"um\"".to_string()),
                    ("WidthConvertValue".to_string(), "0.414".to_string()),
                    ("WidthUnit".to_string(), "\"um\"".to_string()),
                    ("ValidBitCounts".to_string(), self.bits.to_string()),
                ],
            ),
            (
                "Axis Parameter Common".to_string(),
                vec![("AxisOrder".to_string(), format!("\"{}\"", self.axis_order))],
            ),
        ];

        for (position, label) in self.axis_order.chars().enumerate() {
            let (interval, unit) = if label == 'Z' {
                ("2.5", "\"um\"")
            } else {
                ("1.0", "\"px\"")
            };
            sections.push((
                format!("Axis {} Parameters Common", position),
                vec![
                    ("AxisCode".to_string(), format!("\"{}\"", label)),
                    ("Interval".to_string(), interval.to_string()),
                    ("UnitName".to_string(), unit.to_string()),
                ],
            ));
        }

        let mut text = String::new();
        for (section, entries) in sections {
            text.push_str(&format!("[{}]\r\n", section));
            for (key, value) in entries {
                if self.omit.iter().any(|(s, k)| *s == section && *k == key) {
                    continue;
                }
                text.push_str(&format!("{}={}\r\n", key, value));
            }
            text.push_str("\r\n");
        }
        text
    }

    /// Write the container into `dir`, returning the main file path.
    pub fn build(&self, dir: &Path) -> PathBuf {
        let main = dir.join(format!("{}.oif", self.name));
        fs::write(&main, encode_utf16le(&self.main_file_text())).unwrap();

        let companion = dir.join(format!("{}.oif.files", self.name));
        fs::create_dir_all(&companion).unwrap();

        for index in all_indices(&self.plane_axes) {
            let mut name = String::from("s_");
            for ((label, _), i) in self.plane_axes.iter().zip(&index) {
                name.push_str(&format!("{}{:03}", label, i + 1));
            }
            let plane = Plane::from_fn(self.width, self.height, |x, y| {
                Luma([(self.fill)(&index[..], x, y)])
            });
            plane.save(companion.join(format!("{}.tif", name))).unwrap();
        }

        for extra in &self.extra_files {
            fs::write(companion.join(extra), b"ancillary").unwrap();
        }

        main
    }
}

/// `channel * 1000 + z * 100 + x + y`, addressed by the first two index entries.
pub fn default_fill(index: &[usize], x: u32, y: u32) -> u16 {
    let c = index.first().copied().unwrap_or(0) as u16;
    let z = index.get(1).copied().unwrap_or(0) as u16;
    c * 1000 + z * 100 + (x + y) as u16
}

/// Every index combination of the given axes, last axis fastest.
pub fn all_indices(axes: &[(char, usize)]) -> Vec<Vec<usize>> {
    let mut combos: Vec<Vec<usize>> = vec![Vec::new()];
    for (_, len) in axes {
        let mut next = Vec::new();
        for prefix in &combos {
            for i in 0..*len {
                let mut combo = prefix.clone();
                combo.push(i);
                next.push(combo);
            }
        }
        combos = next;
    }
    combos
}

// =============================================================================
// Job Descriptors
// =============================================================================

pub fn job(oif_file: &Path, stains: &[&str], out_dir: &Path, prefix: &str) -> JobDescriptor {
    JobDescriptor {
        oif_file: oif_file.to_path_buf(),
        stains: stains.iter().map(|s| s.to_string()).collect(),
        person: "A".to_string(),
        hpf: serde_json::Number::from_f64(6.5).unwrap(),
        treatment: "none".to_string(),
        out_dir: out_dir.to_path_buf(),
        prefix: prefix.to_string(),
    }
}

/// Sorted file names in a directory.
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// =============================================================================
// Overwrite Policies
// =============================================================================

/// Answers prompts from a script and records the asked paths.
#[derive(Debug, Default)]
pub struct ScriptedPolicy {
    answers: VecDeque<bool>,
    pub asked: Vec<PathBuf>,
    pub scopes: Vec<OverwriteScope>,
}

impl ScriptedPolicy {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: Vec::new(),
            scopes: Vec::new(),
        }
    }
}

impl OverwritePolicy for ScriptedPolicy {
    fn confirm_overwrite(&mut self, path: &Path, scope: OverwriteScope) -> bool {
        self.asked.push(path.to_path_buf());
        self.scopes.push(scope);
        self.answers.pop_front().unwrap_or(false)
    }
}

// =============================================================================
// Mock Volume Source
// =============================================================================

/// An in-memory volume. Planes are generated on demand.
pub struct MockVolume {
    metadata: MetadataTree,
    axis_order: String,
    axes: AxisMap,
    shape: Vec<usize>,
    closed: Arc<AtomicUsize>,
}

impl VolumeReader for MockVolume {
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
        let rank = self.shape.len() - 2;
        if index.len() != rank || index.iter().zip(&self.shape).any(|(i, n)| i >= n) {
            return Err(OifError::PlaneOutOfBounds {
                index: index.to_vec(),
                shape: self.shape.clone(),
            });
        }
        let (height, width) = (self.shape[rank] as u32, self.shape[rank + 1] as u32);
        Ok(Plane::from_fn(width, height, |x, y| {
            Luma([default_fill(index, x, y)])
        }))
    }
}

impl Drop for MockVolume {
    fn drop(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Serves in-memory volumes keyed by path and counts opens and closes.
pub struct MockVolumeSource {
    volumes: HashMap<PathBuf, (String, String, Vec<usize>)>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl MockVolumeSource {
    pub fn new() -> Self {
        Self {
            volumes: HashMap::new(),
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register a volume with INI metadata text, plane axes (e.g. `"CZYX"`)
    /// and shape.
    pub fn with_volume(
        mut self,
        path: impl Into<PathBuf>,
        metadata: &str,
        axes: &str,
        shape: &[usize],
    ) -> Self {
        self.volumes.insert(
            path.into(),
            (metadata.to_string(), axes.to_string(), shape.to_vec()),
        );
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Default for MockVolumeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeSource for MockVolumeSource {
    type Reader = MockVolume;

    fn open(&self, path: &Path) -> Result<MockVolume, OifError> {
        let (text, axes, shape) = self.volumes.get(path).ok_or_else(|| OifError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such volume"),
        })?;

        let metadata = MetadataTree::parse(text)?;
        let axis_order = metadata
            .get("Axis Parameter Common", "AxisOrder")
            .map(|v| v.to_string())
            .unwrap_or_default();

        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockVolume {
            metadata,
            axis_order,
            axes: AxisMap::from_order(axes),
            shape: shape.clone(),
            closed: Arc::clone(&self.closed),
        })
    }
}
