//! Metadata record derivation.
//!
//! Combines the sample annotations of the job descriptor with acquisition
//! parameters read from the OIF main file into the flat record persisted as
//! `metadata.json`.
//!
//! Keys of the record:
//!
//! | Key               | Source                                                   |
//! |-------------------|----------------------------------------------------------|
//! | `Person`          | descriptor `person`                                      |
//! | `HPF`             | descriptor `hpf`                                         |
//! | `Treatment`       | descriptor `treatment`                                   |
//! | `Channel<i>`      | `{"Stain": <i-th stain>}`                                |
//! | `CaptureDateTime` | `[Acquisition Parameters Common] ImageCaputreDate`       |
//! | `HeightConvert`   | `[Reference Image Parameter] HeightConvertValue/Unit`    |
//! | `WidthConvert`    | `[Reference Image Parameter] WidthConvertValue/Unit`     |
//! | `DepthConvert`    | `[Axis <p> Parameters Common] Interval/UnitName`, where  |
//! |                   | `p` is the position of `Z` in `AxisOrder`                |

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::config::JobDescriptor;
use crate::error::MetadataError;
use crate::format::{IniValue, MetadataTree};
use crate::volume::AxisMap;

const SECTION_ACQUISITION: &str = "Acquisition Parameters Common";
const SECTION_REFERENCE: &str = "Reference Image Parameter";
const SECTION_AXIS_COMMON: &str = "Axis Parameter Common";

/// Spelled as the instrument writes it.
const KEY_CAPTURE_DATE: &str = "ImageCaputreDate";

/// Largest sample bit depth the slice writer accepts.
pub const MAX_BIT_DEPTH: u32 = 16;

// =============================================================================
// Metadata Record
// =============================================================================

/// Flat metadata record with deterministically sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetadataRecord {
    entries: BTreeMap<String, Value>,
}

impl MetadataRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Stain recorded for a 1-based channel number.
    pub fn channel_stain(&self, channel: usize) -> Option<&str> {
        self.entries
            .get(&channel_key(channel))
            .and_then(|v| v.get("Stain"))
            .and_then(Value::as_str)
    }

    /// Number of `Channel<i>` entries.
    pub fn channel_count(&self) -> usize {
        self.entries
            .keys()
            .filter(|k| {
                k.strip_prefix("Channel")
                    .map(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
                    .unwrap_or(false)
            })
            .count()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }
}

fn channel_key(channel: usize) -> String {
    format!("Channel{}", channel)
}

// =============================================================================
// Builder
// =============================================================================

/// Build the metadata record for one job.
///
/// Fails if a required acquisition parameter is missing or `AxisOrder` has no
/// `Z`. Physical scale is never guessed.
pub fn build_metadata(
    job: &JobDescriptor,
    tree: &MetadataTree,
) -> Result<MetadataRecord, MetadataError> {
    let mut record = MetadataRecord::default();

    record.insert("Person", job.person.clone());
    record.insert("HPF", Value::Number(job.hpf.clone()));
    record.insert("Treatment", job.treatment.clone());

    for (i, stain) in job.stains.iter().enumerate() {
        let mut channel = Map::new();
        channel.insert("Stain".to_string(), Value::String(stain.clone()));
        record.insert(channel_key(i + 1), Value::Object(channel));
    }

    record.insert(
        "CaptureDateTime",
        to_json(tree.require(SECTION_ACQUISITION, KEY_CAPTURE_DATE)?),
    );
    record.insert(
        "HeightConvert",
        scale_string(tree, SECTION_REFERENCE, "HeightConvertValue", "HeightUnit")?,
    );
    record.insert(
        "WidthConvert",
        scale_string(tree, SECTION_REFERENCE, "WidthConvertValue", "WidthUnit")?,
    );

    let z_section = z_axis_section(tree)?;
    record.insert(
        "DepthConvert",
        scale_string(tree, &z_section, "Interval", "UnitName")?,
    );

    debug!(keys = record.len(), "Built metadata record");
    Ok(record)
}

/// Name of the per-axis section describing the Z axis.
///
/// The section index is the position of `Z` in the `AxisOrder` declaration,
/// which varies with acquisition settings.
pub fn z_axis_section(tree: &MetadataTree) -> Result<String, MetadataError> {
    let order = tree.require(SECTION_AXIS_COMMON, "AxisOrder")?.to_string();
    let position = AxisMap::from_order(&order).z()?;
    Ok(format!("Axis {} Parameters Common", position))
}

/// Valid bits per sample of the raw planes.
pub fn bit_depth(tree: &MetadataTree) -> Result<u32, MetadataError> {
    let value = tree.require(SECTION_REFERENCE, "ValidBitCounts")?;
    value
        .as_i64()
        .and_then(|bits| u32::try_from(bits).ok())
        .filter(|bits| (1..=MAX_BIT_DEPTH).contains(bits))
        .ok_or_else(|| MetadataError::InvalidValue {
            section: SECTION_REFERENCE.to_string(),
            key: "ValidBitCounts".to_string(),
            message: format!("expected an integer in 1..={}, got {}", MAX_BIT_DEPTH, value),
        })
}

/// `"<value> <unit>"` from two keys of one section.
fn scale_string(
    tree: &MetadataTree,
    section: &str,
    value_key: &str,
    unit_key: &str,
) -> Result<String, MetadataError> {
    let value = tree.require(section, value_key)?;
    let unit = tree.require(section, unit_key)?;
    Ok(format!("{} {}", value, unit))
}

fn to_json(value: &IniValue) -> Value {
    match value {
        IniValue::Int(v) => Value::Number(Number::from(*v)),
        IniValue::Float(v) => Number::from_f64(*v)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string())),
        IniValue::Bool(v) => Value::Bool(*v),
        IniValue::Str(s) => Value::String(s.clone()),
    }
}
