//! Typed axis lookup.
//!
//! Axis ordering is not fixed across acquisition settings, so positions are
//! always resolved through an [`AxisMap`] built once from the axis labels.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::MetadataError;

/// A logical axis of a microscopy volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    Channel,
    Z,
    Time,
    Y,
    X,
    /// Any other single-letter axis (lambda, rotation, ...)
    Other(char),
}

impl Axis {
    pub fn from_label(label: char) -> Self {
        match label.to_ascii_uppercase() {
            'C' => Axis::Channel,
            'Z' => Axis::Z,
            'T' => Axis::Time,
            'Y' => Axis::Y,
            'X' => Axis::X,
            other => Axis::Other(other),
        }
    }

    pub const fn label(&self) -> char {
        match self {
            Axis::Channel => 'C',
            Axis::Z => 'Z',
            Axis::Time => 'T',
            Axis::Y => 'Y',
            Axis::X => 'X',
            Axis::Other(c) => *c,
        }
    }

    /// Human-readable name used in error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Axis::Channel => "channel",
            Axis::Z => "Z",
            Axis::Time => "time",
            Axis::Y => "Y",
            Axis::X => "X",
            Axis::Other(_) => "auxiliary",
        }
    }

    /// Whether this axis spans the pixels of a single plane.
    pub const fn is_spatial(&self) -> bool {
        matches!(self, Axis::Y | Axis::X)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Mapping from axis to its position in an axis-order declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisMap {
    order: Vec<Axis>,
    positions: BTreeMap<Axis, usize>,
}

impl AxisMap {
    /// Build from an axis-order string such as `"XYCZT"` or `"CZYX"`.
    ///
    /// When a label repeats, the first occurrence wins.
    pub fn from_order(order: &str) -> Self {
        let order: Vec<Axis> = order.chars().map(Axis::from_label).collect();
        let mut positions = BTreeMap::new();
        for (i, axis) in order.iter().enumerate() {
            positions.entry(*axis).or_insert(i);
        }
        Self { order, positions }
    }

    pub fn position(&self, axis: Axis) -> Option<usize> {
        self.positions.get(&axis).copied()
    }

    /// Position of an axis that must be present.
    pub fn require(&self, axis: Axis) -> Result<usize, MetadataError> {
        self.position(axis)
            .ok_or(MetadataError::MissingAxis { axis: axis.name() })
    }

    pub fn channel(&self) -> Result<usize, MetadataError> {
        self.require(Axis::Channel)
    }

    pub fn z(&self) -> Result<usize, MetadataError> {
        self.require(Axis::Z)
    }

    pub fn axes(&self) -> &[Axis] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Display for AxisMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in &self.order {
            write!(f, "{}", axis)?;
        }
        Ok(())
    }
}
