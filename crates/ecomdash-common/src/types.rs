//! Common type definitions and newtype wrappers for domain modeling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A zip-code prefix used as the customer ↔ geolocation join key.
///
/// Values are trimmed and, when purely numeric, stripped of leading zeros so
/// that `"01037"` and `"1037"` refer to the same prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZipPrefix(String);

impl ZipPrefix {
    /// Normalize raw text into a prefix; blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            let stripped = trimmed.trim_start_matches('0');
            let normalized = if stripped.is_empty() { "0" } else { stripped };
            return Some(Self(normalized.to_string()));
        }
        Some(Self(trimmed.to_string()))
    }

    /// The normalized text of the prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZipPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Arithmetic mean of a set of coordinates, `None` when empty.
    pub fn centroid<'a>(points: impl IntoIterator<Item = &'a Coordinate>) -> Option<Self> {
        let (count, lat, lng) = points
            .into_iter()
            .fold((0usize, 0.0, 0.0), |(n, lat, lng), p| (n + 1, lat + p.lat, lng + p.lng));
        if count == 0 {
            None
        } else {
            Some(Self::new(lat / count as f64, lng / count as f64))
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// What to do with a row whose cells fail to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowErrorPolicy {
    /// Drop the row, count it, keep loading
    #[default]
    Skip,
    /// Abort the whole load with a `ParseFailure`
    Fail,
}

/// How a zip prefix with several geolocation samples is reduced to one point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateStrategy {
    /// First sample for the prefix in file order
    #[default]
    FirstSample,
    /// Mean of every sample for the prefix
    Centroid,
}

impl fmt::Display for CoordinateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstSample => write!(f, "first_sample"),
            Self::Centroid => write!(f, "centroid"),
        }
    }
}
