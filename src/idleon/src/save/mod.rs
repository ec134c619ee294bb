//! Decoded save data and the adapters that read it.
//!
//! The exporter never reads the decoded document directly. It asks a
//! [`SaveSource`] for one field across every player, and for the complete
//! set of save-specific fields in [`SaveFields`]. Each save layout gets its
//! own adapter; [`LocalSave`] reads the local-storage layout.

mod local;

pub use local::LocalSave;

use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Failed to parse save JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Key not found: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

/// The decoded save document
#[derive(Debug, Clone)]
pub struct SaveData {
    data: Value,
}

impl SaveData {
    /// Parse decoded save JSON
    pub fn from_json(json: &[u8]) -> Result<Self, SaveError> {
        let data = serde_json::from_slice(json)?;
        Ok(SaveData { data })
    }

    /// Read and parse a decoded save file
    pub fn from_path(path: &Path) -> Result<Self, SaveError> {
        let json = fs::read(path).map_err(|source| SaveError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_value(data: Value) -> Self {
        SaveData { data }
    }

    /// Get a top-level field
    pub fn get(&self, key: &str) -> Result<&Value, SaveError> {
        field(&self.data, key)
    }

    pub fn root(&self) -> &Value {
        &self.data
    }
}

/// One statue's state as recorded by a single player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatueLevel {
    pub level: i64,
    /// Progress toward the next level; fractional in the save
    pub progress: f64,
}

/// Save-specific fields an adapter must supply in full.
///
/// Per-player vectors are in the same order as [`SaveSource::all_players`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveFields {
    pub names: Vec<String>,
    pub stats: Vec<Vec<i64>>,
    /// Raw equipped starsign code strings, e.g. `"1,15,_"`
    pub starsigns_equipped: Vec<String>,
    /// Canonical starsign name -> unlocked flag, in save order
    pub starsigns_unlocked: Vec<(String, i64)>,
    /// Per constellation, the codes of the players who completed it
    pub starsigns_progress: Vec<Option<String>>,
    pub cauldron: Vec<Value>,
    /// Card name -> card count, in save order
    pub cards: Vec<(String, i64)>,
    /// Per stamp category, levels aligned with the reference stamp list
    pub stamp_levels: Vec<Vec<i64>>,
    /// Golden flags per statue, one vector per data bank
    pub statues_golden: Vec<Vec<bool>>,
    /// Ids of the storage chests in use
    pub storage_used: Vec<String>,
    pub cog_map: Vec<Map<String, Value>>,
    pub cog_order: Vec<String>,
}

/// A source of save data for the exporter
pub trait SaveSource {
    /// Extract `key` from every player, in canonical player order
    fn all_players(&self, key: &str) -> Result<Vec<&Value>, SaveError>;

    /// Everything else the exporter needs from this save layout
    fn fields(&self) -> Result<SaveFields, SaveError>;
}

// Field helpers shared by adapters and the exporter

pub(crate) fn field<'a>(value: &'a Value, key: &str) -> Result<&'a Value, SaveError> {
    value
        .get(key)
        .ok_or_else(|| SaveError::MissingField(key.to_string()))
}

pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> SaveError {
    SaveError::InvalidField {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Read an integer; decoders emit whole numbers as either ints or floats
pub(crate) fn as_int(value: &Value, name: &str) -> Result<i64, SaveError> {
    if let Some(i) = value.as_i64() {
        return Ok(i);
    }

    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f as i64)
        }
        Some(f) => Err(invalid(name, format!("expected a whole number, got {}", f))),
        None => Err(invalid(name, format!("expected a number, got {}", value))),
    }
}

pub(crate) fn as_float(value: &Value, name: &str) -> Result<f64, SaveError> {
    value
        .as_f64()
        .ok_or_else(|| invalid(name, format!("expected a number, got {}", value)))
}

pub(crate) fn as_str<'a>(value: &'a Value, name: &str) -> Result<&'a str, SaveError> {
    value
        .as_str()
        .ok_or_else(|| invalid(name, format!("expected a string, got {}", value)))
}

pub(crate) fn as_array<'a>(value: &'a Value, name: &str) -> Result<&'a Vec<Value>, SaveError> {
    value
        .as_array()
        .ok_or_else(|| invalid(name, "expected a list"))
}

pub(crate) fn as_object<'a>(
    value: &'a Value,
    name: &str,
) -> Result<&'a Map<String, Value>, SaveError> {
    value
        .as_object()
        .ok_or_else(|| invalid(name, "expected a mapping"))
}

pub(crate) fn int_list(value: &Value, name: &str) -> Result<Vec<i64>, SaveError> {
    as_array(value, name)?
        .iter()
        .map(|v| as_int(v, name))
        .collect()
}

pub(crate) fn string_list(value: &Value, name: &str) -> Result<Vec<String>, SaveError> {
    as_array(value, name)?
        .iter()
        .map(|v| as_str(v, name).map(String::from))
        .collect()
}

/// Mapping entries as (key, integer) pairs, keeping mapping order
pub(crate) fn int_pairs(value: &Value, name: &str) -> Result<Vec<(String, i64)>, SaveError> {
    as_object(value, name)?
        .iter()
        .map(|(k, v)| Ok((k.clone(), as_int(v, name)?)))
        .collect()
}
