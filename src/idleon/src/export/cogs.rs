//! Cog board tables for cogstruction.
//!
//! The construction board is 8 rows by 12 columns, stored row-major in
//! `CogOrder`. `CogMap` holds the bonuses of the cog at the same position.

use serde_json::{Map, Number, Value};
use std::fmt;
use tracing::debug;

use super::{ExportError, Exporter};
use crate::reference::{CogDirection, CogField};
use crate::save::invalid;

pub const BOARD_ROWS: usize = 8;
pub const BOARD_COLUMNS: usize = 12;
pub const BOARD_SLOTS: usize = BOARD_ROWS * BOARD_COLUMNS;

const BLANK: &str = "Blank";
const PLAYER_PREFIX: &str = "Player_";
const YANG_COG: &str = "CogY";
const OMNI_PREFIX: &str = "CogZ";

/// What kind of cog occupies a board slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CogKind {
    /// A player standing on the board
    Character,
    Yang,
    Omni,
    /// A cog boosting the slots in one direction, e.g. `Plus` or `Row`
    Directional(String),
    Plain,
}

impl fmt::Display for CogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CogKind::Character => f.write_str("Character"),
            CogKind::Yang => f.write_str("Yang_Cog"),
            CogKind::Omni => f.write_str("Omni_Cog"),
            CogKind::Directional(direction) => write!(f, "{}_Cog", direction),
            CogKind::Plain => f.write_str("Cog"),
        }
    }
}

/// One occupied board slot
#[derive(Debug, Clone, PartialEq)]
pub struct CogRow {
    pub kind: CogKind,
    /// Player name for character cogs, empty for the rest
    pub name: String,
    /// One value per bonus field, in schema order; `None` when the cog lacks it
    pub bonuses: Vec<Option<Value>>,
}

/// An empty board slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmptySlot {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cogstruction {
    /// Bonus field columns, fixed by the reference schema
    pub fields: Vec<CogField>,
    pub cog_datas: Vec<CogRow>,
    pub empties: Vec<EmptySlot>,
}

/// Classify a board slot by name; `None` for a blank slot
pub fn cog_kind(name: &str, directions: &[CogDirection]) -> Option<CogKind> {
    if name == BLANK {
        return None;
    }
    if name.starts_with(PLAYER_PREFIX) {
        return Some(CogKind::Character);
    }
    if name == YANG_COG {
        return Some(CogKind::Yang);
    }
    if name.starts_with(OMNI_PREFIX) {
        return Some(CogKind::Omni);
    }

    let directional = directions
        .iter()
        .find(|d| name.ends_with(d.suffix.as_str()))
        .map(|d| CogKind::Directional(d.direction.clone()));

    Some(directional.unwrap_or(CogKind::Plain))
}

/// Build the row for one slot, or `None` if the slot is blank
pub fn cog_row(
    cog: &Map<String, Value>,
    name: &str,
    fields: &[CogField],
    directions: &[CogDirection],
) -> Result<Option<CogRow>, ExportError> {
    let Some(kind) = cog_kind(name, directions) else {
        return Ok(None);
    };

    // Only character cogs are named in the table
    let name = match kind {
        CogKind::Character => name.strip_prefix(PLAYER_PREFIX).unwrap_or(name),
        _ => "",
    };

    // Cogs only carry keys for the bonuses they have
    let bonuses = fields
        .iter()
        .map(|field| match cog.get(&field.key) {
            None => Ok(None),
            Some(value) if field.boost => percent_to_multiplier(value, &field.key).map(Some),
            Some(value) => Ok(Some(value.clone())),
        })
        .collect::<Result<_, ExportError>>()?;

    Ok(Some(CogRow {
        kind,
        name: name.to_string(),
        bonuses,
    }))
}

/// Boosts are stored as percentages; rows carry multipliers
fn percent_to_multiplier(value: &Value, key: &str) -> Result<Value, ExportError> {
    let percent = value
        .as_f64()
        .ok_or_else(|| invalid("CogMap", format!("boost {} is not a number: {}", key, value)))?;

    Number::from_f64(percent / 100.0)
        .map(Value::Number)
        .ok_or_else(|| invalid("CogMap", format!("boost {} is not finite", key)).into())
}

/// Coordinates of every blank slot on the board
pub fn empties(cog_order: &[String]) -> Result<Vec<EmptySlot>, ExportError> {
    if cog_order.len() < BOARD_SLOTS {
        return Err(ExportError::InsufficientData(cog_order.len()));
    }

    Ok(cog_order[..BOARD_SLOTS]
        .iter()
        .enumerate()
        .filter(|(_, name)| name.as_str() == BLANK)
        .map(|(i, _)| EmptySlot {
            x: i % BOARD_COLUMNS,
            y: i / BOARD_COLUMNS,
        })
        .collect())
}

impl Exporter<'_> {
    pub fn to_cogstruction(&self) -> Result<Cogstruction, ExportError> {
        let cogs = &self.reference.cogs;

        let empties = empties(&self.fields.cog_order)?;

        let mut cog_datas = Vec::new();
        for (cog, name) in self.fields.cog_map.iter().zip(&self.fields.cog_order) {
            if let Some(row) = cog_row(cog, name, &cogs.fields, &cogs.directions)? {
                cog_datas.push(row);
            }
        }

        debug!(
            cogs = cog_datas.len(),
            empties = empties.len(),
            "Built cog board"
        );

        Ok(Cogstruction {
            fields: cogs.fields.clone(),
            cog_datas,
            empties,
        })
    }
}
