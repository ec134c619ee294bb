//! Derived records and export formats.
//!
//! An [`Exporter`] reads everything it needs from a [`SaveSource`] up front,
//! then builds either format on demand. Building is pure: the same save and
//! reference tables always produce the same output.

mod cogs;
mod companion;

pub use cogs::{
    cog_kind, empties, CogKind, CogRow, Cogstruction, EmptySlot, BOARD_COLUMNS, BOARD_ROWS,
    BOARD_SLOTS,
};
pub use companion::{
    base_class, card_tier, parse_starsign_codes, player_codes, pouch_size_name, Alchemy,
    Character, Companion, Statue,
};

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::output;
use crate::reference::ReferenceData;
use crate::save::{
    as_array, as_float, as_int, as_object, int_list, int_pairs, invalid, SaveError, SaveFields,
    SaveSource, StatueLevel,
};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Save(#[from] SaveError),

    #[error("Format must be idleon_companion or cogstruction, not {0}")]
    UnsupportedFormat(String),

    #[error(
        "cog list must contain at least {} entries to cover the whole cog board; {0} isn't enough",
        BOARD_SLOTS
    )]
    InsufficientData(usize),

    #[error("Class {0} does not exist")]
    UnknownClass(i64),

    #[error("No entry for {key} in {table} table")]
    UnknownReference { table: &'static str, key: String },

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    IdleonCompanion,
    Cogstruction,
}

impl Format {
    pub const ALL: [Format; 2] = [Format::IdleonCompanion, Format::Cogstruction];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::IdleonCompanion => "idleon_companion",
            Format::Cogstruction => "cogstruction",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| ExportError::UnsupportedFormat(s.to_string()))
    }
}

/// Derived save data, ready to be built into either format
pub struct Exporter<'r> {
    reference: &'r ReferenceData,
    classes: Vec<i64>,
    skill_levels: Vec<Vec<i64>>,
    statue_levels: Vec<Vec<StatueLevel>>,
    bags_used: Vec<Vec<String>>,
    carrycaps: Vec<Vec<(String, i64)>>,
    fields: SaveFields,
}

impl<'r> Exporter<'r> {
    /// Read and derive everything up front; fails on the first absent field
    pub fn new(
        source: &impl SaveSource,
        reference: &'r ReferenceData,
    ) -> Result<Self, ExportError> {
        let classes = source
            .all_players("CharacterClass")?
            .into_iter()
            .map(|v| as_int(v, "CharacterClass"))
            .collect::<Result<Vec<_>, _>>()?;

        let skill_levels = source
            .all_players("Lv0")?
            .into_iter()
            .map(|v| int_list(v, "Lv0"))
            .collect::<Result<Vec<_>, _>>()?;

        let statue_levels = source
            .all_players("StatueLevels")?
            .into_iter()
            .map(parse_statue_levels)
            .collect::<Result<Vec<_>, _>>()?;

        let bags_used = source
            .all_players("InvBagsUsed")?
            .into_iter()
            .map(|v| Ok(as_object(v, "InvBagsUsed")?.keys().cloned().collect::<Vec<String>>()))
            .collect::<Result<Vec<_>, SaveError>>()?;

        let carrycaps = source
            .all_players("MaxCarryCap")?
            .into_iter()
            .map(|v| int_pairs(v, "MaxCarryCap"))
            .collect::<Result<Vec<_>, _>>()?;

        let fields = source.fields()?;

        debug!(
            players = classes.len(),
            names = fields.names.len(),
            cogs = fields.cog_order.len(),
            "Loaded save data"
        );

        Ok(Exporter {
            reference,
            classes,
            skill_levels,
            statue_levels,
            bags_used,
            carrycaps,
            fields,
        })
    }

    /// Build `format` and write it into `workdir`, returning the written paths
    pub fn export(&self, format: Format, workdir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        match format {
            Format::IdleonCompanion => {
                let path = output::write_companion(workdir, &self.to_idleon_companion()?)?;
                Ok(vec![path])
            }
            Format::Cogstruction => output::write_cogstruction(workdir, &self.to_cogstruction()?),
        }
    }
}

/// A player's statues as `[level, progress]` pairs
fn parse_statue_levels(value: &serde_json::Value) -> Result<Vec<StatueLevel>, SaveError> {
    let name = "StatueLevels";
    as_array(value, name)?
        .iter()
        .map(|statue| match as_array(statue, name)?.as_slice() {
            [level, progress, ..] => Ok(StatueLevel {
                level: as_int(level, name)?,
                progress: as_float(progress, name)?,
            }),
            _ => Err(invalid(name, "expected [level, progress]")),
        })
        .collect()
}
