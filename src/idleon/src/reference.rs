//! Reference data for Legends of Idleon
//!
//! Static tables mapping internal identifiers to display names, sizes and
//! classifications. The bundled tables are embedded at compile time from
//! share/reference/ and are passed explicitly to the exporter. A directory
//! holding the same files can replace them wholesale when the game updates.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::export::ExportError;

// Embed reference files at compile time
const NAMES_JSON: &str = include_str!("../../../share/reference/names.json");
const STARSIGNS_JSON: &str = include_str!("../../../share/reference/starsigns.json");
const CARDS_JSON: &str = include_str!("../../../share/reference/cards.json");
const STAMPS_JSON: &str = include_str!("../../../share/reference/stamps.json");
const BAGS_JSON: &str = include_str!("../../../share/reference/bags.json");
const POUCHES_JSON: &str = include_str!("../../../share/reference/pouches.json");
const COGS_JSON: &str = include_str!("../../../share/reference/cogs.json");

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {file}: {source}")]
    Json {
        file: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

// ============================================================================
// Tables
// ============================================================================

/// Ordered name lists indexed by in-game position
#[derive(Debug, Clone, Deserialize)]
pub struct Names {
    /// Internal class names indexed by class id
    pub classes: Vec<String>,
    /// Skill names aligned with a player's skill levels; index 0 is the character level
    pub skills: Vec<String>,
    pub vials: Vec<String>,
    pub statues: Vec<String>,
    pub constellations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Starsigns {
    /// Canonical starsign names indexed by equip code
    pub names: Vec<String>,
    /// Canonical starsign name -> companion display id
    pub ids: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Card {
    pub name: String,
    /// Card count needed for the first tier upgrade
    pub requirement: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StampCategory {
    pub category: String,
    pub stamps: Vec<String>,
}

/// Bag families that show up in the companion checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bag {
    Inventory,
    Storage,
    Gem,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BagMaps {
    pub inventory: HashMap<String, String>,
    pub storage: HashMap<String, String>,
    pub gem: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pouches {
    /// Stack size -> size qualifier
    pub sizes: HashMap<i64, String>,
    /// Carry-capacity category -> display name
    pub categories: HashMap<String, String>,
}

/// A bonus a cog may carry, as stored under `key` in the cog map
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CogField {
    pub key: String,
    pub column: String,
    /// Stored as a percentage in the save
    pub boost: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CogDirection {
    pub suffix: String,
    pub direction: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cogs {
    pub fields: Vec<CogField>,
    pub directions: Vec<CogDirection>,
}

/// The complete set of reference tables
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub names: Names,
    pub starsigns: Starsigns,
    pub cards: HashMap<String, Card>,
    pub stamps: Vec<StampCategory>,
    pub bags: BagMaps,
    pub pouches: Pouches,
    pub cogs: Cogs,
}

impl ReferenceData {
    /// Parse the tables embedded in the library
    pub fn bundled() -> Result<Self, ReferenceError> {
        Ok(ReferenceData {
            names: parse("names.json", NAMES_JSON)?,
            starsigns: parse("starsigns.json", STARSIGNS_JSON)?,
            cards: parse("cards.json", CARDS_JSON)?,
            stamps: parse("stamps.json", STAMPS_JSON)?,
            bags: parse("bags.json", BAGS_JSON)?,
            pouches: parse("pouches.json", POUCHES_JSON)?,
            cogs: parse("cogs.json", COGS_JSON)?,
        })
    }

    /// Load a replacement table set from a directory laid out like share/reference/
    pub fn from_dir(dir: &Path) -> Result<Self, ReferenceError> {
        Ok(ReferenceData {
            names: load(dir, "names.json")?,
            starsigns: load(dir, "starsigns.json")?,
            cards: load(dir, "cards.json")?,
            stamps: load(dir, "stamps.json")?,
            bags: load(dir, "bags.json")?,
            pouches: load(dir, "pouches.json")?,
            cogs: load(dir, "cogs.json")?,
        })
    }

    /// Display name for a class id
    pub fn class_name(&self, class_id: i64) -> Result<String, ExportError> {
        usize::try_from(class_id)
            .ok()
            .and_then(|i| self.names.classes.get(i))
            .map(|name| friendly_name(name))
            .ok_or_else(|| unknown("classes", class_id))
    }

    /// Companion id for a canonical starsign name
    pub fn starsign_id(&self, name: &str) -> Result<&str, ExportError> {
        self.starsigns
            .ids
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| unknown("starsign ids", name))
    }

    /// Companion id for an equip code (an index into the starsign name list)
    pub fn starsign_from_index(&self, index: usize) -> Result<&str, ExportError> {
        let name = self
            .starsigns
            .names
            .get(index)
            .ok_or_else(|| unknown("starsign names", index))?;
        self.starsign_id(name)
    }

    /// Requirement and display name for a card code
    pub fn card(&self, name: &str) -> Option<&Card> {
        self.cards.get(name)
    }

    pub fn constellation(&self, index: usize) -> Result<&str, ExportError> {
        self.names
            .constellations
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| unknown("constellations", index))
    }

    /// Size qualifier for a pouch stack size
    pub fn pouch_size(&self, stack_size: i64) -> Result<&str, ExportError> {
        self.pouches
            .sizes
            .get(&stack_size)
            .map(String::as_str)
            .ok_or_else(|| unknown("pouch sizes", stack_size))
    }

    /// Display name for a carry-capacity category
    pub fn pouch_category(&self, category: &str) -> Result<&str, ExportError> {
        self.pouches
            .categories
            .get(category)
            .map(String::as_str)
            .ok_or_else(|| unknown("pouch categories", category))
    }

    pub fn bag_map(&self, bag: Bag) -> &HashMap<String, String> {
        match bag {
            Bag::Inventory => &self.bags.inventory,
            Bag::Storage => &self.bags.storage,
            Bag::Gem => &self.bags.gem,
        }
    }

    /// Display names of the bags in `bag` whose ids appear in `ids`
    ///
    /// Ids that aren't in the table belong to another bag family and are skipped.
    pub fn bag_names<'a, I>(&'a self, bag: Bag, ids: I) -> impl Iterator<Item = &'a str> + 'a
    where
        I: IntoIterator<Item = &'a String>,
        I::IntoIter: 'a,
    {
        let map = self.bag_map(bag);
        ids.into_iter()
            .filter_map(move |id| map.get(id).map(String::as_str))
    }
}

/// Convert an internal name to display form: underscores become spaces and
/// every word is title-cased.
pub fn friendly_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;

    for c in s.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}

fn unknown(table: &'static str, key: impl ToString) -> ExportError {
    ExportError::UnknownReference {
        table,
        key: key.to_string(),
    }
}

fn parse<T: DeserializeOwned>(file: &'static str, text: &str) -> Result<T, ReferenceError> {
    serde_json::from_str(text).map_err(|source| ReferenceError::Json { file, source })
}

fn load<T: DeserializeOwned>(dir: &Path, file: &'static str) -> Result<T, ReferenceError> {
    let path = dir.join(file);
    let text = fs::read_to_string(&path).map_err(|source| ReferenceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(file, &text)
}
