//! # idleon
//!
//! Legends of Idleon save exporter library.
//!
//! This library provides functionality to:
//! - Read a decoded save snapshot (the JSON produced by the save decoder)
//! - Derive per-player and account-wide records from positional save fields
//! - Build the Idleon Companion JSON document
//! - Build the cog board tables consumed by cogstruction
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let reference = idleon::ReferenceData::bundled()?;
//! let save = idleon::LocalSave::new(idleon::SaveData::from_path(Path::new("decoded.json"))?);
//!
//! let exporter = idleon::Exporter::new(&save, &reference)?;
//! let written = exporter.export(idleon::Format::IdleonCompanion, Path::new("."))?;
//! println!("Wrote {} file(s)", written.len());
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod output;
pub mod reference;
pub mod save;

// Re-export commonly used items
#[doc(inline)]
pub use export::{
    base_class, card_tier, Alchemy, Character, CogKind, CogRow, Cogstruction, Companion,
    EmptySlot, ExportError, Exporter, Format, Statue,
};
#[doc(inline)]
pub use output::{atomic_write, escape_csv};
#[doc(inline)]
pub use reference::{friendly_name, Bag, ReferenceData, ReferenceError};
#[doc(inline)]
pub use save::{LocalSave, SaveData, SaveError, SaveFields, SaveSource, StatueLevel};
