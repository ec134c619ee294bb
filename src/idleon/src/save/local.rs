//! Adapter for the local-storage save layout.
//!
//! Players live in `PlayerDATABASE`, a mapping keyed by player id. Its
//! iteration order must match `GetPlayersUsernames`; nothing here re-sorts.

use serde_json::Value;

use super::{
    as_array, as_object, as_str, field, int_list, int_pairs, invalid, string_list, SaveData,
    SaveError, SaveFields, SaveSource,
};

const PLAYER_DATABASE: &str = "PlayerDATABASE";
const PERSONAL_VALUES: &str = "PersonalValuesMap";

pub struct LocalSave {
    save: SaveData,
}

impl LocalSave {
    pub fn new(save: SaveData) -> Self {
        LocalSave { save }
    }

    pub fn save(&self) -> &SaveData {
        &self.save
    }

    fn personal_values(&self, key: &str) -> Result<Vec<&Value>, SaveError> {
        self.all_players(PERSONAL_VALUES)?
            .into_iter()
            .map(|pv| field(pv, key))
            .collect()
    }

    fn starsign_progress(&self) -> Result<Vec<Option<String>>, SaveError> {
        let name = "StarSignProg";
        as_array(self.save.get(name)?, name)?
            .iter()
            .map(|entry| {
                // [completed-by codes (may be null), completion count]
                let codes = as_array(entry, name)?.first();
                match codes {
                    None | Some(Value::Null) => Ok(None),
                    Some(v) => as_str(v, name).map(|s| Some(s.to_string())),
                }
            })
            .collect()
    }

    fn cards(&self) -> Result<Vec<(String, i64)>, SaveError> {
        let name = "Cards";
        let first = as_array(self.save.get(name)?, name)?
            .first()
            .ok_or_else(|| invalid(name, "expected at least one card bank"))?;
        int_pairs(first, name)
    }

    fn stamp_levels(&self) -> Result<Vec<Vec<i64>>, SaveError> {
        let name = "StampLevel";
        as_array(self.save.get(name)?, name)?
            .iter()
            .map(|levels| int_list(levels, name))
            .collect()
    }

    fn cog_map(&self) -> Result<Vec<serde_json::Map<String, Value>>, SaveError> {
        let name = "CogMap";
        as_array(self.save.get(name)?, name)?
            .iter()
            .map(|cog| as_object(cog, name).cloned())
            .collect()
    }
}

impl SaveSource for LocalSave {
    fn all_players(&self, key: &str) -> Result<Vec<&Value>, SaveError> {
        as_object(self.save.get(PLAYER_DATABASE)?, PLAYER_DATABASE)?
            .values()
            .map(|player| field(player, key))
            .collect()
    }

    fn fields(&self) -> Result<SaveFields, SaveError> {
        let stats = self
            .personal_values("StatList")?
            .into_iter()
            .map(|v| int_list(v, "StatList"))
            .collect::<Result<_, _>>()?;

        let starsigns_equipped = self
            .personal_values("StarSign")?
            .into_iter()
            .map(|v| as_str(v, "StarSign").map(String::from))
            .collect::<Result<_, _>>()?;

        let golden = int_list(self.save.get("StatueG")?, "StatueG")?
            .into_iter()
            .map(|flag| flag != 0)
            .collect();

        let storage_used = as_object(self.save.get("InvStorageUsed")?, "InvStorageUsed")?
            .keys()
            .cloned()
            .collect();

        let starsigns_unlocked =
            int_pairs(self.save.get("StarSignsUnlocked")?, "StarSignsUnlocked")?;

        Ok(SaveFields {
            names: string_list(self.save.get("GetPlayersUsernames")?, "GetPlayersUsernames")?,
            stats,
            starsigns_equipped,
            starsigns_unlocked,
            starsigns_progress: self.starsign_progress()?,
            cauldron: as_array(self.save.get("CauldronInfo")?, "CauldronInfo")?.clone(),
            cards: self.cards()?,
            stamp_levels: self.stamp_levels()?,
            statues_golden: vec![golden],
            storage_used,
            cog_map: self.cog_map()?,
            cog_order: string_list(self.save.get("CogOrder")?, "CogOrder")?,
        })
    }
}
