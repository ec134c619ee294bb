//! Idleon Companion document.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::{ExportError, Exporter};
use crate::reference::{friendly_name, Bag, ReferenceData};
use crate::save::{as_array, as_int, invalid};

const UPGRADE_TRACKS: [&str; 4] = ["Orange", "Green", "Purple", "Yellow"];
const VIAL_INDEX: usize = 4;
const LEVEL_STAT: usize = 4;

/// Player codes used by constellation progress: a sentinel for the first
/// player, then one letter per player after it
const PLAYER_CODES: &str = "_abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Companion {
    pub alchemy: Alchemy,
    #[serde(rename = "starSigns")]
    pub star_signs: BTreeMap<String, bool>,
    pub cards: BTreeMap<String, u8>,
    pub stamps: BTreeMap<String, i64>,
    pub statues: BTreeMap<String, Statue>,
    pub checklist: BTreeMap<String, bool>,
    pub chars: Vec<Character>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alchemy {
    pub upgrades: BTreeMap<String, Value>,
    pub vials: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Statue {
    pub golden: bool,
    pub level: i64,
    pub progress: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Character {
    pub name: String,
    pub class: String,
    pub level: i64,
    pub constellations: BTreeMap<String, bool>,
    #[serde(rename = "starSigns")]
    pub star_signs: BTreeMap<String, bool>,
    pub skills: BTreeMap<String, i64>,
    pub items: BTreeMap<String, bool>,
}

/// Card tier (0-4) from a card count and the card's base requirement
pub fn card_tier(level: i64, requirement: i64) -> u8 {
    if level == 0 {
        0
    } else if level >= requirement * 9 {
        4
    } else if level >= requirement * 4 {
        3
    } else if level >= requirement {
        2
    } else {
        1
    }
}

/// The base class a class id belongs to
///
/// Beginner has only four subclasses; warrior, archer and mage each have six
/// (some unreleased but still present in the class list).
pub fn base_class(class_id: i64) -> Result<i64, ExportError> {
    match class_id {
        1..=5 => Ok(1),
        7..=13 => Ok(7),
        19..=25 => Ok(19),
        31..=37 => Ok(31),
        other => Err(ExportError::UnknownClass(other)),
    }
}

/// Constellation progress code for each of `count` players
pub fn player_codes(count: usize) -> Vec<Option<char>> {
    let mut codes = PLAYER_CODES.chars();
    (0..count).map(|_| codes.next()).collect()
}

/// Resolve an equipped starsign string like `"1,15,_"` to companion ids
pub fn parse_starsign_codes(
    codes: &str,
    reference: &ReferenceData,
) -> Result<BTreeMap<String, bool>, ExportError> {
    let trimmed = codes.trim_matches(&[',', '_'][..]);
    if trimmed.is_empty() {
        return Ok(BTreeMap::new());
    }

    trimmed
        .split(',')
        .map(|code| {
            let index: usize = code
                .parse()
                .map_err(|_| invalid("StarSign", format!("bad starsign code {:?}", code)))?;
            Ok((reference.starsign_from_index(index)?.to_string(), true))
        })
        .collect()
}

/// Size qualifier for a pouch; two categories name their smallest pouch specially
pub fn pouch_size_name<'a>(
    reference: &'a ReferenceData,
    category: &str,
    stack_size: i64,
) -> Result<&'a str, ExportError> {
    match (category, stack_size) {
        ("bCraft", 25) => Ok("Mini"),
        ("Foods", 25) => Ok("Miniscule"),
        _ => reference.pouch_size(stack_size),
    }
}

/// Checklist entries for every carry-capacity upgrade above the base stack
fn pouches(
    reference: &ReferenceData,
    carrycaps: &[(String, i64)],
) -> Result<BTreeMap<String, bool>, ExportError> {
    carrycaps
        .iter()
        .filter(|(_, stack_size)| *stack_size > 10)
        .map(|(category, stack_size)| {
            let name = format!(
                "{} {} Pouch",
                pouch_size_name(reference, category, *stack_size)?,
                reference.pouch_category(category)?
            );
            Ok((name, true))
        })
        .collect()
}

impl Exporter<'_> {
    pub fn to_idleon_companion(&self) -> Result<Companion, ExportError> {
        let stamps = self
            .stamps()
            .into_iter()
            .filter(|(_, level)| *level > 0)
            .map(|(name, level)| (name.to_string(), level))
            .collect();

        Ok(Companion {
            alchemy: self.alchemy()?,
            star_signs: self.starsigns()?,
            cards: self.cards(),
            stamps,
            statues: self.statues(),
            checklist: self.checklist(),
            chars: self.chars()?,
        })
    }

    pub fn alchemy(&self) -> Result<Alchemy, ExportError> {
        let cauldron = &self.fields.cauldron;

        let upgrades = UPGRADE_TRACKS
            .iter()
            .zip(cauldron)
            .map(|(track, levels)| (track.to_string(), levels.clone()))
            .collect();

        let vial_levels = cauldron
            .get(VIAL_INDEX)
            .ok_or_else(|| invalid("CauldronInfo", "expected vial levels at index 4"))?;

        let mut vials = BTreeMap::new();
        for (name, level) in self
            .reference
            .names
            .vials
            .iter()
            .zip(as_array(vial_levels, "CauldronInfo")?)
        {
            let level = as_int(level, "CauldronInfo")?;
            if level > 0 {
                vials.insert(friendly_name(name), level);
            }
        }

        Ok(Alchemy { upgrades, vials })
    }

    /// Every known starsign's unlocked state
    pub fn starsigns(&self) -> Result<BTreeMap<String, bool>, ExportError> {
        self.fields
            .starsigns_unlocked
            .iter()
            .map(|(name, unlocked)| {
                let id = self.reference.starsign_id(name)?;
                Ok((id.to_string(), *unlocked != 0))
            })
            .collect()
    }

    /// Tier of every card collected at least once; cards missing from the
    /// reference table are skipped
    pub fn cards(&self) -> BTreeMap<String, u8> {
        let mut cards = BTreeMap::new();
        for (code, level) in self.fields.cards.iter().filter(|(_, level)| *level > 0) {
            match self.reference.card(code) {
                Some(card) => {
                    cards.insert(card.name.clone(), card_tier(*level, card.requirement));
                }
                None => warn!(card = %code, "Unknown card, skipping"),
            }
        }
        cards
    }

    /// (stamp name, level) across every stamp category
    pub fn stamps(&self) -> Vec<(&str, i64)> {
        self.reference
            .stamps
            .iter()
            .zip(&self.fields.stamp_levels)
            .flat_map(|(category, levels)| {
                category
                    .stamps
                    .iter()
                    .map(String::as_str)
                    .zip(levels.iter().copied())
            })
            .collect()
    }

    /// Best statue state seen by any player, golden if any bank says so
    pub fn statues(&self) -> BTreeMap<String, Statue> {
        let banks = &self.fields.statues_golden;
        let names = &self.reference.names.statues;

        if self.statue_levels.is_empty() {
            return BTreeMap::new();
        }

        let count = self
            .statue_levels
            .iter()
            .map(Vec::len)
            .chain(banks.iter().map(Vec::len))
            .chain(std::iter::once(names.len()))
            .min()
            .unwrap_or(0);

        (0..count)
            .map(|i| {
                let golden = banks.iter().any(|bank| bank[i]);
                let level = self
                    .statue_levels
                    .iter()
                    .map(|player| player[i].level)
                    .max()
                    .unwrap_or(0);
                let progress = self
                    .statue_levels
                    .iter()
                    .map(|player| player[i].progress)
                    .fold(f64::NEG_INFINITY, f64::max);

                let statue = Statue {
                    golden,
                    level,
                    progress: progress.floor() as i64,
                };
                (names[i].clone(), statue)
            })
            .collect()
    }

    /// Gem bags held by the first player, storage chests, and unlocked stamps
    pub fn checklist(&self) -> BTreeMap<String, bool> {
        let mut checklist = BTreeMap::new();

        if let Some(first) = self.bags_used.first() {
            for name in self.reference.bag_names(Bag::Gem, first) {
                checklist.insert(name.to_string(), true);
            }
        }

        for name in self
            .reference
            .bag_names(Bag::Storage, &self.fields.storage_used)
        {
            checklist.insert(name.to_string(), true);
        }

        for (name, level) in self.stamps() {
            if level > 0 {
                checklist.insert(name.to_string(), true);
            }
        }

        checklist
    }

    fn constellations(&self, code: Option<char>) -> Result<BTreeMap<String, bool>, ExportError> {
        let Some(code) = code else {
            return Ok(BTreeMap::new());
        };

        let mut completed = BTreeMap::new();
        for (i, chars) in self.fields.starsigns_progress.iter().enumerate() {
            // Plain substring match on the recorded codes; null records match nobody
            if chars.as_deref().unwrap_or("").contains(code) {
                completed.insert(self.reference.constellation(i)?.to_string(), true);
            }
        }

        Ok(completed)
    }

    /// One record per player
    pub fn chars(&self) -> Result<Vec<Character>, ExportError> {
        let fields = &self.fields;
        let lengths = [
            fields.names.len(),
            self.classes.len(),
            fields.stats.len(),
            fields.starsigns_equipped.len(),
            self.skill_levels.len(),
            self.bags_used.len(),
            self.carrycaps.len(),
        ];
        let count = lengths.iter().copied().min().unwrap_or(0);

        if lengths.iter().any(|&len| len != count) {
            warn!(?lengths, "Player sequences differ in length; extra entries are ignored");
        }
        if count > PLAYER_CODES.len() {
            warn!(
                players = count,
                "More players than constellation codes; later players match no constellations"
            );
        }

        let codes = player_codes(count);
        let mut chars = Vec::with_capacity(count);

        for (i, code) in codes.into_iter().enumerate() {
            let level = *fields.stats[i]
                .get(LEVEL_STAT)
                .ok_or_else(|| invalid("StatList", "expected at least 5 stats"))?;

            let skills = self
                .reference
                .names
                .skills
                .iter()
                .zip(&self.skill_levels[i])
                .skip(1)
                .map(|(name, level)| (name.clone(), *level))
                .collect();

            let mut items: BTreeMap<String, bool> = self
                .reference
                .bag_names(Bag::Inventory, &self.bags_used[i])
                .map(|name| (name.to_string(), true))
                .collect();
            items.extend(pouches(self.reference, &self.carrycaps[i])?);

            chars.push(Character {
                name: fields.names[i].clone(),
                class: self.reference.class_name(base_class(self.classes[i])?)?,
                level,
                constellations: self.constellations(code)?,
                star_signs: parse_starsign_codes(&fields.starsigns_equipped[i], self.reference)?,
                skills,
                items,
            });
        }

        debug!(players = chars.len(), "Built player records");
        Ok(chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures;
    use crate::save::{LocalSave, SaveData, SaveError};
    use serde_json::json;

    fn build(root: Value) -> Result<Companion, ExportError> {
        let reference = ReferenceData::bundled().unwrap();
        let save = LocalSave::new(SaveData::from_value(root));
        Exporter::new(&save, &reference)?.to_idleon_companion()
    }

    #[test]
    fn test_card_tier_thresholds() {
        assert_eq!(card_tier(0, 10), 0);
        assert_eq!(card_tier(1, 10), 1);
        assert_eq!(card_tier(9, 10), 1);
        assert_eq!(card_tier(10, 10), 2);
        assert_eq!(card_tier(39, 10), 2);
        assert_eq!(card_tier(40, 10), 3);
        assert_eq!(card_tier(89, 10), 3);
        assert_eq!(card_tier(90, 10), 4);
    }

    #[test]
    fn test_card_tier_monotonic_and_bounded() {
        for requirement in 1..=12 {
            assert_eq!(card_tier(0, requirement), 0);
            let mut previous = 0;
            for level in 0..=200 {
                let tier = card_tier(level, requirement);
                assert!(tier <= 4);
                assert!(tier >= previous, "tier dropped at level {}", level);
                previous = tier;
            }
        }
    }

    #[test]
    fn test_base_class_ranges() {
        for id in 1..=5 {
            assert_eq!(base_class(id).unwrap(), 1);
        }
        for (base, id) in [(7, 7), (7, 13), (19, 19), (19, 25), (31, 31), (31, 37)] {
            assert_eq!(base_class(id).unwrap(), base);
        }
        for id in [0, 6, 14, 18, 26, 38] {
            assert!(matches!(base_class(id), Err(ExportError::UnknownClass(c)) if c == id));
        }
    }

    #[test]
    fn test_player_codes() {
        let codes = player_codes(28);
        assert_eq!(codes[0], Some('_'));
        assert_eq!(codes[1], Some('a'));
        assert_eq!(codes[26], Some('z'));
        assert_eq!(codes[27], None);
    }

    #[test]
    fn test_parse_starsign_codes() {
        let reference = ReferenceData::bundled().unwrap();
        let signs = parse_starsign_codes("0,3,_", &reference).unwrap();
        assert_eq!(signs.len(), 2);
        assert_eq!(signs.get("1"), Some(&true));
        assert_eq!(signs.get("4"), Some(&true));

        assert!(parse_starsign_codes("_", &reference).unwrap().is_empty());
        assert!(parse_starsign_codes("", &reference).unwrap().is_empty());
        assert!(matches!(
            parse_starsign_codes("1,x", &reference),
            Err(ExportError::Save(SaveError::InvalidField { .. }))
        ));
    }

    #[test]
    fn test_pouch_size_overrides() {
        let reference = ReferenceData::bundled().unwrap();
        assert_eq!(pouch_size_name(&reference, "bCraft", 25).unwrap(), "Mini");
        assert_eq!(pouch_size_name(&reference, "Foods", 25).unwrap(), "Miniscule");
        assert_eq!(pouch_size_name(&reference, "Mining", 25).unwrap(), "Miniature");
        assert_eq!(pouch_size_name(&reference, "bCraft", 50).unwrap(), "Small");
    }

    #[test]
    fn test_pouches_skip_base_stacks() {
        let reference = ReferenceData::bundled().unwrap();
        let carrycaps = vec![
            ("bCraft".to_string(), 25),
            ("Foods".to_string(), 25),
            ("Mining".to_string(), 10),
            ("Chopping".to_string(), 5),
        ];
        let pouches = pouches(&reference, &carrycaps).unwrap();
        assert_eq!(
            pouches.keys().collect::<Vec<_>>(),
            vec!["Mini Materials Pouch", "Miniscule Food Pouch"]
        );
    }

    #[test]
    fn test_alchemy() {
        let companion = build(fixtures::save_json()).unwrap();
        let alchemy = &companion.alchemy;
        assert_eq!(alchemy.upgrades.len(), 4);
        assert_eq!(alchemy.upgrades["Orange"], json!([1, 2]));
        assert_eq!(alchemy.upgrades["Yellow"], json!([5]));
        assert_eq!(alchemy.vials.len(), 2);
        assert_eq!(alchemy.vials["Copper Corona"], 3);
        assert_eq!(alchemy.vials["Mushroom Soup"], 1);
    }

    #[test]
    fn test_starsigns_and_cards() {
        let companion = build(fixtures::save_json()).unwrap();
        assert_eq!(companion.star_signs.get("1"), Some(&true));
        assert_eq!(companion.star_signs.get("2"), Some(&false));

        // mushG: requirement 5, 50 cards -> tier 4; Boss1A: requirement 3, 2 cards -> tier 1
        assert_eq!(companion.cards.len(), 2);
        assert_eq!(companion.cards["Green Mushroom"], 4);
        assert_eq!(companion.cards["Amarok"], 1);
    }

    #[test]
    fn test_unknown_cards_are_skipped() {
        let mut root = fixtures::save_json();
        root["Cards"][0]["Boss4A"] = json!(1);
        root["Cards"][0]["notACard"] = json!(7);

        let companion = build(root).unwrap();
        assert_eq!(companion.cards.len(), 2);
        assert_eq!(companion.cards["Green Mushroom"], 4);
        assert_eq!(companion.cards["Amarok"], 1);
    }

    #[test]
    fn test_stamps_filter_zero_levels() {
        let companion = build(fixtures::save_json()).unwrap();
        assert_eq!(companion.stamps.len(), 3);
        assert_eq!(companion.stamps["Sword Stamp"], 2);
        assert_eq!(companion.stamps["Mana Stamp"], 1);
        assert_eq!(companion.stamps["Hatchet Stamp"], 4);
        assert!(!companion.stamps.contains_key("Heart Stamp"));
    }

    #[test]
    fn test_statues_aggregate_players_and_banks() {
        let companion = build(fixtures::save_json()).unwrap();
        assert_eq!(companion.statues.len(), 3);
        assert_eq!(
            companion.statues["Power Statue"],
            Statue {
                golden: false,
                level: 4,
                progress: 10
            }
        );
        assert_eq!(
            companion.statues["Speed Statue"],
            Statue {
                golden: true,
                level: 2,
                progress: 8
            }
        );
        assert_eq!(companion.statues["Mining Statue"].level, 5);
        assert_eq!(companion.statues["Mining Statue"].progress, 2);
    }

    #[test]
    fn test_statues_golden_from_any_bank() {
        let reference = ReferenceData::bundled().unwrap();
        let save = LocalSave::new(SaveData::from_value(fixtures::save_json()));
        let mut exporter = Exporter::new(&save, &reference).unwrap();
        exporter.fields.statues_golden = vec![vec![false, false, true], vec![true, false]];

        let statues = exporter.statues();
        // The shorter bank caps the statue count
        assert_eq!(
            statues.keys().collect::<Vec<_>>(),
            vec!["Power Statue", "Speed Statue"]
        );
        assert!(statues["Power Statue"].golden);
        assert!(!statues["Speed Statue"].golden);
        assert_eq!(statues["Power Statue"].level, 4);
    }

    #[test]
    fn test_checklist() {
        let companion = build(fixtures::save_json()).unwrap();
        let checklist = &companion.checklist;
        // Gem bag from the first player only
        assert_eq!(checklist.get("Gem Bag A"), Some(&true));
        // Storage chests; unknown ids are skipped
        assert_eq!(checklist.get("Storage Chest 1"), Some(&true));
        assert_eq!(checklist.get("Gummy Chest"), Some(&true));
        // Stamps above zero
        assert_eq!(checklist.get("Sword Stamp"), Some(&true));
        assert!(!checklist.contains_key("Heart Stamp"));
        // Inventory bags belong to players, not the checklist
        assert!(!checklist.contains_key("Inventory Bag A"));
        assert_eq!(checklist.len(), 6);
    }

    #[test]
    fn test_chars() {
        let companion = build(fixtures::save_json()).unwrap();
        assert_eq!(companion.chars.len(), 2);

        let alice = &companion.chars[0];
        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.class, "Warrior");
        assert_eq!(alice.level, 85);
        assert_eq!(alice.skills.len(), 9);
        assert_eq!(alice.skills["mining"], 40);
        assert!(!alice.skills.contains_key("character"));
        assert_eq!(alice.star_signs.keys().collect::<Vec<_>>(), vec!["1", "4"]);
        assert_eq!(
            alice.constellations.keys().collect::<Vec<_>>(),
            vec!["1-1"]
        );
        assert_eq!(alice.items.get("Inventory Bag A"), Some(&true));
        assert_eq!(alice.items.get("Snakeskinventory Bag"), Some(&true));
        assert_eq!(alice.items.get("Mini Materials Pouch"), Some(&true));
        assert_eq!(alice.items.get("Miniscule Food Pouch"), Some(&true));
        assert_eq!(alice.items.get("Small Mining Pouch"), Some(&true));
        assert!(!alice.items.keys().any(|k| k.contains("Chopping")));

        let bob = &companion.chars[1];
        assert_eq!(bob.class, "Beginner");
        assert_eq!(bob.level, 12);
        assert!(bob.star_signs.is_empty());
        assert_eq!(
            bob.constellations.keys().collect::<Vec<_>>(),
            vec!["1-1", "1-2"]
        );
        assert_eq!(bob.items.get("Average Mining Pouch"), Some(&true));
    }

    #[test]
    fn test_players_past_the_last_code_get_no_constellations() {
        let mut players = serde_json::Map::new();
        let mut names = Vec::new();
        for i in 0..29 {
            let name = format!("p{:02}", i);
            players.insert(
                name.clone(),
                json!({
                    "CharacterClass": 1,
                    "Lv0": [1],
                    "StatueLevels": [],
                    "InvBagsUsed": {},
                    "MaxCarryCap": {},
                    "PersonalValuesMap": {"StatList": [0, 0, 0, 0, 1], "StarSign": ""}
                }),
            );
            names.push(name);
        }

        let mut root = fixtures::save_json();
        root["PlayerDATABASE"] = Value::Object(players);
        root["GetPlayersUsernames"] = json!(names);
        root["StarSignProg"] = json!([[PLAYER_CODES, 27]]);

        let companion = build(root).unwrap();
        assert_eq!(companion.chars.len(), 29);
        for player in &companion.chars[..27] {
            assert_eq!(
                player.constellations.keys().collect::<Vec<_>>(),
                vec!["1-1"],
                "{}",
                player.name
            );
        }
        assert!(companion.chars[27].constellations.is_empty());
        assert!(companion.chars[28].constellations.is_empty());
    }

    #[test]
    fn test_unknown_class_fails() {
        let mut root = fixtures::save_json();
        root["PlayerDATABASE"]["Bob"]["CharacterClass"] = json!(6);
        assert!(matches!(build(root), Err(ExportError::UnknownClass(6))));
    }

    #[test]
    fn test_minimal_save() {
        let mut cog_order = vec![json!("Blank"); 96];
        cog_order[0] = json!("Player_Solo");

        let root = json!({
            "PlayerDATABASE": {
                "Solo": {
                    "CharacterClass": 1,
                    "Lv0": [1],
                    "StatueLevels": [],
                    "InvBagsUsed": {},
                    "MaxCarryCap": {},
                    "PersonalValuesMap": {"StatList": [0, 0, 0, 0, 1], "StarSign": ""}
                }
            },
            "GetPlayersUsernames": ["Solo"],
            "StarSignsUnlocked": {},
            "StarSignProg": [],
            "CauldronInfo": [[], [], [], [], []],
            "Cards": [{}],
            "StampLevel": [],
            "StatueG": [],
            "InvStorageUsed": {},
            "CogMap": [],
            "CogOrder": cog_order
        });

        let companion = build(root).unwrap();
        assert!(companion.cards.is_empty());
        assert!(companion.stamps.is_empty());
        assert!(companion.statues.is_empty());
        assert_eq!(companion.chars.len(), 1);
        assert_eq!(companion.chars[0].class, "Beginner");
        assert!(companion.chars[0].skills.is_empty());
    }

    #[test]
    fn test_serialized_keys() {
        let companion = build(fixtures::save_json()).unwrap();
        let json = serde_json::to_value(&companion).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec![
                "alchemy",
                "starSigns",
                "cards",
                "stamps",
                "statues",
                "checklist",
                "chars"
            ]
        );

        let char_keys: Vec<&String> = json["chars"][0].as_object().unwrap().keys().collect();
        assert_eq!(
            char_keys,
            vec![
                "name",
                "class",
                "level",
                "constellations",
                "starSigns",
                "skills",
                "items"
            ]
        );
    }
}
