//! Persistent record types: accounts and player characters.

use embergate_protocol::{AccountId, CharacterId};
use serde::{Deserialize, Serialize};

/// A registered account.
///
/// `password_hash` is opaque to everything above the storage layer: the
/// core passes plaintext into exactly two calls (`validate_account`,
/// `insert_account`) and never sees, stores, or logs it otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub password_hash: String,
}

// Stat block a freshly created character starts with.
const START_LEVEL: u32 = 1;
const START_HP: u32 = 100;
const START_MP: u32 = 50;
const START_MAX_XP: u64 = 1000;
const START_STRENGTH: u32 = 10;
const START_ARMOR: u32 = 5;
const START_DEFENSE: u32 = 5;
const START_ATTACK: u32 = 10;

/// A player character.
///
/// Owned by the storage backend; the core only holds one transiently while
/// moving it between a command and storage. Serializes camelCase because
/// the whole record doubles as the `GET_CHARACTER` wire summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Assigned by the storage backend on insert; zero until then.
    pub id: CharacterId,
    pub account_id: AccountId,
    pub name: String,
    pub level: u32,
    pub hp: u32,
    pub max_hp: u32,
    pub mp: u32,
    pub max_mp: u32,
    pub xp: u64,
    pub max_xp: u64,
    pub race: String,
    pub pos_x: i32,
    pub pos_y: i32,
    pub strength: u32,
    pub armor: u32,
    pub defense: u32,
    pub attack: u32,
}

impl Character {
    /// Builds a level-1 character with the fixed starting stat block.
    pub fn new(
        account_id: AccountId,
        name: impl Into<String>,
        race: impl Into<String>,
    ) -> Self {
        Self {
            id: CharacterId(0),
            account_id,
            name: name.into(),
            level: START_LEVEL,
            hp: START_HP,
            max_hp: START_HP,
            mp: START_MP,
            max_mp: START_MP,
            xp: 0,
            max_xp: START_MAX_XP,
            race: race.into(),
            pos_x: 0,
            pos_y: 0,
            strength: START_STRENGTH,
            armor: START_ARMOR,
            defense: START_DEFENSE,
            attack: START_ATTACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_character_has_default_stat_block() {
        let c = Character::new(AccountId(1), "Zed", "Elf");

        assert_eq!(c.level, 1);
        assert_eq!(c.hp, 100);
        assert_eq!(c.max_hp, 100);
        assert_eq!(c.mp, 50);
        assert_eq!(c.max_mp, 50);
        assert_eq!(c.xp, 0);
        assert_eq!((c.pos_x, c.pos_y), (0, 0));
        assert_eq!(c.account_id, AccountId(1));
        assert_eq!(c.name, "Zed");
        assert_eq!(c.race, "Elf");
    }

    #[test]
    fn test_character_serializes_camel_case() {
        let c = Character::new(AccountId(7), "Zed", "Elf");
        let json = serde_json::to_value(&c).unwrap();

        assert_eq!(json["accountId"], 7);
        assert_eq!(json["maxHp"], 100);
        assert_eq!(json["maxMp"], 50);
        assert_eq!(json["posX"], 0);
        assert_eq!(json["characterName"], serde_json::Value::Null);
        assert_eq!(json["name"], "Zed");
    }
}
