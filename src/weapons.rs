//! Weapon table, damage formula, and unlock predicates.
//!
//! Weapons are static descriptors; the combat engine references them for
//! damage and QTE selection, the progression layer for unlock checks.

use serde::{Deserialize, Serialize};

use crate::progression::ProgressionRecord;
use crate::round_half_from_zero;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponId {
    Fists,
    Sword,
    Staff,
    Snowball,
}

impl WeaponId {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "fists" => Some(Self::Fists),
            "sword" => Some(Self::Sword),
            "staff" => Some(Self::Staff),
            "snowball" => Some(Self::Snowball),
            _ => None,
        }
    }
}

/// QTE flavor a weapon's attack runs.
///
/// `Aim` is declared but runs the timing variant; the fallback is a design
/// choice, kept on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QteType {
    Mash,
    Timing,
    Sequence,
    Aim,
}

/// What it takes to unlock a weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnlockCondition {
    /// Total completed runs reaches N
    Runs(u32),
    /// Persisted high score reaches N
    Score(u32),
}

impl UnlockCondition {
    pub fn met(&self, progression: &ProgressionRecord) -> bool {
        match *self {
            Self::Runs(count) => progression.total_runs >= count,
            Self::Score(amount) => progression.high_score >= amount,
        }
    }
}

/// Static weapon descriptor
#[derive(Debug, Clone, Copy)]
pub struct Weapon {
    pub id: WeaponId,
    pub name: &'static str,
    pub description: &'static str,
    pub damage: i32,
    /// Cosmetic attack speed
    pub speed: f32,
    /// Cosmetic attack range
    pub range: f32,
    pub sprite_key: &'static str,
    pub qte: QteType,
    /// `None` = always available
    pub unlock: Option<UnlockCondition>,
}

pub static WEAPONS: [Weapon; 4] = [
    Weapon {
        id: WeaponId::Fists,
        name: "Fists",
        description: "Good old boxing! Fast but short range.",
        damage: 8,
        speed: 1.2,
        range: 40.0,
        sprite_key: "weapon-fists",
        qte: QteType::Mash,
        unlock: None,
    },
    Weapon {
        id: WeaponId::Sword,
        name: "Sword",
        description: "A trusty blade. Balanced damage and range.",
        damage: 15,
        speed: 1.0,
        range: 80.0,
        sprite_key: "weapon-sword",
        qte: QteType::Timing,
        unlock: Some(UnlockCondition::Runs(3)),
    },
    Weapon {
        id: WeaponId::Staff,
        name: "Battle Staff",
        description: "Long reach, sweeping attacks.",
        damage: 12,
        speed: 0.8,
        range: 120.0,
        sprite_key: "weapon-staff",
        qte: QteType::Sequence,
        unlock: Some(UnlockCondition::Score(500)),
    },
    Weapon {
        id: WeaponId::Snowball,
        name: "Snowball Cannon",
        description: "Ranged snowball attacks! Slow but safe.",
        damage: 10,
        speed: 0.6,
        range: 300.0,
        sprite_key: "weapon-snowball",
        qte: QteType::Aim,
        unlock: Some(UnlockCondition::Runs(5)),
    },
];

/// Look up a weapon descriptor by id.
pub fn weapon(id: WeaponId) -> &'static Weapon {
    WEAPONS
        .iter()
        .find(|w| w.id == id)
        .unwrap_or(&WEAPONS[0])
}

/// QTE performance to damage: 50% of base at score 0, 150% at score 1,
/// uncapped above (mash overflow). Rounded once, half away from zero.
pub fn calculate_damage(weapon: &Weapon, qte_score: f32) -> i32 {
    round_half_from_zero(weapon.damage as f32 * (0.5 + qte_score))
}

/// Weapons that newly qualify against the given progression record.
///
/// Already-unlocked weapons are excluded, so a second call with an unchanged
/// record returns nothing.
pub fn check_unlocks(progression: &ProgressionRecord) -> Vec<&'static Weapon> {
    WEAPONS
        .iter()
        .filter(|w| {
            let Some(condition) = w.unlock else {
                return false;
            };
            !progression.is_unlocked(w.id) && condition.met(progression)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_formula() {
        let fists = weapon(WeaponId::Fists);
        // Perfect timing: 1.5x
        assert_eq!(calculate_damage(fists, 1.0), 12);
        // Total miss: 0.5x
        assert_eq!(calculate_damage(fists, 0.0), 4);
        // Mash overflow 25/20: 1.75x base
        assert_eq!(calculate_damage(fists, 1.25), 14);
        let sword = weapon(WeaponId::Sword);
        assert_eq!(calculate_damage(sword, 1.0), round_half_from_zero(22.5));
    }

    #[test]
    fn test_check_unlocks_by_runs_and_score() {
        let mut progression = ProgressionRecord::new();
        assert!(check_unlocks(&progression).is_empty());

        progression.total_runs = 3;
        let unlocked: Vec<_> = check_unlocks(&progression).iter().map(|w| w.id).collect();
        assert_eq!(unlocked, vec![WeaponId::Sword]);

        progression.high_score = 500;
        progression.total_runs = 5;
        let unlocked: Vec<_> = check_unlocks(&progression).iter().map(|w| w.id).collect();
        assert_eq!(
            unlocked,
            vec![WeaponId::Sword, WeaponId::Staff, WeaponId::Snowball]
        );
    }

    #[test]
    fn test_check_unlocks_is_idempotent() {
        let mut progression = ProgressionRecord::new();
        progression.total_runs = 3;
        for w in check_unlocks(&progression) {
            progression.unlock(w.id);
        }
        assert!(
            check_unlocks(&progression).is_empty(),
            "second call with unchanged record yields nothing"
        );
    }

    #[test]
    fn test_fists_always_available() {
        let progression = ProgressionRecord::new();
        assert!(progression.is_unlocked(WeaponId::Fists));
        assert!(weapon(WeaponId::Fists).unlock.is_none());
    }
}
