//! Run outcome aggregation: ski tallies feed combat bonuses, both phases
//! roll up into the run summary handed to the progression store.

use serde::{Deserialize, Serialize};

use super::combat::{BattleOutcome, CombatOutcome};
use super::ski::SkiResults;

/// Combat-phase bonuses derived from ski-phase collectibles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatBonuses {
    /// Extra max HP: 2 per coin
    pub hp: i32,
    /// Flat bonus damage: 5 per star
    pub damage: i32,
    /// Crit chance percent: 10 per trick
    pub crit: u32,
}

impl CombatBonuses {
    pub fn from_ski(results: &SkiResults) -> Self {
        Self {
            hp: results.coins as i32 * 2,
            damage: results.stars as i32 * 5,
            crit: results.tricks * 10,
        }
    }
}

/// Score awarded for a victory: faster wins and spare HP are worth more.
pub fn victory_bonus(turns_used: u32, hp_remaining: i32) -> u32 {
    500u32.saturating_sub(turns_used.saturating_mul(50)) + hp_remaining.max(0) as u32
}

/// Everything a finished run produced, for the outcome screen and the
/// progression store.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub ski: SkiResults,
    pub combat: CombatOutcome,
    /// Ski score plus the victory bonus (defeats keep the ski score only)
    pub total_score: u32,
}

impl RunSummary {
    pub fn new(ski: SkiResults, combat: CombatOutcome) -> Self {
        let total_score = match combat.result {
            BattleOutcome::Victory => {
                ski.score + victory_bonus(combat.turns_used, combat.hp_remaining)
            }
            BattleOutcome::Defeat => ski.score,
        };
        Self {
            ski,
            combat,
            total_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonuses_from_ski_tallies() {
        let results = SkiResults {
            score: 350,
            coins: 3,
            stars: 1,
            tricks: 2,
            potions: 0,
        };
        let bonuses = CombatBonuses::from_ski(&results);
        assert_eq!(
            bonuses,
            CombatBonuses {
                hp: 6,
                damage: 5,
                crit: 20
            }
        );
    }

    #[test]
    fn test_bonuses_from_empty_run() {
        let bonuses = CombatBonuses::from_ski(&SkiResults::default());
        assert_eq!(bonuses, CombatBonuses::default());
    }

    #[test]
    fn test_victory_bonus_floors_at_zero_turn_component() {
        assert_eq!(victory_bonus(0, 100), 600);
        assert_eq!(victory_bonus(3, 40), 390);
        // Slow wins keep only the HP component
        assert_eq!(victory_bonus(20, 25), 25);
    }

    #[test]
    fn test_run_summary_totals() {
        let ski = SkiResults {
            score: 350,
            ..Default::default()
        };
        let victory = CombatOutcome {
            result: BattleOutcome::Victory,
            turns_used: 2,
            hp_remaining: 60,
        };
        assert_eq!(RunSummary::new(ski, victory).total_score, 350 + 400 + 60);

        let defeat = CombatOutcome {
            result: BattleOutcome::Defeat,
            turns_used: 5,
            hp_remaining: 0,
        };
        assert_eq!(RunSummary::new(ski, defeat).total_score, 350);
    }
}
