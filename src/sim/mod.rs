//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (roster/track order)
//! - No rendering or platform dependencies

pub mod combat;
pub mod level;
pub mod outcome;
pub mod qte;
pub mod ski;

pub use combat::{BattleOutcome, CombatEvent, CombatOutcome, CombatPhase, CombatState, Command};
pub use level::{CombatLevel, EnemyKind, EnemySpec, LevelLibrary, LevelObject, ObjectKind, SkiLevel};
pub use outcome::{CombatBonuses, RunSummary};
pub use qte::{Dir, QteInput, QteKind, QteState};
pub use ski::{SkiEvent, SkiInput, SkiResults, SkiState};

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}
