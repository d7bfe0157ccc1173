//! Powder Brawl - a downhill skiing + turn-based combat arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ski run, quick-time events, combat)
//! - `weapons`: Weapon table, damage formula, unlock predicates
//! - `progression`: Persisted run record (unlocks, high score, run count)
//! - `sprites`: Sprite-role registry (custom texture assignments)
//! - `audio`: Audio cue mapping for the sound backend

pub mod audio;
pub mod progression;
pub mod sim;
pub mod sprites;
pub mod weapons;

pub use progression::ProgressionRecord;
pub use sim::{CombatState, SkiState};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Slope geometry: vertical drop per unit of downhill distance
    pub const SLOPE_RATIO: f32 = 0.18;
    /// Screen-space origin of the slope surface
    pub const SLOPE_BASE_Y: f32 = 536.0;

    /// Base downhill speed (units per second)
    pub const SKI_SPEED: f32 = 200.0;
    /// Speed multiplier while braking
    pub const BRAKE_FACTOR: f32 = 0.5;
    /// Speed multiplier while boosting
    pub const BOOST_FACTOR: f32 = 1.5;
    /// Maximum lateral deviation from the slope centerline
    pub const LANE_RANGE: f32 = 120.0;
    /// Lateral steering speed (units per second)
    pub const LANE_SPEED: f32 = 180.0;

    /// Upward launch velocity when a ramp is hit (negative = up)
    pub const RAMP_LAUNCH_VEL: f32 = -260.0;
    /// Downward acceleration while airborne (units per second squared)
    pub const GRAVITY: f32 = 350.0;
    /// Trick rotation rate while the trick input is held (degrees per second)
    pub const TRICK_RATE_DEG: f32 = 300.0;
    /// Score for each completed 360
    pub const TRICK_SCORE: u32 = 100;

    /// Score values for pickups
    pub const COIN_SCORE: u32 = 25;
    pub const STAR_SCORE: u32 = 75;
    /// Score lost on an obstacle hit (floor of zero)
    pub const OBSTACLE_PENALTY: u32 = 50;
    /// Forward progress stalls for this long after an obstacle hit
    pub const KNOCKBACK_STALL_SECS: f32 = 0.3;

    /// Player collision half-extents
    pub const PLAYER_HALF_W: f32 = 10.0;
    pub const PLAYER_HALF_H: f32 = 14.0;
    /// Track object collision half-extent (32px sprites)
    pub const OBJECT_HALF_EXTENT: f32 = 16.0;
    /// The finish line sits this far before the end of the track
    pub const FINISH_MARGIN: f32 = 100.0;
    /// Downhill start position
    pub const SKI_START_X: f32 = 100.0;

    /// Base player HP before ski bonuses
    pub const PLAYER_BASE_HP: i32 = 100;
    /// HP cost of the special attack (requires strictly more than this)
    pub const SPECIAL_COST: i32 = 20;
    /// Special attack damage multiplier (no QTE, no crit)
    pub const SPECIAL_MULTIPLIER: f32 = 2.5;
    /// HP restored by a potion (capped at max HP)
    pub const POTION_HEAL: i32 = 30;
    /// Damage reduction at a perfect defend QTE (70%)
    pub const DEFEND_MAX_REDUCTION: f32 = 0.7;
    /// Display delays between combat phases (seconds)
    pub const ATTACK_WAIT_SECS: f32 = 1.0;
    pub const DEFEND_WAIT_SECS: f32 = 0.8;
    pub const ENEMY_WAIT_SECS: f32 = 1.2;

    /// Mash QTE: window and press target
    pub const MASH_WINDOW_SECS: f32 = 3.0;
    pub const MASH_TARGET: u32 = 20;
    /// Timing QTE bar spans [-BAR_HALF_WIDTH, +BAR_HALF_WIDTH]
    pub const BAR_HALF_WIDTH: f32 = 150.0;
    /// Marker sweep speed (units per second)
    pub const MARKER_SPEED: f32 = 250.0;
    /// Attack timing QTE sweet-spot center and falloff distance
    pub const SWEET_SPOT_CENTER: f32 = 60.0;
    pub const TIMING_FALLOFF: f32 = 100.0;
    /// Sequence QTE: length, window, completion score floor
    pub const SEQUENCE_LEN: usize = 4;
    pub const SEQUENCE_WINDOW_SECS: f32 = 4.0;
    pub const SEQUENCE_FLOOR: f32 = 0.3;
}

/// Round half away from zero, applied once per damage/score computation.
#[inline]
pub fn round_half_from_zero(value: f32) -> i32 {
    value.round() as i32
}

/// Height of the slope surface at downhill distance `x`.
#[inline]
pub fn surface_y(x: f32) -> f32 {
    consts::SLOPE_BASE_Y + consts::SLOPE_RATIO * x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_from_zero() {
        assert_eq!(round_half_from_zero(2.5), 3);
        assert_eq!(round_half_from_zero(2.4), 2);
        assert_eq!(round_half_from_zero(-2.5), -3);
        assert_eq!(round_half_from_zero(0.0), 0);
        assert_eq!(round_half_from_zero(13.999), 14);
    }

    #[test]
    fn test_surface_y_is_linear_in_x() {
        let base = surface_y(0.0);
        assert!((surface_y(100.0) - base - consts::SLOPE_RATIO * 100.0).abs() < 1e-4);
    }
}
