//! Slope motion model
//!
//! Simulates the player's progress down the inclined track: lane steering,
//! speed control, ramp launches with ballistic air physics, trick scoring,
//! and collisions with fixed track objects.
//!
//! Downhill distance is monotonically non-decreasing; an obstacle hit stalls
//! forward progress briefly instead of reversing it.

use serde::{Deserialize, Serialize};

use super::level::{LevelObject, ObjectKind, SkiLevel};
use crate::consts::*;

/// Player input intent for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct SkiInput {
    /// Steer toward the uphill edge of the track
    pub steer_up: bool,
    /// Steer toward the downhill edge of the track
    pub steer_down: bool,
    /// Brake (0.5x speed)
    pub brake: bool,
    /// Boost (1.5x speed)
    pub boost: bool,
    /// Hold to rotate while airborne
    pub trick: bool,
}

/// Things that happened during a tick, for the HUD/audio collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SkiEvent {
    CoinCollected,
    StarCollected,
    PotionCollected,
    ObstacleHit,
    Launched,
    Landed,
    TrickScored,
    Finished(SkiResults),
}

/// Final tallies handed off at the finish line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkiResults {
    pub score: u32,
    pub coins: u32,
    pub stars: u32,
    pub tricks: u32,
    pub potions: u32,
}

/// Player run state for the ski phase
#[derive(Debug, Clone)]
pub struct SkiState {
    /// Downhill distance (only ever increases)
    pub x: f32,
    /// Lateral deviation from the slope centerline
    pub lane_offset: f32,
    /// Height above the slope surface while airborne (0 when grounded)
    pub air_offset: f32,
    /// Ballistic vertical velocity (negative = rising)
    pub vertical_vel: f32,
    pub airborne: bool,
    /// Accumulated trick rotation in degrees, reset each full revolution
    pub trick_rotation: f32,
    pub score: u32,
    pub coins: u32,
    pub stars: u32,
    pub tricks: u32,
    pub potions: u32,
    /// Set once the finish line is crossed; input is ignored afterwards
    pub finished: bool,
    /// Remaining stall time from an obstacle knockback
    stall_timer: f32,
    /// One flag per level object: penalized obstacles and consumed pickups
    spent: Vec<bool>,
    /// Events since the last drain (not gameplay-affecting)
    pub events: Vec<SkiEvent>,
}

impl SkiState {
    /// Start a run at the top of the given track.
    pub fn new(level: &SkiLevel) -> Self {
        Self {
            x: SKI_START_X,
            lane_offset: 0.0,
            air_offset: 0.0,
            vertical_vel: 0.0,
            airborne: false,
            trick_rotation: 0.0,
            score: 0,
            coins: 0,
            stars: 0,
            tricks: 0,
            potions: 0,
            finished: false,
            stall_timer: 0.0,
            spent: vec![false; level.objects.len()],
            events: Vec::new(),
        }
    }

    /// Current tallies (also emitted in `SkiEvent::Finished` exactly once).
    pub fn results(&self) -> SkiResults {
        SkiResults {
            score: self.score,
            coins: self.coins,
            stars: self.stars,
            tricks: self.tricks,
            potions: self.potions,
        }
    }

    /// Drain events accumulated since the last call.
    pub fn drain_events(&mut self) -> Vec<SkiEvent> {
        std::mem::take(&mut self.events)
    }

    fn overlaps(&self, obj: &LevelObject) -> bool {
        (self.x - obj.pos.x).abs() <= PLAYER_HALF_W + OBJECT_HALF_EXTENT
            && (self.lane_offset - obj.pos.y).abs() <= PLAYER_HALF_H + OBJECT_HALF_EXTENT
    }
}

/// Advance the ski run by one timestep
pub fn tick(state: &mut SkiState, level: &SkiLevel, input: &SkiInput, dt: f32) {
    if state.finished {
        return;
    }

    // Lane steering, grounded only
    if !state.airborne {
        if input.steer_up {
            state.lane_offset -= LANE_SPEED * dt;
        } else if input.steer_down {
            state.lane_offset += LANE_SPEED * dt;
        }
    }
    state.lane_offset = state.lane_offset.clamp(-LANE_RANGE, LANE_RANGE);

    // Downhill progress: knockback stalls, otherwise player-scaled base speed
    let factor = if state.stall_timer > 0.0 {
        state.stall_timer = (state.stall_timer - dt).max(0.0);
        0.0
    } else if input.boost {
        BOOST_FACTOR
    } else if input.brake {
        BRAKE_FACTOR
    } else {
        1.0
    };
    state.x += SKI_SPEED * factor * dt;

    // Ballistic air physics
    if state.airborne {
        state.vertical_vel += GRAVITY * dt;
        state.air_offset -= state.vertical_vel * dt;

        if state.air_offset <= 0.0 {
            state.air_offset = 0.0;
            state.vertical_vel = 0.0;
            state.airborne = false;
            // Partial rotations are discarded on touchdown
            state.trick_rotation = 0.0;
            state.events.push(SkiEvent::Landed);
        } else if input.trick {
            state.trick_rotation += TRICK_RATE_DEG * dt;
            while state.trick_rotation >= 360.0 {
                state.trick_rotation -= 360.0;
                state.tricks += 1;
                state.score += TRICK_SCORE;
                state.events.push(SkiEvent::TrickScored);
            }
        }
    }

    // Object interactions, in track order
    for (i, obj) in level.objects.iter().enumerate() {
        if state.spent[i] || !state.overlaps(obj) {
            continue;
        }
        match obj.kind {
            ObjectKind::ObstacleTree | ObjectKind::ObstacleRock => {
                // Jumped over while airborne; at most one penalty per object
                if !state.airborne {
                    state.spent[i] = true;
                    state.score = state.score.saturating_sub(OBSTACLE_PENALTY);
                    state.stall_timer = KNOCKBACK_STALL_SECS;
                    state.events.push(SkiEvent::ObstacleHit);
                }
            }
            ObjectKind::Coin => {
                state.spent[i] = true;
                state.coins += 1;
                state.score += COIN_SCORE;
                state.events.push(SkiEvent::CoinCollected);
            }
            ObjectKind::Star => {
                state.spent[i] = true;
                state.stars += 1;
                state.score += STAR_SCORE;
                state.events.push(SkiEvent::StarCollected);
            }
            ObjectKind::Potion => {
                state.spent[i] = true;
                state.potions += 1;
                state.events.push(SkiEvent::PotionCollected);
            }
            ObjectKind::Ramp => {
                if !state.airborne {
                    state.spent[i] = true;
                    state.airborne = true;
                    state.vertical_vel = RAMP_LAUNCH_VEL;
                    state.trick_rotation = 0.0;
                    state.events.push(SkiEvent::Launched);
                }
            }
        }
    }

    // Finish line is terminal; tallies are emitted exactly once
    if state.x >= level.finish_x() {
        state.finished = true;
        state.events.push(SkiEvent::Finished(state.results()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    fn empty_level(width: f32) -> SkiLevel {
        SkiLevel {
            id: "test".into(),
            name: "Test".into(),
            width,
            objects: Vec::new(),
        }
    }

    fn level_with(objects: Vec<LevelObject>) -> SkiLevel {
        SkiLevel {
            id: "test".into(),
            name: "Test".into(),
            width: 100_000.0,
            objects,
        }
    }

    fn obj(kind: ObjectKind, x: f32, y: f32) -> LevelObject {
        LevelObject {
            kind,
            pos: Vec2::new(x, y),
        }
    }

    /// Run until finished or the tick budget runs out.
    fn run(state: &mut SkiState, level: &SkiLevel, input: &SkiInput, max_ticks: u32) {
        for _ in 0..max_ticks {
            if state.finished {
                break;
            }
            tick(state, level, input, SIM_DT);
        }
    }

    #[test]
    fn test_coin_and_star_scoring() {
        let level = level_with(vec![
            obj(ObjectKind::Coin, 200.0, 0.0),
            obj(ObjectKind::Star, 400.0, 0.0),
        ]);
        let mut state = SkiState::new(&level);
        run(&mut state, &level, &SkiInput::default(), 600);
        assert_eq!(state.coins, 1);
        assert_eq!(state.stars, 1);
        assert_eq!(state.score, COIN_SCORE + STAR_SCORE);
    }

    #[test]
    fn test_obstacle_penalty_clamps_at_zero() {
        let level = level_with(vec![obj(ObjectKind::ObstacleTree, 150.0, 0.0)]);
        let mut state = SkiState::new(&level);
        state.score = 30;
        run(&mut state, &level, &SkiInput::default(), 300);
        assert_eq!(state.score, 0, "30 - 50 clamps to 0, not -20");
        assert!(state.events.contains(&SkiEvent::ObstacleHit));
    }

    #[test]
    fn test_obstacle_penalizes_at_most_once() {
        let level = level_with(vec![obj(ObjectKind::ObstacleRock, 150.0, 0.0)]);
        let mut state = SkiState::new(&level);
        state.score = 500;
        run(&mut state, &level, &SkiInput::default(), 1200);
        assert_eq!(state.score, 500 - OBSTACLE_PENALTY);
    }

    #[test]
    fn test_obstacle_stalls_but_never_reverses() {
        let level = level_with(vec![obj(ObjectKind::ObstacleTree, 150.0, 0.0)]);
        let mut state = SkiState::new(&level);
        let mut last_x = state.x;
        for _ in 0..600 {
            tick(&mut state, &level, &SkiInput::default(), SIM_DT);
            assert!(state.x >= last_x);
            last_x = state.x;
        }
        assert!(state.x > 150.0 + OBJECT_HALF_EXTENT, "stall must end");
    }

    #[test]
    fn test_ramp_launch_and_landing() {
        let level = level_with(vec![obj(ObjectKind::Ramp, 150.0, 0.0)]);
        let mut state = SkiState::new(&level);
        run(&mut state, &level, &SkiInput::default(), 60);
        assert!(state.airborne);
        assert!(state.air_offset > 0.0);

        // Ballistic arc returns to the surface
        run(&mut state, &level, &SkiInput::default(), 600);
        assert!(!state.airborne);
        assert_eq!(state.air_offset, 0.0);
        assert!(state.events.contains(&SkiEvent::Landed));
    }

    #[test]
    fn test_airborne_ignores_obstacles() {
        let level = level_with(vec![
            obj(ObjectKind::Ramp, 150.0, 0.0),
            obj(ObjectKind::ObstacleTree, 250.0, 0.0),
        ]);
        let mut state = SkiState::new(&level);
        state.score = 100;
        // Boost through: airborne window covers the obstacle
        let input = SkiInput {
            boost: true,
            ..Default::default()
        };
        run(&mut state, &level, &input, 300);
        assert_eq!(state.score, 100, "jumped-over obstacle must not penalize");
    }

    #[test]
    fn test_trick_scores_per_full_revolution() {
        let level = level_with(vec![obj(ObjectKind::Ramp, 150.0, 0.0)]);
        let mut state = SkiState::new(&level);
        let input = SkiInput {
            trick: true,
            ..Default::default()
        };
        run(&mut state, &level, &input, 600);
        // ~1.49s of air at 300 deg/s: exactly one full revolution
        assert_eq!(state.tricks, 1);
        assert_eq!(state.score, TRICK_SCORE);
        assert!(!state.airborne);
        assert_eq!(state.trick_rotation, 0.0, "partial rotation discarded");
    }

    #[test]
    fn test_lane_steering_clamped() {
        let level = empty_level(100_000.0);
        let mut state = SkiState::new(&level);
        let input = SkiInput {
            steer_down: true,
            ..Default::default()
        };
        for _ in 0..2000 {
            tick(&mut state, &level, &input, SIM_DT);
        }
        assert_eq!(state.lane_offset, LANE_RANGE);
    }

    #[test]
    fn test_lane_does_not_affect_downhill_progress() {
        let level = empty_level(100_000.0);
        let mut steering = SkiState::new(&level);
        let mut straight = SkiState::new(&level);
        let steer = SkiInput {
            steer_up: true,
            ..Default::default()
        };
        for _ in 0..240 {
            tick(&mut steering, &level, &steer, SIM_DT);
            tick(&mut straight, &level, &SkiInput::default(), SIM_DT);
        }
        assert!((steering.x - straight.x).abs() < 1e-3);
    }

    #[test]
    fn test_finish_emits_results_once() {
        let level = empty_level(400.0);
        let mut state = SkiState::new(&level);
        run(&mut state, &level, &SkiInput::default(), 2000);
        assert!(state.finished);
        let finishes = state
            .events
            .iter()
            .filter(|e| matches!(e, SkiEvent::Finished(_)))
            .count();
        assert_eq!(finishes, 1);

        // Further ticks are ignored entirely
        let x = state.x;
        tick(&mut state, &level, &SkiInput::default(), SIM_DT);
        assert_eq!(state.x, x);
        assert_eq!(state.events.len(), finishes);
    }

    #[test]
    fn test_collect_run_end_to_end() {
        // 3 coins, 1 star, one ramp long enough for 2 tricks
        let level = level_with(vec![
            obj(ObjectKind::Coin, 200.0, 0.0),
            obj(ObjectKind::Coin, 300.0, 0.0),
            obj(ObjectKind::Coin, 400.0, 0.0),
            obj(ObjectKind::Star, 500.0, 0.0),
            obj(ObjectKind::Ramp, 600.0, 0.0),
            obj(ObjectKind::Ramp, 1200.0, 0.0),
        ]);
        let mut state = SkiState::new(&level);
        let input = SkiInput {
            trick: true,
            ..Default::default()
        };
        run(&mut state, &level, &input, 3000);
        assert_eq!(state.coins, 3);
        assert_eq!(state.stars, 1);
        assert_eq!(state.tricks, 2);
        assert_eq!(state.score, 3 * 25 + 75 + 2 * 100);
        assert_eq!(state.results().score, 350);
    }

    #[test]
    fn test_brake_and_boost_scale_progress() {
        let level = empty_level(100_000.0);
        let mut braking = SkiState::new(&level);
        let mut boosting = SkiState::new(&level);
        let brake = SkiInput {
            brake: true,
            ..Default::default()
        };
        let boost = SkiInput {
            boost: true,
            ..Default::default()
        };
        for _ in 0..120 {
            tick(&mut braking, &level, &brake, SIM_DT);
            tick(&mut boosting, &level, &boost, SIM_DT);
        }
        let braked = braking.x - SKI_START_X;
        let boosted = boosting.x - SKI_START_X;
        assert!((braked - SKI_SPEED * 0.5).abs() < 1.0);
        assert!((boosted - SKI_SPEED * 1.5).abs() < 1.0);
    }

    proptest! {
        #[test]
        fn prop_downhill_distance_is_monotonic(inputs in proptest::collection::vec(0u8..32, 1..400)) {
            let level = SkiLevel::default_level();
            let mut state = SkiState::new(&level);
            let mut last_x = state.x;
            for bits in inputs {
                let input = SkiInput {
                    steer_up: bits & 1 != 0,
                    steer_down: bits & 2 != 0,
                    brake: bits & 4 != 0,
                    boost: bits & 8 != 0,
                    trick: bits & 16 != 0,
                };
                tick(&mut state, &level, &input, SIM_DT);
                prop_assert!(state.x >= last_x);
                prop_assert!(state.lane_offset.abs() <= LANE_RANGE);
                last_x = state.x;
            }
        }
    }
}
