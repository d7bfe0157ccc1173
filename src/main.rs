//! Powder Brawl entry point
//!
//! Native builds run a scripted headless demo of a full run (ski phase,
//! transition, combat) and print the outcome. Wasm builds expose the
//! simulation to the browser shell.

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use wasm_bindgen::prelude::*;

    use powder_brawl::consts::{MAX_SUBSTEPS, SIM_DT};
    use powder_brawl::progression::ProgressionRecord;
    use powder_brawl::sim::combat::{self, CombatState, Command};
    use powder_brawl::sim::ski::{self, SkiInput, SkiState};
    use powder_brawl::sim::{
        CombatBonuses, Dir, LevelLibrary, QteInput, RunSummary, SkiLevel,
    };
    use powder_brawl::sprites::SpriteLibrary;
    use powder_brawl::weapons::{self, WeaponId};

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
        log::info!("powder-brawl core ready");
    }

    /// Game instance bridging the JS shell to the simulation
    #[wasm_bindgen]
    pub struct Game {
        levels: LevelLibrary,
        sprites: SpriteLibrary,
        progression: ProgressionRecord,
        ski_level: SkiLevel,
        ski: Option<SkiState>,
        combat: Option<CombatState>,
        log: Vec<String>,
    }

    #[wasm_bindgen]
    impl Game {
        #[wasm_bindgen(constructor)]
        pub fn new() -> Self {
            Self {
                levels: LevelLibrary::load(),
                sprites: SpriteLibrary::load(),
                progression: ProgressionRecord::load(),
                ski_level: SkiLevel::default_level(),
                ski: None,
                combat: None,
                log: Vec::new(),
            }
        }

        /// Resolve a sprite role to the texture key the renderer should draw.
        pub fn texture_key(&self, role: &str) -> String {
            self.sprites.texture_key(role).to_string()
        }

        /// Import an editor-exported level; returns its id, or "" on error.
        pub fn import_level(&mut self, json: &str) -> String {
            match self.levels.import(json) {
                Ok(id) => {
                    self.levels.save();
                    id
                }
                Err(e) => {
                    log::warn!("level import failed: {e}");
                    String::new()
                }
            }
        }

        pub fn start_ski(&mut self, level_id: &str) {
            self.ski_level = self.levels.ski_level(level_id).clone();
            self.ski = Some(SkiState::new(&self.ski_level));
            self.combat = None;
        }

        /// Advance the ski phase; input flags are (up, down, brake, boost, trick).
        /// Returns true once the run is finished.
        pub fn tick_ski(
            &mut self,
            dt: f32,
            steer_up: bool,
            steer_down: bool,
            brake: bool,
            boost: bool,
            trick: bool,
        ) -> bool {
            let Some(state) = self.ski.as_mut() else {
                return false;
            };
            let input = SkiInput {
                steer_up,
                steer_down,
                brake,
                boost,
                trick,
            };
            let mut remaining = dt.min(0.1);
            let mut substeps = 0;
            while remaining > 0.0 && substeps < MAX_SUBSTEPS && !state.finished {
                ski::tick(state, &self.ski_level, &input, remaining.min(SIM_DT));
                remaining -= SIM_DT;
                substeps += 1;
            }
            for event in state.drain_events() {
                if let Ok(line) = serde_json::to_string(&event) {
                    self.log.push(line);
                }
            }
            state.finished
        }

        pub fn ski_results_json(&self) -> String {
            self.ski
                .as_ref()
                .and_then(|s| serde_json::to_string(&s.results()).ok())
                .unwrap_or_else(|| "{}".to_string())
        }

        /// Transition into combat with the chosen weapon.
        pub fn start_combat(&mut self, weapon: &str, level_id: &str, seed: u64) {
            let results = self
                .ski
                .as_ref()
                .map(|s| s.results())
                .unwrap_or_default();
            let weapon = WeaponId::from_tag(weapon)
                .filter(|&id| self.progression.is_unlocked(id))
                .map(weapons::weapon)
                .unwrap_or_else(|| weapons::weapon(WeaponId::Fists));
            let bonuses = CombatBonuses::from_ski(&results);
            let level = self.levels.combat_level(level_id);
            self.combat = Some(CombatState::new(
                level,
                weapon,
                bonuses,
                results.potions,
                seed,
            ));
        }

        pub fn submit_command(&mut self, command: &str) {
            let Some(state) = self.combat.as_mut() else {
                return;
            };
            let command = match command {
                "attack" => Command::Attack,
                "defend" => Command::Defend,
                "special" => Command::Special,
                "potion" => Command::Potion,
                _ => return,
            };
            state.submit(command);
        }

        /// Advance combat; returns true once the battle has ended.
        pub fn tick_combat(&mut self, dt: f32, mash_presses: u8, confirm: bool, dir: &str) -> bool {
            let Some(state) = self.combat.as_mut() else {
                return false;
            };
            let input = QteInput {
                mash_presses,
                confirm,
                dir: Dir::from_key(dir),
            };
            let mut remaining = dt.min(0.1);
            let mut substeps = 0;
            while remaining > 0.0 && substeps < MAX_SUBSTEPS && !state.is_over() {
                combat::tick(state, &input, remaining.min(SIM_DT));
                remaining -= SIM_DT;
                substeps += 1;
            }
            for event in state.drain_events() {
                if let Ok(line) = serde_json::to_string(&event) {
                    self.log.push(line);
                }
            }
            state.is_over()
        }

        /// Drain the event log as a JSON array of event objects.
        pub fn drain_log(&mut self) -> String {
            let drained = std::mem::take(&mut self.log);
            format!("[{}]", drained.join(","))
        }

        /// Record the finished run, persist progression, and report the
        /// summary plus any new weapon unlocks.
        pub fn finish_run(&mut self) -> String {
            let (Some(ski), Some(combat)) = (self.ski.as_ref(), self.combat.as_ref()) else {
                return "{}".to_string();
            };
            let Some(outcome) = combat.outcome() else {
                return "{}".to_string();
            };
            let summary = RunSummary::new(ski.results(), outcome);
            self.progression.record_run(summary.total_score);
            let unlocks: Vec<&str> = weapons::check_unlocks(&self.progression)
                .into_iter()
                .map(|w| {
                    self.progression.unlock(w.id);
                    w.name
                })
                .collect();
            self.progression.save();
            serde_json::json!({
                "summary": summary,
                "newUnlocks": unlocks,
                "highScore": self.progression.high_score,
                "totalRuns": self.progression.total_runs,
            })
            .to_string()
        }
    }

    impl Default for Game {
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use powder_brawl::consts::*;
    use powder_brawl::progression::ProgressionRecord;
    use powder_brawl::sim::combat::{self, CombatPhase, CombatState, Command};
    use powder_brawl::sim::qte::{QteInput, QteState};
    use powder_brawl::sim::ski::{self, SkiInput, SkiState};
    use powder_brawl::sim::{CombatBonuses, LevelLibrary, ObjectKind, RunSummary, SkiLevel};
    use powder_brawl::weapons::{self, WeaponId};

    /// Steer toward collectibles and away from obstacles, trick in the air.
    fn ski_policy(state: &SkiState, level: &SkiLevel) -> SkiInput {
        let mut input = SkiInput {
            trick: true,
            ..Default::default()
        };
        let ahead = level
            .objects
            .iter()
            .filter(|o| o.pos.x > state.x && o.pos.x < state.x + 220.0)
            .min_by(|a, b| a.pos.x.total_cmp(&b.pos.x));
        match ahead {
            Some(obj) if obj.kind.is_obstacle() => {
                // Swerve around it
                if (state.lane_offset - obj.pos.y).abs() < 50.0 {
                    if obj.pos.y >= state.lane_offset {
                        input.steer_up = true;
                    } else {
                        input.steer_down = true;
                    }
                } else {
                    input.boost = true;
                }
            }
            Some(obj) => {
                // Line up with the pickup or the ramp
                if state.lane_offset < obj.pos.y - 4.0 {
                    input.steer_down = true;
                } else if state.lane_offset > obj.pos.y + 4.0 {
                    input.steer_up = true;
                } else {
                    input.boost = true;
                }
            }
            None => input.boost = true,
        }
        input
    }

    /// Drive whatever QTE is active with competent (not perfect) play.
    fn qte_policy(state: &CombatState, tick_index: u32) -> QteInput {
        let mut input = QteInput::default();
        if let CombatPhase::Qte { qte, .. } = state.phase() {
            match qte {
                // ~10 presses per second
                QteState::Mash { .. } => input.mash_presses = u8::from(tick_index % 12 == 0),
                QteState::Timing { marker } => {
                    input.confirm = (*marker - SWEET_SPOT_CENTER).abs() < MARKER_SPEED * SIM_DT;
                }
                QteState::DefendTiming { marker } => {
                    input.confirm = marker.abs() < MARKER_SPEED * SIM_DT;
                }
                QteState::Sequence {
                    symbols, matched, ..
                } => {
                    // One correct press every few ticks
                    if tick_index % 8 == 0 && *matched < symbols.len() {
                        input.dir = Some(symbols[*matched]);
                    }
                }
            }
        }
        input
    }

    pub fn run() {
        env_logger::init();

        let levels = LevelLibrary::load();
        let level = levels.ski_level("default-ski");
        log::info!("ski phase: {} ({} objects)", level.name, level.objects.len());

        let mut ski = SkiState::new(level);
        for _ in 0..60_000 {
            if ski.finished {
                break;
            }
            let input = ski_policy(&ski, level);
            ski::tick(&mut ski, level, &input, SIM_DT);
        }
        let results = ski.results();
        println!(
            "run complete: score {} ({} coins, {} stars, {} tricks, {} potions)",
            results.score, results.coins, results.stars, results.tricks, results.potions
        );

        let mut progression = ProgressionRecord::load();
        let bonuses = CombatBonuses::from_ski(&results);
        println!(
            "combat bonuses: +{} HP, +{} DMG, +{}% crit",
            bonuses.hp, bonuses.damage, bonuses.crit
        );

        let weapon = weapons::weapon(WeaponId::Fists);
        let arena = levels.combat_level("default-combat");
        log::info!("combat phase: {} vs {} enemies", arena.name, arena.enemies.len());

        let mut battle = CombatState::new(arena, weapon, bonuses, results.potions, 0xB0B5);
        let mut ticks = 0u32;
        while !battle.is_over() && ticks < 600_000 {
            if battle.is_player_turn() {
                let low_hp = battle.player.hp < battle.player.max_hp / 4;
                battle.submit(if low_hp && battle.player.potions > 0 {
                    Command::Potion
                } else {
                    Command::Attack
                });
            }
            let input = qte_policy(&battle, ticks);
            combat::tick(&mut battle, &input, SIM_DT);
            ticks += 1;
        }

        for event in battle.drain_events() {
            log::debug!("combat event: {event:?}");
        }

        let Some(outcome) = battle.outcome() else {
            println!("battle never resolved");
            return;
        };
        let summary = RunSummary::new(results, outcome);
        let new_high = progression.record_run(summary.total_score);
        for weapon in weapons::check_unlocks(&progression) {
            progression.unlock(weapon.id);
            println!("new weapon unlocked: {}", weapon.name);
        }
        progression.save();

        println!(
            "{:?} in {} turns, {} HP left | total score {}{}",
            outcome.result,
            outcome.turns_used,
            outcome.hp_remaining,
            summary.total_score,
            if new_high { " (new high!)" } else { "" }
        );

        // The ramp count is a quick sanity check that the default level loaded
        let ramps = level
            .objects
            .iter()
            .filter(|o| o.kind == ObjectKind::Ramp)
            .count();
        log::debug!("level sanity: {ramps} ramps on {}", level.name);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry is #[wasm_bindgen(start)] in wasm_game
}
