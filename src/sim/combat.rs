//! Combat turn engine
//!
//! An explicit state machine: `PlayerTurn` accepts commands, `Qte` runs the
//! active quick-time event, `Wait` holds the scheduled transition to the
//! enemy turn or back to the player. `Victory` and `Defeat` are absorbing.
//!
//! Every transition applies all of its side effects before the next tick
//! reads input, and commands submitted outside `PlayerTurn` are silent
//! no-ops, so double-submission can never double-resolve an action.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::RngState;
use super::level::{CombatLevel, EnemyKind};
use super::outcome::CombatBonuses;
use super::qte::{QteInput, QteKind, QteState};
use crate::consts::*;
use crate::round_half_from_zero;
use crate::weapons::{self, QteType, Weapon};

/// Player commands, accepted only during `PlayerTurn`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Command {
    Attack,
    Defend,
    Special,
    Potion,
}

/// Why a command was refused (with a user-visible message, not an error)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    /// Special needs strictly more HP than its cost
    InsufficientHp,
    NoPotions,
}

/// Which pending action the active QTE resolves into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QteAction {
    Attack,
    Defend,
}

/// Where a scheduled wait leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Then {
    EnemyTurn,
    PlayerTurn,
}

/// Combat state machine phases
#[derive(Debug, Clone)]
pub enum CombatPhase {
    /// Awaiting a player command
    PlayerTurn,
    /// A quick-time event is running; owns the only live QTE
    Qte { qte: QteState, action: QteAction },
    /// Display delay before the scheduled transition fires
    Wait { remaining: f32, then: Then },
    Victory,
    Defeat,
}

/// Final battle result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BattleOutcome {
    Victory,
    Defeat,
}

/// Terminal payload for the outcome screen
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CombatOutcome {
    pub result: BattleOutcome,
    /// Enemy turns survived before the battle ended
    pub turns_used: u32,
    pub hp_remaining: i32,
}

/// Combat log events for the HUD/audio collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CombatEvent {
    TurnStarted { number: u32 },
    QteStarted { kind: QteKind },
    AttackLanded {
        target: usize,
        damage: i32,
        crit: bool,
        score: f32,
    },
    DefendReady { reduction_pct: i32 },
    SpecialCast { target: usize, damage: i32 },
    PotionDrunk { healed: i32, remaining: u32 },
    CommandRejected { command: Command, reason: RejectReason },
    EnemyDown { index: usize },
    EnemiesAttacked { total: i32 },
    Victory { turns_used: u32, hp_remaining: i32 },
    Defeat,
}

/// Player-side combatant
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub hp: i32,
    pub max_hp: i32,
    pub potions: u32,
    /// Damage multiplier for the upcoming enemy turn (1.0 = no reduction)
    pub defend_multiplier: f32,
    defending: bool,
}

/// Enemy-side combatant
#[derive(Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub hp: i32,
    pub max_hp: i32,
    pub alive: bool,
}

/// Full combat phase state
#[derive(Debug, Clone)]
pub struct CombatState {
    pub player: PlayerState,
    /// Roster order is targeting order: attacks hit the first living enemy
    pub enemies: Vec<Enemy>,
    pub weapon: &'static Weapon,
    pub bonuses: CombatBonuses,
    /// Completed enemy turns
    pub turn_count: u32,
    phase: CombatPhase,
    rng: Pcg32,
    /// Events since the last drain (not gameplay-affecting)
    pub events: Vec<CombatEvent>,
}

/// Map a weapon's declared QTE type to the variant that actually runs
fn attack_qte_kind(qte: QteType) -> QteKind {
    match qte {
        QteType::Mash => QteKind::Mash,
        QteType::Sequence => QteKind::Sequence,
        // Aim falls back to the timing bar
        QteType::Timing | QteType::Aim => QteKind::Timing,
    }
}

impl CombatState {
    /// Start a battle from a roster, the equipped weapon, and the ski-phase
    /// carry-over (bonus stats and potion supply).
    pub fn new(
        level: &CombatLevel,
        weapon: &'static Weapon,
        bonuses: CombatBonuses,
        potions: u32,
        seed: u64,
    ) -> Self {
        let max_hp = PLAYER_BASE_HP + bonuses.hp;
        let enemies = level
            .enemies
            .iter()
            .map(|spec| Enemy {
                kind: spec.kind,
                hp: spec.hp,
                max_hp: spec.hp,
                alive: true,
            })
            .collect();
        log::debug!(
            "combat start: weapon={} bonuses={bonuses:?} potions={potions}",
            weapon.name
        );
        Self {
            player: PlayerState {
                hp: max_hp,
                max_hp,
                potions,
                defend_multiplier: 1.0,
                defending: false,
            },
            enemies,
            weapon,
            bonuses,
            turn_count: 0,
            phase: CombatPhase::PlayerTurn,
            rng: RngState::new(seed).to_rng(),
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> &CombatPhase {
        &self.phase
    }

    pub fn is_player_turn(&self) -> bool {
        matches!(self.phase, CombatPhase::PlayerTurn)
    }

    pub fn is_over(&self) -> bool {
        self.outcome().is_some()
    }

    /// Terminal result, if the battle has ended.
    pub fn outcome(&self) -> Option<CombatOutcome> {
        match self.phase {
            CombatPhase::Victory => Some(CombatOutcome {
                result: BattleOutcome::Victory,
                turns_used: self.turn_count,
                hp_remaining: self.player.hp,
            }),
            CombatPhase::Defeat => Some(CombatOutcome {
                result: BattleOutcome::Defeat,
                turns_used: self.turn_count,
                hp_remaining: 0,
            }),
            _ => None,
        }
    }

    /// Drain events accumulated since the last call.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Submit a player command. Outside `PlayerTurn` this is a silent no-op.
    pub fn submit(&mut self, command: Command) {
        if !self.is_player_turn() {
            return;
        }
        match command {
            Command::Attack => {
                let kind = attack_qte_kind(self.weapon.qte);
                let qte = QteState::new(kind, &mut self.rng);
                self.events.push(CombatEvent::QteStarted { kind });
                self.phase = CombatPhase::Qte {
                    qte,
                    action: QteAction::Attack,
                };
            }
            Command::Defend => {
                let qte = QteState::new(QteKind::DefendTiming, &mut self.rng);
                self.events.push(CombatEvent::QteStarted {
                    kind: QteKind::DefendTiming,
                });
                self.phase = CombatPhase::Qte {
                    qte,
                    action: QteAction::Defend,
                };
            }
            Command::Special => self.cast_special(),
            Command::Potion => self.drink_potion(),
        }
    }

    fn reject(&mut self, command: Command, reason: RejectReason) {
        self.events.push(CombatEvent::CommandRejected { command, reason });
    }

    /// Damage the first living enemy. Returns the roster index hit, or None
    /// if every enemy is already down.
    fn apply_damage_to_target(&mut self, amount: i32) -> Option<usize> {
        let index = self.enemies.iter().position(|e| e.alive)?;
        let enemy = &mut self.enemies[index];
        enemy.hp -= amount;
        if enemy.hp <= 0 {
            // Lethal: alive recomputed the same frame, HP clamped for display
            enemy.alive = false;
            enemy.hp = 0;
            self.events.push(CombatEvent::EnemyDown { index });
        }
        Some(index)
    }

    fn all_enemies_down(&self) -> bool {
        self.enemies.iter().all(|e| !e.alive)
    }

    /// Victory is checked after every enemy-damage application in the
    /// player's turn, before the enemy turn ever runs.
    fn after_player_strike(&mut self, wait: f32) {
        if self.all_enemies_down() {
            self.enter_victory();
        } else {
            self.phase = CombatPhase::Wait {
                remaining: wait,
                then: Then::EnemyTurn,
            };
        }
    }

    fn enter_victory(&mut self) {
        self.events.push(CombatEvent::Victory {
            turns_used: self.turn_count,
            hp_remaining: self.player.hp,
        });
        self.phase = CombatPhase::Victory;
    }

    fn resolve_attack(&mut self, score: f32) {
        let base = weapons::calculate_damage(self.weapon, score);
        let total = base + self.bonuses.damage;
        let crit = self.rng.random_range(0.0..100.0) < self.bonuses.crit as f32;
        let damage = if crit { total * 2 } else { total };

        if let Some(target) = self.apply_damage_to_target(damage) {
            self.events.push(CombatEvent::AttackLanded {
                target,
                damage,
                crit,
                score,
            });
        }
        self.after_player_strike(ATTACK_WAIT_SECS);
    }

    fn resolve_defend(&mut self, score: f32) {
        self.player.defend_multiplier = 1.0 - DEFEND_MAX_REDUCTION * score;
        self.player.defending = true;
        self.events.push(CombatEvent::DefendReady {
            reduction_pct: round_half_from_zero(score * 70.0),
        });
        self.phase = CombatPhase::Wait {
            remaining: DEFEND_WAIT_SECS,
            then: Then::EnemyTurn,
        };
    }

    fn cast_special(&mut self) {
        if self.player.hp <= SPECIAL_COST {
            self.reject(Command::Special, RejectReason::InsufficientHp);
            return;
        }
        self.player.hp -= SPECIAL_COST;
        let damage =
            round_half_from_zero(self.weapon.damage as f32 * SPECIAL_MULTIPLIER) + self.bonuses.damage;
        if let Some(target) = self.apply_damage_to_target(damage) {
            self.events.push(CombatEvent::SpecialCast { target, damage });
        }
        self.after_player_strike(ATTACK_WAIT_SECS);
    }

    fn drink_potion(&mut self) {
        if self.player.potions == 0 {
            self.reject(Command::Potion, RejectReason::NoPotions);
            return;
        }
        self.player.potions -= 1;
        let healed = POTION_HEAL.min(self.player.max_hp - self.player.hp);
        self.player.hp += healed;
        self.events.push(CombatEvent::PotionDrunk {
            healed,
            remaining: self.player.potions,
        });
        // Drinking consumes the turn
        self.phase = CombatPhase::Wait {
            remaining: ATTACK_WAIT_SECS,
            then: Then::EnemyTurn,
        };
    }

    /// Every living enemy rolls damage; the sum lands on the player once.
    fn enemy_turn(&mut self) {
        if self.all_enemies_down() {
            self.enter_victory();
            return;
        }

        let defending = self.player.defending;
        let multiplier = self.player.defend_multiplier;
        let mut total = 0;
        for enemy in self.enemies.iter().filter(|e| e.alive) {
            let (lo, hi) = enemy.kind.damage_range();
            let mut roll = self.rng.random_range(lo..=hi);
            if defending {
                roll = round_half_from_zero(roll as f32 * multiplier);
            }
            total += roll;
        }

        self.player.hp -= total;
        // Defend lasts exactly one enemy turn
        self.player.defending = false;
        self.player.defend_multiplier = 1.0;
        self.events.push(CombatEvent::EnemiesAttacked { total });

        if self.player.hp <= 0 {
            self.player.hp = 0;
            self.events.push(CombatEvent::Defeat);
            self.phase = CombatPhase::Defeat;
        } else {
            self.phase = CombatPhase::Wait {
                remaining: ENEMY_WAIT_SECS,
                then: Then::PlayerTurn,
            };
        }
    }

    fn begin_player_turn(&mut self) {
        self.turn_count += 1;
        self.phase = CombatPhase::PlayerTurn;
        self.events.push(CombatEvent::TurnStarted {
            number: self.turn_count + 1,
        });
    }
}

/// What a tick resolved, extracted before side effects run
enum Step {
    QteDone(QteAction, f32),
    WaitDone(Then),
    Idle,
}

/// Advance combat by one timestep
pub fn tick(state: &mut CombatState, input: &QteInput, dt: f32) {
    let step = match &mut state.phase {
        CombatPhase::Qte { qte, action } => match qte.advance(input, dt) {
            Some(score) => Step::QteDone(*action, score),
            None => Step::Idle,
        },
        CombatPhase::Wait { remaining, then } => {
            *remaining -= dt;
            if *remaining <= 0.0 {
                Step::WaitDone(*then)
            } else {
                Step::Idle
            }
        }
        _ => Step::Idle,
    };

    match step {
        Step::QteDone(QteAction::Attack, score) => state.resolve_attack(score),
        Step::QteDone(QteAction::Defend, score) => state.resolve_defend(score),
        Step::WaitDone(Then::EnemyTurn) => state.enemy_turn(),
        Step::WaitDone(Then::PlayerTurn) => state.begin_player_turn(),
        Step::Idle => {}
    }
}
