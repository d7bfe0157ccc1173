//! Audio cue mapping
//!
//! The simulation never waits on audio: events map to fire-and-forget cues
//! handed to whatever backend is wired in. Synthesis lives with the
//! presentation layer; a missing backend simply drops cues.

use crate::sim::{CombatEvent, SkiEvent};

/// Sound effect cues the backend knows how to voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    ButtonHover,
    ButtonClick,
    CoinPickup,
    StarPickup,
    PotionPickup,
    ObstacleHit,
    RampLaunch,
    TrickScore,
    FinishLine,
    QteMash,
    QteFail,
    AttackHit,
    CriticalHit,
    Defend,
    SpecialAttack,
    UsePotion,
    EnemyAttack,
    PlayerHurt,
    EnemyDeath,
    Victory,
    Defeat,
    HighScore,
}

/// Fire-and-forget audio backend; implementations must not block and must
/// never mutate simulation state.
pub trait CueSink {
    fn play(&self, cue: AudioCue);
}

/// Backend used when audio is unavailable; drops every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl CueSink for NullSink {
    fn play(&self, _cue: AudioCue) {}
}

/// Cue for a ski-phase event, if it makes a sound.
pub fn ski_cue(event: &SkiEvent) -> Option<AudioCue> {
    match event {
        SkiEvent::CoinCollected => Some(AudioCue::CoinPickup),
        SkiEvent::StarCollected => Some(AudioCue::StarPickup),
        SkiEvent::PotionCollected => Some(AudioCue::PotionPickup),
        SkiEvent::ObstacleHit => Some(AudioCue::ObstacleHit),
        SkiEvent::Launched => Some(AudioCue::RampLaunch),
        SkiEvent::TrickScored => Some(AudioCue::TrickScore),
        SkiEvent::Finished(_) => Some(AudioCue::FinishLine),
        SkiEvent::Landed => None,
    }
}

/// Cues for a combat event, in play order.
pub fn combat_cues(event: &CombatEvent) -> Vec<AudioCue> {
    match event {
        CombatEvent::AttackLanded { crit, score, .. } => {
            if *score <= 0.2 {
                vec![AudioCue::QteFail]
            } else if *crit {
                vec![AudioCue::CriticalHit]
            } else {
                vec![AudioCue::AttackHit]
            }
        }
        CombatEvent::DefendReady { .. } => vec![AudioCue::Defend],
        CombatEvent::SpecialCast { .. } => vec![AudioCue::SpecialAttack],
        CombatEvent::PotionDrunk { .. } => vec![AudioCue::UsePotion],
        CombatEvent::EnemiesAttacked { .. } => vec![AudioCue::EnemyAttack, AudioCue::PlayerHurt],
        CombatEvent::EnemyDown { .. } => vec![AudioCue::EnemyDeath],
        CombatEvent::Victory { .. } => vec![AudioCue::Victory],
        CombatEvent::Defeat => vec![AudioCue::Defeat],
        CombatEvent::TurnStarted { .. }
        | CombatEvent::QteStarted { .. }
        | CombatEvent::CommandRejected { .. } => Vec::new(),
    }
}

/// Forward every cue for a batch of combat events to a sink.
pub fn play_combat_events(sink: &impl CueSink, events: &[CombatEvent]) {
    for event in events {
        for cue in combat_cues(event) {
            sink.play(cue);
        }
    }
}
