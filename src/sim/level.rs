//! Level data: author-defined ski tracks and combat rosters.
//!
//! Levels are immutable once loaded. Custom levels arrive as JSON exported by
//! the level editor; malformed object entries are skipped, unknown level ids
//! fall back to the built-in defaults.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{FINISH_MARGIN, LANE_RANGE};

/// Kinds of objects that can be placed on a ski track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    ObstacleTree,
    ObstacleRock,
    Coin,
    Star,
    Potion,
    Ramp,
}

impl ObjectKind {
    /// Parse the tag the level editor writes; `None` for unknown tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "obstacle_tree" => Some(Self::ObstacleTree),
            "obstacle_rock" => Some(Self::ObstacleRock),
            "collectible_coin" => Some(Self::Coin),
            "collectible_star" => Some(Self::Star),
            "collectible_potion" => Some(Self::Potion),
            "ramp" => Some(Self::Ramp),
            _ => None,
        }
    }

    /// Sprite role tag for the rendering collaborator.
    pub fn tag(self) -> &'static str {
        match self {
            Self::ObstacleTree => "obstacle_tree",
            Self::ObstacleRock => "obstacle_rock",
            Self::Coin => "collectible_coin",
            Self::Star => "collectible_star",
            Self::Potion => "collectible_potion",
            Self::Ramp => "ramp",
        }
    }

    pub fn is_obstacle(self) -> bool {
        matches!(self, Self::ObstacleTree | Self::ObstacleRock)
    }

    pub fn is_collectible(self) -> bool {
        matches!(self, Self::Coin | Self::Star | Self::Potion)
    }
}

/// A fixed object on the ski track.
///
/// `pos.x` is absolute downhill distance, `pos.y` the lane offset from the
/// slope centerline (negative = uphill side).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LevelObject {
    pub kind: ObjectKind,
    pub pos: Vec2,
}

/// Raw object entry as the editor exports it
#[derive(Debug, Clone, Deserialize)]
struct RawObject {
    #[serde(rename = "type")]
    tag: String,
    x: f32,
    #[serde(default)]
    y: f32,
}

/// A ski track description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkiLevel {
    pub id: String,
    pub name: String,
    pub width: f32,
    pub objects: Vec<LevelObject>,
}

impl SkiLevel {
    /// Downhill distance of the finish line
    pub fn finish_x(&self) -> f32 {
        self.width - FINISH_MARGIN
    }

    fn from_raw(raw: RawSkiLevel) -> Self {
        let objects = raw
            .objects
            .into_iter()
            .filter_map(|obj| match ObjectKind::from_tag(&obj.tag) {
                // Out-of-range placements are clamped, never rejected
                Some(kind) => Some(LevelObject {
                    kind,
                    pos: Vec2::new(obj.x.max(0.0), obj.y.clamp(-LANE_RANGE, LANE_RANGE)),
                }),
                None => {
                    log::warn!("skipping unknown track object type {:?}", obj.tag);
                    None
                }
            })
            .collect();
        Self {
            id: raw.id,
            name: raw.name,
            width: raw.width,
            objects,
        }
    }

    /// The built-in Beginner Hill track
    pub fn default_level() -> Self {
        let objects = [
            // Early section - gentle introduction
            (ObjectKind::Coin, 300.0, 0.0),
            (ObjectKind::ObstacleTree, 500.0, -50.0),
            (ObjectKind::Coin, 600.0, 40.0),
            (ObjectKind::ObstacleTree, 750.0, 60.0),
            // Mid section - more spread
            (ObjectKind::Star, 850.0, -30.0),
            (ObjectKind::ObstacleRock, 950.0, 10.0),
            (ObjectKind::Coin, 1050.0, -70.0),
            (ObjectKind::Ramp, 1200.0, 0.0),
            // Post-ramp
            (ObjectKind::Potion, 1400.0, -20.0),
            (ObjectKind::ObstacleTree, 1550.0, 80.0),
            (ObjectKind::Coin, 1650.0, -50.0),
            (ObjectKind::ObstacleRock, 1800.0, -80.0),
            // Late section - harder
            (ObjectKind::Coin, 2000.0, 30.0),
            (ObjectKind::Ramp, 2200.0, 0.0),
            (ObjectKind::Potion, 2400.0, 40.0),
            (ObjectKind::ObstacleTree, 2550.0, -60.0),
            (ObjectKind::Star, 2700.0, 50.0),
            (ObjectKind::ObstacleRock, 2900.0, -90.0),
        ];
        Self {
            id: "default-ski".into(),
            name: "Beginner Hill".into(),
            width: 3200.0,
            objects: objects
                .iter()
                .map(|&(kind, x, y)| LevelObject {
                    kind,
                    pos: Vec2::new(x, y),
                })
                .collect(),
        }
    }
}

/// Enemy archetypes fielded by combat levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Strong,
    Boss,
}

impl EnemyKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "enemy_basic" => Some(Self::Basic),
            "enemy_strong" => Some(Self::Strong),
            "enemy_boss" => Some(Self::Boss),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Basic => "enemy_basic",
            Self::Strong => "enemy_strong",
            Self::Boss => "enemy_boss",
        }
    }

    /// Inclusive per-turn damage roll range
    pub fn damage_range(self) -> (i32, i32) {
        match self {
            Self::Basic => (5, 15),
            Self::Strong => (10, 25),
            Self::Boss => (15, 35),
        }
    }
}

/// A single enemy placement in a combat level
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnemySpec {
    pub kind: EnemyKind,
    pub hp: i32,
    pub pos: Vec2,
}

#[derive(Debug, Clone, Deserialize)]
struct RawEnemy {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    hp: i32,
}

/// A combat arena description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatLevel {
    pub id: String,
    pub name: String,
    pub enemies: Vec<EnemySpec>,
}

impl CombatLevel {
    fn from_raw(raw: RawCombatLevel) -> Self {
        let enemies = raw
            .enemies
            .into_iter()
            .filter_map(|e| match EnemyKind::from_tag(&e.tag) {
                Some(kind) => Some(EnemySpec {
                    kind,
                    hp: e.hp.max(1),
                    pos: Vec2::new(e.x, e.y),
                }),
                None => {
                    log::warn!("skipping unknown enemy type {:?}", e.tag);
                    None
                }
            })
            .collect();
        Self {
            id: raw.id,
            name: raw.name,
            enemies,
        }
    }

    /// The built-in Snow Arena roster
    pub fn default_level() -> Self {
        Self {
            id: "default-combat".into(),
            name: "Snow Arena".into(),
            enemies: vec![
                EnemySpec {
                    kind: EnemyKind::Basic,
                    hp: 30,
                    pos: Vec2::new(500.0, 300.0),
                },
                EnemySpec {
                    kind: EnemyKind::Basic,
                    hp: 30,
                    pos: Vec2::new(600.0, 200.0),
                },
                EnemySpec {
                    kind: EnemyKind::Strong,
                    hp: 60,
                    pos: Vec2::new(650.0, 350.0),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawSkiLevel {
    #[serde(default)]
    id: String,
    name: String,
    width: f32,
    #[serde(default)]
    objects: Vec<RawObject>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawCombatLevel {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    enemies: Vec<RawEnemy>,
}

/// Editor export envelope; `type` selects the level flavor
#[derive(Debug, Clone, Deserialize)]
struct RawLevel {
    #[serde(rename = "type")]
    flavor: String,
    #[serde(flatten)]
    rest: serde_json::Value,
}

/// Errors importing a level from editor JSON
#[derive(Debug)]
pub enum LevelImportError {
    Parse(serde_json::Error),
    UnknownFlavor(String),
}

impl std::fmt::Display for LevelImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "invalid level JSON: {e}"),
            Self::UnknownFlavor(flavor) => write!(f, "unknown level type {flavor:?}"),
        }
    }
}

impl std::error::Error for LevelImportError {}

impl From<serde_json::Error> for LevelImportError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Custom level store with built-in fallbacks.
///
/// Lookup never fails: an unknown id resolves to the built-in default level.
#[derive(Debug, Clone)]
pub struct LevelLibrary {
    default_ski: SkiLevel,
    default_combat: CombatLevel,
    custom_ski: Vec<SkiLevel>,
    custom_combat: Vec<CombatLevel>,
    next_custom: u32,
}

impl Default for LevelLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelLibrary {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "powder_brawl_levels";

    pub fn new() -> Self {
        Self {
            default_ski: SkiLevel::default_level(),
            default_combat: CombatLevel::default_level(),
            custom_ski: Vec::new(),
            custom_combat: Vec::new(),
            next_custom: 1,
        }
    }

    /// Resolve a ski level id, falling back to Beginner Hill.
    pub fn ski_level(&self, id: &str) -> &SkiLevel {
        self.custom_ski
            .iter()
            .find(|l| l.id == id)
            .unwrap_or(&self.default_ski)
    }

    /// Resolve a combat level id, falling back to Snow Arena.
    pub fn combat_level(&self, id: &str) -> &CombatLevel {
        self.custom_combat
            .iter()
            .find(|l| l.id == id)
            .unwrap_or(&self.default_combat)
    }

    pub fn ski_levels(&self) -> impl Iterator<Item = &SkiLevel> {
        std::iter::once(&self.default_ski).chain(self.custom_ski.iter())
    }

    pub fn combat_levels(&self) -> impl Iterator<Item = &CombatLevel> {
        std::iter::once(&self.default_combat).chain(self.custom_combat.iter())
    }

    /// Import a level from editor JSON. Returns the assigned level id.
    pub fn import(&mut self, json: &str) -> Result<String, LevelImportError> {
        let raw: RawLevel = serde_json::from_str(json)?;
        let id = format!("custom-{}", self.next_custom);
        self.next_custom += 1;
        match raw.flavor.as_str() {
            "ski" => {
                let mut level = SkiLevel::from_raw(serde_json::from_value(raw.rest)?);
                level.id = id.clone();
                self.custom_ski.push(level);
            }
            "combat" => {
                let mut level = CombatLevel::from_raw(serde_json::from_value(raw.rest)?);
                level.id = id.clone();
                self.custom_combat.push(level);
            }
            other => return Err(LevelImportError::UnknownFlavor(other.to_string())),
        }
        Ok(id)
    }

    /// Remove a custom level by id (defaults cannot be removed).
    pub fn remove(&mut self, id: &str) {
        self.custom_ski.retain(|l| l.id != id);
        self.custom_combat.retain(|l| l.id != id);
    }

    /// Export a level back to JSON for sharing.
    pub fn export_ski(&self, id: &str) -> Option<String> {
        serde_json::to_string_pretty(self.ski_level(id)).ok()
    }

    /// Load custom levels from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let mut library = Self::new();
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Vec<serde_json::Value>>(&json) {
                    Ok(entries) => {
                        for entry in entries {
                            if let Ok(text) = serde_json::to_string(&entry) {
                                if let Err(e) = library.import(&text) {
                                    log::warn!("dropping stored level: {e}");
                                }
                            }
                        }
                        log::info!(
                            "Loaded {} custom levels",
                            library.custom_ski.len() + library.custom_combat.len()
                        );
                    }
                    Err(e) => log::warn!("Failed to parse stored levels: {e}"),
                }
            }
        }
        library
    }

    /// Save custom levels to LocalStorage in the editor export format
    /// (WASM only). Failures are logged and ignored.
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let mut entries = Vec::new();
            for level in &self.custom_ski {
                if let Ok(mut value) = serde_json::to_value(level) {
                    value["type"] = "ski".into();
                    entries.push(value);
                }
            }
            for level in &self.custom_combat {
                if let Ok(mut value) = serde_json::to_value(level) {
                    value["type"] = "combat".into();
                    entries.push(value);
                }
            }
            if let Ok(json) = serde_json::to_string(&entries) {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Failed to save custom levels (storage unavailable)");
                }
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ski_level_shape() {
        let level = SkiLevel::default_level();
        assert_eq!(level.objects.len(), 18);
        assert_eq!(level.finish_x(), 3100.0);
        assert!(level.objects.iter().all(|o| o.pos.y.abs() <= 120.0));
        // Two ramps, two potions on Beginner Hill
        let ramps = level
            .objects
            .iter()
            .filter(|o| o.kind == ObjectKind::Ramp)
            .count();
        assert_eq!(ramps, 2);
    }

    #[test]
    fn test_default_combat_roster() {
        let level = CombatLevel::default_level();
        assert_eq!(level.enemies.len(), 3);
        assert_eq!(level.enemies[2].kind, EnemyKind::Strong);
        assert_eq!(level.enemies[2].hp, 60);
    }

    #[test]
    fn test_unknown_object_kinds_are_skipped() {
        let json = r#"{
            "type": "ski",
            "name": "Weird Hill",
            "width": 1000,
            "objects": [
                {"type": "collectible_coin", "x": 100, "y": 0},
                {"type": "obstacle_ufo", "x": 200, "y": 10},
                {"type": "ramp", "x": 300, "y": 0}
            ]
        }"#;
        let mut library = LevelLibrary::new();
        let id = library.import(json).expect("import should succeed");
        let level = library.ski_level(&id);
        assert_eq!(level.objects.len(), 2);
    }

    #[test]
    fn test_unknown_id_falls_back_to_default() {
        let library = LevelLibrary::new();
        assert_eq!(library.ski_level("no-such-level").id, "default-ski");
        assert_eq!(library.combat_level("nope").id, "default-combat");
    }

    #[test]
    fn test_unknown_flavor_is_an_error() {
        let mut library = LevelLibrary::new();
        let err = library
            .import(r#"{"type": "race", "name": "x", "width": 10}"#)
            .unwrap_err();
        assert!(matches!(err, LevelImportError::UnknownFlavor(_)));
    }

    #[test]
    fn test_damage_ranges() {
        assert_eq!(EnemyKind::Basic.damage_range(), (5, 15));
        assert_eq!(EnemyKind::Strong.damage_range(), (10, 25));
    }
}
