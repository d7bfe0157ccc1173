//! Sprite-role registry
//!
//! The core never touches pixel data; it resolves logical roles (player,
//! enemy_basic, obstacle_tree, ...) to texture keys the renderer can draw.
//! Players can upload custom sprites and assign them to roles; assignments
//! override the built-in placeholder art.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A logical drawable role and its built-in placeholder texture
#[derive(Debug, Clone, Copy)]
pub struct SpriteRole {
    pub role: &'static str,
    pub name: &'static str,
    pub default_key: &'static str,
    /// Expected sprite edge length in pixels
    pub size: u32,
}

/// Every role the game draws
pub static SPRITE_ROLES: [SpriteRole; 10] = [
    SpriteRole { role: "player", name: "Player Character", default_key: "player-default", size: 32 },
    SpriteRole { role: "enemy_basic", name: "Basic Enemy", default_key: "enemy-basic", size: 32 },
    SpriteRole { role: "enemy_strong", name: "Strong Enemy", default_key: "enemy-strong", size: 32 },
    SpriteRole { role: "enemy_boss", name: "Boss Enemy", default_key: "enemy-boss", size: 48 },
    SpriteRole { role: "obstacle_tree", name: "Tree", default_key: "obstacle-tree", size: 32 },
    SpriteRole { role: "obstacle_rock", name: "Rock", default_key: "obstacle-rock", size: 32 },
    SpriteRole { role: "collectible_coin", name: "Coin", default_key: "collectible-coin", size: 16 },
    SpriteRole { role: "collectible_star", name: "Star", default_key: "collectible-star", size: 16 },
    SpriteRole { role: "collectible_potion", name: "Health Potion", default_key: "collectible-potion", size: 16 },
    SpriteRole { role: "ramp", name: "Ramp", default_key: "ramp", size: 32 },
];

/// An uploaded sprite; the image itself is an opaque data URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomSprite {
    pub id: String,
    pub name: String,
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

/// Uploaded sprites plus role assignments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpriteLibrary {
    #[serde(default)]
    sprites: Vec<CustomSprite>,
    /// role tag -> custom sprite id
    #[serde(default)]
    assignments: HashMap<String, String>,
    #[serde(default)]
    next_id: u32,
}

impl SpriteLibrary {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "powder_brawl_sprites";

    pub fn new() -> Self {
        Self::default()
    }

    /// Register an uploaded sprite; returns its id.
    pub fn add_sprite(&mut self, name: &str, data_url: &str, width: u32, height: u32) -> String {
        self.next_id += 1;
        let id = format!("custom-{}", self.next_id);
        self.sprites.push(CustomSprite {
            id: id.clone(),
            name: name.to_string(),
            data_url: data_url.to_string(),
            width,
            height,
        });
        id
    }

    /// Remove a sprite and any role assignments pointing at it.
    pub fn remove_sprite(&mut self, id: &str) {
        self.sprites.retain(|s| s.id != id);
        self.assignments.retain(|_, assigned| assigned.as_str() != id);
    }

    /// Point a role at an uploaded sprite. Unknown ids are ignored.
    pub fn assign_to_role(&mut self, role: &str, sprite_id: &str) {
        if self.sprites.iter().any(|s| s.id == sprite_id) {
            self.assignments.insert(role.to_string(), sprite_id.to_string());
        } else {
            log::warn!("cannot assign unknown sprite {sprite_id:?} to {role:?}");
        }
    }

    pub fn unassign_role(&mut self, role: &str) {
        self.assignments.remove(role);
    }

    pub fn sprite_for_role(&self, role: &str) -> Option<&CustomSprite> {
        let id = self.assignments.get(role)?;
        self.sprites.iter().find(|s| &s.id == id)
    }

    pub fn sprites(&self) -> &[CustomSprite] {
        &self.sprites
    }

    /// The texture key to draw for a role: the assigned custom sprite if
    /// any, else the built-in default, else a placeholder.
    pub fn texture_key<'a>(&'a self, role: &str) -> &'a str {
        if let Some(sprite) = self.sprite_for_role(role) {
            return &sprite.id;
        }
        SPRITE_ROLES
            .iter()
            .find(|r| r.role == role)
            .map(|r| r.default_key)
            .unwrap_or("placeholder")
    }

    /// Load the library from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(library) = serde_json::from_str(&json) {
                    return library;
                }
                log::warn!("Corrupt sprite library, starting fresh");
            }
        }
        Self::new()
    }

    /// Save the library to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Failed to save sprite library");
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
    fn test_default_keys() {
        let library = SpriteLibrary::new();
        assert_eq!(library.texture_key("player"), "player-default");
        assert_eq!(library.texture_key("no_such_role"), "placeholder");
    }

    #[test]
    fn test_assignment_overrides_default() {
        let mut library = SpriteLibrary::new();
        let id = library.add_sprite("My Skier", "data:image/png;base64,AAAA", 32, 32);
        library.assign_to_role("player", &id);
        assert_eq!(library.texture_key("player"), id);

        library.unassign_role("player");
        assert_eq!(library.texture_key("player"), "player-default");
    }

    #[test]
    fn test_removal_clears_assignments() {
        let mut library = SpriteLibrary::new();
        let id = library.add_sprite("Rock", "data:,", 32, 32);
        library.assign_to_role("obstacle_rock", &id);
        library.remove_sprite(&id);
        assert_eq!(library.texture_key("obstacle_rock"), "obstacle-rock");
        assert!(library.sprite_for_role("obstacle_rock").is_none());
    }

    #[test]
    fn test_assign_unknown_sprite_ignored() {
        let mut library = SpriteLibrary::new();
        library.assign_to_role("player", "custom-999");
        assert_eq!(library.texture_key("player"), "player-default");
    }
}
