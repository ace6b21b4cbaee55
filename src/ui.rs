//! HUD and overlay updates
//!
//! The canvas renderer owns the playfield; everything around it (score,
//! health bar, wave banner, boss health, overlays) lives in the DOM and
//! is pushed here once per frame. Missing elements degrade to a no-op
//! with a single warning so a stripped-down page still runs.

use crate::consts::SHIP_MAX_HEALTH;
use crate::sim::waves::{WaveDirector, WAVES};
use crate::sim::GameState;

/// Label shown in the wave slot of the HUD
pub fn wave_label(state: &GameState) -> String {
    match state.director {
        WaveDirector::Paused { next_index, .. } => {
            if next_index < WAVES.len() {
                format!("Wave {} incoming", next_index + 1)
            } else {
                "Sector cleared".to_string()
            }
        }
        WaveDirector::Active { index, .. } => WAVES[index].name.to_string(),
        WaveDirector::AwaitingBoss => "Dreadnought approaching".to_string(),
        WaveDirector::BossPhase => "Dreadnought".to_string(),
    }
}

/// Hull integrity as a 0-100 percentage for the health bar
pub fn health_percent(state: &GameState) -> f32 {
    (state.ship.health / SHIP_MAX_HEALTH * 100.0).clamp(0.0, 100.0)
}

/// Boss hull as a 0-100 percentage, `None` when no boss is on the field
pub fn boss_health_percent(state: &GameState) -> Option<f32> {
    state
        .boss
        .as_ref()
        .filter(|b| !b.defeated)
        .map(|b| (b.health / b.max_health * 100.0).clamp(0.0, 100.0))
}

/// HUD pusher. Caches nothing but the warn-once flag; element lookups
/// are cheap enough per frame.
pub struct Hud {
    #[cfg(target_arch = "wasm32")]
    warned_missing: bool,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl Hud {
    pub fn new() -> Self {
        Self {
            warned_missing: false,
        }
    }

    /// Push the per-frame readouts into the DOM
    pub fn update(&mut self, state: &GameState, fps: u32) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        self.set_text(&document, "hud-score", &state.score.to_string());
        self.set_text(&document, "hud-lives", &state.lives.to_string());
        self.set_text(&document, "hud-gems", &state.gems.to_string());
        self.set_text(&document, "hud-weapon", state.ship.weapon.name());
        self.set_text(&document, "hud-wave", &wave_label(state));
        self.set_text(&document, "hud-fps", &fps.to_string());

        if let Some(bar) = document.get_element_by_id("health-bar") {
            let _ = bar
                .set_attribute("style", &format!("width: {:.0}%", health_percent(state)));
        }

        // Boss bar appears only while the boss is alive
        if let Some(wrap) = document.get_element_by_id("boss-health") {
            match boss_health_percent(state) {
                Some(pct) => {
                    let _ = wrap.set_attribute("class", "boss-health");
                    if let Some(bar) = document.get_element_by_id("boss-health-bar") {
                        let _ = bar.set_attribute("style", &format!("width: {pct:.0}%"));
                    }
                }
                None => {
                    let _ = wrap.set_attribute("class", "boss-health hidden");
                }
            }
        }

        self.set_overlay(&document, "pause-overlay", state.paused && !state.game_over);
        self.set_overlay(&document, "game-over", state.game_over && !state.victory);
        self.set_overlay(&document, "victory", state.game_over && state.victory);

        if state.game_over {
            self.set_text(&document, "final-score", &state.score.to_string());
            self.set_text(&document, "final-gems", &state.gems.to_string());
        }
    }

    /// Flash a banner message (wave names, boss warning). CSS handles
    /// the fade; we just swap the text and re-arm the animation class.
    pub fn show_banner(&mut self, document: &web_sys::Document, text: &str) {
        if let Some(el) = document.get_element_by_id("banner") {
            el.set_text_content(Some(text));
            let _ = el.set_attribute("class", "banner hidden");
            // Force a reflow so re-adding the class restarts the animation
            let _ = el.client_height();
            let _ = el.set_attribute("class", "banner show");
        }
    }

    fn set_text(&mut self, document: &web_sys::Document, id: &str, text: &str) {
        match document.get_element_by_id(id) {
            Some(el) => el.set_text_content(Some(text)),
            None => {
                if !self.warned_missing {
                    log::warn!("HUD element #{id} not found, HUD updates degraded");
                    self.warned_missing = true;
                }
            }
        }
    }

    fn set_overlay(&self, document: &web_sys::Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "overlay" } else { "overlay hidden" });
        }
    }
}

/// Native stub
#[cfg(not(target_arch = "wasm32"))]
impl Hud {
    pub fn new() -> Self {
        Self {}
    }

    pub fn update(&mut self, _state: &GameState, _fps: u32) {}
}
