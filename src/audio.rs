//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed.
//! The host drains [`GameEvent`]s every frame and maps them to
//! [`SoundEffect`]s via [`SoundEffect::for_event`].

use crate::sim::state::GameEvent;
use crate::sim::entities::{ExplosionSize, WeaponKind};

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoundEffect {
    /// Standard twin cannons
    WeaponStandard,
    /// Spread fan
    WeaponSpread,
    /// Rapid fire
    WeaponRapid,
    /// Heavy shot
    WeaponHeavy,
    /// Laser beam ignition
    LaserBeam,
    /// Alien weapon discharge
    AlienShot,
    /// Small pop
    ExplosionSmall,
    /// Medium boom
    ExplosionMedium,
    /// Large boom
    ExplosionLarge,
    /// Power-up collected
    PowerUpCollect,
    /// Crystal banked (tier 0-3, higher tiers chime higher)
    CrystalCollect(u8),
    /// Energy shield raised
    ShieldUp,
    /// Energy shield expired
    ShieldDown,
    /// Hull took a hit
    PlayerHit,
    /// Ship destroyed
    LifeLost,
    /// New wave inbound
    WaveStart,
    /// Boss approach klaxon
    BossWarning,
    /// Boss escalated to a new phase
    BossPhase,
    /// Boss shield collapsed
    BossShieldDown,
    /// Boss subsystem destroyed
    ComponentDestroyed,
    /// Boss destroyed - the big one
    MegaExplosion,
    /// Run ended in defeat
    GameOver,
    /// Run ended in victory
    Victory,
    /// New high score
    HighScore,
}

impl SoundEffect {
    /// Map a simulation event to the effect that should play for it.
    /// Returns `None` for events that are purely visual/UI.
    pub fn for_event(event: &GameEvent) -> Option<SoundEffect> {
        match event {
            GameEvent::WeaponFired(kind) => Some(match kind {
                WeaponKind::Standard => SoundEffect::WeaponStandard,
                WeaponKind::Spread => SoundEffect::WeaponSpread,
                WeaponKind::Rapid => SoundEffect::WeaponRapid,
                WeaponKind::Heavy => SoundEffect::WeaponHeavy,
                WeaponKind::Laser => SoundEffect::LaserBeam,
            }),
            GameEvent::AlienFired => Some(SoundEffect::AlienShot),
            GameEvent::Explosion(size) => Some(match size {
                ExplosionSize::Small => SoundEffect::ExplosionSmall,
                ExplosionSize::Medium => SoundEffect::ExplosionMedium,
                ExplosionSize::Large => SoundEffect::ExplosionLarge,
            }),
            GameEvent::PowerUpCollected(_) => Some(SoundEffect::PowerUpCollect),
            GameEvent::CrystalCollected { tier, .. } => {
                Some(SoundEffect::CrystalCollect(*tier))
            }
            GameEvent::ShieldUp => Some(SoundEffect::ShieldUp),
            GameEvent::ShieldDown => Some(SoundEffect::ShieldDown),
            GameEvent::PlayerHit => Some(SoundEffect::PlayerHit),
            GameEvent::LifeLost => Some(SoundEffect::LifeLost),
            GameEvent::WaveStarted { .. } => Some(SoundEffect::WaveStart),
            GameEvent::BossWarning => Some(SoundEffect::BossWarning),
            GameEvent::BossPhase(_) => Some(SoundEffect::BossPhase),
            GameEvent::BossShieldDown => Some(SoundEffect::BossShieldDown),
            GameEvent::BossComponentDestroyed => Some(SoundEffect::ComponentDestroyed),
            GameEvent::BossDefeated => Some(SoundEffect::MegaExplosion),
            GameEvent::GameOver { victory } => Some(if *victory {
                SoundEffect::Victory
            } else {
                SoundEffect::GameOver
            }),
            // Spawn is announced by the warning klaxon; shield restore is visual
            GameEvent::BossSpawned | GameEvent::BossShieldRestored => None,
        }
    }
}

/// Audio manager for the game
pub struct AudioManager {
    #[cfg(target_arch = "wasm32")]
    ctx: Option<AudioContext>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    #[cfg(target_arch = "wasm32")]
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn resume(&self) {}

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    #[cfg(target_arch = "wasm32")]
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Browsers suspend the context until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::WeaponStandard => self.play_weapon_standard(ctx, vol),
            SoundEffect::WeaponSpread => self.play_weapon_spread(ctx, vol),
            SoundEffect::WeaponRapid => self.play_weapon_rapid(ctx, vol),
            SoundEffect::WeaponHeavy => self.play_weapon_heavy(ctx, vol),
            SoundEffect::LaserBeam => self.play_laser_beam(ctx, vol),
            SoundEffect::AlienShot => self.play_alien_shot(ctx, vol),
            SoundEffect::ExplosionSmall => self.play_explosion(ctx, vol * 0.6, 0.25),
            SoundEffect::ExplosionMedium => self.play_explosion(ctx, vol * 0.8, 0.4),
            SoundEffect::ExplosionLarge => self.play_explosion(ctx, vol, 0.6),
            SoundEffect::PowerUpCollect => self.play_power_up(ctx, vol),
            SoundEffect::CrystalCollect(tier) => self.play_crystal(ctx, vol, tier),
            SoundEffect::ShieldUp => self.play_shield_up(ctx, vol),
            SoundEffect::ShieldDown => self.play_shield_down(ctx, vol),
            SoundEffect::PlayerHit => self.play_player_hit(ctx, vol),
            SoundEffect::LifeLost => self.play_life_lost(ctx, vol),
            SoundEffect::WaveStart => self.play_wave_start(ctx, vol),
            SoundEffect::BossWarning => self.play_boss_warning(ctx, vol),
            SoundEffect::BossPhase => self.play_boss_phase(ctx, vol),
            SoundEffect::BossShieldDown => self.play_boss_shield_down(ctx, vol),
            SoundEffect::ComponentDestroyed => self.play_component_destroyed(ctx, vol),
            SoundEffect::MegaExplosion => self.play_mega_explosion(ctx, vol),
            SoundEffect::GameOver => self.play_game_over(ctx, vol),
            SoundEffect::Victory => self.play_victory(ctx, vol),
            SoundEffect::HighScore => self.play_high_score(ctx, vol),
        }
    }

    /// Native no-op
    #[cfg(not(target_arch = "wasm32"))]
    pub fn play(&self, effect: SoundEffect) {
        let _ = (effect, self.effective_volume());
    }
}

// === Sound generators (wasm only) ===

#[cfg(target_arch = "wasm32")]
impl AudioManager {
    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Twin cannons - short pew
    fn play_weapon_standard(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.15, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.08)
            .ok();
        osc.frequency().set_value_at_time(900.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(300.0, t + 0.08)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.1).ok();
    }

    /// Spread fan - wider, slightly detuned double pew
    fn play_weapon_spread(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        for freq in [760.0, 840.0] {
            if let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Square) {
                gain.gain().set_value_at_time(vol * 0.12, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                    .ok();
                osc.frequency().set_value_at_time(freq, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(freq * 0.35, t + 0.1)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.12).ok();
            }
        }
    }

    /// Rapid fire - tight click
    fn play_weapon_rapid(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 1200.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.1, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.04)
            .ok();
        osc.frequency().set_value_at_time(1200.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(600.0, t + 0.04)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.05).ok();
    }

    /// Heavy shot - chunky thunk with a bass tail
    fn play_weapon_heavy(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 400.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.frequency().set_value_at_time(400.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(90.0, t + 0.15)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.18).ok();
        }

        if let Some((osc, gain)) = self.create_osc(ctx, 70.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.25, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }
    }

    /// Laser beam ignition - rising hum
    fn play_laser_beam(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.01, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(vol * 0.2, t + 0.06)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.3)
            .ok();
        osc.frequency().set_value_at_time(200.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(1400.0, t + 0.25)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.35).ok();
    }

    /// Alien shot - descending zap
    fn play_alien_shot(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 500.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.12, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();
        osc.frequency().set_value_at_time(500.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(180.0, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.12).ok();
    }

    /// Explosion - boom scaled by size
    fn play_explosion(&self, ctx: &AudioContext, vol: f32, duration: f64) {
        let Some((osc, gain)) = self.create_osc(ctx, 110.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.5, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + duration)
            .ok();
        osc.frequency().set_value_at_time(110.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(30.0, t + duration)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + duration + 0.1).ok();

        // High frequency crack
        if let Some((osc2, gain2)) = self.create_osc(ctx, 1500.0, OscillatorType::Square) {
            gain2.gain().set_value_at_time(vol * 0.15, t).ok();
            gain2
                .gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok();
            osc2.start().ok();
            osc2.stop_with_when(t + 0.1).ok();
        }
    }

    /// Power-up collect - happy ding
    fn play_power_up(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [600.0, 800.0, 1000.0].iter().enumerate() {
            let delay = i as f64 * 0.08;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.2).ok();
            }
        }
    }

    /// Crystal collect - chime that rises with tier
    fn play_crystal(&self, ctx: &AudioContext, vol: f32, tier: u8) {
        let base = 900.0 + f32::from(tier.min(3)) * 250.0;
        for (i, mult) in [1.0, 1.5].iter().enumerate() {
            let delay = i as f64 * 0.03;
            if let Some((osc, gain)) = self.create_osc(ctx, base * mult, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.18, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.25).ok();
            }
        }
    }

    /// Shield up - rising whoosh
    fn play_shield_up(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.01, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(vol * 0.3, t + 0.1)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.4)
            .ok();
        osc.frequency().set_value_at_time(300.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(900.0, t + 0.3)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.5).ok();
    }

    /// Shield down - the same whoosh, inverted
    fn play_shield_down(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.4)
            .ok();
        osc.frequency().set_value_at_time(900.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(250.0, t + 0.35)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.45).ok();
    }

    /// Hull hit - harsh buzz
    fn play_player_hit(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 180.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.35, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.15)
            .ok();
        osc.frequency().set_value_at_time(180.0, t).ok();
        osc.frequency().set_value_at_time(120.0, t + 0.05).ok();
        osc.frequency().set_value_at_time(90.0, t + 0.1).ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.2).ok();
    }

    /// Ship destroyed - heavy boom plus descending wail
    fn play_life_lost(&self, ctx: &AudioContext, vol: f32) {
        self.play_explosion(ctx, vol, 0.5);

        if let Some((osc, gain)) = self.create_osc(ctx, 500.0, OscillatorType::Triangle) {
            let t = ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.25, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.6)
                .ok();
            osc.frequency().set_value_at_time(500.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(100.0, t + 0.6)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.7).ok();
        }
    }

    /// Wave start - short two-note call
    fn play_wave_start(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [440.0, 660.0].iter().enumerate() {
            let delay = i as f64 * 0.12;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.3).ok();
            }
        }
    }

    /// Boss warning - low klaxon, two pulses
    fn play_boss_warning(&self, ctx: &AudioContext, vol: f32) {
        for i in 0..2 {
            let delay = i as f64 * 0.45;
            if let Some((osc, gain)) = self.create_osc(ctx, 140.0, OscillatorType::Sawtooth) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(0.01, t).ok();
                gain.gain()
                    .linear_ramp_to_value_at_time(vol * 0.35, t + 0.05)
                    .ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.35)
                    .ok();
                osc.frequency().set_value_at_time(140.0, t).ok();
                osc.frequency().set_value_at_time(110.0, t + 0.2).ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.4).ok();
            }
        }
    }

    /// Boss phase change - ominous rising swell
    fn play_boss_phase(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 100.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.01, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(vol * 0.4, t + 0.3)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.7)
            .ok();
        osc.frequency().set_value_at_time(100.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(320.0, t + 0.5)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.8).ok();
    }

    /// Boss shield collapse - glassy shatter
    fn play_boss_shield_down(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 2000.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                .ok();
            osc.frequency().set_value_at_time(2000.0, t).ok();
            osc.frequency().set_value_at_time(3000.0, t + 0.03).ok();
            osc.frequency().set_value_at_time(1500.0, t + 0.06).ok();
            osc.frequency().set_value_at_time(2500.0, t + 0.09).ok();
            osc.frequency().set_value_at_time(1000.0, t + 0.13).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.25).ok();
        }

        if let Some((osc, gain)) = self.create_osc(ctx, 90.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.25).ok();
        }
    }

    /// Subsystem destroyed - metallic crunch
    fn play_component_destroyed(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 350.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                .ok();
            osc.frequency().set_value_at_time(350.0, t).ok();
            osc.frequency().set_value_at_time(250.0, t + 0.06).ok();
            osc.frequency().set_value_at_time(160.0, t + 0.12).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.3).ok();
        }

        if let Some((osc, gain)) = self.create_osc(ctx, 70.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.35, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.25).ok();
        }
    }

    /// Boss destroyed - layered rolling booms
    fn play_mega_explosion(&self, ctx: &AudioContext, vol: f32) {
        for i in 0..4 {
            let delay = i as f64 * 0.15;
            if let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sawtooth) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.45, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.6)
                    .ok();
                osc.frequency().set_value_at_time(120.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(25.0, t + 0.6)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.7).ok();
            }
        }
    }

    /// Game over - sad descending
    fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
            let delay = i as f64 * 0.2;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.4).ok();
            }
        }
    }

    /// Victory - triumphant fanfare
    fn play_victory(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [400.0, 500.0, 600.0, 800.0].iter().enumerate() {
            let delay = i as f64 * 0.12;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.5).ok();
            }
        }
    }

    /// High score - celebratory
    fn play_high_score(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [500.0, 600.0, 700.0, 800.0, 1000.0].iter().enumerate() {
            let delay = i as f64 * 0.08;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.3).ok();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::PowerUpKind;

    #[test]
    fn test_event_mapping_covers_weapons() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::WeaponFired(WeaponKind::Laser)),
            Some(SoundEffect::LaserBeam)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::WeaponFired(WeaponKind::Heavy)),
            Some(SoundEffect::WeaponHeavy)
        );
    }

    #[test]
    fn test_crystal_tier_carried_through() {
        let event = GameEvent::CrystalCollected {
            tier: 2,
            value: 500,
        };
        assert_eq!(
            SoundEffect::for_event(&event),
            Some(SoundEffect::CrystalCollect(2))
        );
    }

    #[test]
    fn test_game_over_splits_on_victory() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::GameOver { victory: true }),
            Some(SoundEffect::Victory)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::GameOver { victory: false }),
            Some(SoundEffect::GameOver)
        );
    }

    #[test]
    fn test_silent_events_map_to_none() {
        assert_eq!(SoundEffect::for_event(&GameEvent::BossSpawned), None);
        assert_eq!(
            SoundEffect::for_event(&GameEvent::BossShieldRestored),
            None
        );
        // Sanity: a pickup is not silent
        assert!(SoundEffect::for_event(&GameEvent::PowerUpCollected(
            PowerUpKind::Shield
        ))
        .is_some());
    }

    #[test]
    fn test_muted_manager_reports_zero_volume() {
        let mut audio = AudioManager::new();
        audio.set_muted(true);
        assert_eq!(audio.effective_volume(), 0.0);
        audio.set_muted(false);
        audio.set_master_volume(0.5);
        audio.set_sfx_volume(0.5);
        assert_eq!(audio.effective_volume(), 0.25);
    }
}
