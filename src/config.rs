//! Gameplay tuning, loadable from RON.
//!
//! Every section is `#[serde(default)]`, so a tuning file only needs the
//! values it overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::entities::EnemyKind;
use crate::error::KnightError;
use crate::level::LevelData;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
    pub frame_rate: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            frame_rate: 60.0,
        }
    }
}

impl CanvasConfig {
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.frame_rate as f64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    /// Multiplier applied to `vx` every tick, grounded or not.
    pub friction: f32,
    pub terminal_velocity: f32,
    /// Anything whose top edge drops below this line has fallen out.
    pub world_bottom: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.8,
            friction: 0.85,
            terminal_velocity: 20.0,
            world_bottom: 600.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub acceleration: f32,
    pub max_health: f32,
    pub max_energy: f32,
    pub energy_regen: f32,
    pub attack_power: f32,
    pub attack_cooldown_ms: f32,
    pub combo_window_ms: f32,
    pub combo_bonus: f32,
    pub hitbox_width: f32,
    pub jump_strength: f32,
    pub jump_cooldown_ms: u64,
    pub lives: u32,
    pub respawn_delay_ms: u64,
    pub knockback_x: f32,
    pub knockback_y: f32,
    pub hit_shake: f32,
    pub powerup_attack_bonus: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn_x: 100.0,
            spawn_y: 400.0,
            width: 32.0,
            height: 48.0,
            speed: 8.0,
            acceleration: 1.0,
            max_health: 100.0,
            max_energy: 100.0,
            energy_regen: 0.1,
            attack_power: 25.0,
            attack_cooldown_ms: 400.0,
            combo_window_ms: 1000.0,
            combo_bonus: 5.0,
            hitbox_width: 40.0,
            jump_strength: 15.0,
            jump_cooldown_ms: 300,
            lives: 3,
            respawn_delay_ms: 2000,
            knockback_x: 5.0,
            knockback_y: 3.0,
            hit_shake: 10.0,
            powerup_attack_bonus: 5.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlastConfig {
    pub energy_cost: f32,
    pub cooldown_ms: u64,
    pub damage: f32,
    pub speed: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for BlastConfig {
    fn default() -> Self {
        Self {
            energy_cost: 30.0,
            cooldown_ms: 2000,
            damage: 40.0,
            speed: 12.0,
            width: 20.0,
            height: 8.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldConfig {
    pub energy_cost: f32,
    pub cooldown_ms: u64,
    pub duration_ms: u64,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            energy_cost: 20.0,
            cooldown_ms: 5000,
            duration_ms: 3000,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    pub energy_blast: BlastConfig,
    pub shield: ShieldConfig,
}

/// Fixed base stats of one enemy archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeConfig {
    pub max_health: f32,
    pub speed: f32,
    pub attack_power: f32,
    pub attack_cooldown_ms: u64,
    pub width: f32,
    pub height: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    pub hitbox_width: f32,
    /// Hop impulse while idling; only slimes use it.
    pub bounce_height: f32,
}

impl ArchetypeConfig {
    const fn base(max_health: f32, speed: f32, attack_power: f32, attack_cooldown_ms: u64) -> Self {
        Self {
            max_health,
            speed,
            attack_power,
            attack_cooldown_ms,
            width: 30.0,
            height: 40.0,
            detection_range: 150.0,
            attack_range: 80.0,
            hitbox_width: 30.0,
            bounce_height: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub slime: ArchetypeConfig,
    pub skeleton: ArchetypeConfig,
    pub orc: ArchetypeConfig,
    pub vertical_band: f32,
    pub standoff: f32,
    pub chase_acceleration: f32,
    pub drift_acceleration: f32,
    pub hop_chance: f64,
    pub turn_chance: f64,
    pub drop_chance: f64,
    pub kill_score: u32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            slime: ArchetypeConfig {
                bounce_height: 8.0,
                ..ArchetypeConfig::base(30.0, 1.5, 10.0, 1500)
            },
            skeleton: ArchetypeConfig::base(50.0, 2.5, 15.0, 1200),
            orc: ArchetypeConfig {
                width: 40.0,
                height: 50.0,
                ..ArchetypeConfig::base(80.0, 1.8, 20.0, 2000)
            },
            vertical_band: 100.0,
            standoff: 50.0,
            chase_acceleration: 0.5,
            drift_acceleration: 0.2,
            hop_chance: 0.01,
            turn_chance: 0.005,
            drop_chance: 0.3,
            kill_score: 50,
        }
    }
}

impl EnemyConfig {
    pub fn archetype(&self, kind: EnemyKind) -> &ArchetypeConfig {
        match kind {
            EnemyKind::Slime => &self.slime,
            EnemyKind::Skeleton => &self.skeleton,
            EnemyKind::Orc => &self.orc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    pub width: f32,
    pub height: f32,
    pub max_health: f32,
    pub speed: f32,
    pub attack_power: f32,
    /// Fraction of max health at or below which phase two begins.
    pub phase_threshold: f32,
    pub phase_speed_multiplier: f32,
    pub phase_power_multiplier: f32,
    pub attack_gap_ms: u64,
    pub melee_range: f32,
    pub melee_hitbox_width: f32,
    pub charge_range: f32,
    pub charge_cooldown_ms: f32,
    pub charge_duration_ms: u64,
    pub charge_speed_factor: f32,
    pub charge_release_factor: f32,
    pub fireball_cooldown_ms: f32,
    pub fireball_speed: f32,
    pub fireball_lift: f32,
    pub fireball_size: f32,
    pub fireball_damage_factor: f32,
    pub summon_cooldown_ms: f32,
    pub summon_cap: usize,
    pub approach_acceleration: f32,
    pub hit_score: u32,
    pub kill_score: u32,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            width: 80.0,
            height: 100.0,
            max_health: 300.0,
            speed: 3.0,
            attack_power: 35.0,
            phase_threshold: 0.5,
            phase_speed_multiplier: 1.2,
            phase_power_multiplier: 1.15,
            attack_gap_ms: 2000,
            melee_range: 100.0,
            melee_hitbox_width: 60.0,
            charge_range: 200.0,
            charge_cooldown_ms: 5000.0,
            charge_duration_ms: 800,
            charge_speed_factor: 2.0,
            charge_release_factor: 0.1,
            fireball_cooldown_ms: 3000.0,
            fireball_speed: 8.0,
            fireball_lift: 2.0,
            fireball_size: 25.0,
            fireball_damage_factor: 1.5,
            summon_cooldown_ms: 8000.0,
            summon_cap: 3,
            approach_acceleration: 0.8,
            hit_score: 10,
            kill_score: 1000,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub trail_length: usize,
    /// Distance past the visible edge before a projectile is dropped.
    pub offscreen_margin: f32,
    pub max_age_ticks: u32,
    pub fireball_gravity: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            trail_length: 8,
            offscreen_margin: 50.0,
            max_age_ticks: 600,
            fireball_gravity: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub follow_lerp: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub shake_decay: f32,
    pub shake_epsilon: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            follow_lerp: 0.1,
            min_y: -100.0,
            max_y: 0.0,
            shake_decay: 0.9,
            shake_epsilon: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub gravity: f32,
    pub drag: f32,
    pub max_live: usize,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            gravity: 0.2,
            drag: 0.98,
            max_live: 800,
        }
    }
}

/// Everything the simulation reads that is not level geometry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub canvas: CanvasConfig,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub skills: SkillsConfig,
    pub enemies: EnemyConfig,
    pub boss: BossConfig,
    pub projectiles: ProjectileConfig,
    pub camera: CameraConfig,
    pub particles: ParticleConfig,
    pub level: LevelData,
}

impl Tuning {
    pub fn from_ron_str(source: &str, origin: &str) -> Result<Self, KnightError> {
        ron::from_str(source).map_err(|e| KnightError::ParseError {
            path: origin.to_string(),
            details: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, KnightError> {
        let origin = path.display().to_string();
        let source = fs::read_to_string(path).map_err(|e| KnightError::ReadError {
            path: origin.clone(),
            details: e.to_string(),
        })?;
        let tuning = Self::from_ron_str(&source, &origin)?;
        info!(path = %origin, "Loaded tuning");
        Ok(tuning)
    }

    /// `KNIGHT_CONFIG` if set, else `assets/tuning.ron` if present, else defaults.
    pub fn discover() -> Result<Self, KnightError> {
        if let Ok(path) = std::env::var("KNIGHT_CONFIG") {
            return Self::load(Path::new(&path));
        }
        let bundled = Path::new("assets/tuning.ron");
        if bundled.exists() {
            return Self::load(bundled);
        }
        info!("No tuning file found, using defaults");
        Ok(Self::default())
    }
}
