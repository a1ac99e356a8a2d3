//! Level layout data and construction of the initial entity set.

use std::f32::consts::TAU;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Tuning;
use crate::entities::{
    Boss, Collectible, CollectibleKind, Enemy, EnemyKind, Platform, PlatformKind,
};
use crate::error::KnightError;
use crate::geometry::Rect;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpec {
    pub rect: Rect,
    pub kind: PlatformKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub x: f32,
    pub y: f32,
    /// `None` rolls a random archetype at construction.
    #[serde(default)]
    pub kind: Option<EnemyKind>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectibleSpawn {
    pub x: f32,
    pub y: f32,
    pub kind: CollectibleKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossSpawn {
    pub x: f32,
    pub y: f32,
}

/// A level section in a tuning file replaces the whole stock layout:
/// lists it leaves out are empty, not stock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    #[serde(default)]
    pub platforms: Vec<PlatformSpec>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
    #[serde(default)]
    pub collectibles: Vec<CollectibleSpawn>,
    #[serde(default)]
    pub boss: Option<BossSpawn>,
    /// The boss only appears from this level number on.
    #[serde(default = "default_boss_from_level")]
    pub boss_from_level: u32,
}

fn default_boss_from_level() -> u32 {
    3
}

impl Default for LevelData {
    fn default() -> Self {
        let platform = |x, y, w, h, kind| PlatformSpec {
            rect: Rect::new(x, y, w, h),
            kind,
        };
        let enemy = |x, y| EnemySpawn { x, y, kind: None };
        let item = |x, y, kind| CollectibleSpawn { x, y, kind };

        Self {
            platforms: vec![
                platform(0.0, 550.0, 1200.0, 50.0, PlatformKind::Ground),
                platform(300.0, 450.0, 150.0, 20.0, PlatformKind::Ledge),
                platform(600.0, 350.0, 120.0, 20.0, PlatformKind::Ledge),
                platform(850.0, 250.0, 150.0, 20.0, PlatformKind::Ledge),
                platform(1100.0, 400.0, 200.0, 20.0, PlatformKind::Ledge),
                platform(1400.0, 500.0, 300.0, 50.0, PlatformKind::Ground),
            ],
            enemies: vec![
                enemy(400.0, 400.0),
                enemy(700.0, 300.0),
                enemy(950.0, 200.0),
                enemy(1200.0, 450.0),
                enemy(1500.0, 450.0),
            ],
            collectibles: vec![
                item(350.0, 420.0, CollectibleKind::Health),
                item(650.0, 320.0, CollectibleKind::Energy),
                item(900.0, 220.0, CollectibleKind::Coin),
                item(1150.0, 370.0, CollectibleKind::Coin),
                item(1450.0, 470.0, CollectibleKind::PowerUp),
            ],
            boss: Some(BossSpawn { x: 1600.0, y: 400.0 }),
            boss_from_level: default_boss_from_level(),
        }
    }
}

impl LevelData {
    pub fn validate(&self) -> Result<(), KnightError> {
        if self.platforms.is_empty() {
            return Err(KnightError::InvalidLevel("level has no platforms".into()));
        }
        for (i, p) in self.platforms.iter().enumerate() {
            if !p.rect.is_valid() {
                return Err(KnightError::InvalidLevel(format!(
                    "platform {i} has a degenerate rectangle {:?}",
                    p.rect
                )));
            }
        }
        for (i, e) in self.enemies.iter().enumerate() {
            if !(e.x.is_finite() && e.y.is_finite()) {
                return Err(KnightError::InvalidLevel(format!(
                    "enemy spawn {i} is not finite"
                )));
            }
        }
        for (i, c) in self.collectibles.iter().enumerate() {
            if !(c.x.is_finite() && c.y.is_finite()) {
                return Err(KnightError::InvalidLevel(format!(
                    "collectible spawn {i} is not finite"
                )));
            }
        }
        if let Some(b) = &self.boss {
            if !(b.x.is_finite() && b.y.is_finite()) {
                return Err(KnightError::InvalidLevel("boss spawn is not finite".into()));
            }
        }
        Ok(())
    }
}

/// Entities created once at level construction.
#[derive(Clone, Debug)]
pub struct BuiltLevel {
    pub platforms: Vec<Platform>,
    pub enemies: Vec<Enemy>,
    pub collectibles: Vec<Collectible>,
    pub boss: Option<Boss>,
}

pub fn build(level: u32, tuning: &Tuning, rng: &mut impl Rng) -> Result<BuiltLevel, KnightError> {
    let data = &tuning.level;
    data.validate()?;

    let platforms = data
        .platforms
        .iter()
        .map(|p| Platform { rect: p.rect, kind: p.kind })
        .collect();

    let enemies = data
        .enemies
        .iter()
        .map(|spawn| {
            let kind = match spawn.kind {
                Some(kind) => kind,
                None => *EnemyKind::ALL.choose(rng).unwrap_or(&EnemyKind::Slime),
            };
            Enemy::new(kind, spawn.x, spawn.y, tuning.enemies.archetype(kind))
        })
        .collect::<Vec<_>>();

    let collectibles = data
        .collectibles
        .iter()
        .map(|c| Collectible::new(c.kind, c.x, c.y, rng.gen::<f32>() * TAU))
        .collect();

    let boss = match &data.boss {
        Some(spawn) if level >= data.boss_from_level => {
            Some(Boss::new(spawn.x, spawn.y, &tuning.boss))
        }
        _ => None,
    };

    debug!(
        level,
        enemies = enemies.len(),
        boss = boss.is_some(),
        "Built level"
    );

    Ok(BuiltLevel {
        platforms,
        enemies,
        collectibles,
        boss,
    })
}
