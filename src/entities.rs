//! Game entity types: data plus constructors, no per-tick logic.

use std::collections::VecDeque;

use crossterm::style::Color;
use serde::{Deserialize, Serialize};

use crate::animation::{AnimTag, Animator, BOSS_CLIPS, ENEMY_CLIPS, PLAYER_CLIPS};
use crate::camera::Camera;
use crate::config::{ArchetypeConfig, BossConfig, PlayerConfig, SkillsConfig, Tuning};
use crate::events::EventQueue;
use crate::geometry::Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Menu,
    Playing,
    Paused,
    GameOver,
    Victory,
    /// Torn down; nothing runs any more.
    Stopped,
}

// ── Shared body ───────────────────────────────────────────────────────────────

/// Kinematic rectangle shared by everything that moves.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub vy: f32,
    /// Recomputed every tick by the platform pass.
    pub is_grounded: bool,
    pub facing_right: bool,
}

impl Body {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            vx: 0.0,
            vy: 0.0,
            is_grounded: false,
            facing_right: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center(&self) -> (f32, f32) {
        self.rect().center()
    }

    /// `1.0` when facing right, `-1.0` otherwise.
    pub fn facing_sign(&self) -> f32 {
        if self.facing_right {
            1.0
        } else {
            -1.0
        }
    }
}

/// Anything with an on-screen bounding box.
pub trait Positioned {
    fn bounds(&self) -> Rect;
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkillKind {
    EnergyBlast,
    Shield,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SkillEffect {
    /// Fires a projectile along the caster's facing.
    Projectile {
        damage: f32,
        speed: f32,
        width: f32,
        height: f32,
    },
    /// Stays active until the absolute `ends_at` timestamp.
    Timed {
        duration_ms: u64,
        active: bool,
        ends_at: u64,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Skill {
    pub kind: SkillKind,
    pub energy_cost: f32,
    pub cooldown_ms: u64,
    /// `None` until first use, so a fresh skill is never on cooldown.
    pub last_used: Option<u64>,
    pub effect: SkillEffect,
}

impl Skill {
    pub fn is_active(&self) -> bool {
        matches!(self.effect, SkillEffect::Timed { active: true, .. })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub body: Body,
    pub speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub energy: f32,
    pub max_energy: f32,
    pub is_alive: bool,
    pub attack_power: f32,
    pub is_attacking: bool,
    /// Milliseconds until the next melee swing is allowed.
    pub attack_cooldown: f32,
    pub combo_count: u32,
    /// Milliseconds left in the combo window.
    pub combo_timer: f32,
    pub last_jump: Option<u64>,
    pub skills: Vec<Skill>,
    pub animation: Animator,
}

impl Player {
    pub fn new(cfg: &PlayerConfig, skills: &SkillsConfig) -> Self {
        let blast = skills.energy_blast;
        let shield = skills.shield;
        Self {
            body: Body::new(cfg.spawn_x, cfg.spawn_y, cfg.width, cfg.height),
            speed: cfg.speed,
            health: cfg.max_health,
            max_health: cfg.max_health,
            energy: cfg.max_energy,
            max_energy: cfg.max_energy,
            is_alive: true,
            attack_power: cfg.attack_power,
            is_attacking: false,
            attack_cooldown: 0.0,
            combo_count: 0,
            combo_timer: 0.0,
            last_jump: None,
            skills: vec![
                Skill {
                    kind: SkillKind::EnergyBlast,
                    energy_cost: blast.energy_cost,
                    cooldown_ms: blast.cooldown_ms,
                    last_used: None,
                    effect: SkillEffect::Projectile {
                        damage: blast.damage,
                        speed: blast.speed,
                        width: blast.width,
                        height: blast.height,
                    },
                },
                Skill {
                    kind: SkillKind::Shield,
                    energy_cost: shield.energy_cost,
                    cooldown_ms: shield.cooldown_ms,
                    last_used: None,
                    effect: SkillEffect::Timed {
                        duration_ms: shield.duration_ms,
                        active: false,
                        ends_at: 0,
                    },
                },
            ],
            animation: Animator::new(PLAYER_CLIPS),
        }
    }

    pub fn skill(&self, kind: SkillKind) -> Option<&Skill> {
        self.skills.iter().find(|s| s.kind == kind)
    }

    pub fn skill_mut(&mut self, kind: SkillKind) -> Option<&mut Skill> {
        self.skills.iter_mut().find(|s| s.kind == kind)
    }

    pub fn shield_active(&self) -> bool {
        self.skill(SkillKind::Shield).is_some_and(Skill::is_active)
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Slime,
    Skeleton,
    Orc,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Slime, EnemyKind::Skeleton, EnemyKind::Orc];
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub body: Body,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    pub attack_power: f32,
    pub attack_cooldown_ms: u64,
    pub detection_range: f32,
    pub attack_range: f32,
    pub hitbox_width: f32,
    pub bounce_height: f32,
    pub last_attack: Option<u64>,
    pub is_alive: bool,
    /// Spawned by the boss rather than placed by the level.
    pub is_minion: bool,
    pub animation: Animator,
}

impl Enemy {
    pub fn new(kind: EnemyKind, x: f32, y: f32, arch: &ArchetypeConfig) -> Self {
        let mut body = Body::new(x, y, arch.width, arch.height);
        body.facing_right = false;
        Self {
            kind,
            body,
            health: arch.max_health,
            max_health: arch.max_health,
            speed: arch.speed,
            attack_power: arch.attack_power,
            attack_cooldown_ms: arch.attack_cooldown_ms,
            detection_range: arch.detection_range,
            attack_range: arch.attack_range,
            hitbox_width: arch.hitbox_width,
            bounce_height: arch.bounce_height,
            last_attack: None,
            is_alive: true,
            is_minion: false,
            animation: Animator::new(ENEMY_CLIPS),
        }
    }
}

// ── Boss ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossPhase {
    One,
    Two,
}

/// Milliseconds until each special attack is ready again.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BossCooldowns {
    pub charge: f32,
    pub fireball: f32,
    pub summon: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Boss {
    pub body: Body,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    pub attack_power: f32,
    pub phase: BossPhase,
    pub last_attack: Option<u64>,
    pub cooldowns: BossCooldowns,
    pub is_charging: bool,
    pub is_alive: bool,
    pub animation: Animator,
}

impl Boss {
    pub fn new(x: f32, y: f32, cfg: &BossConfig) -> Self {
        let mut body = Body::new(x, y, cfg.width, cfg.height);
        body.facing_right = false;
        Self {
            body,
            health: cfg.max_health,
            max_health: cfg.max_health,
            speed: cfg.speed,
            attack_power: cfg.attack_power,
            phase: BossPhase::One,
            last_attack: None,
            cooldowns: BossCooldowns::default(),
            is_charging: false,
            is_alive: true,
            animation: Animator::new(BOSS_CLIPS),
        }
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Owner {
    Player,
    Boss,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileKind {
    EnergyBlast,
    /// Arcs under gravity.
    Fireball,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub owner: Owner,
    pub body: Body,
    pub damage: f32,
    /// Most recent positions, oldest first.
    pub trail: VecDeque<(f32, f32)>,
    pub age: u32,
    pub active: bool,
}

impl Projectile {
    pub fn new(kind: ProjectileKind, owner: Owner, body: Body, damage: f32) -> Self {
        Self {
            kind,
            owner,
            body,
            damage,
            trail: VecDeque::new(),
            age: 0,
            active: true,
        }
    }
}

// ── Collectibles ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    Health,
    Energy,
    Coin,
    /// Permanently raises attack power.
    PowerUp,
}

impl CollectibleKind {
    pub fn value(self) -> f32 {
        match self {
            CollectibleKind::Health => 25.0,
            CollectibleKind::Energy => 30.0,
            CollectibleKind::Coin => 100.0,
            CollectibleKind::PowerUp => 1.0,
        }
    }
}

pub const COLLECTIBLE_SIZE: f32 = 20.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Collectible {
    pub kind: CollectibleKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub value: f32,
    /// Phase of the vertical bob, in radians.
    pub bob_phase: f32,
    pub collected: bool,
}

impl Collectible {
    pub fn new(kind: CollectibleKind, x: f32, y: f32, bob_phase: f32) -> Self {
        Self {
            kind,
            x,
            y,
            width: COLLECTIBLE_SIZE,
            height: COLLECTIBLE_SIZE,
            value: kind.value(),
            bob_phase,
            collected: false,
        }
    }
}

// ── Platforms ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Ground,
    Ledge,
}

/// Static level geometry; never mutated after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
}

// ── Particles ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleShape {
    Circle,
    Square,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub color: Color,
    pub shape: ParticleShape,
    /// Remaining life in milliseconds.
    pub life: f32,
    pub max_life: f32,
    pub has_gravity: bool,
}

impl Particle {
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

// ── Positioned impls ─────────────────────────────────────────────────────────

impl Positioned for Player {
    fn bounds(&self) -> Rect {
        self.body.rect()
    }
}

impl Positioned for Enemy {
    fn bounds(&self) -> Rect {
        self.body.rect()
    }
}

impl Positioned for Boss {
    fn bounds(&self) -> Rect {
        self.body.rect()
    }
}

impl Positioned for Projectile {
    fn bounds(&self) -> Rect {
        self.body.rect()
    }
}

impl Positioned for Collectible {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

impl Positioned for Platform {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

impl Positioned for Particle {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }
}

// ── Tagged view ───────────────────────────────────────────────────────────────

/// Borrowed view of any entity, for code that walks the whole world.
#[derive(Clone, Copy, Debug)]
pub enum EntityRef<'a> {
    Player(&'a Player),
    Enemy(&'a Enemy),
    Boss(&'a Boss),
    Projectile(&'a Projectile),
    Collectible(&'a Collectible),
    Platform(&'a Platform),
    Particle(&'a Particle),
}

impl Positioned for EntityRef<'_> {
    fn bounds(&self) -> Rect {
        match self {
            EntityRef::Player(p) => p.bounds(),
            EntityRef::Enemy(e) => e.bounds(),
            EntityRef::Boss(b) => b.bounds(),
            EntityRef::Projectile(p) => p.bounds(),
            EntityRef::Collectible(c) => c.bounds(),
            EntityRef::Platform(p) => p.bounds(),
            EntityRef::Particle(p) => p.bounds(),
        }
    }
}

impl EntityRef<'_> {
    /// Current animation tag, for the entities that animate.
    pub fn animation(&self) -> Option<AnimTag> {
        match self {
            EntityRef::Player(p) => Some(p.animation.current()),
            EntityRef::Enemy(e) => Some(e.animation.current()),
            EntityRef::Boss(b) => Some(b.animation.current()),
            EntityRef::Projectile(_)
            | EntityRef::Collectible(_)
            | EntityRef::Platform(_)
            | EntityRef::Particle(_) => None,
        }
    }
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The whole entity graph of one running level.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub projectiles: Vec<Projectile>,
    pub particles: Vec<Particle>,
    pub collectibles: Vec<Collectible>,
    pub platforms: Vec<Platform>,
    pub camera: Camera,
    /// Delayed effects keyed by absolute time.
    pub events: EventQueue,
    pub tuning: Tuning,
    pub score: u32,
    pub high_score: u32,
    pub lives: u32,
    pub level: u32,
    pub status: GameStatus,
    pub frame: u64,
}

impl GameState {
    /// Every entity in world draw order: platforms, collectibles, player,
    /// enemies, boss, projectiles, particles.  Dead entities are skipped.
    pub fn entities(&self) -> impl Iterator<Item = EntityRef<'_>> {
        let player = self.player.is_alive.then_some(EntityRef::Player(&self.player));
        let boss = self
            .boss
            .as_ref()
            .filter(|b| b.is_alive)
            .map(EntityRef::Boss);

        self.platforms
            .iter()
            .map(EntityRef::Platform)
            .chain(
                self.collectibles
                    .iter()
                    .filter(|c| !c.collected)
                    .map(EntityRef::Collectible),
            )
            .chain(player)
            .chain(self.enemies.iter().filter(|e| e.is_alive).map(EntityRef::Enemy))
            .chain(boss)
            .chain(
                self.projectiles
                    .iter()
                    .filter(|p| p.active)
                    .map(EntityRef::Projectile),
            )
            .chain(self.particles.iter().map(EntityRef::Particle))
    }

    pub fn boss_alive(&self) -> bool {
        self.boss.as_ref().is_some_and(|b| b.is_alive)
    }
}
