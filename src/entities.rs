/// All game entity types: data plus the small accessors that keep it
/// consistent. Behaviour lives in `compute`, `collision` and `abilities`.

use std::collections::BTreeMap;

use crate::abilities::Ability;
use crate::constants::{player, score};
use crate::geometry::{Rect, Vec2};

pub type EntityId = u64;

// ── Categories ────────────────────────────────────────────────────────────────

/// Timed or piercing effects that destroy what they touch and survive it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AreaKind {
    Shield,
    /// Front and rear walls share one category so the pair is single-slot.
    Barrier,
    GravityWell,
    ScreenGravity,
    GoldenAura,
    DeathBall,
}

/// Registry key. Every live entity belongs to exactly one category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Enemy,
    Bomb,
    Beam,
    Explosion,
    Area(AreaKind),
}

// ── Enemy ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyState {
    Descending,
    /// Parked on its stop line, dropping bombs.
    Holding,
}

/// Per-instance enemy behaviour, rolled once at spawn.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyBrain {
    pub stop_line: f32,
    pub interval: u64,
    pub state: EnemyState,
    pub sprite: u8,
}

// ── Generic entity ────────────────────────────────────────────────────────────

/// How an area effect decides where it is each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    /// Stays where it was cast.
    Fixed,
    /// Re-centred on the player plus a fixed offset every tick.
    Player { offset: Vec2 },
    /// Moves on its own velocity until it leaves the field.
    Travel,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    Enemy(EnemyBrain),
    Bomb { radius: f32, color: usize },
    Beam,
    Explosion,
    Area { kind: AreaKind, anchor: Anchor },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    /// Assigned by the registry on spawn.
    pub id: EntityId,
    pub rect: Rect,
    /// Displacement per tick (direction × speed).
    pub velocity: Vec2,
    /// Remaining ticks; the entity dies once this goes negative.
    pub life: Option<i32>,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(rect: Rect, kind: EntityKind) -> Self {
        Self {
            id: 0,
            rect,
            velocity: Vec2::ZERO,
            life: None,
            kind,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_life(mut self, life: i32) -> Self {
        self.life = Some(life);
        self
    }

    pub fn category(&self) -> Category {
        match &self.kind {
            EntityKind::Enemy(_) => Category::Enemy,
            EntityKind::Bomb { .. } => Category::Bomb,
            EntityKind::Beam => Category::Beam,
            EntityKind::Explosion => Category::Explosion,
            EntityKind::Area { kind, .. } => Category::Area(*kind),
        }
    }

    /// True once the life counter has gone negative.
    pub fn expired(&self) -> bool {
        matches!(self.life, Some(life) if life < 0)
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Every live entity, grouped by category in spawn order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Registry {
    collections: BTreeMap<Category, Vec<Entity>>,
    next_id: EntityId,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entity` under its category and return its fresh id.
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        self.next_id += 1;
        entity.id = self.next_id;
        self.collections
            .entry(entity.category())
            .or_default()
            .push(entity);
        self.next_id
    }

    pub fn of(&self, category: Category) -> &[Entity] {
        self.collections
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn of_mut(&mut self, category: Category) -> &mut Vec<Entity> {
        self.collections.entry(category).or_default()
    }

    pub fn len(&self, category: Category) -> usize {
        self.of(category).len()
    }

    pub fn is_empty(&self, category: Category) -> bool {
        self.of(category).is_empty()
    }

    /// Number of live entities across all categories.
    pub fn total(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Entity])> {
        self.collections
            .iter()
            .map(|(category, list)| (*category, list.as_slice()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Category, &mut Vec<Entity>)> {
        self.collections
            .iter_mut()
            .map(|(category, list)| (*category, list))
    }

    /// Drop the listed ids from one category, keeping the order of the rest.
    pub fn remove_ids(&mut self, category: Category, ids: &[EntityId]) {
        if ids.is_empty() {
            return;
        }
        if let Some(list) = self.collections.get_mut(&category) {
            list.retain(|e| !ids.contains(&e.id));
        }
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

/// One of the eight compass directions, as a sum of unit key deltas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Facing {
    pub dx: i8,
    pub dy: i8,
}

impl Facing {
    pub const RIGHT: Facing = Facing { dx: 1, dy: 0 };

    /// `None` for the zero sum, which never changes the facing.
    pub fn from_sum(dx: i8, dy: i8) -> Option<Facing> {
        if dx == 0 && dy == 0 {
            None
        } else {
            Some(Facing {
                dx: dx.signum(),
                dy: dy.signum(),
            })
        }
    }

    /// Normalised direction; diagonals have length 1 like the others.
    pub fn unit(&self) -> Vec2 {
        Vec2::new(self.dx as f32, self.dy as f32).normalize()
    }
}

impl Default for Facing {
    fn default() -> Self {
        Facing::RIGHT
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Normal,
    /// Invulnerable to bombs until `life` goes negative.
    Hyper { life: i32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub rect: Rect,
    pub facing: Facing,
    pub speed: f32,
    pub state: PlayerState,
}

impl Player {
    pub fn at(center: Vec2) -> Self {
        Self {
            rect: Rect::new(center, Vec2::new(player::WIDTH, player::HEIGHT)),
            facing: Facing::RIGHT,
            speed: player::SPEED,
            state: PlayerState::Normal,
        }
    }

    pub fn is_hyper(&self) -> bool {
        matches!(self.state, PlayerState::Hyper { .. })
    }
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// Keys whose effect lasts as long as they are held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub boost: bool,
}

/// Edge-triggered commands: one per key-down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Fire,
    Activate(Ability),
}

/// Everything the driver sampled for one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub held: HeldKeys,
    pub commands: Vec<Command>,
}

// ── Score ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scoreboard {
    pub score: i64,
    pub enemy_kills: u32,
    pub bomb_kills: u32,
}

impl Scoreboard {
    pub fn credit_enemy(&mut self) {
        self.score += score::ENEMY_KILL;
        self.enemy_kills += 1;
    }

    pub fn credit_bomb(&mut self) {
        self.score += score::BOMB_KILL;
        self.bomb_kills += 1;
    }

    pub fn level(&self) -> u32 {
        1 + self.enemy_kills / score::KILLS_PER_LEVEL
    }
}

// ── Master game state ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    /// Terminal: the player touched a bomb outside hyper mode.
    Defeated { final_score: i64 },
}

/// Notable things that happened during the last tick.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    EnemySpawned { at: Vec2 },
    BombDropped { at: Vec2 },
    EnemyDestroyed { at: Vec2 },
    BombDestroyed { at: Vec2 },
    AbilityActivated(Ability),
    PlayerDefeated { final_score: i64 },
}

/// The entire game state. Cloneable so the update functions can return a
/// new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    pub registry: Registry,
    pub scoreboard: Scoreboard,
    pub status: GameStatus,
    pub frame: u64,
    /// Cleared at the start of every tick.
    pub events: Vec<GameEvent>,
}
