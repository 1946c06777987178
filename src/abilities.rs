//! Score-gated special abilities.
//!
//! Each ability is described by two small tables: [`Ability`] carries the
//! cost and the single-slot rule, [`area_spec`] carries the shape, anchoring,
//! tint and duration of the effect entity it spawns. Activation checks the
//! slot, then the balance, and only then debits.

use tracing::debug;

use crate::compute::beam_from;
use crate::constants::{beam, effect, FIELD_HEIGHT, FIELD_WIDTH};
use crate::entities::{
    Anchor, AreaKind, Category, Entity, EntityKind, GameEvent, GameState, GameStatus, Player,
    PlayerState,
};
use crate::geometry::{rotated_bounds, Rect, Vec2};

/// Ticks of invulnerability bought by [`Ability::Hyper`].
pub const HYPER_LIFE: i32 = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ability {
    /// Bombs bounce off the player instead of ending the round.
    Hyper,
    Shield,
    /// Front and rear walls that follow the player.
    Barrier,
    GravityWell,
    ScreenGravity,
    GoldenAura,
    DeathBall,
    /// Five beams fanned around the facing direction.
    FanShot,
}

impl Ability {
    pub const ALL: [Ability; 8] = [
        Ability::Hyper,
        Ability::Shield,
        Ability::Barrier,
        Ability::GravityWell,
        Ability::ScreenGravity,
        Ability::GoldenAura,
        Ability::DeathBall,
        Ability::FanShot,
    ];

    pub fn cost(self) -> i64 {
        match self {
            Ability::Hyper => 100,
            Ability::Shield => 50,
            Ability::Barrier => 50,
            Ability::GravityWell => 50,
            Ability::ScreenGravity => 200,
            Ability::GoldenAura => 50,
            Ability::DeathBall => 70,
            Ability::FanShot => 30,
        }
    }

    /// Category that must be empty before this ability may be cast again.
    pub fn single_slot(self) -> Option<Category> {
        match self {
            Ability::Shield => Some(Category::Area(AreaKind::Shield)),
            Ability::Barrier => Some(Category::Area(AreaKind::Barrier)),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Ability::Hyper => "Hyper",
            Ability::Shield => "Shield",
            Ability::Barrier => "Barrier",
            Ability::GravityWell => "Gravity",
            Ability::ScreenGravity => "NeoGravity",
            Ability::GoldenAura => "Golden",
            Ability::DeathBall => "DeathBall",
            Ability::FanShot => "FanShot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbilityError {
    #[error("{ability:?} costs {cost}, balance is {balance}")]
    InsufficientScore {
        ability: Ability,
        cost: i64,
        balance: i64,
    },
    #[error("{0:?} is already active")]
    AlreadyActive(Ability),
    #[error("round is over")]
    RoundOver,
}

// ── Area-effect table ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// Thin wall across the facing direction, twice the player's height long.
    Wall,
    Circle { radius: f32 },
    WholeField,
}

/// Where an effect is placed relative to the player when cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Ahead,
    Behind,
    OnPlayer,
    FieldCenter,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tracking {
    Fixed,
    FollowPlayer,
    Travel { speed: f32 },
}

pub type Rgb = (u8, u8, u8);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaSpec {
    pub shape: Shape,
    pub tracking: Tracking,
    /// `None` lives until it leaves the field.
    pub duration: Option<i32>,
    pub tint: Rgb,
}

pub fn area_spec(kind: AreaKind) -> AreaSpec {
    match kind {
        AreaKind::Shield => AreaSpec {
            shape: Shape::Wall,
            tracking: Tracking::Fixed,
            duration: Some(400),
            tint: (200, 200, 200),
        },
        AreaKind::Barrier => AreaSpec {
            shape: Shape::Wall,
            tracking: Tracking::FollowPlayer,
            duration: Some(400),
            tint: (255, 60, 60),
        },
        AreaKind::GravityWell => AreaSpec {
            shape: Shape::Circle {
                radius: effect::GRAVITY_RADIUS,
            },
            tracking: Tracking::FollowPlayer,
            duration: Some(500),
            tint: (110, 110, 110),
        },
        AreaKind::ScreenGravity => AreaSpec {
            shape: Shape::WholeField,
            tracking: Tracking::Fixed,
            duration: Some(400),
            tint: (50, 50, 50),
        },
        AreaKind::GoldenAura => AreaSpec {
            shape: Shape::Circle {
                radius: effect::AURA_RADIUS,
            },
            tracking: Tracking::FollowPlayer,
            duration: Some(500),
            tint: (255, 215, 0),
        },
        AreaKind::DeathBall => AreaSpec {
            shape: Shape::Circle {
                radius: effect::DEATH_BALL_RADIUS,
            },
            tracking: Tracking::Travel {
                speed: effect::DEATH_BALL_SPEED,
            },
            duration: None,
            tint: (160, 32, 240),
        },
    }
}

/// Build the effect entity for `kind` as cast by `player`.
pub fn area_effect(kind: AreaKind, placement: Placement, player: &Player) -> Entity {
    let spec = area_spec(kind);
    let dir = player.facing.unit();

    let size = match spec.shape {
        Shape::Wall => rotated_bounds(effect::WALL_THICKNESS, player.rect.size.y * 2.0, dir),
        Shape::Circle { radius } => Vec2::new(radius * 2.0, radius * 2.0),
        Shape::WholeField => Vec2::new(FIELD_WIDTH, FIELD_HEIGHT),
    };
    let offset = match placement {
        Placement::Ahead => player.rect.size.scale(dir),
        Placement::Behind => -player.rect.size.scale(dir),
        Placement::OnPlayer | Placement::FieldCenter => Vec2::ZERO,
    };
    let center = match placement {
        Placement::FieldCenter => Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0),
        _ => player.rect.center + offset,
    };
    let (anchor, velocity) = match spec.tracking {
        Tracking::Fixed => (Anchor::Fixed, Vec2::ZERO),
        Tracking::FollowPlayer => (Anchor::Player { offset }, Vec2::ZERO),
        Tracking::Travel { speed } => (Anchor::Travel, dir * speed),
    };

    let entity = Entity::new(Rect::new(center, size), EntityKind::Area { kind, anchor })
        .with_velocity(velocity);
    match spec.duration {
        Some(life) => entity.with_life(life),
        None => entity,
    }
}

// ── Activation ────────────────────────────────────────────────────────────────

/// Try to cast `ability`, returning the new state on success.
pub fn activate(state: &GameState, ability: Ability) -> Result<GameState, AbilityError> {
    let mut next = state.clone();
    apply(&mut next, ability)?;
    Ok(next)
}

/// In-place form of [`activate`]; leaves `state` untouched on error.
pub(crate) fn apply(state: &mut GameState, ability: Ability) -> Result<(), AbilityError> {
    if state.status != GameStatus::Playing {
        return Err(AbilityError::RoundOver);
    }
    if let Some(slot) = ability.single_slot() {
        if !state.registry.is_empty(slot) {
            return Err(AbilityError::AlreadyActive(ability));
        }
    }
    let cost = ability.cost();
    let balance = state.scoreboard.score;
    if balance < cost {
        return Err(AbilityError::InsufficientScore {
            ability,
            cost,
            balance,
        });
    }
    state.scoreboard.score -= cost;

    if ability == Ability::Hyper {
        state.player.state = PlayerState::Hyper { life: HYPER_LIFE };
    }
    for entity in effects_for(ability, &state.player) {
        state.registry.spawn(entity);
    }

    debug!(
        ability = ability.label(),
        cost,
        balance = state.scoreboard.score,
        "ability activated"
    );
    state.events.push(GameEvent::AbilityActivated(ability));
    Ok(())
}

/// Entities spawned by casting `ability` from `player`'s current pose.
fn effects_for(ability: Ability, player: &Player) -> Vec<Entity> {
    match ability {
        Ability::Hyper => Vec::new(),
        Ability::Shield => vec![area_effect(AreaKind::Shield, Placement::Ahead, player)],
        Ability::Barrier => vec![
            area_effect(AreaKind::Barrier, Placement::Ahead, player),
            area_effect(AreaKind::Barrier, Placement::Behind, player),
        ],
        Ability::GravityWell => {
            vec![area_effect(AreaKind::GravityWell, Placement::OnPlayer, player)]
        }
        Ability::ScreenGravity => {
            vec![area_effect(AreaKind::ScreenGravity, Placement::FieldCenter, player)]
        }
        Ability::GoldenAura => {
            vec![area_effect(AreaKind::GoldenAura, Placement::OnPlayer, player)]
        }
        Ability::DeathBall => vec![area_effect(AreaKind::DeathBall, Placement::Ahead, player)],
        Ability::FanShot => fan_directions(player.facing.unit())
            .into_iter()
            .map(|dir| beam_from(player, dir))
            .collect(),
    }
}

/// Evenly spread directions covering `beam::FAN_SPREAD` degrees around `dir`.
pub fn fan_directions(dir: Vec2) -> Vec<Vec2> {
    let count = beam::FAN_COUNT;
    if count < 2 {
        return vec![dir];
    }
    let step = beam::FAN_SPREAD / (count - 1) as f32;
    let start = -beam::FAN_SPREAD / 2.0;
    (0..count)
        .map(|i| dir.rotated(start + step * i as f32))
        .collect()
}
