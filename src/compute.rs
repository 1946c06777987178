/// Pure game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `GameState` (and, where needed, an RNG handle) and returns a brand-new
/// `GameState`. Side effects are limited to the injected RNG, so a seeded
/// generator replays a round exactly.

use rand::Rng;
use tracing::{debug, info, trace};

use crate::abilities;
use crate::collision::{self, Resolution};
use crate::constants::{beam, bomb, enemy, explosion, player, FIELD_WIDTH};
use crate::entities::{
    Anchor, Category, Command, EnemyBrain, EnemyState, Entity, EntityKind, Facing, FrameInput,
    GameEvent, GameState, GameStatus, HeldKeys, Player, PlayerState, Registry, Scoreboard,
};
use crate::geometry::{direction_to, fully_inside, rotated_bounds, Rect, Vec2};

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the initial state for a new round.
pub fn init_state() -> GameState {
    GameState {
        player: Player::at(Vec2::new(player::START_X, player::START_Y)),
        registry: Registry::new(),
        scoreboard: Scoreboard::default(),
        status: GameStatus::Playing,
        frame: 0,
        events: Vec::new(),
    }
}

/// A beam leaving `player` along the unit vector `dir`, one body length out.
pub fn beam_from(player: &Player, dir: Vec2) -> Entity {
    let size = rotated_bounds(beam::LENGTH, beam::THICKNESS, dir);
    let center = player.rect.center + player.rect.size.scale(dir);
    Entity::new(Rect::new(center, size), EntityKind::Beam).with_velocity(dir * beam::SPEED)
}

/// A fresh enemy on the top edge with its stop line, bomb interval and
/// sprite rolled once.
pub fn spawn_enemy(rng: &mut impl Rng) -> Entity {
    let x = rng.gen_range(0..=FIELD_WIDTH as i32) as f32;
    let brain = EnemyBrain {
        stop_line: rng.gen_range(enemy::STOP_LINE_MIN..=enemy::STOP_LINE_MAX) as f32,
        interval: rng.gen_range(enemy::INTERVAL_MIN..=enemy::INTERVAL_MAX),
        state: EnemyState::Descending,
        sprite: rng.gen_range(0..enemy::SPRITE_VARIANTS),
    };
    Entity::new(
        Rect::new(Vec2::new(x, 0.0), Vec2::new(enemy::WIDTH, enemy::HEIGHT)),
        EntityKind::Enemy(brain),
    )
    .with_velocity(Vec2::new(0.0, enemy::DESCENT_SPEED))
}

/// A bomb released under `source`, aimed once at where `target` is now.
pub fn drop_bomb(source: &Entity, target: &Player, rng: &mut impl Rng) -> Entity {
    let radius = rng.gen_range(bomb::RADIUS_MIN..=bomb::RADIUS_MAX) as f32;
    let color = rng.gen_range(0..bomb::PALETTE_LEN);
    let dir = direction_to(&source.rect, &target.rect);
    let center = Vec2::new(
        source.rect.center.x,
        source.rect.center.y + source.rect.size.y / 2.0,
    );
    Entity::new(
        Rect::new(center, Vec2::new(radius * 2.0, radius * 2.0)),
        EntityKind::Bomb { radius, color },
    )
    .with_velocity(dir * bomb::SPEED)
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

/// Fire one beam along the player's facing.
pub fn player_shoot(state: &GameState) -> GameState {
    if state.status != GameStatus::Playing {
        return state.clone();
    }
    let mut next = state.clone();
    fire(&mut next);
    next
}

fn fire(state: &mut GameState) {
    let beam = beam_from(&state.player, state.player.facing.unit());
    state.registry.spawn(beam);
}

fn held_deltas(held: &HeldKeys) -> impl Iterator<Item = (i8, i8)> {
    [
        (held.up, (0, -1)),
        (held.down, (0, 1)),
        (held.left, (-1, 0)),
        (held.right, (1, 0)),
    ]
    .into_iter()
    .filter_map(|(on, delta)| on.then_some(delta))
}

/// Advance the player by one tick of held input.
///
/// Each held direction moves the player `speed` units. If the result leaves
/// the field the whole step is reverted rather than clamped to the edge. The
/// facing follows the last nonzero key sum even when the move was reverted.
pub fn advance_player(current: &Player, held: &HeldKeys) -> Player {
    let mut next = current.clone();
    next.speed = if held.boost {
        player::BOOST_SPEED
    } else {
        player::SPEED
    };

    let (mut sum_x, mut sum_y) = (0i8, 0i8);
    for (dx, dy) in held_deltas(held) {
        next.rect.translate(Vec2::new(dx as f32, dy as f32) * next.speed);
        sum_x += dx;
        sum_y += dy;
    }
    if !fully_inside(&next.rect) {
        next.rect.center = current.rect.center;
    }
    if let Some(facing) = Facing::from_sum(sum_x, sum_y) {
        next.facing = facing;
    }

    if let PlayerState::Hyper { life } = next.state {
        let life = life - 1;
        next.state = if life < 0 {
            PlayerState::Normal
        } else {
            PlayerState::Hyper { life }
        };
    }
    next
}

// ── Entity movement ──────────────────────────────────────────────────────────

/// Move one entity a tick; returns `false` when it should be removed.
fn advance_entity(entity: &mut Entity, player: &Player) -> bool {
    let velocity = entity.velocity;
    let mut alive = true;

    match &mut entity.kind {
        EntityKind::Enemy(brain) => {
            entity.rect.translate(velocity);
            if brain.state == EnemyState::Descending && entity.rect.center.y > brain.stop_line {
                brain.state = EnemyState::Holding;
                entity.velocity = Vec2::ZERO;
            }
        }
        EntityKind::Bomb { .. } | EntityKind::Beam => {
            entity.rect.translate(velocity);
            alive = fully_inside(&entity.rect);
        }
        EntityKind::Explosion => {}
        EntityKind::Area { anchor, .. } => match *anchor {
            Anchor::Fixed => {}
            Anchor::Player { offset } => entity.rect.center = player.rect.center + offset,
            Anchor::Travel => {
                entity.rect.translate(velocity);
                alive = fully_inside(&entity.rect);
            }
        },
    }

    if let Some(life) = entity.life.as_mut() {
        *life -= 1;
    }
    alive && !entity.expired()
}

/// Which of the two explosion frames to show for a given remaining life.
pub fn explosion_frame(life: i32) -> usize {
    (life / explosion::FRAME_TICKS).rem_euclid(2) as usize
}

// ── Per-frame tick (RNG injected) ────────────────────────────────────────────

/// Advance the simulation by one tick.
///
/// Order within a tick: commands, spawns, movement of every entity, then the
/// collision sweep. A defeated round is returned unchanged.
pub fn tick(state: &GameState, input: &FrameInput, rng: &mut impl Rng) -> GameState {
    if state.status != GameStatus::Playing {
        return state.clone();
    }
    let frame = state.frame;
    let mut next = state.clone();
    next.events.clear();

    // ── 1. Edge-triggered commands ───────────────────────────────────────────
    for command in &input.commands {
        match command {
            Command::Fire => fire(&mut next),
            Command::Activate(ability) => {
                if let Err(err) = abilities::apply(&mut next, *ability) {
                    debug!(%err, "ability rejected");
                }
            }
        }
    }

    // ── 2. Spawns ────────────────────────────────────────────────────────────
    if frame % enemy::SPAWN_EVERY == 0 {
        let fresh = spawn_enemy(rng);
        trace!(x = fresh.rect.center.x, frame, "enemy spawned");
        next.events.push(GameEvent::EnemySpawned {
            at: fresh.rect.center,
        });
        next.registry.spawn(fresh);
    }

    let bombs: Vec<Entity> = next
        .registry
        .of(Category::Enemy)
        .iter()
        .filter(|e| match &e.kind {
            EntityKind::Enemy(brain) => {
                brain.state == EnemyState::Holding && frame % brain.interval == 0
            }
            _ => false,
        })
        .map(|e| drop_bomb(e, &next.player, rng))
        .collect();
    for bomb in bombs {
        trace!(x = bomb.rect.center.x, y = bomb.rect.center.y, "bomb dropped");
        next.events.push(GameEvent::BombDropped {
            at: bomb.rect.center,
        });
        next.registry.spawn(bomb);
    }

    // ── 3. Movement ──────────────────────────────────────────────────────────
    next.player = advance_player(&next.player, &input.held);
    let anchor = next.player.clone();
    for (_, list) in next.registry.iter_mut() {
        list.retain_mut(|entity| advance_entity(entity, &anchor));
    }

    // ── 4. Collisions ────────────────────────────────────────────────────────
    if let Resolution::Defeated { final_score } = collision::resolve(&mut next) {
        info!(final_score, frame, "player defeated");
    }

    next.frame = frame + 1;
    next
}
