//! Collision and scoring resolver.
//!
//! The sweep is driven by [`RULES`]: one entry per (victim, weapon) category
//! pair, each with its removal policy. The player/bomb contact is handled
//! first and separately because it can end the round, and once it does no
//! other pair is evaluated.

use crate::constants::explosion;
use crate::entities::{
    AreaKind, Category, Entity, EntityId, EntityKind, GameEvent, GameState, GameStatus,
};
use crate::geometry::{Rect, Vec2};

use Category::{Beam, Bomb, Enemy};
use Removal::{Both, VictimOnly};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    /// Victim and every weapon that touched it are destroyed.
    Both,
    /// Only the victim is destroyed; the weapon persists.
    VictimOnly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rule {
    pub victim: Category,
    pub weapon: Category,
    pub removal: Removal,
}

const fn rule(victim: Category, weapon: Category, removal: Removal) -> Rule {
    Rule {
        victim,
        weapon,
        removal,
    }
}

const fn area(kind: AreaKind) -> Category {
    Category::Area(kind)
}

pub const RULES: &[Rule] = &[
    rule(Enemy, Beam, Both),
    rule(Bomb, Beam, Both),
    rule(Enemy, area(AreaKind::Shield), VictimOnly),
    rule(Bomb, area(AreaKind::Shield), VictimOnly),
    rule(Enemy, area(AreaKind::Barrier), VictimOnly),
    rule(Bomb, area(AreaKind::Barrier), VictimOnly),
    rule(Enemy, area(AreaKind::GravityWell), VictimOnly),
    rule(Bomb, area(AreaKind::GravityWell), VictimOnly),
    rule(Enemy, area(AreaKind::ScreenGravity), VictimOnly),
    rule(Bomb, area(AreaKind::ScreenGravity), VictimOnly),
    rule(Enemy, area(AreaKind::GoldenAura), VictimOnly),
    rule(Bomb, area(AreaKind::GoldenAura), VictimOnly),
    rule(Enemy, area(AreaKind::DeathBall), VictimOnly),
    rule(Bomb, area(AreaKind::DeathBall), VictimOnly),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Continue,
    Defeated { final_score: i64 },
}

/// Run the whole sweep for one tick, mutating `state` in place.
pub fn resolve(state: &mut GameState) -> Resolution {
    if let Some(final_score) = player_vs_bombs(state) {
        state.status = GameStatus::Defeated { final_score };
        state.events.push(GameEvent::PlayerDefeated { final_score });
        return Resolution::Defeated { final_score };
    }
    for rule in RULES {
        apply_rule(state, rule);
    }
    Resolution::Continue
}

/// Returns the final score if the contact ended the round. In hyper mode the
/// touching bombs are destroyed and credited instead.
fn player_vs_bombs(state: &mut GameState) -> Option<i64> {
    let hits: Vec<(EntityId, Vec2)> = state
        .registry
        .of(Category::Bomb)
        .iter()
        .filter(|b| b.rect.intersects(&state.player.rect))
        .map(|b| (b.id, b.rect.center))
        .collect();
    if hits.is_empty() {
        return None;
    }
    if !state.player.is_hyper() {
        return Some(state.scoreboard.score);
    }

    let ids: Vec<EntityId> = hits.iter().map(|(id, _)| *id).collect();
    state.registry.remove_ids(Category::Bomb, &ids);
    for (_, at) in hits {
        destroyed(state, Category::Bomb, at);
    }
    None
}

/// Full cross-product test for one rule. A weapon consumed by one victim is
/// not available to the victims after it.
pub fn apply_rule(state: &mut GameState, rule: &Rule) {
    let weapons = state.registry.of(rule.weapon);
    if weapons.is_empty() {
        return;
    }

    let mut victims: Vec<(EntityId, Vec2)> = Vec::new();
    let mut spent: Vec<EntityId> = Vec::new();
    for victim in state.registry.of(rule.victim) {
        let touching: Vec<EntityId> = weapons
            .iter()
            .filter(|w| !spent.contains(&w.id) && w.rect.intersects(&victim.rect))
            .map(|w| w.id)
            .collect();
        if touching.is_empty() {
            continue;
        }
        victims.push((victim.id, victim.rect.center));
        if rule.removal == Removal::Both {
            spent.extend(touching);
        }
    }
    if victims.is_empty() {
        return;
    }

    let ids: Vec<EntityId> = victims.iter().map(|(id, _)| *id).collect();
    state.registry.remove_ids(rule.victim, &ids);
    state.registry.remove_ids(rule.weapon, &spent);
    for (_, at) in victims {
        destroyed(state, rule.victim, at);
    }
}

/// Score, explosion and event for a victim that just died at `at`.
fn destroyed(state: &mut GameState, category: Category, at: Vec2) {
    let life = match category {
        Category::Enemy => {
            state.scoreboard.credit_enemy();
            state.events.push(GameEvent::EnemyDestroyed { at });
            explosion::ENEMY_LIFE
        }
        Category::Bomb => {
            state.scoreboard.credit_bomb();
            state.events.push(GameEvent::BombDestroyed { at });
            explosion::BOMB_LIFE
        }
        _ => return,
    };
    state.registry.spawn(explosion_at(at, life));
}

pub fn explosion_at(at: Vec2, life: i32) -> Entity {
    Entity::new(
        Rect::new(at, Vec2::new(explosion::SIZE, explosion::SIZE)),
        EntityKind::Explosion,
    )
    .with_life(life)
}
