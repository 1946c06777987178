use musou_shooter::abilities::*;
use musou_shooter::compute::{init_state, tick};
use musou_shooter::entities::*;
use musou_shooter::geometry::{rotated_bounds, Vec2};

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Player at (800, 450) facing right, `score` in the bank, past the opening
/// spawn.
fn funded(score: i64) -> GameState {
    let mut s = init_state();
    s.player = Player::at(Vec2::new(800.0, 450.0));
    s.scoreboard.score = score;
    s.frame = 1;
    s
}

fn approx(a: Vec2, b: Vec2) -> bool {
    (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
}

// ── Costs and gating ──────────────────────────────────────────────────────────

#[test]
fn cost_table() {
    let costs: Vec<i64> = Ability::ALL.iter().map(|a| a.cost()).collect();
    assert_eq!(costs, vec![100, 50, 50, 50, 200, 50, 70, 30]);
}

#[test]
fn shield_spawns_ahead_and_debits() {
    let s = activate(&funded(100), Ability::Shield).unwrap();
    assert_eq!(s.scoreboard.score, 50);

    let shields = s.registry.of(Category::Area(AreaKind::Shield));
    assert_eq!(shields.len(), 1);
    assert_eq!(shields[0].rect.center, Vec2::new(900.0, 450.0));
    assert_eq!(shields[0].rect.size, Vec2::new(20.0, 200.0));
    assert_eq!(shields[0].life, Some(400));
    assert!(s.events.contains(&GameEvent::AbilityActivated(Ability::Shield)));
}

#[test]
fn exact_balance_is_enough() {
    let s = activate(&funded(50), Ability::Shield).unwrap();
    assert_eq!(s.scoreboard.score, 0);
}

#[test]
fn short_balance_is_rejected_without_debit() {
    let s = funded(49);
    let err = activate(&s, Ability::Shield).unwrap_err();
    assert_eq!(
        err,
        AbilityError::InsufficientScore {
            ability: Ability::Shield,
            cost: 50,
            balance: 49,
        }
    );
    assert_eq!(s.scoreboard.score, 49);
}

#[test]
fn second_shield_is_rejected_while_first_lives() {
    let s = activate(&funded(500), Ability::Shield).unwrap();
    let err = activate(&s, Ability::Shield).unwrap_err();
    assert_eq!(err, AbilityError::AlreadyActive(Ability::Shield));
    assert_eq!(s.scoreboard.score, 450);
}

#[test]
fn second_barrier_is_rejected_while_first_lives() {
    let s = activate(&funded(500), Ability::Barrier).unwrap();
    assert_eq!(
        activate(&s, Ability::Barrier).unwrap_err(),
        AbilityError::AlreadyActive(Ability::Barrier)
    );
}

#[test]
fn stackable_effects_stack() {
    let s = activate(&funded(500), Ability::GravityWell).unwrap();
    let s = activate(&s, Ability::GravityWell).unwrap();
    assert_eq!(s.registry.len(Category::Area(AreaKind::GravityWell)), 2);
    assert_eq!(s.scoreboard.score, 400);
}

#[test]
fn nothing_activates_after_defeat() {
    let mut s = funded(1000);
    s.status = GameStatus::Defeated { final_score: 1000 };
    assert_eq!(
        activate(&s, Ability::Hyper).unwrap_err(),
        AbilityError::RoundOver
    );
}

#[test]
fn rejected_command_in_tick_changes_nothing() {
    let mut rng = seeded_rng();
    let s = funded(10);
    let input = FrameInput {
        held: HeldKeys::default(),
        commands: vec![Command::Activate(Ability::ScreenGravity)],
    };
    let s2 = tick(&s, &input, &mut rng);
    assert_eq!(s2.scoreboard.score, 10);
    assert!(s2.registry.is_empty(Category::Area(AreaKind::ScreenGravity)));
    assert!(s2.events.is_empty());
}

// ── Individual abilities ──────────────────────────────────────────────────────

#[test]
fn hyper_sets_invulnerable_state() {
    let s = activate(&funded(150), Ability::Hyper).unwrap();
    assert_eq!(s.scoreboard.score, 50);
    assert_eq!(s.player.state, PlayerState::Hyper { life: HYPER_LIFE });
    assert_eq!(s.registry.total(), 0);
}

#[test]
fn barrier_walls_follow_the_player() {
    let mut rng = seeded_rng();
    let s = activate(&funded(50), Ability::Barrier).unwrap();
    let walls = s.registry.of(Category::Area(AreaKind::Barrier));
    assert_eq!(walls.len(), 2);
    assert_eq!(walls[0].rect.center, Vec2::new(900.0, 450.0));
    assert_eq!(walls[1].rect.center, Vec2::new(700.0, 450.0));

    let input = FrameInput {
        held: HeldKeys {
            down: true,
            ..HeldKeys::default()
        },
        commands: Vec::new(),
    };
    let s2 = tick(&s, &input, &mut rng);
    let walls = s2.registry.of(Category::Area(AreaKind::Barrier));
    assert_eq!(walls[0].rect.center, Vec2::new(900.0, 460.0));
    assert_eq!(walls[1].rect.center, Vec2::new(700.0, 460.0));
}

#[test]
fn shield_stays_where_it_was_cast() {
    let mut rng = seeded_rng();
    let s = activate(&funded(50), Ability::Shield).unwrap();
    let input = FrameInput {
        held: HeldKeys {
            up: true,
            ..HeldKeys::default()
        },
        commands: Vec::new(),
    };
    let s2 = tick(&s, &input, &mut rng);
    let shield = &s2.registry.of(Category::Area(AreaKind::Shield))[0];
    assert_eq!(shield.rect.center, Vec2::new(900.0, 450.0));
    assert_eq!(shield.life, Some(399));
}

#[test]
fn diagonal_wall_uses_rotated_bounds() {
    let mut s = funded(50);
    s.player.facing = Facing { dx: -1, dy: -1 };
    let s = activate(&s, Ability::Shield).unwrap();
    let shield = &s.registry.of(Category::Area(AreaKind::Shield))[0];
    let dir = Facing { dx: -1, dy: -1 }.unit();
    assert!(approx(shield.rect.size, rotated_bounds(20.0, 200.0, dir)));
    assert!(approx(
        shield.rect.center,
        Vec2::new(800.0 + 100.0 * dir.x, 450.0 + 100.0 * dir.y)
    ));
}

#[test]
fn gravity_well_and_aura_centre_on_player() {
    let s = activate(&funded(100), Ability::GravityWell).unwrap();
    let well = &s.registry.of(Category::Area(AreaKind::GravityWell))[0];
    assert_eq!(well.rect.center, Vec2::new(800.0, 450.0));
    assert_eq!(well.rect.size, Vec2::new(400.0, 400.0));
    assert_eq!(well.life, Some(500));

    let s = activate(&s, Ability::GoldenAura).unwrap();
    let aura = &s.registry.of(Category::Area(AreaKind::GoldenAura))[0];
    assert_eq!(aura.rect.size, Vec2::new(200.0, 200.0));
    assert_eq!(s.scoreboard.score, 0);
}

#[test]
fn screen_gravity_covers_the_field() {
    let s = activate(&funded(200), Ability::ScreenGravity).unwrap();
    let field = &s.registry.of(Category::Area(AreaKind::ScreenGravity))[0];
    assert_eq!(field.rect.center, Vec2::new(800.0, 450.0));
    assert_eq!(field.rect.size, Vec2::new(1600.0, 900.0));
    assert_eq!(field.life, Some(400));
}

#[test]
fn screen_gravity_clears_enemies_in_the_same_tick() {
    let mut rng = seeded_rng();
    let mut s = funded(200);
    s.registry.spawn(musou_shooter::compute::spawn_enemy(&mut rng));
    let input = FrameInput {
        held: HeldKeys::default(),
        commands: vec![Command::Activate(Ability::ScreenGravity)],
    };
    let s2 = tick(&s, &input, &mut rng);
    assert!(s2.registry.is_empty(Category::Enemy));
    assert_eq!(s2.scoreboard.score, 10);
}

#[test]
fn death_ball_travels_until_it_leaves_the_field() {
    let mut rng = seeded_rng();
    let s = activate(&funded(70), Ability::DeathBall).unwrap();
    let ball = &s.registry.of(Category::Area(AreaKind::DeathBall))[0];
    assert_eq!(ball.rect.center, Vec2::new(900.0, 450.0));
    assert_eq!(ball.velocity, Vec2::new(10.0, 0.0));
    assert_eq!(ball.life, None);

    // Right edge reaches 1600 after 60 ticks and crosses it on the 61st
    let mut s = s;
    for _ in 0..60 {
        s = tick(&s, &FrameInput::default(), &mut rng);
    }
    assert_eq!(s.registry.len(Category::Area(AreaKind::DeathBall)), 1);
    s = tick(&s, &FrameInput::default(), &mut rng);
    assert!(s.registry.is_empty(Category::Area(AreaKind::DeathBall)));
}

#[test]
fn fan_shot_fires_five_beams() {
    let s = activate(&funded(30), Ability::FanShot).unwrap();
    assert_eq!(s.scoreboard.score, 0);
    let beams = s.registry.of(Category::Beam);
    assert_eq!(beams.len(), 5);
    for b in beams {
        assert!((b.velocity.length() - 10.0).abs() < 1e-3);
    }
}

#[test]
fn fan_directions_are_symmetric() {
    let dirs = fan_directions(Vec2::RIGHT);
    assert_eq!(dirs.len(), 5);
    assert!(approx(dirs[2], Vec2::RIGHT));
    let fifty = 50f32.to_radians();
    assert!(approx(dirs[0], Vec2::new(fifty.cos(), fifty.sin())));
    assert!(approx(dirs[4], Vec2::new(fifty.cos(), -fifty.sin())));
}

// ── Area table ────────────────────────────────────────────────────────────────

#[test]
fn only_death_ball_is_untimed() {
    let kinds = [
        AreaKind::Shield,
        AreaKind::Barrier,
        AreaKind::GravityWell,
        AreaKind::ScreenGravity,
        AreaKind::GoldenAura,
        AreaKind::DeathBall,
    ];
    for kind in kinds {
        let spec = area_spec(kind);
        assert_eq!(spec.duration.is_none(), kind == AreaKind::DeathBall);
    }
}

#[test]
fn two_shield_presses_in_one_tick_make_one_shield() {
    let mut rng = seeded_rng();
    let s = funded(200);
    let input = FrameInput {
        held: HeldKeys::default(),
        commands: vec![
            Command::Activate(Ability::Shield),
            Command::Activate(Ability::Shield),
        ],
    };
    let s2 = tick(&s, &input, &mut rng);
    assert_eq!(s2.registry.len(Category::Area(AreaKind::Shield)), 1);
    assert_eq!(s2.scoreboard.score, 150);
}
