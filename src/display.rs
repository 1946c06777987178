/// Rendering layer. All terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state. No game logic is performed; this module only translates the
/// 1600×900 logical field into terminal cells.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use musou_shooter::abilities::{area_spec, Ability, Shape};
use musou_shooter::compute::explosion_frame;
use musou_shooter::constants::{FIELD_HEIGHT, FIELD_WIDTH};
use musou_shooter::entities::{
    AreaKind, Category, Entity, EntityKind, GameEvent, GameState, GameStatus, PlayerState,
};
use musou_shooter::geometry::{Rect, Vec2};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LEVEL: Color = Color::Green;
const C_HUD_HYPER: Color = Color::Magenta;
const C_PLAYER: Color = Color::White;
const C_PLAYER_JOY: Color = Color::Yellow;
const C_PLAYER_DOWN: Color = Color::Red;
const C_BEAM: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;

const ENEMY_SPRITES: [(&str, Color); 3] = [
    ("«▼»", Color::Green),
    ("(◎)", Color::Red),
    ("{Ѫ}", Color::Magenta),
];

/// Same order as the bomb palette index rolled at spawn.
const BOMB_COLORS: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Blue,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
];

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Maps field coordinates onto the bordered play area of the terminal:
/// columns `1..width-1`, rows `2..height-2`.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    fn cols(&self) -> f32 {
        self.width.saturating_sub(2).max(1) as f32
    }

    fn rows(&self) -> f32 {
        self.height.saturating_sub(4).max(1) as f32
    }

    /// Cell under a field position, or `None` outside the play area.
    fn cell(&self, at: Vec2) -> Option<(u16, u16)> {
        if at.x < 0.0 || at.y < 0.0 || at.x >= FIELD_WIDTH || at.y >= FIELD_HEIGHT {
            return None;
        }
        let col = 1 + (at.x / FIELD_WIDTH * self.cols()) as u16;
        let row = 2 + (at.y / FIELD_HEIGHT * self.rows()) as u16;
        Some((col, row))
    }

    /// Field position at the middle of a cell.
    fn point(&self, col: u16, row: u16) -> Vec2 {
        Vec2::new(
            (col as f32 - 1.0 + 0.5) / self.cols() * FIELD_WIDTH,
            (row as f32 - 2.0 + 0.5) / self.rows() * FIELD_HEIGHT,
        )
    }

    /// Every cell whose centre lies inside `rect`, clipped to the field.
    /// Only the cells under the rect's span are visited.
    fn cells_in(&self, rect: &Rect) -> Vec<(u16, u16)> {
        let to_col = |x: f32| 1.0 + (x / FIELD_WIDTH * self.cols()).floor();
        let to_row = |y: f32| 2.0 + (y / FIELD_HEIGHT * self.rows()).floor();
        let first_col = to_col(rect.left()).max(1.0) as u16;
        let last_col = to_col(rect.right()).min(self.width.saturating_sub(2) as f32) as u16;
        let first_row = to_row(rect.top()).max(2.0) as u16;
        let last_row = to_row(rect.bottom()).min(self.height.saturating_sub(3) as f32) as u16;

        let mut cells = Vec::new();
        for row in first_row..=last_row {
            for col in first_col..=last_col {
                let p = self.point(col, row);
                let inside = p.x >= rect.left()
                    && p.x <= rect.right()
                    && p.y >= rect.top()
                    && p.y <= rect.bottom();
                if inside {
                    cells.push((col, row));
                }
            }
        }
        cells
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, state: &GameState, view: Viewport) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;
    draw_hud(out, state, view)?;

    // Effects first so sprites stay readable on top of them.
    for (category, list) in state.registry.iter() {
        if let Category::Area(kind) = category {
            for effect in list {
                draw_area(out, effect, kind, view)?;
            }
        }
    }
    for explosion in state.registry.of(Category::Explosion) {
        draw_explosion(out, explosion, view)?;
    }
    for enemy in state.registry.of(Category::Enemy) {
        draw_enemy(out, enemy, view)?;
    }
    for bomb in state.registry.of(Category::Bomb) {
        draw_bomb(out, bomb, view)?;
    }
    for beam in state.registry.of(Category::Beam) {
        draw_beam(out, beam, view)?;
    }

    draw_player(out, state, view)?;
    draw_controls_hint(out, view)?;

    if let GameStatus::Defeated { final_score } = state.status {
        draw_defeat(out, state, final_score, view)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: Viewport) -> std::io::Result<()> {
    let w = view.width as usize;
    let h = view.height;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &GameState, view: Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score: {:>6}", state.scoreboard.score)))?;
    out.queue(style::SetForegroundColor(C_HUD_LEVEL))?;
    out.queue(Print(format!("  Level: {}", state.scoreboard.level())))?;

    // Active effects, right-aligned
    let mut tags: Vec<String> = Vec::new();
    if let PlayerState::Hyper { life } = state.player.state {
        tags.push(format!("HYPER {:>3}", life));
    }
    for (category, list) in state.registry.iter() {
        if let Category::Area(kind) = category {
            if !list.is_empty() {
                tags.push(area_label(kind).to_string());
            }
        }
    }
    let right = tags.join(" · ");
    let rx = view.width.saturating_sub(right.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HYPER))?;
    out.queue(Print(&right))?;

    Ok(())
}

fn area_label(kind: AreaKind) -> &'static str {
    let ability = match kind {
        AreaKind::Shield => Ability::Shield,
        AreaKind::Barrier => Ability::Barrier,
        AreaKind::GravityWell => Ability::GravityWell,
        AreaKind::ScreenGravity => Ability::ScreenGravity,
        AreaKind::GoldenAura => Ability::GoldenAura,
        AreaKind::DeathBall => Ability::DeathBall,
    };
    ability.label()
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, state: &GameState, view: Viewport) -> std::io::Result<()> {
    let p = &state.player;
    let Some((col, row)) = view.cell(p.rect.center) else {
        return Ok(());
    };

    let defeated = matches!(state.status, GameStatus::Defeated { .. });
    let joyful = state
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::EnemyDestroyed { .. }));
    let (face, color) = if defeated {
        ("x", C_PLAYER_DOWN)
    } else if joyful {
        ("^", C_PLAYER_JOY)
    } else if p.is_hyper() {
        ("@", C_HUD_HYPER)
    } else {
        ("@", C_PLAYER)
    };

    out.queue(style::SetForegroundColor(color))?;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print(face))?;

    // Beak in the facing direction
    let arrow = match (p.facing.dx, p.facing.dy) {
        (1, 0) => "→",
        (1, -1) => "↗",
        (0, -1) => "↑",
        (-1, -1) => "↖",
        (-1, 0) => "←",
        (-1, 1) => "↙",
        (0, 1) => "↓",
        _ => "↘",
    };
    let beak_col = col as i32 + p.facing.dx as i32;
    let beak_row = row as i32 + p.facing.dy as i32;
    if beak_col >= 1
        && beak_col < view.width as i32 - 1
        && beak_row >= 2
        && beak_row < view.height as i32 - 2
    {
        out.queue(cursor::MoveTo(beak_col as u16, beak_row as u16))?;
        out.queue(Print(arrow))?;
    }
    Ok(())
}

fn draw_enemy<W: Write>(out: &mut W, enemy: &Entity, view: Viewport) -> std::io::Result<()> {
    let EntityKind::Enemy(brain) = &enemy.kind else {
        return Ok(());
    };
    let Some((col, row)) = view.cell(enemy.rect.center) else {
        return Ok(());
    };
    let (sprite, color) = ENEMY_SPRITES[brain.sprite as usize % ENEMY_SPRITES.len()];
    out.queue(style::SetForegroundColor(color))?;
    out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row))?;
    out.queue(Print(sprite))?;
    Ok(())
}

fn draw_bomb<W: Write>(out: &mut W, bomb: &Entity, view: Viewport) -> std::io::Result<()> {
    let EntityKind::Bomb { radius, color } = bomb.kind else {
        return Ok(());
    };
    let Some((col, row)) = view.cell(bomb.rect.center) else {
        return Ok(());
    };
    let glyph = if radius >= 30.0 { "●" } else { "•" };
    out.queue(style::SetForegroundColor(BOMB_COLORS[color % BOMB_COLORS.len()]))?;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print(glyph))?;
    Ok(())
}

fn draw_beam<W: Write>(out: &mut W, beam: &Entity, view: Viewport) -> std::io::Result<()> {
    let Some((col, row)) = view.cell(beam.rect.center) else {
        return Ok(());
    };
    let v = beam.velocity;
    // Pick the stroke closest to the travel angle
    let glyph = if v.y.abs() < v.x.abs() * 0.4 {
        "─"
    } else if v.x.abs() < v.y.abs() * 0.4 {
        "│"
    } else if (v.x > 0.0) == (v.y < 0.0) {
        "╱"
    } else {
        "╲"
    };
    out.queue(style::SetForegroundColor(C_BEAM))?;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print(glyph))?;
    Ok(())
}

fn draw_explosion<W: Write>(
    out: &mut W,
    explosion: &Entity,
    view: Viewport,
) -> std::io::Result<()> {
    let Some((col, row)) = view.cell(explosion.rect.center) else {
        return Ok(());
    };
    let (glyph, color) = match explosion_frame(explosion.life.unwrap_or(0)) {
        0 => ("✶", Color::Yellow),
        _ => ("✷", Color::DarkYellow),
    };
    out.queue(style::SetForegroundColor(color))?;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print(glyph))?;
    Ok(())
}

fn draw_area<W: Write>(
    out: &mut W,
    effect: &Entity,
    kind: AreaKind,
    view: Viewport,
) -> std::io::Result<()> {
    let spec = area_spec(kind);
    let (r, g, b) = spec.tint;
    out.queue(style::SetForegroundColor(Color::Rgb { r, g, b }))?;

    let rect = &effect.rect;
    for (col, row) in view.cells_in(rect) {
        let glyph = match spec.shape {
            Shape::Wall => "█",
            Shape::WholeField => {
                // Sparse haze so the field stays readable
                if col % 4 == 0 && row % 2 == 0 {
                    "·"
                } else {
                    continue;
                }
            }
            Shape::Circle { radius } => {
                let p = view.point(col, row);
                let dx = p.x - rect.center.x;
                let dy = p.y - rect.center.y;
                let d = (dx * dx + dy * dy).sqrt() / radius;
                if kind == AreaKind::DeathBall && d <= 1.0 {
                    "▒"
                } else if (0.8..=1.0).contains(&d) {
                    "∙"
                } else {
                    continue;
                }
            }
        };
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

const CONTROLS: &str = "←↑↓→ Move  SPACE Fire  B Boost  V Fan  H Hyper  C Shield  X Barrier  \
                        TAB Gravity  ENTER NeoGravity  F Golden  D DeathBall  Q Quit";

fn draw_controls_hint<W: Write>(out: &mut W, view: Viewport) -> std::io::Result<()> {
    let hint: String = CONTROLS
        .chars()
        .take(view.width.saturating_sub(2) as usize)
        .collect();
    out.queue(cursor::MoveTo(1, view.height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(hint))?;
    Ok(())
}

// ── Defeat overlay ────────────────────────────────────────────────────────────

fn draw_defeat<W: Write>(
    out: &mut W,
    state: &GameState,
    final_score: i64,
    view: Viewport,
) -> std::io::Result<()> {
    let score_line = format!("Final Score: {:>6}", final_score);
    let level_line = format!("Level reached: {:>4}", state.scoreboard.level());

    let lines: &[(&str, Color)] = &[
        ("╔════════════════════╗", Color::Red),
        ("║    GAME  OVER      ║", Color::Red),
        ("╚════════════════════╝", Color::Red),
    ];

    let cx = view.width / 2;
    let total_rows = lines.len() + 3;
    let start_row = (view.height / 2).saturating_sub(total_rows as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    let rows: [(&str, Color); 3] = [
        (score_line.as_str(), Color::Yellow),
        (level_line.as_str(), Color::Green),
        ("R - Play Again  Q - Quit", Color::White),
    ];
    for (i, (msg, color)) in rows.iter().enumerate() {
        let row = start_row + lines.len() as u16 + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference result from scanning every play-area cell.
    fn scan_all(view: &Viewport, rect: &Rect) -> Vec<(u16, u16)> {
        let mut cells = Vec::new();
        for row in 2..=view.height.saturating_sub(3) {
            for col in 1..=view.width.saturating_sub(2) {
                let p = view.point(col, row);
                let inside = p.x >= rect.left()
                    && p.x <= rect.right()
                    && p.y >= rect.top()
                    && p.y <= rect.bottom();
                if inside {
                    cells.push((col, row));
                }
            }
        }
        cells
    }

    #[test]
    fn span_scan_matches_full_scan() {
        let view = Viewport::new(120, 40);
        let rects = [
            Rect::new(Vec2::new(800.0, 450.0), Vec2::new(400.0, 400.0)),
            Rect::new(Vec2::new(900.0, 450.0), Vec2::new(20.0, 200.0)),
            Rect::new(Vec2::new(800.0, 450.0), Vec2::new(1600.0, 900.0)),
            Rect::new(Vec2::new(20.0, 20.0), Vec2::new(200.0, 200.0)),
            Rect::new(Vec2::new(1590.0, 880.0), Vec2::new(200.0, 200.0)),
        ];
        for rect in &rects {
            assert_eq!(view.cells_in(rect), scan_all(&view, rect));
        }
    }

    #[test]
    fn rect_off_the_field_has_no_cells() {
        let view = Viewport::new(120, 40);
        let gone = Rect::new(Vec2::new(-500.0, -500.0), Vec2::new(100.0, 100.0));
        assert!(view.cells_in(&gone).is_empty());
    }

    #[test]
    fn small_rect_touches_few_cells() {
        let view = Viewport::new(120, 40);
        let wall = Rect::new(Vec2::new(900.0, 450.0), Vec2::new(20.0, 200.0));
        let cells = view.cells_in(&wall);
        assert!(!cells.is_empty());
        assert!(cells.len() < 20);
    }
}
