mod display;

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{stdout, BufWriter, Write};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use musou_shooter::abilities::Ability;
use musou_shooter::compute::{init_state, tick};
use musou_shooter::config::GameConfig;
use musou_shooter::entities::{Command, FrameInput, GameEvent, GameState, GameStatus, HeldKeys};

use display::Viewport;

/// How long the defeat screen stays up before keys are accepted again.
const DEFEAT_PAUSE: Duration = Duration::from_secs(2);

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many milliseconds. Covers terminals that don't emit key-release
/// events: the OS key-repeat rate is ≥ 15 Hz, so the window is refreshed
/// before expiry while the key is down.
///
/// Without release events a real second tap inside this window cannot be
/// told apart from auto-repeat, so fast double taps of SPACE or an ability
/// key register as one press on those terminals.
const HOLD_WINDOW_MS: u64 = 133;

/// Returns true if `key` was seen within the last `window` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64, window: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= window)
        .unwrap_or(false)
}

// ── Key bindings ──────────────────────────────────────────────────────────────

fn command_for(code: &KeyCode) -> Option<Command> {
    let ability = match code {
        KeyCode::Char(' ') => return Some(Command::Fire),
        KeyCode::Char('h') | KeyCode::Char('H') => Ability::Hyper,
        KeyCode::Char('c') | KeyCode::Char('C') => Ability::Shield,
        KeyCode::Char('x') | KeyCode::Char('X') => Ability::Barrier,
        KeyCode::Tab => Ability::GravityWell,
        KeyCode::Enter => Ability::ScreenGravity,
        KeyCode::Char('f') | KeyCode::Char('F') => Ability::GoldenAura,
        KeyCode::Char('d') | KeyCode::Char('D') => Ability::DeathBall,
        KeyCode::Char('v') | KeyCode::Char('V') => Ability::FanShot,
        _ => return None,
    };
    Some(Command::Activate(ability))
}

fn key_label(ability: Ability) -> &'static str {
    match ability {
        Ability::Hyper => "H",
        Ability::Shield => "C",
        Ability::Barrier => "X",
        Ability::GravityWell => "TAB",
        Ability::ScreenGravity => "ENTER",
        Ability::GoldenAura => "F",
        Ability::DeathBall => "D",
        Ability::FanShot => "V",
    }
}

fn held_keys(key_frame: &HashMap<KeyCode, u64>, frame: u64, window: u64) -> HeldKeys {
    let held = |key: KeyCode| is_held(key_frame, &key, frame, window);
    HeldKeys {
        up: held(KeyCode::Up),
        down: held(KeyCode::Down),
        left: held(KeyCode::Left),
        right: held(KeyCode::Right),
        boost: held(KeyCode::Char('b')) || held(KeyCode::Char('B')),
    }
}

fn is_quit(code: &KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        _ => false,
    }
}

// ── Start screen ──────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;
    let left = cx.saturating_sub(18);

    let title = "✦  MUSOU  SHOOTER  ✦";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(8),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    out.queue(cursor::MoveTo(left, cy.saturating_sub(6)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("←↑↓→ Move   B Boost   SPACE Fire"))?;

    out.queue(cursor::MoveTo(left, cy.saturating_sub(4)))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Abilities (paid from score):"))?;

    for (i, ability) in Ability::ALL.iter().enumerate() {
        let row = cy.saturating_sub(3) + i as u16;
        out.queue(cursor::MoveTo(left, row))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(format!("{:>5} ", key_label(*ability))))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(format!("{:<11}", ability.label())))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("{:>4} pts", ability.cost())))?;
    }

    out.queue(cursor::MoveTo(left, cy + 7))?;
    out.queue(style::SetForegroundColor(Color::Green))?;
    out.queue(Print("ENTER / SPACE : Start    Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        if let Ok(Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            modifiers,
            ..
        })) = rx.recv()
        {
            if is_quit(&code, modifiers) {
                return Ok(MenuResult::Quit);
            }
            if matches!(code, KeyCode::Enter | KeyCode::Char(' ')) {
                return Ok(MenuResult::Start);
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → back to the start screen.
///
/// Input model: movement and boost are level-triggered through a `key_frame`
/// map holding the frame each key was last seen; a key stays live while it
/// keeps refreshing within the hold window. Fire and abilities are
/// edge-triggered: a `Press` only counts when the key was not already held,
/// so OS auto-repeat on classic terminals does not re-fire them.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
    config: &GameConfig,
) -> std::io::Result<bool> {
    let frame_time = Duration::from_millis(config.frame_ms);
    let window = (HOLD_WINDOW_MS / config.frame_ms).max(1);

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        let mut commands = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = ev
            else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    if is_quit(&code, modifiers) {
                        return Ok(true);
                    }
                    let fresh = !is_held(&key_frame, &code, frame, window);
                    key_frame.insert(code, frame);
                    if fresh {
                        commands.extend(command_for(&code));
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        let input = FrameInput {
            held: held_keys(&key_frame, frame, window),
            commands,
        };
        *state = tick(state, &input, rng);

        for event in &state.events {
            match event {
                GameEvent::EnemySpawned { .. } | GameEvent::BombDropped { .. } => {}
                other => debug!(?other, frame = state.frame, "game event"),
            }
        }

        let (width, height) = terminal::size()?;
        display::render(out, state, Viewport::new(width, height))?;

        if let GameStatus::Defeated { final_score } = state.status {
            info!(final_score, level = state.scoreboard.level(), "round over");
            return defeat_screen(rx);
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

/// Hold the defeat frame, discard keys mashed during the pause, then wait
/// for R (play again) or Q (quit).
fn defeat_screen(rx: &mpsc::Receiver<Event>) -> std::io::Result<bool> {
    thread::sleep(DEFEAT_PAUSE);
    while rx.try_recv().is_ok() {}

    loop {
        if let Ok(Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            modifiers,
            ..
        })) = rx.recv()
        {
            if is_quit(&code, modifiers) {
                return Ok(true);
            }
            if matches!(code, KeyCode::Char('r') | KeyCode::Char('R')) {
                return Ok(false);
            }
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(config: &GameConfig) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("opening log file {}", config.log_file.display()))?;

    // The terminal belongs to the game, so logs go to a file
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let (config, warnings) = GameConfig::from_env();
    config.validate().context("invalid configuration")?;
    init_logging(&config)?;
    for warning in &warnings {
        warn!("{}", warning);
    }

    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(seed, frame_ms = config.frame_ms, "starting musou_shooter");
    let mut rng = StdRng::seed_from_u64(seed);

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, &mut rng, &config);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result?;
    info!("exiting");
    Ok(())
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
    config: &GameConfig,
) -> std::io::Result<()> {
    loop {
        match show_menu(out, rx)? {
            MenuResult::Quit => break,
            MenuResult::Start => {
                info!("round started");
                let mut state = init_state();
                if game_loop(out, &mut state, rx, rng, config)? {
                    break;
                }
            }
        }
    }
    Ok(())
}
