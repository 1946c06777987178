//! Gameplay constants. None of these are read from configuration.

/// Logical play-field size.
pub const FIELD_WIDTH: f32 = 1600.0;
pub const FIELD_HEIGHT: f32 = 900.0;

pub mod player {
    pub const START_X: f32 = 900.0;
    pub const START_Y: f32 = 400.0;
    pub const WIDTH: f32 = 100.0;
    pub const HEIGHT: f32 = 100.0;
    pub const SPEED: f32 = 10.0;
    pub const BOOST_SPEED: f32 = 20.0;
}

pub mod enemy {
    pub const WIDTH: f32 = 70.0;
    pub const HEIGHT: f32 = 70.0;
    pub const DESCENT_SPEED: f32 = 6.0;
    /// Inclusive range for the per-instance stop line.
    pub const STOP_LINE_MIN: i32 = 50;
    pub const STOP_LINE_MAX: i32 = (super::FIELD_HEIGHT / 2.0) as i32;
    /// Inclusive range for the per-instance bomb interval, in ticks.
    pub const INTERVAL_MIN: u64 = 50;
    pub const INTERVAL_MAX: u64 = 300;
    /// A new enemy appears every this many ticks.
    pub const SPAWN_EVERY: u64 = 200;
    pub const SPRITE_VARIANTS: u8 = 3;
}

pub mod bomb {
    pub const RADIUS_MIN: i32 = 10;
    pub const RADIUS_MAX: i32 = 50;
    pub const SPEED: f32 = 6.0;
    pub const PALETTE_LEN: usize = 6;
}

pub mod beam {
    /// Sprite size before rotation; the long side lies along the direction.
    pub const LENGTH: f32 = 100.0;
    pub const THICKNESS: f32 = 40.0;
    pub const SPEED: f32 = 10.0;
    /// Fan shot: number of beams and total spread in degrees.
    pub const FAN_COUNT: usize = 5;
    pub const FAN_SPREAD: f32 = 100.0;
}

pub mod effect {
    /// Wall sprite thickness; its length is twice the player's height.
    pub const WALL_THICKNESS: f32 = 20.0;
    pub const GRAVITY_RADIUS: f32 = 200.0;
    pub const AURA_RADIUS: f32 = 100.0;
    pub const DEATH_BALL_RADIUS: f32 = 100.0;
    pub const DEATH_BALL_SPEED: f32 = 10.0;
}

pub mod score {
    pub const ENEMY_KILL: i64 = 10;
    pub const BOMB_KILL: i64 = 1;
    /// Enemy kills needed per level.
    pub const KILLS_PER_LEVEL: u32 = 10;
}

pub mod explosion {
    pub const ENEMY_LIFE: i32 = 100;
    pub const BOMB_LIFE: i32 = 50;
    pub const SIZE: f32 = 100.0;
    /// Ticks per animation frame.
    pub const FRAME_TICKS: i32 = 10;
}
