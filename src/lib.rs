//! Simulation core of a single-player arcade shooter: eight-way movement,
//! descending bomb-dropping enemies, and score-bought abilities.
//!
//! The crate exposes pure state transitions (`compute::tick` and friends);
//! the bundled binary is a crossterm front-end that samples keys, calls
//! `tick` at a fixed rate, and draws the result.

pub mod abilities;
pub mod collision;
pub mod compute;
pub mod config;
pub mod constants;
pub mod entities;
pub mod geometry;
