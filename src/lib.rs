//! Impostor Arena - headless simulation core for a social-deduction party game
//!
//! A fixed roster wanders a 2D arena while a hidden impostor eliminates anyone
//! who gets too close. The human-controlled actor can confront the impostor up
//! close, or the round clock runs out and a vote decides the match.
//!
//! - `game`: actors, movement, AI, round clock, vote rules and the match controller
//! - `host`: JSON-line protocol and tokio tick loop for driving a match headlessly
//! - `config`: environment configuration
//! - `util`: timing and rate-limiting helpers

pub mod config;
pub mod game;
pub mod host;
pub mod util;
