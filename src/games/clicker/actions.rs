//! Semantic action IDs for Minute Clicker click targets.
//!
//! Registered during render and dispatched via `InputEvent::Click`.

// ── Main button ─────────────────────────────────────────────────
pub const PRIMARY_CLICK: u16 = 0;

// ── Upgrades ────────────────────────────────────────────────────
pub const BUY_CLICK_POWER: u16 = 10;
pub const REDUCE_COOLDOWN: u16 = 11;
pub const ADD_TIME: u16 = 12;
pub const WIN_INSTANT: u16 = 13;

// ── Penalty buttons (hard mode) ─────────────────────────────────
pub const TAP_BOMB: u16 = 20;
pub const TAP_DUAL_BOMB: u16 = 21;
pub const TAP_DEATH: u16 = 22;

// ── Run control ─────────────────────────────────────────────────
pub const START_GAME: u16 = 30;
pub const TOGGLE_HARD_MODE: u16 = 31;
pub const TOGGLE_MUTE: u16 = 32;
