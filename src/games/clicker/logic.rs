//! Minute Clicker game logic — pure functions over [`ClickerState`].
//!
//! Player actions either succeed (state mutated, success cue) or are
//! rejected with a [`Rejection`] (state untouched, error cue + notice).
//! Time advances only through [`tick`], which processes the timers one base
//! tick at a time in a fixed order: countdown, cooldown, bomb, dual bomb,
//! death meter.

use thiserror::Error;
use tracing::{debug, info};

use super::state::{BombSlot, ClickerState, Cue, Notification, Outcome, Tone};
use super::timers::{fires, CycleStatus, CycleTransition, Interval};

/// Why a player action was refused.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("Click power is already at the maximum!")]
    ClickPowerMaxed,
    #[error("Cooldown is already at the minimum!")]
    CooldownAtMinimum,
    #[error("Time upgrade limit reached!")]
    TimeUpgradesExhausted,
    #[error("You already used this option!")]
    WinAlreadyUsed,
    #[error("Not enough points! ({have}/{needed})")]
    InsufficientPoints { needed: u64, have: u64 },
    #[error("No game in progress")]
    NotRunning,
    #[error("Difficulty can only be changed before a game starts")]
    HardModeLocked,
    #[error("Penalty buttons are only active in hard mode")]
    PenaltiesDisabled,
    #[error("Still arming...")]
    StillArming,
}

/// Result of pressing the main button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Points were awarded and the cooldown started.
    Scored(u32),
    /// Pressed during the cooldown; seconds taken off the countdown.
    Penalized(u32),
    /// No run in progress.
    Ignored,
}

/// Emit the error cue and notice for a rejected action.
fn settle(state: &mut ClickerState, result: Result<(), Rejection>) -> Result<(), Rejection> {
    if let Err(rejection) = &result {
        debug!(%rejection, "action rejected");
        state.cue(Cue::Error);
        let tone = if *rejection == Rejection::StillArming {
            Tone::Info
        } else {
            Tone::Error
        };
        state.notice(rejection.to_string(), tone);
    }
    result
}

fn ensure_running(state: &ClickerState) -> Result<(), Rejection> {
    if state.is_running() {
        Ok(())
    } else {
        Err(Rejection::NotRunning)
    }
}

fn ensure_points(state: &ClickerState, needed: u64) -> Result<(), Rejection> {
    if state.points >= needed {
        Ok(())
    } else {
        Err(Rejection::InsufficientPoints {
            needed,
            have: state.points,
        })
    }
}

// ── Run lifecycle ───────────────────────────────────────────────

/// Start a run, or restart after a win or loss. Everything except the
/// difficulty is reinitialised.
pub fn start_game(state: &mut ClickerState) {
    state.reset_run();
    state.game_started = true;
    state.timers.countdown = Some(Interval::every_secs(1));

    if state.hard_mode {
        state.bomb.arm();
        state.dual_bomb.arm();
        state.timers.death = Some(Interval::every_secs(1));
    }

    info!(hard_mode = state.hard_mode, "game started");
    let target = state.config.win_cost;
    state.notice(
        format!("Game started! Reach {} points!", target),
        Tone::Success,
    );
}

/// Select the difficulty. Only allowed while no run is live.
pub fn set_hard_mode(state: &mut ClickerState, enabled: bool) -> Result<(), Rejection> {
    let result = if state.is_running() {
        Err(Rejection::HardModeLocked)
    } else {
        state.hard_mode = enabled;
        state.cue(Cue::Click);
        let label = if enabled { "Hard mode" } else { "Easy mode" };
        state.notice(format!("{} selected", label), Tone::Info);
        Ok(())
    };
    settle(state, result)
}

fn handle_win(state: &mut ClickerState) {
    if state.game_ended {
        return;
    }
    state.game_ended = true;
    state.outcome = Some(Outcome::Won);
    state.clear_timers();
    info!(points = state.points, "game won");
    state.cue(Cue::Win);
    state.notify(Notification::Won);
}

/// End the run as a loss. Safe to call more than once: only the first call
/// has any effect.
pub fn handle_loss(state: &mut ClickerState) {
    if state.game_ended {
        return;
    }
    state.game_ended = true;
    state.outcome = Some(Outcome::Lost);
    state.clear_timers();
    info!(points = state.points, "game lost");
    state.cue(Cue::Whistle);
    let points = state.points;
    state.notify(Notification::Lost { points });
}

fn check_loss(state: &mut ClickerState) {
    if state.countdown_remaining == 0 {
        handle_loss(state);
    }
}

// ── Player actions ──────────────────────────────────────────────

/// Press the main button.
pub fn primary_click(state: &mut ClickerState) -> ClickOutcome {
    if !state.is_running() {
        return ClickOutcome::Ignored;
    }

    if state.click_ready {
        let power = state.points_available;
        state.click_ready = false;
        // The first cooldown second is charged immediately
        state.cooldown_remaining = state.cooldown_seconds.saturating_sub(1);
        state.points += power as u64;
        state.timers.cooldown = Some(Interval::every_secs(1));
        state.cue(Cue::Click);
        ClickOutcome::Scored(power)
    } else {
        let penalty = state.config.early_click_penalty;
        state.apply_time_penalty(penalty);
        state.cue(Cue::Error);
        state.notice(format!("-{}s (penalized)", penalty), Tone::Error);
        check_loss(state);
        ClickOutcome::Penalized(penalty)
    }
}

pub fn buy_click_power(state: &mut ClickerState) -> Result<(), Rejection> {
    let result = try_buy_click_power(state);
    settle(state, result)
}

fn try_buy_click_power(state: &mut ClickerState) -> Result<(), Rejection> {
    if state.points_available >= state.config.max_click_power {
        return Err(Rejection::ClickPowerMaxed);
    }
    ensure_running(state)?;
    let cost = state.config.add_point_cost;
    ensure_points(state, cost)?;

    state.points -= cost;
    state.points_available += 1;
    state.cue(Cue::Upgrade);
    let power = state.points_available;
    state.notice(
        format!("Upgrade bought! +{} points per click", power),
        Tone::Success,
    );
    Ok(())
}

pub fn reduce_cooldown(state: &mut ClickerState) -> Result<(), Rejection> {
    let result = try_reduce_cooldown(state);
    settle(state, result)
}

fn try_reduce_cooldown(state: &mut ClickerState) -> Result<(), Rejection> {
    if state.cooldown_seconds <= state.config.min_cooldown {
        return Err(Rejection::CooldownAtMinimum);
    }
    ensure_running(state)?;
    let cost = state.config.reduce_cooldown_cost;
    ensure_points(state, cost)?;

    state.points -= cost;
    state.cooldown_seconds -= 1;
    state.cue(Cue::Upgrade);
    let secs = state.cooldown_seconds;
    state.notice(format!("Cooldown reduced to {}s!", secs), Tone::Success);
    Ok(())
}

pub fn add_time(state: &mut ClickerState) -> Result<(), Rejection> {
    let result = try_add_time(state);
    settle(state, result)
}

fn try_add_time(state: &mut ClickerState) -> Result<(), Rejection> {
    if state.time_upgrades_used >= state.config.max_time_upgrades {
        return Err(Rejection::TimeUpgradesExhausted);
    }
    ensure_running(state)?;
    let cost = state.config.add_time_cost;
    ensure_points(state, cost)?;

    state.points -= cost;
    state.countdown_remaining = state
        .countdown_remaining
        .saturating_add(state.config.extra_time);
    state.time_upgrades_used += 1;
    state.cue(Cue::Upgrade);
    let extra = state.config.extra_time;
    state.notice(format!("+{} seconds added!", extra), Tone::Success);
    Ok(())
}

pub fn win_instant(state: &mut ClickerState) -> Result<(), Rejection> {
    let result = try_win_instant(state);
    settle(state, result)
}

fn try_win_instant(state: &mut ClickerState) -> Result<(), Rejection> {
    if state.win_used >= state.config.max_win_uses {
        return Err(Rejection::WinAlreadyUsed);
    }
    ensure_running(state)?;
    let cost = state.config.win_cost;
    ensure_points(state, cost)?;

    state.points -= cost;
    state.win_used += 1;
    handle_win(state);
    Ok(())
}

fn ensure_penalties_live(state: &ClickerState) -> Result<(), Rejection> {
    if !state.hard_mode {
        return Err(Rejection::PenaltiesDisabled);
    }
    ensure_running(state)
}

/// Tap a bomb button: start arming when idle, defuse when armed.
pub fn tap_bomb(state: &mut ClickerState, slot: BombSlot) -> Result<(), Rejection> {
    let result = try_tap_bomb(state, slot);
    settle(state, result)
}

fn try_tap_bomb(state: &mut ClickerState, slot: BombSlot) -> Result<(), Rejection> {
    ensure_penalties_live(state)?;
    let cycle = state.cycle_mut(slot);
    match cycle.status() {
        CycleStatus::Idle => {
            cycle.arm();
            state.cue(Cue::Click);
            Ok(())
        }
        CycleStatus::Arming => Err(Rejection::StillArming),
        CycleStatus::Armed => {
            cycle.defuse();
            debug!(bomb = slot.label(), "defused");
            state.cue(Cue::Upgrade);
            let text = match slot {
                BombSlot::Single => "Bomb defused!",
                BombSlot::Dual => "2 bombs defused!",
            };
            state.notice(text, Tone::Success);
            state.cycle_mut(slot).arm();
            Ok(())
        }
    }
}

/// Tap the death button: lowers the meter by one percent.
pub fn tap_death(state: &mut ClickerState) -> Result<(), Rejection> {
    let result = ensure_penalties_live(state).map(|()| {
        state.death_percent = state.death_percent.saturating_sub(1);
        state.cue(Cue::Click);
    });
    settle(state, result)
}

// ── Time ────────────────────────────────────────────────────────

/// Advance the game by `delta_ticks` base ticks.
pub fn tick(state: &mut ClickerState, delta_ticks: u32) {
    for _ in 0..delta_ticks {
        if !state.is_running() {
            return;
        }
        state.total_ticks += 1;
        step(state);
    }
}

/// One base tick. Stops as soon as the run ends so nothing later in the
/// order can mutate a finished game.
fn step(state: &mut ClickerState) {
    tick_countdown(state);
    if state.game_ended {
        return;
    }
    tick_cooldown(state);
    for slot in [BombSlot::Single, BombSlot::Dual] {
        tick_bomb(state, slot);
        if state.game_ended {
            return;
        }
    }
    tick_death(state);
}

fn tick_countdown(state: &mut ClickerState) {
    if !fires(&mut state.timers.countdown) {
        return;
    }
    if state.countdown_remaining > 0 {
        state.countdown_remaining -= 1;
        if state.countdown_remaining > 0
            && state.countdown_remaining <= state.config.warning_threshold
        {
            state.cue(Cue::Tick);
        }
    }
    check_loss(state);
}

fn tick_cooldown(state: &mut ClickerState) {
    if !fires(&mut state.timers.cooldown) {
        return;
    }
    if state.cooldown_remaining > 0 {
        state.cooldown_remaining -= 1;
    } else {
        state.click_ready = true;
        state.timers.cooldown = None;
    }
}

fn tick_bomb(state: &mut ClickerState, slot: BombSlot) {
    match state.cycle_mut(slot).advance() {
        CycleTransition::None => {}
        CycleTransition::Armed => debug!(bomb = slot.label(), "armed"),
        CycleTransition::Expired => {
            let penalty = state.cycle(slot).config.penalty_secs;
            debug!(bomb = slot.label(), penalty, "expired");
            state.apply_time_penalty(penalty);
            state.cue(Cue::Error);
            state.notice(format!("-{}s ({})", penalty, slot.label()), Tone::Error);
            check_loss(state);
            if !state.game_ended {
                state.cycle_mut(slot).arm();
            }
        }
    }
}

fn tick_death(state: &mut ClickerState) {
    if !fires(&mut state.timers.death) {
        return;
    }
    let max = state.config.death_max;
    state.death_percent = state
        .death_percent
        .saturating_add(state.config.death_rate)
        .min(max);
    if state.death_percent >= max {
        state.timers.death = None;
        state.countdown_remaining = 0;
        handle_loss(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::clicker::config::GameConfig;
    use crate::games::clicker::timers::TICKS_PER_SEC;

    fn started(hard_mode: bool) -> ClickerState {
        let mut state = ClickerState::new(GameConfig::default());
        state.hard_mode = hard_mode;
        start_game(&mut state);
        state.drain_notifications();
        state
    }

    fn seconds(state: &mut ClickerState, secs: u32) {
        tick(state, secs * TICKS_PER_SEC);
    }

    fn cues(state: &mut ClickerState) -> Vec<Cue> {
        state
            .drain_notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Cue(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    // ── start_game ──────────────────────────────────────────────

    #[test]
    fn start_game_resets_economy() {
        let mut state = started(false);
        state.points = 500;
        state.points_available = 9;
        state.cooldown_seconds = 2;
        state.time_upgrades_used = 2;
        state.win_used = 1;
        state.game_ended = true;
        start_game(&mut state);

        assert!(state.is_running());
        assert_eq!(state.points, 0);
        assert_eq!(state.points_available, 1);
        assert_eq!(state.cooldown_seconds, 5);
        assert_eq!(state.countdown_remaining, 60);
        assert_eq!(state.time_upgrades_used, 0);
        assert_eq!(state.win_used, 0);
        assert_eq!(state.outcome, None);
    }

    #[test]
    fn start_game_easy_mode_leaves_penalties_idle() {
        let state = started(false);
        assert_eq!(state.bomb.status(), CycleStatus::Idle);
        assert_eq!(state.dual_bomb.status(), CycleStatus::Idle);
        assert!(state.timers.death.is_none());
        assert!(state.timers.countdown.is_some());
    }

    #[test]
    fn start_game_hard_mode_arms_everything() {
        let state = started(true);
        assert_eq!(state.bomb.status(), CycleStatus::Arming);
        assert_eq!(state.dual_bomb.status(), CycleStatus::Arming);
        assert!(state.timers.death.is_some());
    }

    #[test]
    fn start_game_announces_target() {
        let mut state = ClickerState::new(GameConfig::default());
        start_game(&mut state);
        let notes = state.drain_notifications();
        assert!(matches!(
            &notes[0],
            Notification::Notice { text, tone: Tone::Success } if text.contains("1000")
        ));
    }

    // ── countdown ───────────────────────────────────────────────

    #[test]
    fn countdown_decrements_once_per_second() {
        let mut state = started(false);
        seconds(&mut state, 1);
        assert_eq!(state.countdown_remaining, 59);
        tick(&mut state, TICKS_PER_SEC - 1);
        assert_eq!(state.countdown_remaining, 59);
        tick(&mut state, 1);
        assert_eq!(state.countdown_remaining, 58);
    }

    #[test]
    fn countdown_reaching_zero_loses() {
        let mut state = started(false);
        seconds(&mut state, 60);
        assert_eq!(state.countdown_remaining, 0);
        assert!(state.game_ended);
        assert_eq!(state.outcome, Some(Outcome::Lost));
        assert!(state.timers.countdown.is_none());
    }

    #[test]
    fn countdown_warning_ticks_in_final_seconds() {
        let mut state = started(false);
        seconds(&mut state, 49);
        assert!(!cues(&mut state).contains(&Cue::Tick));
        seconds(&mut state, 1); // 10 left
        assert_eq!(cues(&mut state), vec![Cue::Tick]);
    }

    #[test]
    fn nothing_moves_before_start() {
        let mut state = ClickerState::new(GameConfig::default());
        seconds(&mut state, 10);
        assert_eq!(state.countdown_remaining, 60);
        assert_eq!(state.total_ticks, 0);
    }

    #[test]
    fn nothing_moves_after_end() {
        let mut state = started(true);
        handle_loss(&mut state);
        let before = state.snapshot();
        seconds(&mut state, 30);
        assert_eq!(state.snapshot(), before);
    }

    // ── primary click / cooldown ────────────────────────────────

    #[test]
    fn click_awards_points_and_starts_cooldown() {
        let mut state = started(false);
        assert_eq!(primary_click(&mut state), ClickOutcome::Scored(1));
        assert_eq!(state.points, 1);
        assert!(!state.click_ready);
        assert_eq!(state.cooldown_remaining, 4);
        assert!(state.timers.cooldown.is_some());

        seconds(&mut state, 4);
        assert!(!state.click_ready);
        seconds(&mut state, 1);
        assert!(state.click_ready);
        assert!(state.timers.cooldown.is_none());
    }

    #[test]
    fn second_immediate_click_is_penalized() {
        let mut state = started(false);
        primary_click(&mut state);
        state.drain_notifications();
        assert_eq!(primary_click(&mut state), ClickOutcome::Penalized(5));
        assert_eq!(state.points, 1);
        assert_eq!(state.countdown_remaining, 55);
        assert_eq!(cues(&mut state), vec![Cue::Error]);
    }

    #[test]
    fn penalty_to_zero_loses() {
        let mut state = started(false);
        state.countdown_remaining = 4;
        primary_click(&mut state);
        primary_click(&mut state);
        assert_eq!(state.countdown_remaining, 0);
        assert!(state.game_ended);
        assert_eq!(state.outcome, Some(Outcome::Lost));
    }

    #[test]
    fn click_ignored_when_not_running() {
        let mut state = ClickerState::new(GameConfig::default());
        assert_eq!(primary_click(&mut state), ClickOutcome::Ignored);
        assert_eq!(state.points, 0);

        let mut state = started(false);
        handle_loss(&mut state);
        assert_eq!(primary_click(&mut state), ClickOutcome::Ignored);
        assert_eq!(state.points, 0);
    }

    #[test]
    fn min_cooldown_click_is_ready_after_one_second() {
        let mut state = started(false);
        state.cooldown_seconds = 1;
        primary_click(&mut state);
        assert_eq!(state.cooldown_remaining, 0);
        seconds(&mut state, 1);
        assert!(state.click_ready);
    }

    #[test]
    fn click_uses_current_power() {
        let mut state = started(false);
        state.points_available = 7;
        primary_click(&mut state);
        assert_eq!(state.points, 7);
    }

    // ── upgrades ────────────────────────────────────────────────

    #[test]
    fn buy_click_power_success() {
        let mut state = started(false);
        state.points = 2;
        assert_eq!(buy_click_power(&mut state), Ok(()));
        assert_eq!(state.points, 0);
        assert_eq!(state.points_available, 2);
        assert_eq!(cues(&mut state), vec![Cue::Upgrade]);
    }

    #[test]
    fn buy_click_power_caps_at_fifty() {
        let mut state = started(false);
        state.points = 1_000;
        while state.points_available < 50 {
            buy_click_power(&mut state).unwrap();
        }
        let points = state.points;
        assert_eq!(buy_click_power(&mut state), Err(Rejection::ClickPowerMaxed));
        assert_eq!(state.points, points);

        state.points = 1_000_000;
        assert_eq!(buy_click_power(&mut state), Err(Rejection::ClickPowerMaxed));
    }

    #[test]
    fn buy_click_power_insufficient() {
        let mut state = started(false);
        state.points = 1;
        assert_eq!(
            buy_click_power(&mut state),
            Err(Rejection::InsufficientPoints { needed: 2, have: 1 })
        );
        assert_eq!(state.points_available, 1);
        assert_eq!(cues(&mut state), vec![Cue::Error]);
    }

    #[test]
    fn cap_is_checked_before_running() {
        let mut state = started(false);
        state.points_available = 50;
        handle_loss(&mut state);
        assert_eq!(buy_click_power(&mut state), Err(Rejection::ClickPowerMaxed));
    }

    #[test]
    fn upgrades_rejected_after_end() {
        let mut state = started(false);
        state.points = 10_000;
        handle_loss(&mut state);
        assert_eq!(buy_click_power(&mut state), Err(Rejection::NotRunning));
        assert_eq!(reduce_cooldown(&mut state), Err(Rejection::NotRunning));
        assert_eq!(add_time(&mut state), Err(Rejection::NotRunning));
        assert_eq!(win_instant(&mut state), Err(Rejection::NotRunning));
        assert_eq!(state.points, 10_000);
    }

    #[test]
    fn reduce_cooldown_until_minimum() {
        let mut state = started(false);
        state.points = 100;
        for expected in (1..5).rev() {
            reduce_cooldown(&mut state).unwrap();
            assert_eq!(state.cooldown_seconds, expected);
        }
        assert_eq!(state.points, 80);
        assert_eq!(
            reduce_cooldown(&mut state),
            Err(Rejection::CooldownAtMinimum)
        );
        assert_eq!(state.cooldown_upgrades_bought(), 4);
    }

    #[test]
    fn reduce_cooldown_insufficient() {
        let mut state = started(false);
        state.points = 4;
        assert_eq!(
            reduce_cooldown(&mut state),
            Err(Rejection::InsufficientPoints { needed: 5, have: 4 })
        );
        assert_eq!(state.cooldown_seconds, 5);
    }

    #[test]
    fn add_time_three_times_then_exhausted() {
        let mut state = started(false);
        state.points = 400;
        for _ in 0..3 {
            add_time(&mut state).unwrap();
        }
        assert_eq!(state.countdown_remaining, 90);
        assert_eq!(state.points, 100);
        assert_eq!(add_time(&mut state), Err(Rejection::TimeUpgradesExhausted));
        assert_eq!(state.countdown_remaining, 90);
    }

    #[test]
    fn add_time_saturates_instead_of_overflowing() {
        let config = GameConfig {
            extra_time: u32::MAX,
            add_time_cost: 0,
            ..GameConfig::default()
        };
        let mut state = ClickerState::new(config);
        start_game(&mut state);
        add_time(&mut state).unwrap();
        add_time(&mut state).unwrap();
        assert_eq!(state.countdown_remaining, u32::MAX);
        assert!(state.is_running());
    }

    #[test]
    fn win_instant_once() {
        let mut state = started(false);
        state.points = 1_000;
        assert_eq!(win_instant(&mut state), Ok(()));
        assert!(state.game_ended);
        assert_eq!(state.win_used, 1);
        assert_eq!(state.points, 0);
        assert_eq!(state.outcome, Some(Outcome::Won));

        let notes = state.drain_notifications();
        assert!(notes.contains(&Notification::Cue(Cue::Win)));
        assert!(notes.contains(&Notification::Won));

        state.points = 1_000;
        assert_eq!(win_instant(&mut state), Err(Rejection::WinAlreadyUsed));
        let notes = state.drain_notifications();
        assert!(notes.iter().any(|n| matches!(
            n,
            Notification::Notice { text, .. } if text.contains("already used")
        )));
    }

    #[test]
    fn win_instant_insufficient() {
        let mut state = started(false);
        state.points = 999;
        assert_eq!(
            win_instant(&mut state),
            Err(Rejection::InsufficientPoints { needed: 1_000, have: 999 })
        );
        assert!(!state.game_ended);
    }

    #[test]
    fn win_clears_all_timers() {
        let mut state = started(true);
        state.points = 1_000;
        primary_click(&mut state);
        win_instant(&mut state).unwrap();
        assert!(state.timers.countdown.is_none());
        assert!(state.timers.cooldown.is_none());
        assert!(state.timers.death.is_none());
        assert!(!state.bomb.is_active());
        assert!(!state.dual_bomb.is_active());
    }

    // ── hard mode selection ─────────────────────────────────────

    #[test]
    fn hard_mode_only_between_runs() {
        let mut state = ClickerState::new(GameConfig::default());
        assert_eq!(set_hard_mode(&mut state, true), Ok(()));
        assert!(state.hard_mode);

        start_game(&mut state);
        assert_eq!(set_hard_mode(&mut state, false), Err(Rejection::HardModeLocked));
        assert!(state.hard_mode);

        handle_loss(&mut state);
        assert_eq!(set_hard_mode(&mut state, false), Ok(()));
        assert!(!state.hard_mode);
    }

    #[test]
    fn hard_mode_toggle_plays_click_cue() {
        let mut state = ClickerState::new(GameConfig::default());
        assert_eq!(set_hard_mode(&mut state, true), Ok(()));
        assert_eq!(cues(&mut state), vec![Cue::Click]);

        start_game(&mut state);
        state.drain_notifications();
        assert_eq!(set_hard_mode(&mut state, false), Err(Rejection::HardModeLocked));
        assert_eq!(cues(&mut state), vec![Cue::Error]);
    }

    #[test]
    fn hard_mode_survives_restart() {
        let mut state = started(true);
        handle_loss(&mut state);
        start_game(&mut state);
        assert!(state.hard_mode);
        assert_eq!(state.bomb.status(), CycleStatus::Arming);
    }

    // ── bombs ───────────────────────────────────────────────────

    #[test]
    fn bomb_tap_rejected_in_easy_mode() {
        let mut state = started(false);
        assert_eq!(
            tap_bomb(&mut state, BombSlot::Single),
            Err(Rejection::PenaltiesDisabled)
        );
        assert_eq!(tap_death(&mut state), Err(Rejection::PenaltiesDisabled));
    }

    #[test]
    fn bomb_tap_while_arming_is_rejected() {
        let mut state = started(true);
        assert_eq!(
            tap_bomb(&mut state, BombSlot::Single),
            Err(Rejection::StillArming)
        );
        assert_eq!(state.bomb.status(), CycleStatus::Arming);
    }

    #[test]
    fn bomb_defused_in_window_restarts_arming_without_penalty() {
        let mut state = started(true);
        seconds(&mut state, 3);
        assert_eq!(state.bomb.status(), CycleStatus::Armed);
        let countdown = state.countdown_remaining;

        tick(&mut state, 5);
        assert_eq!(tap_bomb(&mut state, BombSlot::Single), Ok(()));
        assert_eq!(state.bomb.status(), CycleStatus::Arming);
        assert!((state.bomb.arming_remaining_secs() - 3.0).abs() < 1e-9);

        // Full window length later there is still no penalty
        seconds(&mut state, 1);
        assert_eq!(state.countdown_remaining, countdown - 1);
    }

    #[test]
    fn dual_bomb_defused_in_window_rearms_without_penalty() {
        let mut state = started(true);
        state.bomb.reset();
        state.timers.death = None;
        seconds(&mut state, 5);
        assert_eq!(state.dual_bomb.status(), CycleStatus::Armed);
        let countdown = state.countdown_remaining;
        state.drain_notifications();

        tick(&mut state, 5);
        assert_eq!(tap_bomb(&mut state, BombSlot::Dual), Ok(()));
        assert_eq!(state.dual_bomb.status(), CycleStatus::Arming);
        assert!((state.dual_bomb.arming_remaining_secs() - 5.0).abs() < 1e-9);

        let notes = state.drain_notifications();
        assert!(notes.contains(&Notification::Cue(Cue::Upgrade)));
        assert!(notes.contains(&Notification::Notice {
            text: "2 bombs defused!".into(),
            tone: Tone::Success,
        }));

        seconds(&mut state, 1);
        assert_eq!(state.countdown_remaining, countdown - 1);
        assert!(!state
            .drain_notifications()
            .iter()
            .any(|n| matches!(n, Notification::Notice { text, .. } if text.contains("(2 bombs)"))));
    }

    #[test]
    fn bomb_expiry_penalizes_once_and_rearms() {
        let mut state = started(true);
        seconds(&mut state, 3);
        assert_eq!(state.bomb.status(), CycleStatus::Armed);
        assert_eq!(state.countdown_remaining, 57);
        state.drain_notifications();

        seconds(&mut state, 1);
        // one countdown second plus the 3s bomb penalty
        assert_eq!(state.countdown_remaining, 53);
        assert_eq!(state.bomb.status(), CycleStatus::Arming);

        let penalties = state
            .drain_notifications()
            .into_iter()
            .filter(|n| matches!(n, Notification::Notice { text, .. } if text.contains("(bomb)")))
            .count();
        assert_eq!(penalties, 1);
    }

    #[test]
    fn dual_bomb_expiry_costs_five_seconds() {
        let mut state = started(true);
        // Keep the single bomb defused so only the dual bomb penalizes
        state.bomb.reset();
        seconds(&mut state, 5);
        assert_eq!(state.dual_bomb.status(), CycleStatus::Armed);
        assert_eq!(state.countdown_remaining, 55);
        seconds(&mut state, 1);
        assert_eq!(state.countdown_remaining, 49);
        assert_eq!(state.dual_bomb.status(), CycleStatus::Arming);
    }

    #[test]
    fn bomb_penalty_can_end_the_game() {
        let mut state = started(true);
        state.dual_bomb.reset();
        state.timers.death = None;
        seconds(&mut state, 3);
        state.countdown_remaining = 2;
        seconds(&mut state, 1);
        assert!(state.game_ended);
        assert_eq!(state.countdown_remaining, 0);
        // Not re-armed after the loss
        assert!(!state.bomb.is_active());
    }

    #[test]
    fn tapping_idle_bomb_starts_arming() {
        let mut state = started(true);
        state.bomb.reset();
        assert_eq!(tap_bomb(&mut state, BombSlot::Single), Ok(()));
        assert_eq!(state.bomb.status(), CycleStatus::Arming);
        assert_eq!(cues(&mut state), vec![Cue::Click]);
    }

    // ── death meter ─────────────────────────────────────────────

    #[test]
    fn death_meter_rises_one_percent_per_second() {
        let mut state = started(true);
        state.bomb.reset();
        state.dual_bomb.reset();
        seconds(&mut state, 10);
        assert_eq!(state.death_percent, 10);
    }

    #[test]
    fn death_tap_lowers_meter_floored_at_zero() {
        let mut state = started(true);
        state.death_percent = 1;
        assert_eq!(tap_death(&mut state), Ok(()));
        assert_eq!(state.death_percent, 0);
        assert_eq!(tap_death(&mut state), Ok(()));
        assert_eq!(state.death_percent, 0);
    }

    #[test]
    fn death_meter_full_loses_exactly_once() {
        let mut state = started(true);
        state.bomb.reset();
        state.dual_bomb.reset();
        state.countdown_remaining = 500;
        state.death_percent = 99;
        seconds(&mut state, 1);

        assert_eq!(state.death_percent, 100);
        assert_eq!(state.countdown_remaining, 0);
        assert!(state.game_ended);
        assert!(state.timers.death.is_none());

        handle_loss(&mut state);
        let losses = state
            .drain_notifications()
            .into_iter()
            .filter(|n| matches!(n, Notification::Lost { .. }))
            .count();
        assert_eq!(losses, 1);
    }

    #[test]
    fn same_tick_failures_resolve_in_order() {
        let mut state = started(true);
        state.timers.death = None;
        // Bomb window and countdown both land on the same tick
        seconds(&mut state, 3);
        state.countdown_remaining = 1;
        state.drain_notifications();
        seconds(&mut state, 1);

        assert!(state.game_ended);
        let notes = state.drain_notifications();
        // Countdown ended the game first; the bomb never got to penalize
        assert!(!notes.iter().any(|n| matches!(
            n,
            Notification::Notice { text, .. } if text.contains("(bomb)")
        )));
        assert_eq!(
            notes.iter().filter(|n| matches!(n, Notification::Lost { .. })).count(),
            1
        );
    }

    #[test]
    fn death_meter_and_bomb_same_tick_single_loss() {
        let mut state = started(true);
        state.dual_bomb.reset();
        state.countdown_remaining = 500;
        // Death meter fills on the 4s tick, the same tick the bomb window expires
        state.death_percent = 96;
        seconds(&mut state, 3);
        assert_eq!(state.bomb.status(), CycleStatus::Armed);
        assert_eq!(state.death_percent, 99);
        assert!(state.is_running());
        state.drain_notifications();

        seconds(&mut state, 1);
        assert!(state.game_ended);
        assert_eq!(state.outcome, Some(Outcome::Lost));
        assert_eq!(state.death_percent, 100);
        assert_eq!(state.countdown_remaining, 0);

        let notes = state.drain_notifications();
        let penalty_at = notes
            .iter()
            .position(|n| matches!(n, Notification::Notice { text, .. } if text == "-3s (bomb)"));
        let lost_at = notes
            .iter()
            .position(|n| matches!(n, Notification::Lost { .. }));
        // Bomb is processed before the death meter
        assert!(penalty_at.is_some());
        assert!(penalty_at < lost_at);
        assert_eq!(
            notes.iter().filter(|n| matches!(n, Notification::Lost { .. })).count(),
            1
        );
        assert_eq!(
            notes.iter().filter(|n| **n == Notification::Cue(Cue::Whistle)).count(),
            1
        );
    }

    #[test]
    fn loss_reports_points() {
        let mut state = started(false);
        state.points = 321;
        handle_loss(&mut state);
        assert!(state
            .drain_notifications()
            .contains(&Notification::Lost { points: 321 }));
    }
}
