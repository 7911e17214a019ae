/// Minute Clicker game state definitions.

use super::config::GameConfig;
use super::timers::{ArmingCycle, CycleStatus, Interval};

/// The death meter's fill is drawn as "danger" from this percentage up.
pub const DEATH_DANGER_PERCENT: u32 = 80;

/// Sound cue names. The engine only says which one fired; the
/// presentation decides what (if anything) it sounds or looks like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Click,
    Upgrade,
    Error,
    Win,
    Tick,
    Whistle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
    Info,
}

/// Everything the engine tells the presentation layer, in emission order.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    Cue(Cue),
    Notice { text: String, tone: Tone },
    Won,
    Lost { points: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

/// Purchasable upgrades, in button order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upgrade {
    ClickPower,
    ReduceCooldown,
    AddTime,
    Win,
}

impl Upgrade {
    pub fn all() -> &'static [Upgrade] {
        &[
            Upgrade::ClickPower,
            Upgrade::ReduceCooldown,
            Upgrade::AddTime,
            Upgrade::Win,
        ]
    }

    pub fn name(&self) -> &str {
        match self {
            Upgrade::ClickPower => "+1 point per click",
            Upgrade::ReduceCooldown => "-1s cooldown",
            Upgrade::AddTime => "+time",
            Upgrade::Win => "Instant win",
        }
    }

    pub fn cost(&self, config: &GameConfig) -> u64 {
        match self {
            Upgrade::ClickPower => config.add_point_cost,
            Upgrade::ReduceCooldown => config.reduce_cooldown_cost,
            Upgrade::AddTime => config.add_time_cost,
            Upgrade::Win => config.win_cost,
        }
    }
}

/// The two bomb-style penalty games.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BombSlot {
    Single,
    Dual,
}

impl BombSlot {
    pub fn label(&self) -> &str {
        match self {
            BombSlot::Single => "bomb",
            BombSlot::Dual => "2 bombs",
        }
    }
}

/// Intervals owned directly by the engine (bomb timers live in their cycle).
#[derive(Clone, Debug, Default)]
pub struct Timers {
    pub countdown: Option<Interval>,
    pub cooldown: Option<Interval>,
    pub death: Option<Interval>,
}

/// Read-only view of one bomb.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CycleView {
    pub status: CycleStatus,
    pub arming_remaining: f64,
    pub armed_remaining: f64,
    pub progress: f64,
}

impl From<&ArmingCycle> for CycleView {
    fn from(cycle: &ArmingCycle) -> Self {
        Self {
            status: cycle.status(),
            arming_remaining: cycle.arming_remaining_secs(),
            armed_remaining: cycle.armed_remaining_secs(),
            progress: cycle.progress(),
        }
    }
}

/// Read-only copy of everything the presentation needs after a mutation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snapshot {
    pub points: u64,
    pub points_available: u32,
    pub cooldown_seconds: u32,
    pub click_ready: bool,
    pub cooldown_remaining: u32,
    pub countdown_remaining: u32,
    pub game_started: bool,
    pub game_ended: bool,
    pub outcome: Option<Outcome>,
    pub time_upgrades_used: u32,
    pub win_used: u32,
    pub hard_mode: bool,
    pub bomb: CycleView,
    pub dual_bomb: CycleView,
    pub death_percent: u32,
}

/// Full state of a Minute Clicker run.
pub struct ClickerState {
    pub config: GameConfig,
    /// Spendable points.
    pub points: u64,
    /// Points awarded per click (click power).
    pub points_available: u32,
    /// Cooldown length applied after each click.
    pub cooldown_seconds: u32,
    pub click_ready: bool,
    /// Seconds left on the running cooldown.
    pub cooldown_remaining: u32,
    /// Seconds left before the run is lost.
    pub countdown_remaining: u32,
    pub game_started: bool,
    pub game_ended: bool,
    pub outcome: Option<Outcome>,
    pub time_upgrades_used: u32,
    pub win_used: u32,
    /// Penalty games enabled. Fixed for the duration of a run.
    pub hard_mode: bool,
    pub bomb: ArmingCycle,
    pub dual_bomb: ArmingCycle,
    pub death_percent: u32,
    pub timers: Timers,
    /// Base ticks processed while a run was live.
    pub total_ticks: u64,
    outbox: Vec<Notification>,
}

impl ClickerState {
    pub fn new(config: GameConfig) -> Self {
        Self {
            points: 0,
            points_available: 1,
            cooldown_seconds: config.cooldown_initial,
            click_ready: true,
            cooldown_remaining: 0,
            countdown_remaining: config.countdown_initial,
            game_started: false,
            game_ended: false,
            outcome: None,
            time_upgrades_used: 0,
            win_used: 0,
            hard_mode: false,
            bomb: ArmingCycle::new(config.bomb),
            dual_bomb: ArmingCycle::new(config.dual_bomb),
            death_percent: 0,
            timers: Timers::default(),
            total_ticks: 0,
            outbox: Vec::new(),
            config,
        }
    }

    /// Reinitialise every run field from the config. `hard_mode`, the
    /// config and undelivered notifications survive.
    pub fn reset_run(&mut self) {
        let config = self.config.clone();
        let hard_mode = self.hard_mode;
        let outbox = std::mem::take(&mut self.outbox);
        *self = Self::new(config);
        self.hard_mode = hard_mode;
        self.outbox = outbox;
    }

    /// Started and not yet won or lost.
    pub fn is_running(&self) -> bool {
        self.game_started && !self.game_ended
    }

    pub fn cycle(&self, slot: BombSlot) -> &ArmingCycle {
        match slot {
            BombSlot::Single => &self.bomb,
            BombSlot::Dual => &self.dual_bomb,
        }
    }

    pub fn cycle_mut(&mut self, slot: BombSlot) -> &mut ArmingCycle {
        match slot {
            BombSlot::Single => &mut self.bomb,
            BombSlot::Dual => &mut self.dual_bomb,
        }
    }

    /// Stop every running timer. Bomb phases stay visible.
    pub fn clear_timers(&mut self) {
        self.timers = Timers::default();
        self.bomb.halt();
        self.dual_bomb.halt();
    }

    /// Take `secs` off the countdown, floored at zero.
    pub fn apply_time_penalty(&mut self, secs: u32) {
        self.countdown_remaining = self.countdown_remaining.saturating_sub(secs);
    }

    pub fn cue(&mut self, cue: Cue) {
        self.outbox.push(Notification::Cue(cue));
    }

    pub fn notice(&mut self, text: impl Into<String>, tone: Tone) {
        self.outbox.push(Notification::Notice {
            text: text.into(),
            tone,
        });
    }

    pub fn notify(&mut self, notification: Notification) {
        self.outbox.push(notification);
    }

    /// Hand all pending notifications to the caller.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }

    #[cfg(test)]
    pub fn pending_notifications(&self) -> &[Notification] {
        &self.outbox
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            points: self.points,
            points_available: self.points_available,
            cooldown_seconds: self.cooldown_seconds,
            click_ready: self.click_ready,
            cooldown_remaining: self.cooldown_remaining,
            countdown_remaining: self.countdown_remaining,
            game_started: self.game_started,
            game_ended: self.game_ended,
            outcome: self.outcome,
            time_upgrades_used: self.time_upgrades_used,
            win_used: self.win_used,
            hard_mode: self.hard_mode,
            bomb: CycleView::from(&self.bomb),
            dual_bomb: CycleView::from(&self.dual_bomb),
            death_percent: self.death_percent,
        }
    }

    // ── Derived display values ──────────────────────────────────

    /// Progress toward the instant-win cost, 0..=100.
    pub fn win_progress(&self) -> f64 {
        (self.points as f64 / self.config.win_cost.max(1) as f64 * 100.0).min(100.0)
    }

    /// Click power progress toward the cap, 0..=100.
    pub fn click_power_progress(&self) -> f64 {
        let max = self.config.max_click_power;
        if max <= 1 {
            return 100.0;
        }
        (self.points_available - 1) as f64 / (max - 1) as f64 * 100.0
    }

    pub fn cooldown_upgrades_bought(&self) -> u32 {
        self.config.cooldown_initial - self.cooldown_seconds
    }

    pub fn death_in_danger(&self) -> bool {
        self.death_percent >= DEATH_DANGER_PERCENT
    }

    /// True when the upgrade's button would currently succeed.
    pub fn can_buy(&self, upgrade: Upgrade) -> bool {
        let capped = match upgrade {
            Upgrade::ClickPower => self.points_available >= self.config.max_click_power,
            Upgrade::ReduceCooldown => self.cooldown_seconds <= self.config.min_cooldown,
            Upgrade::AddTime => self.time_upgrades_used >= self.config.max_time_upgrades,
            Upgrade::Win => self.win_used >= self.config.max_win_uses,
        };
        !capped && self.is_running() && self.points >= upgrade.cost(&self.config)
    }
}
