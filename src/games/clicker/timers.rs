//! Periodic intervals and the arming cycle shared by both bombs.
//!
//! All timing is expressed in base ticks of [`TICK_MS`]. The host feeds
//! whole ticks in; an [`Interval`] fires once every `period` ticks, the
//! same way a browser `setInterval` fires one full period after it starts.

use super::config::CycleConfig;

/// Length of one engine tick. 50ms is the finest step any timer needs
/// (the bomb defuse window).
pub const TICK_MS: u32 = 50;
pub const TICKS_PER_SEC: u32 = 1_000 / TICK_MS;

/// Arming progress is counted down in 100ms steps.
pub const ARMING_STEP_MS: u32 = 100;
/// The defuse window is counted down in 50ms steps.
pub const ARMED_STEP_MS: u32 = 50;

/// A repeating timer measured in base ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct Interval {
    period: u32,
    elapsed: u32,
}

impl Interval {
    pub fn every_ms(period_ms: u32) -> Self {
        Self {
            period: (period_ms / TICK_MS).max(1),
            elapsed: 0,
        }
    }

    pub fn every_secs(secs: u32) -> Self {
        Self::every_ms(secs * 1_000)
    }

    /// Advance by one base tick. Returns true when the interval fires.
    pub fn advance(&mut self) -> bool {
        self.elapsed += 1;
        if self.elapsed >= self.period {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }
}

/// Advance an optional interval; a cleared (`None`) interval never fires.
pub fn fires(interval: &mut Option<Interval>) -> bool {
    interval.as_mut().is_some_and(Interval::advance)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleStatus {
    Idle,
    Arming,
    Armed,
}

/// What happened to a cycle during one tick. The engine consumes this and
/// decides on penalties and re-arming; the cycle never restarts itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleTransition {
    None,
    /// Arming finished; the defuse window just opened.
    Armed,
    /// The defuse window ran out. The cycle is back to Idle.
    Expired,
}

/// `Idle → Arming → Armed → Idle`, parametrised by [`CycleConfig`].
#[derive(Clone, Debug)]
pub struct ArmingCycle {
    pub config: CycleConfig,
    status: CycleStatus,
    arming_remaining_ms: u32,
    armed_remaining_ms: u32,
    timer: Option<Interval>,
}

impl ArmingCycle {
    pub fn new(config: CycleConfig) -> Self {
        Self {
            config,
            status: CycleStatus::Idle,
            arming_remaining_ms: 0,
            armed_remaining_ms: 0,
            timer: None,
        }
    }

    pub fn status(&self) -> CycleStatus {
        self.status
    }

    /// True while an interval is running for this cycle.
    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Start (or restart) the arming phase from the full duration.
    pub fn arm(&mut self) {
        self.status = CycleStatus::Arming;
        self.arming_remaining_ms = self.config.arming_ms;
        self.armed_remaining_ms = 0;
        self.timer = Some(Interval::every_ms(ARMING_STEP_MS));
    }

    /// Advance by one base tick.
    pub fn advance(&mut self) -> CycleTransition {
        if !fires(&mut self.timer) {
            return CycleTransition::None;
        }
        match self.status {
            CycleStatus::Idle => CycleTransition::None,
            CycleStatus::Arming => {
                self.arming_remaining_ms = self.arming_remaining_ms.saturating_sub(ARMING_STEP_MS);
                if self.arming_remaining_ms > 0 {
                    return CycleTransition::None;
                }
                self.status = CycleStatus::Armed;
                self.armed_remaining_ms = self.config.armed_ms;
                self.timer = Some(Interval::every_ms(ARMED_STEP_MS));
                CycleTransition::Armed
            }
            CycleStatus::Armed => {
                self.armed_remaining_ms = self.armed_remaining_ms.saturating_sub(ARMED_STEP_MS);
                if self.armed_remaining_ms > 0 {
                    return CycleTransition::None;
                }
                self.reset();
                CycleTransition::Expired
            }
        }
    }

    /// Defuse during the armed window. Returns false (and changes nothing)
    /// in any other phase.
    pub fn defuse(&mut self) -> bool {
        if self.status != CycleStatus::Armed {
            return false;
        }
        self.reset();
        true
    }

    /// Back to Idle with no timer.
    pub fn reset(&mut self) {
        self.status = CycleStatus::Idle;
        self.arming_remaining_ms = 0;
        self.armed_remaining_ms = 0;
        self.timer = None;
    }

    /// Stop the timer but keep the phase visible (used when the game ends).
    pub fn halt(&mut self) {
        self.timer = None;
    }

    pub fn arming_remaining_secs(&self) -> f64 {
        self.arming_remaining_ms as f64 / 1_000.0
    }

    pub fn armed_remaining_secs(&self) -> f64 {
        self.armed_remaining_ms as f64 / 1_000.0
    }

    /// 0.0..=1.0 fill for the current phase: arming fills up, the armed
    /// window drains.
    pub fn progress(&self) -> f64 {
        match self.status {
            CycleStatus::Idle => 0.0,
            CycleStatus::Arming => {
                let total = self.config.arming_ms as f64;
                (total - self.arming_remaining_ms as f64) / total
            }
            CycleStatus::Armed => self.armed_remaining_ms as f64 / self.config.armed_ms as f64,
        }
    }
}
