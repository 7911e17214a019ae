/// Minute Clicker — reach the win cost before the countdown runs out.

pub mod actions;
pub mod config;
pub mod logic;
pub mod render;
pub mod state;
pub mod timers;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::games::Game;
use crate::input::{ClickState, InputEvent};

use config::GameConfig;
use state::{BombSlot, ClickerState, Cue, Notification, Tone};

/// Log entry shown in the message panel.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub tone: Tone,
    pub is_important: bool,
}

/// Presentation-only state: flashes standing in for sound cues, the mute
/// toggle and the message log. Nothing here feeds back into the engine.
pub struct ClickerView {
    pub muted: bool,
    pub log: Vec<LogEntry>,
    /// Ticks of highlight left on the main button.
    pub click_flash: u32,
    /// Ticks of highlight left on the upgrade panel.
    pub upgrade_flash: u32,
    /// Ticks of red border after an error or penalty.
    pub error_flash: u32,
    /// Ticks of the countdown "tick" blink.
    pub tick_flash: u32,
    pub last_cue: Option<Cue>,
    /// Incremented every tick for simple animations.
    pub anim_frame: u32,
}

impl ClickerView {
    pub fn new() -> Self {
        Self {
            muted: false,
            log: vec![LogEntry {
                text: "1000 in a minute! Press [S] to start.".into(),
                tone: Tone::Info,
                is_important: true,
            }],
            click_flash: 0,
            upgrade_flash: 0,
            error_flash: 0,
            tick_flash: 0,
            last_cue: None,
            anim_frame: 0,
        }
    }

    pub fn add_log(&mut self, text: &str, tone: Tone, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            tone,
            is_important,
        });
        if self.log.len() > 50 {
            self.log.remove(0);
        }
    }

    fn play(&mut self, cue: Cue) {
        self.last_cue = Some(cue);
        if self.muted {
            return;
        }
        match cue {
            Cue::Click => self.click_flash = 2,
            Cue::Upgrade => self.upgrade_flash = 4,
            Cue::Error | Cue::Whistle => self.error_flash = 6,
            Cue::Tick => self.tick_flash = 4,
            Cue::Win => self.upgrade_flash = 10,
        }
    }

    fn decay(&mut self, delta_ticks: u32) {
        self.anim_frame = self.anim_frame.wrapping_add(delta_ticks);
        self.click_flash = self.click_flash.saturating_sub(delta_ticks);
        self.upgrade_flash = self.upgrade_flash.saturating_sub(delta_ticks);
        self.error_flash = self.error_flash.saturating_sub(delta_ticks);
        self.tick_flash = self.tick_flash.saturating_sub(delta_ticks);
    }

    /// Consume engine notifications.
    pub fn absorb(&mut self, notifications: Vec<Notification>, win_cost: u64) {
        for notification in notifications {
            match notification {
                Notification::Cue(cue) => self.play(cue),
                Notification::Notice { text, tone } => self.add_log(&text, tone, false),
                Notification::Won => {
                    self.add_log("🏆 VICTORY! You won the game!", Tone::Success, true);
                    self.add_log("Press [S] to play again.", Tone::Info, false);
                }
                Notification::Lost { points } => {
                    self.add_log("⏰ Time's up!", Tone::Error, true);
                    self.add_log(
                        &format!("Points reached: {}/{}", points, win_cost),
                        Tone::Info,
                        false,
                    );
                    self.add_log("Press [S] to try again.", Tone::Info, false);
                }
            }
        }
    }
}

pub struct ClickerGame {
    pub state: ClickerState,
    pub view: ClickerView,
}

impl ClickerGame {
    pub fn new(config: GameConfig) -> Self {
        Self {
            state: ClickerState::new(config),
            view: ClickerView::new(),
        }
    }

    fn flush(&mut self) {
        let notifications = self.state.drain_notifications();
        let win_cost = self.state.config.win_cost;
        self.view.absorb(notifications, win_cost);
    }

    fn dispatch(&mut self, action_id: u16) -> bool {
        let state = &mut self.state;
        // Rejections already surface as notices; nothing else to do here.
        let _ = match action_id {
            actions::PRIMARY_CLICK => {
                logic::primary_click(state);
                Ok(())
            }
            actions::BUY_CLICK_POWER => logic::buy_click_power(state),
            actions::REDUCE_COOLDOWN => logic::reduce_cooldown(state),
            actions::ADD_TIME => logic::add_time(state),
            actions::WIN_INSTANT => logic::win_instant(state),
            actions::TAP_BOMB => logic::tap_bomb(state, BombSlot::Single),
            actions::TAP_DUAL_BOMB => logic::tap_bomb(state, BombSlot::Dual),
            actions::TAP_DEATH => logic::tap_death(state),
            actions::START_GAME => {
                if state.is_running() {
                    return false;
                }
                logic::start_game(state);
                Ok(())
            }
            actions::TOGGLE_HARD_MODE => {
                let enabled = !state.hard_mode;
                logic::set_hard_mode(state, enabled)
            }
            actions::TOGGLE_MUTE => {
                self.view.muted = !self.view.muted;
                let text = if self.view.muted { "Sound off" } else { "Sound on" };
                self.view.add_log(text, Tone::Info, false);
                Ok(())
            }
            _ => return false,
        };
        self.flush();
        true
    }
}

/// Keyboard shortcuts, mirroring the bracketed hints in the UI.
fn key_to_action(key: char) -> Option<u16> {
    match key {
        ' ' | 'c' => Some(actions::PRIMARY_CLICK),
        '1' => Some(actions::BUY_CLICK_POWER),
        '2' => Some(actions::REDUCE_COOLDOWN),
        '3' => Some(actions::ADD_TIME),
        '4' => Some(actions::WIN_INSTANT),
        'b' => Some(actions::TAP_BOMB),
        'n' => Some(actions::TAP_DUAL_BOMB),
        'd' => Some(actions::TAP_DEATH),
        's' | 'r' => Some(actions::START_GAME),
        'h' => Some(actions::TOGGLE_HARD_MODE),
        'm' => Some(actions::TOGGLE_MUTE),
        _ => None,
    }
}

impl Game for ClickerGame {
    fn handle_input(&mut self, event: &InputEvent) -> bool {
        let action_id = match event {
            InputEvent::Key(c) => match key_to_action(c.to_ascii_lowercase()) {
                Some(id) => id,
                None => return false,
            },
            InputEvent::Click(id) => *id,
        };
        self.dispatch(action_id)
    }

    fn tick(&mut self, delta_ticks: u32) {
        logic::tick(&mut self.state, delta_ticks);
        self.view.decay(delta_ticks);
        self.flush();
    }

    fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(&self.state, &self.view, f, area, click_state);
    }
}
