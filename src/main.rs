mod games;
mod input;
mod logging;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use log::Level;
use tracing::{debug, info};

use games::clicker::config::load_config;
use games::clicker::timers::TICKS_PER_SEC;
use games::clicker::ClickerGame;
use games::Game;
use input::{ClickState, InputEvent};
use time::GameTime;

/// Query the grid container's bounding rect and hit-test a pointer position.
fn dom_hit_test(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<u16> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let click_x = mouse_x as f64 - rect.left();
    let click_y = mouse_y as f64 - rect.top();
    let hit = cs.hit_test_pixels(click_x, click_y, rect.width(), rect.height());

    debug!(click_x, click_y, ?hit, targets = cs.targets.len(), "pointer");
    hit
}

/// Milliseconds from `performance.now()`, falling back to `Date.now()`.
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    logging::init(Level::Info);

    let config = load_config();
    info!(
        countdown = config.countdown_initial,
        win_cost = config.win_cost,
        "minute clicker ready"
    );

    let game = Rc::new(RefCell::new(ClickerGame::new(config)));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let cs = click_state.borrow();
            let hit = dom_hit_test(mouse_event.x, mouse_event.y, &cs);
            drop(cs);

            if let Some(action_id) = hit {
                game.borrow_mut().handle_input(&InputEvent::Click(action_id));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let KeyCode::Char(c) = key_event.code {
                game.borrow_mut().handle_input(&InputEvent::Key(c));
            }
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        let mut clock = GameTime::new(TICKS_PER_SEC);
        let mut was_running = false;
        move |f| {
            // A run's first second starts at the start press, not mid-tick.
            let running = game.borrow().state.is_running();
            if running && !was_running {
                clock.reset();
            }
            was_running = running;

            let ticks = clock.update(now_ms());
            if ticks > 0 {
                game.borrow_mut().tick(ticks);
            }

            let size = f.area();
            {
                let mut cs = click_state.borrow_mut();
                cs.terminal_cols = size.width;
                cs.terminal_rows = size.height;
                cs.clear_targets();
            }

            game.borrow().render(f, size, &click_state);
        }
    });

    Ok(())
}
