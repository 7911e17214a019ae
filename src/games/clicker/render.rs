//! Minute Clicker rendering: header, main button, upgrades, penalty games and log.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::ClickableList;

use super::actions;
use super::state::{ClickerState, CycleView, Outcome, Snapshot, Tone, Upgrade};
use super::timers::CycleStatus;
use super::ClickerView;

const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Fuse animation shown while a bomb is arming.
const FUSE: &[char] = &['*', '+', 'x', '+'];

pub fn render(
    state: &ClickerState,
    view: &ClickerView,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let snap = state.snapshot();
    let narrow = is_narrow_layout(area.width);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // header
            Constraint::Length(5), // main button
            Constraint::Min(6),    // panels + log
            Constraint::Length(1), // key hints
        ])
        .split(area);

    render_header(state, &snap, view, f, chunks[0]);
    render_main_button(state, &snap, view, f, chunks[1], click_state);

    let panel = build_panel(state, &snap, view);
    let panel_height = panel.len() as u16 + 2;
    let (panel_area, log_area) = if narrow {
        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(panel_height), Constraint::Min(3)])
            .split(chunks[2]);
        (body[0], body[1])
    } else {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[2]);
        (body[0], body[1])
    };

    render_panel(panel, view, f, panel_area, narrow, click_state);
    render_log(view, f, log_area, narrow);
    render_hints(&snap, f, chunks[3]);
}

fn borders_for(narrow: bool) -> Borders {
    if narrow {
        Borders::TOP | Borders::BOTTOM
    } else {
        Borders::ALL
    }
}

/// Text progress bar, `width` cells of █/░.
fn bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    let mut s = String::with_capacity(width * 3);
    s.extend(std::iter::repeat(BAR_FULL).take(filled));
    s.extend(std::iter::repeat(BAR_EMPTY).take(width - filled));
    s
}

// ── Header ──────────────────────────────────────────────────

fn render_header(
    state: &ClickerState,
    snap: &Snapshot,
    view: &ClickerView,
    f: &mut Frame,
    area: Rect,
) {
    let warning = snap.game_started
        && !snap.game_ended
        && snap.countdown_remaining <= state.config.warning_threshold;
    let mut countdown_style = if warning {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    };
    if view.tick_flash > 0 {
        countdown_style = countdown_style.add_modifier(Modifier::REVERSED);
    }

    let first = Line::from(vec![
        Span::styled(format!(" ⏱ {:>3}s ", snap.countdown_remaining), countdown_style),
        Span::styled(
            format!(" {} / {} pts", snap.points, state.config.win_cost),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  +{}/click  cd {}s", snap.points_available, snap.cooldown_seconds),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let progress = state.win_progress();
    let bar_width = (area.width as usize).saturating_sub(12).clamp(5, 40);
    let second = Line::from(vec![
        Span::raw(" "),
        Span::styled(bar(progress / 100.0, bar_width), Style::default().fg(Color::Green)),
        Span::styled(format!(" {:>3.0}%", progress), Style::default().fg(Color::Green)),
    ]);

    let title_style = if snap.hard_mode {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    };
    let title = if snap.hard_mode {
        " Minute Clicker · HARD "
    } else {
        " Minute Clicker "
    };
    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(title, title_style));
    f.render_widget(Paragraph::new(vec![first, second]).block(block), area);
}

// ── Main button ─────────────────────────────────────────────

fn render_main_button(
    state: &ClickerState,
    snap: &Snapshot,
    view: &ClickerView,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let (lines, border_color, action) = if !snap.game_started {
        (
            vec![
                Line::from(Span::styled(
                    "▶ START",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!(
                        "Reach {} points in {} seconds",
                        state.config.win_cost, state.config.countdown_initial
                    ),
                    Style::default().fg(Color::Gray),
                )),
            ],
            Color::Green,
            actions::START_GAME,
        )
    } else if snap.game_ended {
        let (headline, color) = match snap.outcome {
            Some(Outcome::Won) => ("🏆 YOU WIN!".to_string(), Color::Yellow),
            _ => (
                format!("⏰ TIME'S UP · {}/{}", snap.points, state.config.win_cost),
                Color::Red,
            ),
        };
        (
            vec![
                Line::from(Span::styled(
                    headline,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "Tap to play again",
                    Style::default().fg(Color::Gray),
                )),
            ],
            color,
            actions::START_GAME,
        )
    } else if snap.click_ready {
        let mut style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        if view.click_flash > 0 {
            style = style.add_modifier(Modifier::REVERSED);
        }
        (
            vec![
                Line::from(Span::styled("●  CLICK!  ●", style)),
                Line::from(Span::styled(
                    format!("+{} points", snap.points_available),
                    Style::default().fg(Color::Gray),
                )),
            ],
            if view.click_flash > 0 { Color::White } else { Color::Yellow },
            actions::PRIMARY_CLICK,
        )
    } else {
        let total = snap.cooldown_seconds.max(1) as f64;
        let elapsed = total - snap.cooldown_remaining as f64;
        (
            vec![
                Line::from(Span::styled(
                    format!("cooling down… {}s", snap.cooldown_remaining),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
                )),
                Line::from(vec![
                    Span::styled(bar(elapsed / total, 10), Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        format!("  early click: -{}s", state.config.early_click_penalty),
                        Style::default().fg(Color::Red),
                    ),
                ]),
            ],
            Color::DarkGray,
            actions::PRIMARY_CLICK,
        )
    };

    let border_color = if view.error_flash > 0 { Color::Red } else { border_color };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    f.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center),
        area,
    );

    click_state.borrow_mut().add_click_target(area, action);
}

// ── Upgrades / penalties / settings ─────────────────────────

fn upgrade_line(state: &ClickerState, upgrade: Upgrade, key: usize) -> Line<'static> {
    let config = &state.config;
    let cost = upgrade.cost(config);
    let (label, status) = match upgrade {
        Upgrade::ClickPower => {
            let status = if state.points_available >= config.max_click_power {
                "MAX".to_string()
            } else {
                format!(
                    "{}/{} ({:.0}%)",
                    state.points_available,
                    config.max_click_power,
                    state.click_power_progress()
                )
            };
            (upgrade.name().to_string(), status)
        }
        Upgrade::ReduceCooldown => {
            let status = if state.cooldown_seconds <= config.min_cooldown {
                "MIN".to_string()
            } else {
                format!(
                    "{}s ({}/{})",
                    state.cooldown_seconds,
                    state.cooldown_upgrades_bought(),
                    config.cooldown_upgrade_slots()
                )
            };
            (upgrade.name().to_string(), status)
        }
        Upgrade::AddTime => (
            format!("+{}s", config.extra_time),
            format!("{}/{}", state.time_upgrades_used, config.max_time_upgrades),
        ),
        Upgrade::Win => {
            let status = if state.win_used >= config.max_win_uses {
                "USED".to_string()
            } else {
                format!("{:.0}%", state.win_progress())
            };
            (upgrade.name().to_string(), status)
        }
    };

    let (key_style, text_style) = if state.can_buy(upgrade) {
        (
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::White),
        )
    } else {
        (
            Style::default().fg(Color::DarkGray),
            Style::default().fg(Color::DarkGray),
        )
    };

    Line::from(vec![
        Span::styled(format!(" [{}] ", key), key_style),
        Span::styled(format!("{:<20}", label), text_style),
        Span::styled(format!("{:>5} pts ", cost), text_style),
        Span::styled(status, Style::default().fg(Color::Cyan)),
    ])
}

fn bomb_line(name: &str, key: char, cycle: &CycleView, penalty: u32, frame: u32) -> Line<'static> {
    let key_span = |style: Style| Span::styled(format!(" [{}] ", key), style);
    match cycle.status {
        CycleStatus::Idle => Line::from(vec![
            key_span(Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{:<8} idle", name), Style::default().fg(Color::DarkGray)),
        ]),
        CycleStatus::Arming => {
            let fuse = FUSE[(frame / 3) as usize % FUSE.len()];
            Line::from(vec![
                key_span(Style::default().fg(Color::Yellow)),
                Span::styled(format!("{:<8}", name), Style::default().fg(Color::White)),
                Span::styled(bar(cycle.progress, 8), Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!(" {} {:.1}s", fuse, cycle.arming_remaining),
                    Style::default().fg(Color::Yellow),
                ),
            ])
        }
        CycleStatus::Armed => {
            let mut style = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
            if frame % 4 < 2 {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(vec![
                key_span(style),
                Span::styled(format!("{:<8}", name), style),
                Span::styled(
                    format!(" DEFUSE! {:.2}s (-{}s)", cycle.armed_remaining, penalty),
                    style,
                ),
            ])
        }
    }
}

fn death_line(state: &ClickerState, frame: u32) -> Line<'static> {
    let fraction = state.death_percent as f64 / state.config.death_max.max(1) as f64;
    let color = if state.death_in_danger() { Color::Red } else { Color::Magenta };
    let mut style = Style::default().fg(color);
    if state.death_in_danger() && frame % 6 < 3 {
        style = style.add_modifier(Modifier::BOLD);
    }
    Line::from(vec![
        Span::styled(" [D] ", Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(format!("{:<8}", "Death"), Style::default().fg(Color::White)),
        Span::styled(bar(fraction, 8), style),
        Span::styled(format!(" {:>3}%", state.death_percent), style),
    ])
}

fn build_panel(state: &ClickerState, snap: &Snapshot, view: &ClickerView) -> ClickableList<'static> {
    let mut cl = ClickableList::new();

    for (i, upgrade) in Upgrade::all().iter().enumerate() {
        let action = match upgrade {
            Upgrade::ClickPower => actions::BUY_CLICK_POWER,
            Upgrade::ReduceCooldown => actions::REDUCE_COOLDOWN,
            Upgrade::AddTime => actions::ADD_TIME,
            Upgrade::Win => actions::WIN_INSTANT,
        };
        cl.push_clickable(upgrade_line(state, *upgrade, i + 1), action);
    }

    if snap.hard_mode && snap.game_started {
        cl.push(Line::from(Span::styled(
            " ── penalty games ──",
            Style::default().fg(Color::Red),
        )));
        let frame = view.anim_frame;
        cl.push_clickable(
            bomb_line("Bomb", 'B', &snap.bomb, state.config.bomb.penalty_secs, frame),
            actions::TAP_BOMB,
        );
        cl.push_clickable(
            bomb_line("2 Bombs", 'N', &snap.dual_bomb, state.config.dual_bomb.penalty_secs, frame),
            actions::TAP_DUAL_BOMB,
        );
        cl.push_clickable(death_line(state, frame), actions::TAP_DEATH);
    }

    cl.push(Line::from(""));
    if !state.is_running() {
        let (label, color) = if snap.hard_mode {
            ("Hard (bombs + death meter)", Color::Red)
        } else {
            ("Easy", Color::Green)
        };
        cl.push_clickable(
            Line::from(vec![
                Span::styled(" [H] ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Span::styled("Difficulty: ", Style::default().fg(Color::Gray)),
                Span::styled(label, Style::default().fg(color)),
            ]),
            actions::TOGGLE_HARD_MODE,
        );
    }
    let sound = if view.muted { "off" } else { "on" };
    cl.push_clickable(
        Line::from(vec![
            Span::styled(" [M] ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::styled(format!("Sound: {}", sound), Style::default().fg(Color::Gray)),
        ]),
        actions::TOGGLE_MUTE,
    );

    cl
}

fn render_panel(
    cl: ClickableList<'static>,
    view: &ClickerView,
    f: &mut Frame,
    area: Rect,
    narrow: bool,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let border_color = if view.upgrade_flash > 0 {
        Color::Magenta
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .borders(borders_for(narrow))
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(" Upgrades ", Style::default().fg(Color::Magenta)));

    let mut cs = click_state.borrow_mut();
    cl.register_targets_with_block(area, &block, &mut cs, 0, 0);
    drop(cs);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

// ── Log ─────────────────────────────────────────────────────

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Success => Color::Green,
        Tone::Error => Color::Red,
        Tone::Info => Color::Gray,
    }
}

fn render_log(view: &ClickerView, f: &mut Frame, area: Rect, narrow: bool) {
    let mut cl = ClickableList::new();
    for entry in &view.log {
        let style = if entry.is_important {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(tone_color(entry.tone))
        };
        cl.push(Line::from(Span::styled(format!(" {}", entry.text), style)));
    }

    let block = Block::default()
        .borders(borders_for(narrow))
        .border_style(Style::default().fg(Color::Blue))
        .title(" Log ");
    let inner = block.inner(area);
    // Keep the newest entry on the last visible row
    let scroll = cl.visual_height(inner.width).saturating_sub(inner.height);

    f.render_widget(
        Paragraph::new(cl.into_lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        area,
    );
}

fn render_hints(snap: &Snapshot, f: &mut Frame, area: Rect) {
    let text = if !snap.game_started || snap.game_ended {
        " S start · H difficulty · M sound"
    } else if snap.hard_mode {
        " Space click · 1-4 buy · B/N defuse · D reset death · M sound"
    } else {
        " Space click · 1-4 buy · M sound"
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            text,
            Style::default().fg(Color::DarkGray),
        ))),
        area,
    );
}
