//! Stateless rendering.

use super::app::App;
use akin::{Answer, Outcome, Phase};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};
use std::time::Instant;
use strum::IntoEnumIterator;

/// Draws the whole screen.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(8),    // Body
            Constraint::Length(3), // Status
            Constraint::Length(1), // Legend
        ])
        .split(frame.area());

    let title = Paragraph::new("Akin - think of a character")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);
    draw_history(frame, body[0], app);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(7)])
        .split(body[1]);
    draw_current(frame, right[0], app);
    draw_proposal(frame, right[1], app);

    draw_status(frame, chunks[2], app);
    draw_legend(frame, chunks[3], app);
}

fn draw_history(frame: &mut Frame, area: Rect, app: &App) {
    let visible = area.height.saturating_sub(2) as usize;
    let skip = app.history().len().saturating_sub(visible);
    let lines: Vec<Line> = app
        .history()
        .iter()
        .skip(skip)
        .map(|entry| Line::from(entry.as_str()))
        .collect();
    let history = Paragraph::new(lines)
        .block(Block::default().title("History").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(history, area);
}

fn draw_current(frame: &mut Frame, area: Rect, app: &App) {
    let (title, text, style) = if let Some(message) = app.fatal() {
        ("Game over", message.to_string(), Style::default().fg(Color::Red))
    } else if app.is_loading() {
        ("Thinking", "…".to_string(), Style::default().fg(Color::DarkGray))
    } else {
        match app.state() {
            None => ("Starting", "Connecting…".to_string(), Style::default().fg(Color::DarkGray)),
            Some(state) => match state.phase() {
                Phase::NotStarted => ("Starting", String::new(), Style::default()),
                Phase::Asking => (
                    "Question",
                    format!("{}. {}", app.number(), state.question),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Phase::AwaitingWinConfirmation => (
                    "Am I right?",
                    state.question.clone(),
                    Style::default().fg(Color::Yellow),
                ),
                Phase::Finished(Outcome::Win) => (
                    "Result",
                    "Great, guessed right one more time! Press r to play again.".to_string(),
                    Style::default().fg(Color::Green),
                ),
                Phase::Finished(Outcome::NoWin) => (
                    "Result",
                    "I give up! Good game. Press r to play again.".to_string(),
                    Style::default().fg(Color::Magenta),
                ),
            },
        }
    };
    let paragraph = Paragraph::new(text)
        .style(style)
        .block(Block::default().title(title).borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_proposal(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title("Proposal").borders(Borders::ALL);
    let Some(state) = app.state() else {
        frame.render_widget(block, area);
        return;
    };
    let Some(name) = &state.name_proposition else {
        if app.debug() {
            let gauge = Gauge::default()
                .block(block)
                .gauge_style(Style::default().fg(Color::Blue))
                .ratio((state.progression / 100.0).clamp(0.0, 1.0))
                .label(format!("step {}", state.step));
            frame.render_widget(gauge, area);
        } else {
            frame.render_widget(block, area);
        }
        return;
    };
    let mut lines = vec![Line::from(Span::styled(
        name.as_str(),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ))];
    if let Some(description) = &state.description_proposition {
        lines.push(Line::from(description.as_str()));
    }
    if state.phase() == Phase::AwaitingWinConfirmation {
        lines.push(Line::from(""));
        lines.push(Line::from("y = that's it, n = wrong guess"));
    }
    let proposal = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(proposal, area);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let text = match app.flash(Instant::now()) {
        Some(flash) => flash.to_string(),
        None => match app.state() {
            Some(state) if app.debug() => {
                format!("step {} · progression {:.1}", state.step, state.progression)
            }
            _ => String::new(),
        },
    };
    let status = Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, area);
}

fn draw_legend(frame: &mut Frame, area: Rect, app: &App) {
    let text = if app.is_over() {
        "r restart · q quit".to_string()
    } else if app.state().is_some_and(|s| s.phase() == Phase::AwaitingWinConfirmation) {
        "y yes · n no · q quit".to_string()
    } else {
        let answers: Vec<String> = Answer::iter()
            .map(|answer| format!("{} {}", answer.key(), answer))
            .collect();
        format!("{} · b back · q quit", answers.join(" · "))
    };
    let legend = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(legend, area);
}
