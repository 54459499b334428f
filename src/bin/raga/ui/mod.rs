//! TUI for raga
//!
//! Now-playing header, the computer-keyboard piano, and live waveform and
//! spectrum views of the output.

mod keyboard;
pub mod spectrum;
mod waveform;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use raga_synth::{NoteSource, PlayerState};

use super::app::App;
use keyboard::render_keyboard;
use spectrum::render_spectrum;
use waveform::render_waveform;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Now playing
            Constraint::Length(5), // Keyboard
            Constraint::Min(8),    // Scopes
            Constraint::Length(1), // Help bar
        ])
        .split(area);

    render_now_playing(frame, chunks[0], app);

    let current = app.now_playing.as_ref().map(|n| n.note);
    render_keyboard(frame, chunks[1], current);

    let scopes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    render_waveform(frame, scopes[0], app.monitor.window().unwrap_or(&[]));
    render_spectrum(frame, scopes[1], app.spectrum.data());

    let help = Paragraph::new(" [keys] Play  [Enter] Play/Replay  [Space] Cancel  [Esc] Quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}

fn render_now_playing(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(format!(" raga | {} ", app.device_name))
        .borders(Borders::ALL);

    let state_color = match app.player_state {
        PlayerState::Playing => Color::Green,
        PlayerState::Cancelled => Color::Yellow,
        _ => Color::DarkGray,
    };

    let mut spans = match &app.now_playing {
        Some(now) => {
            let source = match now.source {
                NoteSource::Keyboard => "key",
                NoteSource::Sequence => "seq",
            };
            vec![
                Span::styled(
                    format!(" {:<4}", now.labels.western),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" {}  {}", now.labels.swara, now.labels.sruthi)),
                Span::styled(format!("  ({source})"), Style::default().fg(Color::DarkGray)),
            ]
        }
        None => vec![Span::styled(" --", Style::default().fg(Color::DarkGray))],
    };

    spans.push(Span::raw("   "));
    spans.push(Span::styled(
        format!("{:?}", app.player_state),
        Style::default().fg(state_color),
    ));
    if let Some(levels) = app.monitor.levels() {
        spans.push(Span::styled(
            format!("   peak {:.2} rms {:.2}", levels.peak, levels.rms),
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans.push(Span::raw(format!("   {}", app.status)));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
