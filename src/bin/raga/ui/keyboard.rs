//! Computer-keyboard piano widget

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use raga_synth::{input::keymap::KEY_TABLE, NoteId};

/// Render the three key bands, upper octave on top, highlighting `current`.
pub fn render_keyboard(frame: &mut Frame, area: Rect, current: Option<NoteId>) {
    let block = Block::default().title(" Keyboard ").borders(Borders::ALL);

    let lines: Vec<Line> = KEY_TABLE
        .chunks(12)
        .rev()
        .map(|band| {
            let spans: Vec<Span> = band
                .iter()
                .map(|&(key, note)| {
                    let style = if Some(note) == current {
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD)
                    } else if note.pitch().is_accidental() {
                        Style::default().fg(Color::DarkGray)
                    } else {
                        Style::default()
                    };
                    Span::styled(format!(" {key}:{:<3}", note.to_string()), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
