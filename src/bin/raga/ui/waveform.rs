//! Waveform oscilloscope widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Samples shown; the tail of the analysis window.
const SCOPE_LEN: usize = 1024;

/// Render the most recent output samples, scaled to the loudest one so quiet
/// release tails stay visible.
pub fn render_waveform(frame: &mut Frame, area: Rect, window: &[f32]) {
    let shown = &window[window.len().saturating_sub(SCOPE_LEN)..];
    let peak = shown.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    let range = f64::from(peak.max(0.05)) * 1.1;

    let block = Block::default()
        .title(format!(" Waveform  ±{range:.2} "))
        .borders(Borders::ALL);

    let data: Vec<(f64, f64)> = shown
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / shown.len().max(1) as f64, f64::from(sample)))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-range, range])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
