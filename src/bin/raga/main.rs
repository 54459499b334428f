//! raga - terminal piano and raga sequence player
//!
//! Run with: cargo run -- [sequence.json]
//!
//! The optional argument is a saved response from the note-generation
//! service. Without it, Enter plays the service's fallback scale.

mod app;
mod ui;

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Logs go to stderr so they can be redirected away from the TUI
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let sequence_path = std::env::args().nth(1).map(PathBuf::from);

    let terminal = ratatui::init();
    let res = app::run(terminal, sequence_path);
    ratatui::restore();
    res
}
