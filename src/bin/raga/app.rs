//! Wires the instrument to the audio device and the terminal.

use std::{
    io::stdout,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use ratatui::DefaultTerminal;
use tracing::{info, warn};

use raga_synth::{
    io::generation::{parse_sequence, FALLBACK_SCALE},
    monitor::ANALYSIS_WINDOW,
    notes::NoteLabels,
    DisplayEvent, EngineConfig, Instrument, LevelMonitor, NoteId, NoteRegistry, NoteSource,
    OutputDevice, PlayerState, Sequence,
};

use super::ui::{self, spectrum::SpectrumAnalyzer};

/// The note on screen and who is playing it.
#[derive(Debug, Clone)]
pub struct NowPlaying {
    pub note: NoteId,
    pub labels: NoteLabels,
    pub source: NoteSource,
}

/// Everything the UI draws from.
pub struct App {
    pub instrument: Arc<Mutex<Instrument>>,
    pub monitor: LevelMonitor,
    pub spectrum: SpectrumAnalyzer,
    pub sequence: Sequence,
    pub now_playing: Option<NowPlaying>,
    pub player_state: PlayerState,
    pub status: String,
    pub device_name: String,
    /// Key held down, when the terminal reports releases.
    held: Option<char>,
    release_events: bool,
    /// False when no output could be opened; keys and playback do nothing.
    audio: bool,
    should_quit: bool,
}

pub fn run(mut terminal: DefaultTerminal, sequence_path: Option<PathBuf>) -> EyreResult<()> {
    let sequence = load_sequence(sequence_path)?;

    let device = OutputDevice::open_default();
    let sample_rate = match &device {
        Ok(device) => device.sample_rate(),
        Err(_) => EngineConfig::default().sample_rate,
    };

    let mut instrument = Instrument::new(EngineConfig::default().with_sample_rate(sample_rate));
    let mut monitor = LevelMonitor::new();
    instrument.attach_monitor(&mut monitor);
    let instrument = Arc::new(Mutex::new(instrument));

    let output = device.and_then(|device| {
        let stream = device.start(instrument.clone())?;
        info!(
            device = device.name(),
            sample_rate = device.sample_rate(),
            channels = device.channels(),
            "audio output started"
        );
        Ok((device.name().to_string(), stream))
    });

    // Key release events need the kitty keyboard protocol
    let release_events = supports_keyboard_enhancement().unwrap_or(false);
    if release_events {
        execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }

    let mut app = App::new(instrument, monitor, sequence, sample_rate, release_events);
    let _stream = match output {
        Ok((name, stream)) => {
            app.device_name = name;
            Some(stream)
        }
        Err(err) => {
            warn!(%err, "running without audio output");
            app.disable_audio(&err);
            None
        }
    };

    let res = app.run(&mut terminal);

    if let Ok(mut inst) = app.lock() {
        inst.shutdown();
    }
    if release_events {
        execute!(stdout(), PopKeyboardEnhancementFlags)?;
    }
    res
}

fn load_sequence(path: Option<PathBuf>) -> EyreResult<Sequence> {
    let registry = NoteRegistry::standard();
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            let sequence = parse_sequence(&json, registry)
                .wrap_err_with(|| format!("unusable sequence in {}", path.display()))?;
            info!(notes = sequence.len(), path = %path.display(), "sequence loaded");
            Ok(sequence)
        }
        None => Ok(Sequence::from_tokens(&FALLBACK_SCALE, registry)?),
    }
}

impl App {
    pub fn new(
        instrument: Arc<Mutex<Instrument>>,
        monitor: LevelMonitor,
        sequence: Sequence,
        sample_rate: f32,
        release_events: bool,
    ) -> Self {
        Self {
            instrument,
            monitor,
            spectrum: SpectrumAnalyzer::new(ANALYSIS_WINDOW, sample_rate),
            sequence,
            now_playing: None,
            player_state: PlayerState::Idle,
            status: String::from("Enter plays the sequence"),
            device_name: String::from("no audio output"),
            held: None,
            release_events,
            audio: true,
            should_quit: false,
        }
    }

    pub fn disable_audio(&mut self, err: &dyn std::fmt::Display) {
        self.audio = false;
        self.device_name = String::from("no audio output");
        self.status = err.to_string();
    }

    fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_instrument()?;

            if let Some(window) = self.monitor.sample() {
                self.spectrum.update(window);
            }

            terminal.draw(|frame| ui::render(frame, self))?;

            // Non-blocking, ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key)?;
                }
            }
        }
        Ok(())
    }

    fn lock(&self) -> EyreResult<MutexGuard<'_, Instrument>> {
        self.instrument
            .lock()
            .map_err(|_| eyre!("audio thread panicked"))
    }

    fn poll_instrument(&mut self) -> EyreResult<()> {
        let (events, state): (Vec<DisplayEvent>, PlayerState) = {
            let mut inst = self.lock()?;
            (inst.drain_events().collect(), inst.player_state())
        };
        self.player_state = state;

        for event in events {
            match event {
                DisplayEvent::NoteStarted {
                    note,
                    labels,
                    source,
                    ..
                } => {
                    self.now_playing = Some(NowPlaying {
                        note,
                        labels,
                        source,
                    });
                }
                DisplayEvent::NoteEnded { source } => {
                    if self.now_playing.as_ref().map(|n| n.source) == Some(source) {
                        self.now_playing = None;
                    }
                }
                DisplayEvent::PlaybackFinished(state) => {
                    self.status = match state {
                        PlayerState::Completed => "Sequence finished. Enter replays".into(),
                        PlayerState::Cancelled => "Sequence cancelled. Enter replays".into(),
                        other => format!("Sequence {other:?}"),
                    };
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> EyreResult<()> {
        match (key.code, key.kind) {
            (KeyCode::Esc, KeyEventKind::Press) => self.should_quit = true,
            _ if !self.audio => {}
            (KeyCode::Enter, KeyEventKind::Press) => self.play_or_replay()?,
            (KeyCode::Char(' '), KeyEventKind::Press) => {
                let result = self.lock()?.cancel();
                if let Err(err) = result {
                    self.status = err.to_string();
                }
            }
            (KeyCode::Char(c), KeyEventKind::Press) => self.press(c)?,
            // Releasing any key ends the held note
            (_, KeyEventKind::Release) => {
                if self.held.take().is_some() {
                    self.lock()?.key_up();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn press(&mut self, c: char) -> EyreResult<()> {
        let c = c.to_ascii_lowercase();
        let release_events = self.release_events;
        let held = self.held;
        let mut inst = self.lock()?;

        let started = if release_events {
            if held.is_some() {
                return Ok(());
            }
            inst.key_down(c)
        } else {
            // No release events: every press is a tap that replaces the last
            inst.key_up();
            inst.key_down(c)
        };
        drop(inst);

        match started {
            Ok(true) if release_events => self.held = Some(c),
            Ok(_) => {}
            Err(err) => {
                warn!(%err, "key press failed");
                self.status = err.to_string();
            }
        }
        Ok(())
    }

    fn play_or_replay(&mut self) -> EyreResult<()> {
        let state = self.lock()?.player_state();
        let result = match state {
            PlayerState::Playing => return Ok(()),
            PlayerState::Idle => {
                let sequence = self.sequence.clone();
                self.lock()?.play(sequence)
            }
            PlayerState::Completed | PlayerState::Cancelled => self.lock()?.replay(),
        };
        self.held = None;
        self.status = match result {
            Ok(()) => format!("Playing {} notes", self.sequence.len()),
            Err(err) => err.to_string(),
        };
        Ok(())
    }
}
