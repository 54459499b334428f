//! End-to-end playback behaviour of the audio context, the drivers and the
//! instrument, checked offline against the sample clock.

use raga_synth::{
    dsp::Ramp,
    engine::AudioContext,
    input::InputDispatcher,
    synth::VoiceState,
    DisplayEvent, EngineConfig, Instrument, LevelMonitor, NoteRegistry, NoteSource, PlayerState,
    Sequence, SequencePlayer,
};

fn sequence(tokens: &[&str]) -> Sequence {
    Sequence::from_tokens(tokens, NoteRegistry::standard()).unwrap()
}

fn started_at(events: impl Iterator<Item = DisplayEvent>) -> Vec<f64> {
    events
        .filter_map(|e| match e {
            DisplayEvent::NoteStarted { at, .. } => Some(at),
            _ => None,
        })
        .collect()
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

#[test]
fn three_notes_trigger_on_the_interval_grid() {
    let mut ctx = AudioContext::new(EngineConfig::default());
    let mut player = SequencePlayer::new();
    player
        .start(&mut ctx, NoteRegistry::standard(), sequence(&["C4", "E4", "G4"]))
        .unwrap();

    ctx.advance_to(6.0, &mut player);

    assert_eq!(player.state(), PlayerState::Completed);
    let events: Vec<DisplayEvent> = player.drain_events().collect();
    assert_eq!(started_at(events.iter().cloned()), vec![0.0, 1.5, 3.0]);
    assert_eq!(
        events.last(),
        Some(&DisplayEvent::PlaybackFinished(PlayerState::Completed))
    );
    assert_eq!(ctx.live_voices(), 0);
}

#[test]
fn cancel_mid_run_skips_remaining_notes() {
    let mut ctx = AudioContext::new(EngineConfig::default());
    let mut player = SequencePlayer::new();
    player
        .start(&mut ctx, NoteRegistry::standard(), sequence(&["C4", "D4", "E4"]))
        .unwrap();

    ctx.advance_to(2.0, &mut player);
    player.cancel(&mut ctx).unwrap();
    ctx.advance_to(8.0, &mut player);

    assert_eq!(player.state(), PlayerState::Cancelled);
    assert_eq!(started_at(player.drain_events()), vec![0.0, 1.5]);
}

#[test]
fn cancelled_note_still_decays() {
    let mut ctx = AudioContext::new(EngineConfig::default());
    let mut player = SequencePlayer::new();
    player
        .start(&mut ctx, NoteRegistry::standard(), sequence(&["A4", "B4"]))
        .unwrap();

    ctx.advance_to(0.2, &mut player);
    player.cancel(&mut ctx).unwrap();

    let mut out = vec![0.0f32; 4800];
    ctx.render_with(&mut out, &mut player);
    assert!(peak(&out) > 0.1);
    assert_eq!(ctx.live_voices(), 1);
}

#[test]
fn replay_repeats_the_same_offsets() {
    let mut ctx = AudioContext::new(EngineConfig::default());
    let mut player = SequencePlayer::new();
    let registry = NoteRegistry::standard();
    player
        .start(&mut ctx, registry, sequence(&["C4", "D4", "E4"]))
        .unwrap();
    ctx.advance_to(5.0, &mut player);
    let first = started_at(player.drain_events());

    player.replay(&mut ctx, registry).unwrap();
    ctx.advance_to(10.0, &mut player);
    let second = started_at(player.drain_events());

    assert_eq!(first, vec![0.0, 1.5, 3.0]);
    assert_eq!(second, vec![5.0, 6.5, 8.0]);
}

#[test]
fn held_key_sounds_one_voice() {
    let mut ctx = AudioContext::new(EngineConfig::default());
    let registry = NoteRegistry::standard();
    let mut keys = InputDispatcher::new();

    assert!(keys.key_down(&mut ctx, registry, 'q').unwrap());
    assert!(!keys.key_down(&mut ctx, registry, 'q').unwrap());
    assert!(!keys.key_down(&mut ctx, registry, 'w').unwrap());
    assert_eq!(ctx.live_voices(), 1);

    keys.key_up(&mut ctx);
    keys.key_up(&mut ctx);
    assert_eq!(ctx.live_voices(), 0);

    let ended = keys
        .drain_events()
        .filter(|e| matches!(e, DisplayEvent::NoteEnded { .. }))
        .count();
    assert_eq!(ended, 1);
}

#[test]
fn unmapped_key_is_silent() {
    let mut ctx = AudioContext::new(EngineConfig::default());
    let mut keys = InputDispatcher::new();
    assert!(!keys
        .key_down(&mut ctx, NoteRegistry::standard(), '/')
        .unwrap());
    assert_eq!(ctx.live_voices(), 0);
    assert_eq!(keys.drain_events().count(), 0);
}

#[test]
fn second_stop_is_a_no_op() {
    let mut ctx = AudioContext::new(EngineConfig::default());
    let voice = ctx.trigger(261.63, 0.0).unwrap();

    let mut out = vec![0.0f32; 2400];
    ctx.render(&mut out);
    assert!(ctx.stop(voice));
    assert!(!ctx.stop(voice));

    ctx.render(&mut out);
    assert_eq!(peak(&out), 0.0);
}

#[test]
fn voice_parameters_follow_the_note() {
    let mut ctx = AudioContext::new(EngineConfig::default());
    let id = ctx.trigger(440.0, 0.0).unwrap();
    let voice = ctx.voice(id).unwrap();

    assert_eq!(voice.state(), VoiceState::Sounding);
    assert_eq!(voice.filter_cutoff(), Some(1760.0));
    assert_eq!(voice.filter_q(), Some(1.0));
    assert_eq!(voice.vibrato(), Some((5.5, 5.0)));
    assert_eq!(voice.stop_time(), 1.5);

    let points: Vec<(Ramp, f64, f32)> = voice
        .envelope()
        .unwrap()
        .breakpoints()
        .iter()
        .map(|b| (b.ramp, b.time, b.value))
        .collect();
    assert_eq!(
        points,
        vec![
            (Ramp::Set, 0.0, 0.0),
            (Ramp::Linear, 0.1, 0.5),
            (Ramp::Linear, 0.4, 0.4),
            (Ramp::Set, 1.0, 0.4),
            (Ramp::Exponential, 1.4, 0.001),
        ]
    );
}

#[test]
fn voice_stops_itself_after_its_lifetime() {
    let mut ctx = AudioContext::new(EngineConfig::default());
    ctx.trigger(329.63, 0.0).unwrap();

    ctx.advance_to(1.49, &mut ());
    assert_eq!(ctx.live_voices(), 1);
    ctx.advance_to(1.5, &mut ());
    assert_eq!(ctx.live_voices(), 0);
    assert_eq!(ctx.pending_cues(), 0);
}

#[test]
fn overlapping_voices_are_bounded() {
    let mut ctx = AudioContext::new(EngineConfig::default());
    let first = ctx.trigger(220.0, 0.0).unwrap();
    for f in [247.0, 262.0, 294.0] {
        ctx.trigger(f, 0.0).unwrap();
    }

    assert_eq!(ctx.live_voices(), 3);
    assert!(ctx.voice(first).is_none());
}

#[test]
fn registry_frequencies_ascend() {
    let registry = NoteRegistry::standard();
    let freqs: Vec<f32> = registry.entries().map(|e| e.frequency_hz).collect();
    assert!(freqs.windows(2).all(|w| w[0] < w[1]));

    let a4 = registry.resolve("A4").unwrap();
    assert_eq!(registry.frequency_of(a4).unwrap(), 440.0);
}

#[cfg(feature = "serde")]
#[test]
fn instrument_plays_a_generated_response() {
    let mut inst = Instrument::default();
    let mut monitor = LevelMonitor::new();
    inst.attach_monitor(&mut monitor);

    inst.play_generated(r#"{"notes":["C4","D4"],"raga":"Kalyani"}"#)
        .unwrap();
    assert_eq!(inst.player_state(), PlayerState::Playing);

    let mut out = vec![0.0f32; 2048];
    for _ in 0..10 {
        inst.render(&mut out);
    }
    monitor.refresh();
    assert!(monitor.levels().unwrap().peak > 0.0);

    let sources: Vec<NoteSource> = inst.drain_events().filter_map(|e| e.source()).collect();
    assert!(sources.iter().all(|&s| s == NoteSource::Sequence));
}

#[cfg(feature = "serde")]
#[test]
fn failed_generation_leaves_player_alone() {
    let mut inst = Instrument::default();
    assert!(inst.play_generated(r#"{"error":"busy"}"#).is_err());
    assert!(inst.play_generated("{").is_err());
    assert_eq!(inst.player_state(), PlayerState::Idle);
    assert_eq!(inst.context().live_voices(), 0);
}

#[test]
fn closed_context_refuses_work() {
    let mut ctx = AudioContext::new(EngineConfig::default());
    ctx.trigger(440.0, 0.0).unwrap();
    ctx.close();

    assert_eq!(ctx.live_voices(), 0);
    assert!(ctx.trigger(440.0, 0.0).is_err());

    let mut out = vec![1.0f32; 64];
    ctx.render(&mut out);
    assert_eq!(peak(&out), 0.0);
}
