// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for padseq
//!
//! These tests drive the public API the way a host application would.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use padseq::{
    step_interval_ms, AudioSink, ChannelObserver, KitLibrary, KitSource, PadDescriptor,
    SequencerConfig, SoundKit, StepObserver, TransportController, TransportState,
};

/// Sink that remembers every path it was asked to play
#[derive(Default)]
struct RecordingSink {
    played: Mutex<Vec<String>>,
}

impl AudioSink for RecordingSink {
    fn play(&self, path: &str) {
        self.played.lock().unwrap().push(path.to_string());
    }
}

impl RecordingSink {
    fn played(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }
}

fn kick_snare_kit() -> SoundKit {
    SoundKit::with_pads(
        "Kick & Snare",
        "",
        "sounds/",
        vec![
            PadDescriptor::new("Kick", "sounds/kick.wav"),
            PadDescriptor::new("Snare", "sounds/snare.wav"),
        ],
    )
}

/// Kick on every beat, snare on step 2
fn program_basic_beat(engine: &TransportController) {
    for step in [0, 4, 8, 12] {
        engine.set_step(0, step, true);
    }
    engine.set_step(1, 2, true);
}

/// One bar at 120 BPM triggers exactly the programmed hits, in step order
#[test]
fn test_one_bar_end_to_end() {
    let sink = Arc::new(RecordingSink::default());
    let kit = kick_snare_kit();
    let engine = TransportController::with_runtime(sink.clone(), Some(&kit), None);
    engine.set_tempo(120);
    engine.set_pattern_length(16);
    assert_eq!(engine.step_interval(), Duration::from_millis(125));

    program_basic_beat(&engine);

    engine.play();
    for _ in 0..16 {
        assert!(engine.tick());
    }

    let played = sink.played();
    assert_eq!(
        played,
        vec![
            "sounds/kick.wav",  // step 0
            "sounds/snare.wav", // step 2
            "sounds/kick.wav",  // step 4
            "sounds/kick.wav",  // step 8
            "sounds/kick.wav",  // step 12
        ]
    );
    assert_eq!(played.iter().filter(|p| p.ends_with("kick.wav")).count(), 4);
    assert_eq!(played.iter().filter(|p| p.ends_with("snare.wav")).count(), 1);
    assert_eq!(engine.current_step(), 0);
}

/// Same bar, but scheduled by the tempo clock in virtual time
#[tokio::test(start_paused = true)]
async fn test_one_bar_on_the_clock() {
    let sink = Arc::new(RecordingSink::default());
    let kit = kick_snare_kit();
    let engine = TransportController::new(sink.clone(), Some(&kit));
    program_basic_beat(&engine);

    engine.play();
    tokio::time::sleep(Duration::from_millis(16 * 125 + 50)).await;
    engine.stop();

    assert_eq!(sink.played().len(), 5);
    assert_eq!(engine.current_step(), 0);
    assert_eq!(engine.skipped_ticks(), 0);
}

/// Tempo can change mid-bar without losing or duplicating steps
#[tokio::test(start_paused = true)]
async fn test_tempo_change_mid_playback() {
    let sink = Arc::new(RecordingSink::default());
    let kit = kick_snare_kit();
    let engine = TransportController::new(sink.clone(), Some(&kit));
    let (observer, steps) = ChannelObserver::new();
    engine.set_step_observer(Some(Arc::new(observer)));

    engine.play();
    // Four ticks at 125 ms
    tokio::time::sleep(Duration::from_millis(510)).await;
    engine.set_tempo(60);
    // One transitional tick at 625, then 250 ms steps: 875, 1125
    tokio::time::sleep(Duration::from_millis(700)).await;
    engine.stop();

    let seen: Vec<usize> = steps.try_iter().collect();
    assert_eq!(seen, vec![1, 2, 3, 4, 5, 6, 7]);
}

/// Observer sees one notification per tick in order; host thread receives them
#[test]
fn test_observer_over_channel() {
    let sink = Arc::new(RecordingSink::default());
    let engine = TransportController::with_runtime(sink, None, None);
    let (observer, steps) = ChannelObserver::new();
    engine.set_step_observer(Some(Arc::new(observer)));
    engine.set_pattern_length(4);

    engine.play();
    for _ in 0..6 {
        engine.tick();
    }

    let handle = std::thread::spawn(move || steps.try_iter().collect::<Vec<_>>());
    assert_eq!(handle.join().unwrap(), vec![1, 2, 3, 0, 1, 2]);
}

/// Full transport cycle: play, pause, resume, stop
#[test]
fn test_transport_cycle() {
    let sink = Arc::new(RecordingSink::default());
    let kit = kick_snare_kit();
    let engine = TransportController::with_runtime(sink, Some(&kit), None);

    let log: Arc<Mutex<Vec<usize>>> = Arc::default();
    let observer: Arc<dyn StepObserver> = {
        let log = Arc::clone(&log);
        Arc::new(move |step: usize| log.lock().unwrap().push(step))
    };
    engine.set_step_observer(Some(observer));

    engine.play();
    engine.tick();
    engine.tick();
    engine.tick();
    engine.pause();
    assert_eq!(engine.transport_state(), TransportState::Paused);
    assert!(!engine.tick());

    engine.play();
    engine.tick();
    assert_eq!(engine.current_step(), 4);

    engine.stop();
    assert_eq!(engine.current_step(), 0);
    engine.play();
    engine.tick();

    assert_eq!(*log.lock().unwrap(), vec![1, 2, 3, 4, 1]);
}

/// Switching kits in the library re-voices the same pattern
#[test]
fn test_library_kit_switch() {
    let sink = Arc::new(RecordingSink::default());
    let mut library = KitLibrary::new();
    let engine = TransportController::with_runtime(sink.clone(), Some(&library as &dyn KitSource), None);
    engine.set_step(0, 0, true);
    engine.set_pattern_length(1);

    engine.play();
    engine.tick();

    library.switch_to("Metal").unwrap();
    // Library changes are invisible until rebound
    engine.tick();
    engine.set_current_kit(Some(&library as &dyn KitSource));
    engine.tick();

    assert_eq!(
        sink.played(),
        vec![
            "sounds/kick.wav",
            "sounds/kick.wav",
            "sounds/metal/metalkick.wav"
        ]
    );
}

/// A config file drives tempo and length
#[test]
fn test_config_applied() {
    let config = SequencerConfig::from_toml("tempo = 150\npattern_length = 20\n").unwrap();
    let engine = TransportController::with_runtime(Arc::new(RecordingSink::default()), None, None);
    engine.configure(&config);

    assert_eq!(engine.tempo(), 150);
    assert_eq!(engine.pattern_length(), 16);
    assert_eq!(engine.step_interval(), Duration::from_millis(step_interval_ms(150)));
    assert_eq!(step_interval_ms(150), 100);
}

/// Dispose ends playback for good
#[tokio::test(start_paused = true)]
async fn test_dispose_stops_clock() {
    let sink = Arc::new(RecordingSink::default());
    let kit = kick_snare_kit();
    let engine = TransportController::new(sink.clone(), Some(&kit));
    for step in 0..16 {
        engine.set_step(0, step, true);
    }

    engine.play();
    tokio::time::sleep(Duration::from_millis(260)).await;
    engine.dispose();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(sink.played().len(), 2);
    engine.play();
    assert!(!engine.is_playing());
}
