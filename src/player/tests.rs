use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::audio::{AudioError, AudioEvent, AudioOutput, MediaStatus, OutputState};
use crate::catalog::TrackCatalog;

use super::controller::{FADE_STEPS, PlaybackController, PlaybackError};
use super::params::PlaybackParams;

#[derive(Debug, Clone, PartialEq)]
enum Cmd {
    Load(PathBuf),
    Play,
    Pause,
    Stop,
    Seek(u64),
    SetRate(f32),
    SetGain(f32),
}

/// Scripted audio-output service that records every command.
#[derive(Default)]
struct MockOutput {
    commands: Vec<Cmd>,
    position_ms: u64,
    duration_ms: u64,
    state: OutputState,
    pending: Vec<AudioEvent>,
}

impl MockOutput {
    fn gains(&self) -> Vec<f32> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Cmd::SetGain(g) => Some(*g),
                _ => None,
            })
            .collect()
    }

    fn loads(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Cmd::Load(_)))
            .count()
    }
}

impl AudioOutput for MockOutput {
    fn load(&mut self, path: &Path) -> Result<(), AudioError> {
        self.commands.push(Cmd::Load(path.to_path_buf()));
        self.state = OutputState::Stopped;
        self.position_ms = 0;
        Ok(())
    }

    fn play(&mut self) {
        self.commands.push(Cmd::Play);
        self.state = OutputState::Playing;
    }

    fn pause(&mut self) {
        self.commands.push(Cmd::Pause);
        self.state = OutputState::Paused;
    }

    fn stop(&mut self) {
        self.commands.push(Cmd::Stop);
        self.state = OutputState::Stopped;
        self.position_ms = 0;
    }

    fn seek(&mut self, position_ms: u64) {
        self.commands.push(Cmd::Seek(position_ms));
        self.position_ms = position_ms;
    }

    fn set_rate(&mut self, rate: f32) {
        self.commands.push(Cmd::SetRate(rate));
    }

    fn set_gain(&mut self, gain: f32) {
        self.commands.push(Cmd::SetGain(gain));
    }

    fn position_ms(&self) -> u64 {
        self.position_ms
    }

    fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    fn state(&self) -> OutputState {
        self.state
    }

    fn take_events(&mut self) -> Vec<AudioEvent> {
        std::mem::take(&mut self.pending)
    }
}

fn catalog_with(files: &[&str]) -> (tempfile::TempDir, TrackCatalog) {
    let dir = tempfile::tempdir().unwrap();
    for f in files {
        File::create(dir.path().join(f)).unwrap();
    }
    let mut catalog = TrackCatalog::new();
    catalog.set_root(dir.path()).unwrap();
    (dir, catalog)
}

fn index_of(catalog: &TrackCatalog, name: &str) -> usize {
    catalog
        .tracks()
        .iter()
        .position(|t| t == Path::new(name))
        .unwrap()
}

fn controller() -> PlaybackController<MockOutput> {
    PlaybackController::new(MockOutput::default())
}

#[test]
fn recorded_volume_survives_mute_cycles() {
    let mut player = controller();

    player.set_volume(30);
    player.set_muted(true);
    // Changing volume while muted updates the record, not the output.
    player.set_volume(80);
    assert_eq!(player.params().volume(), 80);
    assert_eq!(player.output_mut().gains(), vec![0.3, 0.0]);

    player.set_muted(false);
    assert_eq!(player.output_mut().gains(), vec![0.3, 0.0, 0.8]);
    assert_eq!(player.params().volume(), 80);
}

#[test]
fn repeat_and_play_all_are_mutually_exclusive() {
    let mut params = PlaybackParams::default();
    params.set_repeat(true);
    params.set_play_all(true);
    assert!(params.play_all());
    assert!(!params.repeat());
    params.set_repeat(true);
    assert!(params.repeat());
    assert!(!params.play_all());

    let mut player = controller();
    player.set_play_all(true);
    player.set_repeat(true);
    assert!(player.params().repeat());
    assert!(!player.params().play_all());
}

#[test]
fn fade_runs_ten_steps_then_stops_and_restores_gain() {
    let (_dir, catalog) = catalog_with(&["a.mp3"]);
    let mut player = controller();
    player.set_volume(60);
    player.play_track(&catalog, 0).unwrap();
    let before = player.output_mut().gains().len();

    player.fade_out_then_stop();
    for step in 1..FADE_STEPS {
        player.tick();
        assert_eq!(player.state(), OutputState::Playing, "stopped early at step {step}");
    }
    player.tick();
    assert_eq!(player.state(), OutputState::Stopped);
    assert!(!player.is_fading());

    let fade_gains = player.output_mut().gains().split_off(before);
    // Nine descending steps, the silent final step, then the restore.
    let mut expected: Vec<f32> = (1..FADE_STEPS)
        .rev()
        .map(|left| 0.6 * f32::from(left) / f32::from(FADE_STEPS))
        .collect();
    expected.push(0.0);
    expected.push(0.6);
    assert_eq!(fade_gains.len(), expected.len());
    for (got, want) in fade_gains.iter().zip(&expected) {
        assert!((got - want).abs() < 1e-6, "gain {got} != {want}");
    }
    assert!(player.output_mut().commands.contains(&Cmd::Stop));
}

#[test]
fn fade_while_stopped_is_a_noop() {
    let mut player = controller();
    player.fade_out_then_stop();
    assert!(!player.is_fading());
    player.tick();
    assert!(player.output_mut().commands.is_empty());
}

#[test]
fn fade_stop_does_not_trigger_auto_advance() {
    let (_dir, catalog) = catalog_with(&["a.mp3", "b.mp3"]);
    let mut player = controller();
    player.set_play_all(true);
    player.play_track(&catalog, 0).unwrap();

    player.fade_out_then_stop();
    for _ in 0..FADE_STEPS {
        player.tick();
    }
    // The stop the fade issued comes back as a service notification.
    player.handle_state_changed(OutputState::Stopped, &catalog);
    assert_eq!(player.state(), OutputState::Stopped);
    assert_eq!(player.output_mut().loads(), 1);
}

#[test]
fn play_all_advances_then_settles_at_the_end() {
    let (dir, catalog) = catalog_with(&["a.mp3", "b.mp3"]);
    let first = index_of(&catalog, "a.mp3");
    let second = index_of(&catalog, "b.mp3");
    let ordered = first < second;
    let (first, second) = if ordered { (first, second) } else { (second, first) };

    let mut player = controller();
    player.set_play_all(true);
    player.play_track(&catalog, first).unwrap();

    player.handle_media_status(MediaStatus::EndOfMedia, &catalog);
    assert_eq!(player.state(), OutputState::Playing);
    assert_eq!(player.selection(), Some(second));
    let loaded = player.loaded_track().unwrap().to_path_buf();
    assert!(loaded.starts_with(dir.path()));

    // Last entry: a further end settles, keeping the track loaded.
    player.handle_media_status(MediaStatus::EndOfMedia, &catalog);
    assert_eq!(player.state(), OutputState::Stopped);
    assert_eq!(player.loaded_track(), Some(loaded.as_path()));
    assert_eq!(player.selection(), Some(second));
}

#[test]
fn repeat_restarts_the_same_track() {
    let (_dir, catalog) = catalog_with(&["a.mp3"]);
    let mut player = controller();
    player.set_repeat(true);
    player.play_track(&catalog, 0).unwrap();

    player.handle_media_status(MediaStatus::EndOfMedia, &catalog);
    assert_eq!(player.state(), OutputState::Playing);
    assert_eq!(player.selection(), Some(0));
    assert!(player.output_mut().commands.contains(&Cmd::Seek(0)));
    assert_eq!(player.output_mut().loads(), 1);
}

#[test]
fn stopped_notification_at_full_position_repeats() {
    let (_dir, catalog) = catalog_with(&["a.mp3"]);
    let mut player = controller();
    player.set_repeat(true);
    player.play_track(&catalog, 0).unwrap();

    player.output_mut().duration_ms = 180_000;
    player.output_mut().position_ms = 180_000;
    player.handle_state_changed(OutputState::Stopped, &catalog);
    assert_eq!(player.state(), OutputState::Playing);
    assert!(player.output_mut().commands.contains(&Cmd::Seek(0)));
}

#[test]
fn stopped_notification_short_of_the_end_settles() {
    let (_dir, catalog) = catalog_with(&["a.mp3"]);
    let mut player = controller();
    player.set_repeat(true);
    player.play_track(&catalog, 0).unwrap();

    player.output_mut().duration_ms = 180_000;
    player.output_mut().position_ms = 90_000;
    player.handle_state_changed(OutputState::Stopped, &catalog);
    assert_eq!(player.state(), OutputState::Stopped);
    assert!(!player.output_mut().commands.contains(&Cmd::Seek(0)));
}

#[test]
fn end_handled_on_one_channel_absorbs_the_other() {
    let (_dir, catalog) = catalog_with(&["a.mp3", "b.mp3"]);
    let mut player = controller();
    player.set_play_all(true);
    player.play_track(&catalog, 0).unwrap();

    player.handle_media_status(MediaStatus::EndOfMedia, &catalog);
    assert_eq!(player.output_mut().loads(), 2);
    assert_eq!(player.state(), OutputState::Playing);

    // The stop notification for the finished track arrives late; it must
    // not advance again or disturb the new track.
    player.handle_state_changed(OutputState::Stopped, &catalog);
    assert_eq!(player.output_mut().loads(), 2);
    assert_eq!(player.state(), OutputState::Playing);
}

#[test]
fn user_stop_suppresses_auto_advance() {
    let (_dir, catalog) = catalog_with(&["a.mp3", "b.mp3"]);
    let mut player = controller();
    player.set_play_all(true);
    player.play_track(&catalog, 0).unwrap();

    player.stop();
    player.handle_state_changed(OutputState::Stopped, &catalog);
    assert_eq!(player.state(), OutputState::Stopped);
    assert_eq!(player.output_mut().loads(), 1);
}

#[test]
fn user_track_change_suppresses_stale_end_notifications() {
    let (_dir, catalog) = catalog_with(&["a.mp3", "b.mp3", "c.mp3"]);
    let mut player = controller();
    player.set_play_all(true);
    player.play_track(&catalog, 0).unwrap();

    // Switching tracks mid-play flags the stop it causes.
    player.play_track(&catalog, 2).unwrap();
    player.handle_media_status(MediaStatus::EndOfMedia, &catalog);
    assert_eq!(player.selection(), Some(2));
    // One load per user action, none from the swallowed notification.
    assert_eq!(player.output_mut().loads(), 2);
}

#[test]
fn volume_zero_mute_and_unmute_all_yield_zero_gain() {
    let mut player = controller();
    player.set_volume(0);
    player.set_muted(true);
    player.set_muted(false);
    assert_eq!(player.output_mut().gains(), vec![0.0, 0.0, 0.0]);
}

#[test]
fn transport_ignores_commands_with_nothing_loaded() {
    let mut player = controller();
    player.play();
    player.pause();
    player.stop();
    player.seek(1000);
    assert!(player.output_mut().commands.is_empty());
    assert_eq!(player.state(), OutputState::Stopped);
}

#[test]
fn speed_set_while_stopped_applies_on_next_play() {
    let (_dir, catalog) = catalog_with(&["a.mp3"]);
    let mut player = controller();

    player.set_speed(150);
    assert!(player.output_mut().commands.is_empty());

    player.play_track(&catalog, 0).unwrap();
    assert!(player.output_mut().commands.contains(&Cmd::SetRate(1.5)));
}

#[test]
fn speed_change_while_playing_applies_immediately() {
    let (_dir, catalog) = catalog_with(&["a.mp3"]);
    let mut player = controller();
    player.play_track(&catalog, 0).unwrap();

    player.set_speed(80);
    assert!(player.output_mut().commands.contains(&Cmd::SetRate(0.8)));
    // Clamped at both ends.
    player.set_speed(10);
    assert_eq!(player.params().speed(), 50);
    player.set_speed(500);
    assert_eq!(player.params().speed(), 150);
}

#[test]
fn missing_file_is_a_nonfatal_error() {
    let (dir, catalog) = catalog_with(&["a.mp3", "gone.mp3"]);
    let gone = index_of(&catalog, "gone.mp3");
    fs::remove_file(dir.path().join("gone.mp3")).unwrap();

    let mut player = controller();
    let err = player.play_track(&catalog, gone).unwrap_err();
    assert!(matches!(err, PlaybackError::TrackMissing(_)));
    assert_eq!(player.state(), OutputState::Stopped);
    assert_eq!(player.output_mut().loads(), 0);
    assert!(player.loaded_track().is_none());
}

#[test]
fn auto_advance_skips_nothing_when_play_all_is_off() {
    let (_dir, catalog) = catalog_with(&["a.mp3", "b.mp3"]);
    let mut player = controller();
    player.play_track(&catalog, 0).unwrap();

    player.handle_media_status(MediaStatus::EndOfMedia, &catalog);
    assert_eq!(player.state(), OutputState::Stopped);
    assert_eq!(player.output_mut().loads(), 1);
    assert_eq!(player.selection(), Some(0));
}
