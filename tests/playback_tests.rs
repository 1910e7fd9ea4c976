//! Playback tests
//!
//! Real-time pacing, the audio/video rendezvous and pause/stop control across
//! threads.

use spidyani::playback::{AvRendezvous, PacedConsumer, PlaybackControl};
use spidyani::{
    spawn_event_channel, Algorithm, AnimationDecoder, AnimationWriter, DecodeEvent,
    DecoderOptions, Frame, Header, SessionOutcome, SpidyAniError, StreamConsumer, StreamInfo,
};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Consumer standing in for a video surface
struct Surface {
    data: Vec<u8>,
    control: PlaybackControl,
    rendezvous: Option<AvRendezvous>,
    presented: Vec<(u32, Instant)>,
    audio_ready_at_first_frame: Option<bool>,
    audio_ready: Arc<AtomicBool>,
    info: Option<StreamInfo>,
    finished: bool,
}

impl Surface {
    fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            control: PlaybackControl::new(),
            rendezvous: None,
            presented: Vec::new(),
            audio_ready_at_first_frame: None,
            audio_ready: Arc::new(AtomicBool::new(false)),
            info: None,
            finished: false,
        }
    }
}

impl StreamConsumer for Surface {
    type Source = Cursor<Vec<u8>>;

    fn file_name(&self) -> &str {
        "surface"
    }

    fn new_input_stream(&mut self) -> std::io::Result<Self::Source> {
        Ok(Cursor::new(self.data.clone()))
    }

    fn initialize(&mut self, info: &StreamInfo) {
        self.info = Some(info.clone());
    }

    fn image_data(&mut self, frame: &Frame) {
        if self.audio_ready_at_first_frame.is_none() {
            self.audio_ready_at_first_frame = Some(self.audio_ready.load(Ordering::SeqCst));
        }
        self.presented.push((frame.index, Instant::now()));
    }

    fn audio_data(&mut self, _samples: &[u8]) {}

    fn is_paused(&self) -> bool {
        self.control.is_paused()
    }

    fn is_stopped(&self) -> bool {
        self.control.is_stopped()
    }

    fn wait_while_paused(&mut self) {
        self.control.wait_while_paused();
    }

    fn rendezvous(&mut self) {
        if let Some(rendezvous) = self.rendezvous.as_mut() {
            rendezvous.wait();
        }
    }

    fn fatal(&mut self, error: SpidyAniError) {
        panic!("unexpected failure: {error}");
    }

    fn finished(&mut self) {
        self.finished = true;
    }

    fn stopped(&mut self) {}
}

/// Frames of solid color with `audio` bytes of sound up front
fn container(frames: u16, audio: usize) -> Vec<u8> {
    let header = Header::new(4, 4, frames, Algorithm::Type2, true);
    let mut writer = AnimationWriter::new(Vec::new(), header).unwrap();
    writer.write_audio(&vec![0x80; audio]).unwrap();
    for i in 0..frames {
        writer.write_frame(&[i as u8; 16]).unwrap();
    }
    writer.finish().unwrap()
}

#[test]
fn test_paced_presentation() {
    // 6 frames over 2540 sound bytes: 52.09 fps, about 19 ms per frame
    let data = container(6, 2540);
    let mut paced = PacedConsumer::new(Surface::new(data));

    let started = Instant::now();
    let outcome = AnimationDecoder::new().run(&mut paced);
    let elapsed = started.elapsed();

    assert!(matches!(outcome, SessionOutcome::Finished(_)));
    assert_eq!(paced.position().frame_index, 6);
    let surface = paced.into_inner();
    assert!(surface.finished);
    assert_eq!(surface.presented.len(), 6);

    let fps = surface.info.map(|info| info.fps).unwrap_or_default();
    assert!((fps - 6.0 * 22050.0 / 2540.0).abs() < 1e-9);

    // Frame five is due five periods after frame zero
    let period = Duration::from_secs_f64(1.0 / fps);
    let span = surface.presented[5].1 - surface.presented[0].1;
    assert!(span + Duration::from_millis(2) >= period * 5);
    assert!(elapsed >= period * 5);
}

#[test]
fn test_audio_rendezvous_before_first_frame() {
    let data = container(3, 1270);
    let (video_side, mut audio_side) = AvRendezvous::pair();

    let mut surface = Surface::new(data);
    surface.rendezvous = Some(video_side);
    let audio_ready = Arc::clone(&surface.audio_ready);

    let audio = thread::spawn(move || {
        // Stand-in for opening the device and computing the start delay
        thread::sleep(Duration::from_millis(30));
        audio_ready.store(true, Ordering::SeqCst);
        audio_side.wait()
    });

    let outcome = AnimationDecoder::new().run(&mut surface);
    assert!(audio.join().unwrap());
    assert!(matches!(outcome, SessionOutcome::Finished(_)));
    assert_eq!(surface.audio_ready_at_first_frame, Some(true));
    assert!(surface
        .rendezvous
        .as_ref()
        .is_some_and(AvRendezvous::has_arrived));
}

#[test]
fn test_pause_and_resume_from_another_thread() {
    let data = container(4, 0);
    let mut surface = Surface::new(data);
    let control = surface.control.clone();
    control.pause();

    let resumer = {
        let control = control.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(40));
            control.resume();
        })
    };

    let started = Instant::now();
    let outcome = AnimationDecoder::new().run(&mut surface);
    resumer.join().unwrap();

    assert!(started.elapsed() >= Duration::from_millis(40));
    assert!(matches!(outcome, SessionOutcome::Finished(ref stats) if stats.frames == 4));
    assert_eq!(surface.presented.len(), 4);
}

#[test]
fn test_stop_while_paused() {
    let data = container(4, 0);
    let mut surface = Surface::new(data);
    let control = surface.control.clone();
    control.pause();

    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        control.stop();
    });

    let outcome = AnimationDecoder::new().run(&mut surface);
    stopper.join().unwrap();

    assert!(matches!(outcome, SessionOutcome::Stopped(ref stats) if stats.frames == 0));
    assert!(surface.presented.is_empty());
    assert!(surface.info.is_some());
}

#[test]
fn test_paused_event_channel_holds_frames() {
    let data = container(3, 0);
    let channel = spawn_event_channel(
        "paused",
        move || Ok(Cursor::new(data.clone())),
        DecoderOptions::default(),
        1,
    )
    .unwrap();
    channel.control().pause();

    // With room for one event the producer is at most one frame ahead
    let mut early = Vec::new();
    while let Some(event) = channel.recv_timeout(Duration::from_millis(50)) {
        early.push(event);
    }
    let early_frames = early
        .iter()
        .filter(|event| matches!(event, DecodeEvent::Frame(_)))
        .count();
    assert!(early_frames <= 1);

    channel.control().resume();
    let rest: Vec<DecodeEvent> = channel.collect();
    let frames = early_frames
        + rest
            .iter()
            .filter(|event| matches!(event, DecodeEvent::Frame(_)))
            .count();
    assert_eq!(frames, 3);
    assert!(matches!(rest.last(), Some(DecodeEvent::Finished)));
}
