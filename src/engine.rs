//! Threaded session driver.
//!
//! [SessionRunner] owns the two logically concurrent activities of a
//! running session: draining audio frames into the estimation pipeline
//! and ticking the trial scheduler. Both run on one polling worker
//! thread behind a single mutex, so frame processing and timer
//! transitions are never interleaved and frames from a finished trial
//! cannot touch the next one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::info;
use parking_lot::Mutex;

use crate::error::SessionError;
use crate::scoring::ScoreState;
use crate::session::Session;

/// One buffer of time domain samples plus the rate they were captured
/// at. Produced by the audio source, consumed once, not retained.
#[derive(Clone, Debug)]
pub struct AudioFrame {
    pub samples: Vec<f32>,
    pub sample_rate: f32,
}

/// Supplies microphone frames to a running session. Acquiring the
/// device happens before a source exists; constructors of
/// implementations report failure as [SessionError::SetupFailure].
pub trait AudioSource: Send {
    /// The sample rate of the frames this source produces, in Hz.
    fn sample_rate(&self) -> f32;
    /// Returns the next frame if one is ready. Must never block.
    fn next_frame(&mut self) -> Option<AudioFrame>;
}

/// An [AudioSource] reading frames from the consumer side of an SPSC
/// ring buffer, typically fed by a real time audio callback on the
/// producer side.
pub struct RingBufferSource {
    sample_rate: f32,
    frames: rtrb::Consumer<AudioFrame>,
}

impl RingBufferSource {
    pub fn new(sample_rate: f32, frames: rtrb::Consumer<AudioFrame>) -> RingBufferSource {
        RingBufferSource {
            sample_rate,
            frames,
        }
    }
}

impl AudioSource for RingBufferSource {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn next_frame(&mut self) -> Option<AudioFrame> {
        self.frames.pop().ok()
    }
}

/// Drives a [Session] until stopped: polls the audio source, feeds
/// frames through [Session::process_frame] and advances the scheduler
/// with [Session::tick].
pub struct SessionRunner {
    session: Arc<Mutex<Session>>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SessionRunner {
    /// How long the worker sleeps between polls when no frame is ready.
    pub const POLL_INTERVAL: Duration = Duration::from_millis(30);

    /// Starts the session and spawns the worker thread. Fails without
    /// starting anything if the source is unusable.
    pub fn start(
        session: Session,
        mut source: Box<dyn AudioSource>,
    ) -> Result<SessionRunner, SessionError> {
        let sample_rate = source.sample_rate();
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SessionError::SetupFailure(format!(
                "audio source reports sample rate {} Hz",
                sample_rate
            )));
        }

        let session = Arc::new(Mutex::new(session));
        let running = Arc::new(AtomicBool::new(true));
        session.lock().start(Instant::now());

        let worker = {
            let session = Arc::clone(&session);
            let running = Arc::clone(&running);
            thread::spawn(move || {
                while running.load(Ordering::Acquire) {
                    {
                        let mut session = session.lock();
                        while let Some(frame) = source.next_frame() {
                            session.process_frame(&frame.samples, frame.sample_rate);
                        }
                        session.tick(Instant::now());
                    }
                    thread::sleep(SessionRunner::POLL_INTERVAL);
                }
                session.lock().stop();
            })
        };

        Ok(SessionRunner {
            session,
            running,
            worker: Some(worker),
        })
    }

    /// The shared session, for inspecting score or phase while running.
    pub fn session(&self) -> &Arc<Mutex<Session>> {
        &self.session
    }

    pub fn score(&self) -> ScoreState {
        self.session.lock().score()
    }

    /// Stops the worker and the session. When this returns, no further
    /// frame processing or trial state mutation takes place.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.worker.is_none() {
            return;
        }
        self.running.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        info!("session runner stopped");
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}
