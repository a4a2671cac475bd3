//! Playback clock.
//!
//! A single tokio task advances the playhead by measured wall-clock time on
//! each frame tick, pins it at the end of the timeline and stops there. The
//! task holds only a weak reference to the store, and each run carries a
//! generation number so a stale task can never write after a stop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::store::{modify_state, StoreInner, TimelineStore};

#[derive(Debug, Default)]
pub(crate) struct PlaybackClock {
    task: Mutex<Option<JoinHandle<()>>>,
    generation: AtomicU64,
}

impl PlaybackClock {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Invalidate the running task and abort it.
    pub(crate) fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }
}

impl TimelineStore {
    /// Start advancing the playhead. Does nothing if already playing. Needs a
    /// tokio runtime; without one the call is logged and ignored.
    pub fn start_playback(&self) {
        let Ok(runtime) = Handle::try_current() else {
            warn!("start_playback: no tokio runtime, playback not started");
            return;
        };

        let clock = &self.inner.clock;
        let mut task = clock.task.lock().unwrap_or_else(PoisonError::into_inner);

        let started = self.modify(|state| {
            if state.project.is_playing {
                return (false, false);
            }
            state.project.is_playing = true;
            (true, true)
        });
        if !started {
            return;
        }

        let generation = clock.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = task.take() {
            previous.abort();
        }

        let frame = self.inner.playback.frame_interval();
        let weak = std::sync::Arc::downgrade(&self.inner);
        *task = Some(runtime.spawn(run_clock(weak, frame, generation)));
        debug!(generation, frame_ms = frame.as_millis() as u64, "Playback started");
    }

    /// Stop playback and cancel the frame task. The playhead stays where it is.
    pub fn stop_playback(&self) {
        self.inner.clock.cancel();
        let stopped = self.modify(|state| {
            let was_playing = state.project.is_playing;
            state.project.is_playing = false;
            (was_playing, was_playing)
        });
        if stopped {
            debug!("Playback stopped");
        }
    }

    pub fn toggle_playback(&self) {
        if self.is_playing() {
            self.stop_playback();
        } else {
            self.start_playback();
        }
    }
}

async fn run_clock(store: Weak<StoreInner>, frame: Duration, generation: u64) {
    let mut ticker = interval(frame);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // First tick completes immediately.
    ticker.tick().await;
    let mut last_tick = Instant::now();

    loop {
        ticker.tick().await;
        let Some(inner) = store.upgrade() else {
            return;
        };

        let now = Instant::now();
        let delta = now.saturating_duration_since(last_tick);
        last_tick = now;

        if !advance(&inner, delta, generation) {
            return;
        }
    }
}

/// Move the playhead forward by `delta`. Returns false once this run is over.
fn advance(inner: &StoreInner, delta: Duration, generation: u64) -> bool {
    modify_state(inner, |state| {
        let project = &mut state.project;
        if !project.is_playing || !inner.clock.is_current(generation) {
            return (false, false);
        }

        let next = project.current_time + delta.as_secs_f64() * 1000.0;
        if next >= project.duration {
            // Large deltas after a suspend land here too.
            project.current_time = project.duration.max(0.0);
            project.is_playing = false;
            debug!(generation, duration = project.duration, "Playback reached end");
            return (false, true);
        }
        project.current_time = next;
        (true, true)
    })
}
