//! The playback session engine.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use bridge_traits::{AudioBackend, PlayerState};
use core_library::Song;
use core_runtime::{CoreEvent, EventBus, PlayerEvent};

use crate::error::Result;
use crate::queue::{PlayQueue, Position};

/// Point-in-time view of the session, safe to hand across an API boundary.
#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    pub state: PlayerState,
    pub current: Option<Song>,
    pub queue: Vec<Song>,
    pub history: Vec<Song>,
}

struct SessionState {
    queue: PlayQueue,
    current: Option<Song>,
    state: PlayerState,
}

struct PlayerInner {
    backend: Arc<dyn AudioBackend>,
    events: EventBus,
    session: Mutex<SessionState>,
    /// Holds the token of the latest in-flight backend advance. Issuing a
    /// new transport command cancels whatever was still pending here.
    advance_slot: Mutex<Option<CancellationToken>>,
}

/// Queue-driven player over a platform audio backend.
///
/// All queue, history and current-song mutations are serialized through one
/// session lock, with backend scheduling mirrored while holding it. The
/// awaited advance of a skip runs outside the lock under a single-slot
/// cancellation token, so each new transport command supersedes whatever
/// advance is still in flight. Commands issued concurrently apply in lock
/// order, and the last one to complete decides the final state; a
/// background watcher mirrors backend-reported state, elapsed time and
/// end-of-track signals back into the session.
pub struct MusicPlayer {
    inner: Arc<PlayerInner>,
    watcher: JoinHandle<()>,
}

impl MusicPlayer {
    pub fn new(backend: Arc<dyn AudioBackend>, events: EventBus) -> Self {
        let inner = Arc::new(PlayerInner {
            backend,
            events,
            session: Mutex::new(SessionState {
                queue: PlayQueue::new(),
                current: None,
                state: PlayerState::Inactive,
            }),
            advance_slot: Mutex::new(None),
        });
        let watcher = tokio::spawn(watch_backend(Arc::clone(&inner)));
        Self { inner, watcher }
    }

    /// Starts a fresh session from one song, discarding queue and history.
    ///
    /// If the backend refuses to start, the song stays consumed: it is not
    /// retried and the engine is left `Inactive` with the failure reported
    /// on the event bus.
    pub async fn play(&self, song: Song) -> Result<()> {
        let inner = &self.inner;
        let mut s = inner.session.lock().await;
        inner.cancel_pending_advance().await;

        s.queue.clear();
        s.current = None;
        inner.backend.stop().await?;

        // The song goes straight to current without a history record; a
        // fresh session has nothing to skip back to.
        s.current = Some(song.clone());
        inner.emit_song(&s);
        inner.emit_queue(&s);

        let started = async {
            inner.backend.append(&song.id).await?;
            inner.backend.start().await
        }
        .await;

        match started {
            Ok(()) => {
                info!(song_id = %song.id, "playback started");
                inner.set_state(&mut s, PlayerState::Playing);
                Ok(())
            }
            Err(err) => {
                error!(song_id = %song.id, %err, "playback failed to start");
                inner
                    .events
                    .emit(CoreEvent::Player(PlayerEvent::Error {
                        song_id: Some(song.id.clone()),
                        message: err.to_string(),
                    }))
                    .ok();
                inner.set_state(&mut s, PlayerState::Inactive);
                Err(err.into())
            }
        }
    }

    /// Adds a song to the queue and mirrors it into the backend's schedule.
    pub async fn enqueue(&self, song: Song, position: Position) -> Result<()> {
        let inner = &self.inner;
        let mut s = inner.session.lock().await;
        match position {
            Position::Next => inner.backend.insert_next(&song.id).await?,
            Position::Last => inner.backend.append(&song.id).await?,
        }
        s.queue.enqueue(song, position);
        inner.emit_queue(&s);
        Ok(())
    }

    /// Pauses playback. Tolerated from any state; only a `Playing` engine
    /// actually transitions.
    pub async fn pause(&self) -> Result<()> {
        let inner = &self.inner;
        let mut s = inner.session.lock().await;
        if s.state != PlayerState::Playing {
            return Ok(());
        }
        inner.backend.pause().await?;
        inner.set_state(&mut s, PlayerState::Paused);
        Ok(())
    }

    /// Resumes a paused session. Tolerated from any state.
    pub async fn resume(&self) -> Result<()> {
        let inner = &self.inner;
        let mut s = inner.session.lock().await;
        if s.state != PlayerState::Paused {
            return Ok(());
        }
        inner.backend.resume().await?;
        inner.set_state(&mut s, PlayerState::Playing);
        Ok(())
    }

    /// Ends the session, dropping queue, history and the current song.
    pub async fn stop(&self) -> Result<()> {
        let inner = &self.inner;
        let mut s = inner.session.lock().await;
        inner.cancel_pending_advance().await;

        inner.backend.stop().await?;
        s.queue.clear();
        s.current = None;
        inner.emit_song(&s);
        inner.emit_queue(&s);
        inner.set_state(&mut s, PlayerState::Inactive);
        Ok(())
    }

    /// Skips to the queue head. An empty queue is a strict no-op: nothing
    /// changes and the backend is not touched.
    pub async fn skip_forward(&self) -> Result<()> {
        let inner = &self.inner;
        let (token, prior) = {
            let mut s = inner.session.lock().await;
            let Some(song) = s.queue.advance() else {
                debug!("skip forward with empty queue ignored");
                return Ok(());
            };
            s.current = Some(song);
            inner.emit_song(&s);
            inner.emit_queue(&s);
            let prior = s.state;
            inner.set_state(&mut s, PlayerState::Playing);
            (inner.begin_advance().await, prior)
        };

        // The advance runs outside the session lock so that a newer
        // command can supersede it through the token.
        inner.advance_backend(&token).await?;
        if token.is_cancelled() {
            return Ok(());
        }
        inner.restart_transport(prior).await
    }

    /// Skips back to the most recent history entry, pushing the current
    /// song to the queue head so a forward skip replays it. An empty
    /// history is a no-op and the backend is not touched.
    pub async fn skip_backward(&self) -> Result<()> {
        let inner = &self.inner;
        let (token, prior) = {
            let mut s = inner.session.lock().await;
            let current = s.current.clone();
            let Some(previous) = s.queue.rewind(current.clone()) else {
                debug!("skip backward with empty history ignored");
                return Ok(());
            };

            // Schedule: the requeued current first, then the song we are
            // going back to in front of it, then jump.
            if let Some(current) = &current {
                inner.backend.insert_next(&current.id).await?;
            }
            inner.backend.insert_next(&previous.id).await?;

            s.current = Some(previous);
            inner.emit_song(&s);
            inner.emit_queue(&s);
            let prior = s.state;
            inner.set_state(&mut s, PlayerState::Playing);
            (inner.begin_advance().await, prior)
        };

        inner.advance_backend(&token).await?;
        if token.is_cancelled() {
            return Ok(());
        }
        inner.restart_transport(prior).await
    }

    /// The audio session was taken away (phone call, other app). Playback
    /// pauses so it can be resumed when the interruption ends.
    pub async fn handle_interruption_began(&self) {
        if let Err(err) = self.pause().await {
            warn!(%err, "pause on interruption failed");
        }
    }

    /// The interruption ended. `should_resume` carries the platform's hint
    /// on whether playback ought to continue automatically.
    pub async fn handle_interruption_ended(&self, should_resume: bool) {
        if !should_resume {
            return;
        }
        if let Err(err) = self.resume().await {
            warn!(%err, "resume after interruption failed");
        }
    }

    pub async fn state(&self) -> PlayerState {
        self.inner.session.lock().await.state
    }

    pub async fn current(&self) -> Option<Song> {
        self.inner.session.lock().await.current.clone()
    }

    pub async fn snapshot(&self) -> PlayerSnapshot {
        let s = self.inner.session.lock().await;
        PlayerSnapshot {
            state: s.state,
            current: s.current.clone(),
            queue: s.queue.queued(),
            history: s.queue.history(),
        }
    }
}

impl Drop for MusicPlayer {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

impl PlayerInner {
    /// Cancels whatever backend advance is still in flight.
    async fn cancel_pending_advance(&self) {
        let mut slot = self.advance_slot.lock().await;
        if let Some(previous) = slot.take() {
            previous.cancel();
        }
    }

    /// Cancels the previously scheduled advance and installs the token of
    /// the one about to be issued. Called while holding the session lock,
    /// so the queue mutation and the token swap are one atomic step.
    async fn begin_advance(&self) -> CancellationToken {
        let mut slot = self.advance_slot.lock().await;
        if let Some(previous) = slot.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        *slot = Some(token.clone());
        token
    }

    /// Runs one backend advance under its cancellation token. A newer
    /// transport command cancelling the token turns this into a no-op.
    async fn advance_backend(&self, token: &CancellationToken) -> Result<()> {
        tokio::select! {
            _ = token.cancelled() => {
                debug!("backend advance superseded");
                Ok(())
            }
            result = self.backend.advance() => Ok(result?),
        }
    }

    /// Brings the transport back to audible playback after a skip, based
    /// on what the engine was doing before it.
    async fn restart_transport(&self, prior: PlayerState) -> Result<()> {
        match prior {
            PlayerState::Inactive => self.backend.start().await?,
            PlayerState::Paused => self.backend.resume().await?,
            PlayerState::Playing => {}
        }
        Ok(())
    }

    /// Mirrors a backend-reported state change into the session. Reports
    /// that match the session state, and reports of activity while no song
    /// is current, are ignored.
    async fn handle_backend_state(&self, reported: PlayerState) {
        let mut s = self.session.lock().await;
        if s.state == reported {
            return;
        }
        if s.current.is_none() && reported != PlayerState::Inactive {
            debug!(?reported, "backend activity without a session ignored");
            return;
        }
        debug!(?reported, "mirroring backend state");
        self.set_state(&mut s, reported);
    }

    fn set_state(&self, s: &mut SessionState, state: PlayerState) {
        if s.state == state {
            return;
        }
        s.state = state;
        self.events
            .emit(CoreEvent::Player(PlayerEvent::StateChanged { state }))
            .ok();
    }

    fn emit_song(&self, s: &SessionState) {
        self.events
            .emit(CoreEvent::Player(PlayerEvent::CurrentSongChanged {
                song_id: s.current.as_ref().map(|song| song.id.clone()),
            }))
            .ok();
    }

    fn emit_queue(&self, s: &SessionState) {
        self.events
            .emit(CoreEvent::Player(PlayerEvent::QueueChanged {
                size: s.queue.queue_len(),
            }))
            .ok();
        self.events
            .emit(CoreEvent::Player(PlayerEvent::HistoryChanged {
                size: s.queue.history_len(),
            }))
            .ok();
    }

    /// A scheduled track finished in the backend. The backend continues to
    /// its next scheduled item on its own; this mirrors that move into the
    /// queue, or winds the session down when nothing is left.
    async fn handle_track_ended(&self, ended_id: &str) {
        let mut s = self.session.lock().await;
        if s.current.as_ref().map(|song| song.id.as_str()) != Some(ended_id) {
            debug!(ended_id, "stale track-end signal ignored");
            return;
        }

        match s.queue.advance() {
            Some(next) => {
                debug!(song_id = %next.id, "advancing to next queued song");
                s.current = Some(next);
                self.emit_song(&s);
                self.emit_queue(&s);
            }
            None => {
                info!("queue exhausted, session ending");
                if let Err(err) = self.backend.stop().await {
                    warn!(%err, "backend stop at end of queue failed");
                }
                s.current = None;
                self.emit_song(&s);
                self.set_state(&mut s, PlayerState::Inactive);
            }
        }
    }
}

async fn watch_backend(inner: Arc<PlayerInner>) {
    let mut ended = inner.backend.subscribe_track_ended();
    let mut elapsed = inner.backend.subscribe_elapsed();
    let mut state = inner.backend.subscribe_state();
    loop {
        tokio::select! {
            changed = elapsed.changed() => {
                if changed.is_err() {
                    break;
                }
                let seconds = elapsed.borrow_and_update().as_secs();
                inner
                    .events
                    .emit(CoreEvent::Player(PlayerEvent::ElapsedChanged { seconds }))
                    .ok();
            }
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let reported = *state.borrow_and_update();
                inner.handle_backend_state(reported).await;
            }
            message = ended.recv() => match message {
                Ok(song_id) => inner.handle_track_ended(&song_id).await,
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "track-end signals dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}
