//! Typewriter Engine
//!
//! Reveals text into a [`Target`] one visible character at a time. Markup
//! tags are atomic: they appear together with the visible character they
//! precede and are never shown half-open.
//!
//! # Timing Modes
//!
//! - [`TypewriterMode::PerCharDelay`]: one character per delay, driven by
//!   chained continuations in the engine's [`Scheduler`]
//! - [`TypewriterMode::TotalDuration`]: the whole source in a fixed time,
//!   evaluated per frame as `floor(min(elapsed / total, 1) * count)`
//!
//! # Sessions
//!
//! At most one session runs per target. Starting a new one supersedes the old
//! one: its continuations are removed, and any that slip through are dropped
//! because their [`SessionId`] no longer matches. A superseded or cancelled
//! session never completes.

pub mod markup;

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::messages::Target;
use crate::scheduler::Scheduler;

/// How a session paces its reveal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypewriterMode {
    /// Fixed delay before each visible character
    PerCharDelay(Duration),
    /// Fixed total time for the whole source
    TotalDuration(Duration),
}

/// Unique id of one started session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

/// Callback fired once when a session reveals its whole source
pub type CompletionCallback = Box<dyn FnOnce() + Send>;

/// A request to reveal `source` into `target`
pub struct TypewriterSession {
    /// Where the text goes
    pub target: Target,
    /// Text to reveal, possibly with inline markup
    pub source: String,
    /// Pacing
    pub mode: TypewriterMode,
    /// Whether a cursor trails the text while typing
    pub cursor_visible: bool,
    on_complete: Option<CompletionCallback>,
}

impl TypewriterSession {
    /// Create a session with a visible cursor and no callback
    pub fn new(target: Target, source: impl Into<String>, mode: TypewriterMode) -> Self {
        Self {
            target,
            source: source.into(),
            mode,
            cursor_visible: true,
            on_complete: None,
        }
    }

    /// Show or hide the typing cursor
    #[must_use]
    pub fn with_cursor(mut self, visible: bool) -> Self {
        self.cursor_visible = visible;
        self
    }

    /// Run `callback` when the whole source has been revealed
    #[must_use]
    pub fn on_complete(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for TypewriterSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypewriterSession")
            .field("target", &self.target)
            .field("source", &self.source)
            .field("mode", &self.mode)
            .field("cursor_visible", &self.cursor_visible)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Output of the engine, applied by the owner in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypewriterUpdate {
    /// Replace the target's text
    Text {
        /// Element to write
        target: Target,
        /// Session that produced the text
        session: SessionId,
        /// Revealed markup
        text: String,
        /// Whether the cursor should show
        cursor: bool,
    },
    /// The session revealed its whole source
    Completed {
        /// Element that finished
        target: Target,
        /// Session that finished
        session: SessionId,
    },
}

/// Continuation of a per-character session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RevealNext {
    target: Target,
    session: SessionId,
}

struct ActiveSession {
    id: SessionId,
    snapshots: Vec<String>,
    revealed: usize,
    mode: TypewriterMode,
    started: Duration,
    cursor: bool,
    on_complete: Option<CompletionCallback>,
}

/// Restartable, cancelable character reveal
#[derive(Default)]
pub struct TypewriterEngine {
    sessions: BTreeMap<Target, ActiveSession>,
    scheduler: Scheduler<RevealNext>,
    outbox: Vec<TypewriterUpdate>,
    next_session: u64,
}

impl fmt::Debug for TypewriterEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypewriterEngine")
            .field("sessions", &self.sessions.keys().collect::<Vec<_>>())
            .field("pending", &self.scheduler.len())
            .finish()
    }
}

impl TypewriterEngine {
    /// Create an idle engine
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start revealing `session` at time `now`
    ///
    /// Supersedes any session already bound to the same target and clears the
    /// target. A source with no visible characters completes immediately. The
    /// resulting updates are queued; collect them with [`drain`](Self::drain)
    /// or the next [`tick`](Self::tick).
    pub fn start(&mut self, session: TypewriterSession, now: Duration) -> SessionId {
        let target = session.target;
        if self.cancel(target) {
            tracing::debug!(element = %target.name(), "Typewriter session superseded");
        }

        let id = SessionId(self.next_session);
        self.next_session += 1;
        self.scheduler.set_now(now);

        let snapshots = markup::snapshots(&session.source);
        self.outbox.push(TypewriterUpdate::Text {
            target,
            session: id,
            text: String::new(),
            cursor: session.cursor_visible,
        });

        let mut active = ActiveSession {
            id,
            snapshots,
            revealed: 0,
            mode: session.mode,
            started: now,
            cursor: session.cursor_visible,
            on_complete: session.on_complete,
        };

        let visible = markup::visible_len(&session.source);
        if visible == 0 {
            active.revealed = active.snapshots.len();
            self.finish(target, active);
            return id;
        }

        if let TypewriterMode::PerCharDelay(delay) = active.mode {
            self.scheduler
                .schedule_at(now.saturating_add(delay), RevealNext { target, session: id });
        }

        tracing::trace!(element = %target.name(), session = id.0, chars = visible, "Typewriter started");
        self.sessions.insert(target, active);
        id
    }

    /// Cancel the session bound to `target`
    ///
    /// Its pending continuations are removed and its completion never fires.
    /// Returns whether a session was running.
    pub fn cancel(&mut self, target: Target) -> bool {
        let Some(old) = self.sessions.remove(&target) else {
            return false;
        };
        self.scheduler
            .cancel_where(|cue| cue.target == target && cue.session == old.id);
        true
    }

    /// Cancel every session
    pub fn cancel_all(&mut self) {
        self.sessions.clear();
        self.scheduler.cancel_all();
        self.outbox.clear();
    }

    /// Whether a session is revealing into `target`
    #[must_use]
    pub fn is_active(&self, target: Target) -> bool {
        self.sessions.contains_key(&target)
    }

    /// Id of the session bound to `target`
    #[must_use]
    pub fn session_for(&self, target: Target) -> Option<SessionId> {
        self.sessions.get(&target).map(|s| s.id)
    }

    /// Number of running sessions
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Take queued updates without advancing time
    pub fn drain(&mut self) -> Vec<TypewriterUpdate> {
        std::mem::take(&mut self.outbox)
    }

    /// Advance every session to `now`
    ///
    /// Returns the updates produced since the last drain, in order.
    pub fn tick(&mut self, now: Duration) -> Vec<TypewriterUpdate> {
        while let Some((_, cue)) = self.scheduler.pop_due(now) {
            self.reveal_next(cue);
        }

        let timed: Vec<Target> = self
            .sessions
            .iter()
            .filter(|(_, s)| matches!(s.mode, TypewriterMode::TotalDuration(_)))
            .map(|(target, _)| *target)
            .collect();
        for target in timed {
            self.advance_timed(target, now);
        }

        self.drain()
    }

    fn reveal_next(&mut self, cue: RevealNext) {
        let Some(session) = self.sessions.get_mut(&cue.target) else {
            tracing::trace!(element = %cue.target.name(), "Dropping reveal for idle target");
            return;
        };
        if session.id != cue.session {
            tracing::trace!(element = %cue.target.name(), "Dropping reveal from superseded session");
            return;
        }

        session.revealed += 1;
        if session.revealed >= session.snapshots.len() {
            if let Some(active) = self.sessions.remove(&cue.target) {
                self.finish(cue.target, active);
            }
            return;
        }

        self.outbox.push(TypewriterUpdate::Text {
            target: cue.target,
            session: session.id,
            text: session.snapshots[session.revealed - 1].clone(),
            cursor: session.cursor,
        });
        if let TypewriterMode::PerCharDelay(delay) = session.mode {
            self.scheduler.schedule_after(delay, cue);
        }
    }

    fn advance_timed(&mut self, target: Target, now: Duration) {
        let Some(session) = self.sessions.get_mut(&target) else {
            return;
        };
        let TypewriterMode::TotalDuration(total) = session.mode else {
            return;
        };

        let elapsed = now.saturating_sub(session.started);
        if elapsed >= total {
            if let Some(active) = self.sessions.remove(&target) {
                self.finish(target, active);
            }
            return;
        }

        let count = session.snapshots.len();
        let fraction = elapsed.as_secs_f64() / total.as_secs_f64();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let revealed = ((fraction.min(1.0) * count as f64).floor() as usize).min(count);
        if revealed == session.revealed {
            return;
        }
        if revealed >= count {
            if let Some(active) = self.sessions.remove(&target) {
                self.finish(target, active);
            }
            return;
        }

        session.revealed = revealed;
        self.outbox.push(TypewriterUpdate::Text {
            target,
            session: session.id,
            text: if revealed == 0 {
                String::new()
            } else {
                session.snapshots[revealed - 1].clone()
            },
            cursor: session.cursor,
        });
    }

    /// Write the final snapshot and fire completion exactly once
    fn finish(&mut self, target: Target, mut active: ActiveSession) {
        let text = active.snapshots.last().cloned().unwrap_or_default();
        self.outbox.push(TypewriterUpdate::Text {
            target,
            session: active.id,
            text,
            cursor: false,
        });
        self.outbox.push(TypewriterUpdate::Completed {
            target,
            session: active.id,
        });
        tracing::trace!(element = %target.name(), session = active.id.0, "Typewriter completed");

        if let Some(callback) = active.on_complete.take() {
            callback();
        }
    }
}
