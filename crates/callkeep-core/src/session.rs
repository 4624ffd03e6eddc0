//! Capture and playback session state machines.
//!
//! The state here is driven by explicit events from the external audio
//! engine instead of polled flags. Illegal transitions are typed errors so a
//! UI layer can surface them as notices; nothing panics.
//!
//! Capture:  Idle → Recording → Stopped(uri) → Tagging → Saved
//! Playback: Unloaded → Loaded → Playing ⇄ Paused → Finished
//!
//! At most one playback session exists at a time: loading a new source always
//! replaces whatever was loaded before, which is the only mutual-exclusion
//! discipline the system needs.

use thiserror::Error;

/// Illegal state-machine transition.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot {action} while {state}")]
pub struct SessionError {
    pub state: &'static str,
    pub action: &'static str,
}

/// Lifecycle of one call capture, from idle to a saved ledger record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Recording,
    /// Recording finished; the engine yielded the captured file
    Stopped { uri: String },
    /// Duration measured, waiting for the customer tag
    Tagging { uri: String, duration_millis: u64 },
    Saved,
}

impl CaptureState {
    fn name(&self) -> &'static str {
        match self {
            CaptureState::Idle => "idle",
            CaptureState::Recording => "recording",
            CaptureState::Stopped { .. } => "stopped",
            CaptureState::Tagging { .. } => "tagging",
            CaptureState::Saved => "saved",
        }
    }

    fn reject(&self, action: &'static str) -> SessionError {
        SessionError {
            state: self.name(),
            action,
        }
    }

    /// Begin recording. Legal from `Idle` and from `Saved` (next call).
    pub fn start(self) -> Result<Self, SessionError> {
        match self {
            CaptureState::Idle | CaptureState::Saved => Ok(CaptureState::Recording),
            other => Err(other.reject("start recording")),
        }
    }

    /// The engine stopped and produced a captured file.
    pub fn stop(self, uri: impl Into<String>) -> Result<Self, SessionError> {
        match self {
            CaptureState::Recording => Ok(CaptureState::Stopped { uri: uri.into() }),
            other => Err(other.reject("stop recording")),
        }
    }

    /// Duration measured from the captured file; move on to tagging.
    pub fn begin_tagging(self, duration_millis: u64) -> Result<Self, SessionError> {
        match self {
            CaptureState::Stopped { uri } => Ok(CaptureState::Tagging {
                uri,
                duration_millis,
            }),
            other => Err(other.reject("begin tagging")),
        }
    }

    /// The tagged record was added to the ledger.
    pub fn saved(self) -> Result<Self, SessionError> {
        match self {
            CaptureState::Tagging { .. } => Ok(CaptureState::Saved),
            other => Err(other.reject("save")),
        }
    }

    /// Abandon the session from any state (capture error or user discard).
    pub fn reset(self) -> Self {
        CaptureState::Idle
    }
}

/// Periodic status event from the audio engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackStatus {
    pub position_millis: u64,
    pub duration_millis: u64,
    pub is_playing: bool,
    pub did_finish: bool,
}

/// Playback lifecycle for one loaded source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Unloaded,
    Loaded { duration_millis: u64 },
    Playing { position_millis: u64, duration_millis: u64 },
    Paused { position_millis: u64, duration_millis: u64 },
    Finished,
}

impl PlaybackState {
    fn name(&self) -> &'static str {
        match self {
            PlaybackState::Unloaded => "unloaded",
            PlaybackState::Loaded { .. } => "loaded",
            PlaybackState::Playing { .. } => "playing",
            PlaybackState::Paused { .. } => "paused",
            PlaybackState::Finished => "finished",
        }
    }

    fn reject(&self, action: &'static str) -> SessionError {
        SessionError {
            state: self.name(),
            action,
        }
    }

    /// Load a source. Legal from any state: a new load replaces the previous
    /// session, keeping playback single-session process-wide.
    pub fn load(self, duration_millis: u64) -> Self {
        PlaybackState::Loaded { duration_millis }
    }

    /// Start or resume playback.
    pub fn play(self) -> Result<Self, SessionError> {
        match self {
            PlaybackState::Loaded { duration_millis } => Ok(PlaybackState::Playing {
                position_millis: 0,
                duration_millis,
            }),
            PlaybackState::Paused {
                position_millis,
                duration_millis,
            } => Ok(PlaybackState::Playing {
                position_millis,
                duration_millis,
            }),
            // Replay after finishing restarts from the top
            PlaybackState::Finished => Err(self.reject("play (reload the source first)")),
            other => Err(other.reject("play")),
        }
    }

    /// Pause playback, keeping the position.
    pub fn pause(self) -> Result<Self, SessionError> {
        match self {
            PlaybackState::Playing {
                position_millis,
                duration_millis,
            } => Ok(PlaybackState::Paused {
                position_millis,
                duration_millis,
            }),
            other => Err(other.reject("pause")),
        }
    }

    /// Apply a status event from the engine.
    ///
    /// Status events only move position or end the session; they never start
    /// playback on their own, so stale events after an unload are ignored.
    pub fn on_status(self, status: PlaybackStatus) -> Self {
        if status.did_finish {
            return match self {
                PlaybackState::Playing { .. } | PlaybackState::Paused { .. } => {
                    PlaybackState::Finished
                }
                other => other,
            };
        }
        match self {
            PlaybackState::Playing { .. } if status.is_playing => PlaybackState::Playing {
                position_millis: status.position_millis,
                duration_millis: status.duration_millis,
            },
            other => other,
        }
    }

    /// Engine error: drop back to not-playing.
    pub fn on_error(self) -> Self {
        PlaybackState::Unloaded
    }

    /// Stop and unload the session.
    pub fn unload(self) -> Self {
        PlaybackState::Unloaded
    }
}
