//! Camera capture session.
//!
//! A [`CaptureSessionManager`] owns one screen visit's worth of camera state:
//!
//! ```text
//!          activate            bound
//! Idle ───────────▶ Acquiring ───────▶ Bound ──capture──▶ (photo file)
//!  ▲                 ▲    │              │
//!  │        activate │    │ bind failure │ capture failure
//!  │                 │    ▼              │
//!  └─── deactivate ──┴─ Error ◀──────────┘
//! ```
//!
//! `activate` from `Bound` unbinds and rebinds through `Acquiring`.
//! `Error` accepts no captures; only `activate` or `deactivate` leave it.
//!
//! Device I/O runs on a dedicated worker task behind the [`CameraProvider`]
//! seam; the state itself changes only inside the session controller, through
//! [`SessionState::transition`].

pub mod device;
pub mod session;
pub mod still;
pub mod zoom;

pub use device::{CameraProvider, DeviceInfo, SurfaceTarget, UseCase};
pub use session::{CaptureSessionManager, SessionHandle, SessionSnapshot};
pub use still::StillCamera;
pub use zoom::ZoomState;

use serde::{Deserialize, Serialize};

use crate::error::{CaptureError, SessionError};

/// Lifecycle state of a camera session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    Acquiring,
    Bound,
    Error,
}

/// Inputs to the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// `activate` was requested
    Activate,
    /// The device was acquired and both streams bound
    BindSucceeded,
    /// Acquisition or binding failed
    BindFailed,
    /// The device failed or timed out writing a photo
    CaptureFailed,
    /// `deactivate` was requested
    Deactivate,
}

impl SessionState {
    /// Apply an event and return the next state.
    ///
    /// Activation is not reentrant: `Activate` while `Acquiring` is rejected.
    /// Bind results arriving outside `Acquiring` are stale and change nothing.
    pub fn transition(self, event: SessionEvent) -> Result<SessionState, SessionError> {
        use SessionEvent::*;
        use SessionState::*;

        Ok(match (self, event) {
            (Acquiring, Activate) => return Err(SessionError::ActivationInProgress),
            (_, Activate) => Acquiring,
            (Acquiring, BindSucceeded) => Bound,
            (Acquiring, BindFailed) => Error,
            (state, BindSucceeded | BindFailed) => state,
            (Bound, CaptureFailed) => Error,
            (state, CaptureFailed) => state,
            (_, Deactivate) => Idle,
        })
    }

    /// Whether a new capture may start in this state.
    pub fn check_capture(self, capture_pending: bool) -> Result<(), CaptureError> {
        match self {
            SessionState::Bound if capture_pending => Err(CaptureError::DeviceBusy),
            SessionState::Bound => Ok(()),
            SessionState::Idle | SessionState::Acquiring | SessionState::Error => {
                Err(CaptureError::NotReady)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let state = SessionState::Idle;
        let state = state.transition(SessionEvent::Activate).unwrap();
        assert_eq!(state, SessionState::Acquiring);
        let state = state.transition(SessionEvent::BindSucceeded).unwrap();
        assert_eq!(state, SessionState::Bound);
        let state = state.transition(SessionEvent::Deactivate).unwrap();
        assert_eq!(state, SessionState::Idle);
    }

    #[test]
    fn test_activation_not_reentrant() {
        assert_eq!(
            SessionState::Acquiring.transition(SessionEvent::Activate),
            Err(SessionError::ActivationInProgress)
        );
    }

    #[test]
    fn test_failure_then_reactivate() {
        let state = SessionState::Acquiring
            .transition(SessionEvent::BindFailed)
            .unwrap();
        assert_eq!(state, SessionState::Error);
        assert_eq!(
            state.transition(SessionEvent::Activate).unwrap(),
            SessionState::Acquiring
        );
    }

    #[test]
    fn test_stale_bind_result_ignored() {
        assert_eq!(
            SessionState::Idle.transition(SessionEvent::BindSucceeded).unwrap(),
            SessionState::Idle
        );
        assert_eq!(
            SessionState::Bound.transition(SessionEvent::BindFailed).unwrap(),
            SessionState::Bound
        );
    }

    #[test]
    fn test_capture_failure_needs_reactivation() {
        let state = SessionState::Bound
            .transition(SessionEvent::CaptureFailed)
            .unwrap();
        assert_eq!(state, SessionState::Error);
        assert_eq!(state.check_capture(false), Err(CaptureError::NotReady));
        assert_eq!(
            state.transition(SessionEvent::Activate).unwrap(),
            SessionState::Acquiring
        );

        // A failure reported after teardown changes nothing.
        assert_eq!(
            SessionState::Idle.transition(SessionEvent::CaptureFailed).unwrap(),
            SessionState::Idle
        );
    }

    #[test]
    fn test_capture_gate() {
        assert_eq!(SessionState::Idle.check_capture(false), Err(CaptureError::NotReady));
        assert_eq!(
            SessionState::Acquiring.check_capture(false),
            Err(CaptureError::NotReady)
        );
        assert_eq!(SessionState::Error.check_capture(false), Err(CaptureError::NotReady));
        assert_eq!(SessionState::Bound.check_capture(false), Ok(()));
        assert_eq!(SessionState::Bound.check_capture(true), Err(CaptureError::DeviceBusy));
    }
}
