//! Camera permission gating.
//!
//! The permission is an explicit finite-state value owned by the
//! [`PermissionCoordinator`]. Every change goes through the pure
//! [`PermissionState::transition`] function, so the whole state machine is
//! testable without a real permission system behind it:
//!
//! ```text
//! Unknown ──granted──▶ Granted
//!    │
//!    ├──denied (may ask again)──▶ DeniedCanRetry ──granted──▶ Granted
//!    │                                 │
//!    └──denied (never ask again)──▶ Denied ◀──────┘
//! ```
//!
//! `Denied` only leaves through the settings surface ([`PermissionEvent::Reset`])
//! or the system reporting the permission as granted.

mod store;

pub use store::{PermissionRecord, PermissionStore};

use serde::{Deserialize, Serialize};

use crate::error::PermissionError;

/// Camera-access permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
    DeniedCanRetry,
}

/// Inputs to the permission state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionEvent {
    /// The system reports the permission as currently granted
    SystemGranted,
    /// The system reports the permission as not granted
    SystemNotGranted,
    /// The user accepted the prompt
    UserGranted,
    /// The user declined the prompt
    UserDenied { can_retry: bool },
    /// The permission was reset from the settings surface
    Reset,
}

impl PermissionState {
    /// Apply an event and return the next state.
    pub fn transition(self, event: PermissionEvent) -> PermissionState {
        use PermissionEvent::*;
        use PermissionState::*;

        match (self, event) {
            (_, SystemGranted) => Granted,
            (_, Reset) => Unknown,
            // Revoked behind our back.
            (Granted, SystemNotGranted) => Unknown,
            (state, SystemNotGranted) => state,
            (Denied, UserGranted | UserDenied { .. }) => Denied,
            (_, UserGranted) => Granted,
            (_, UserDenied { can_retry: true }) => DeniedCanRetry,
            (_, UserDenied { can_retry: false }) => Denied,
        }
    }

    /// Whether a permission request may be issued from this state.
    pub fn can_request(self) -> bool {
        matches!(self, PermissionState::Unknown | PermissionState::DeniedCanRetry)
    }
}

/// What the caller should do next to get (or proceed without) the permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionAction {
    /// Permission held: activate the camera
    Proceed,
    /// Ask directly
    Request,
    /// Explain why the camera is needed, then ask
    ShowRationale,
    /// Show a non-fatal "permission not granted" notice
    Blocked,
}

impl PermissionAction {
    /// Decide the next action from the state and the rationale hint.
    pub fn decide(state: PermissionState, show_rationale: bool) -> PermissionAction {
        match state {
            PermissionState::Granted => PermissionAction::Proceed,
            PermissionState::Unknown if show_rationale => PermissionAction::ShowRationale,
            PermissionState::Unknown => PermissionAction::Request,
            PermissionState::DeniedCanRetry => PermissionAction::ShowRationale,
            PermissionState::Denied => PermissionAction::Blocked,
        }
    }
}

/// The system side of camera permission: inspect, explain, prompt.
pub trait PermissionSource: Send {
    /// Whether camera access is granted right now.
    fn is_granted(&self) -> bool;

    /// Whether the user denied before without asking not to be asked again.
    fn should_show_rationale(&self) -> bool;

    /// Show the permission prompt and return the user's answer.
    fn request(&mut self) -> Result<bool, PermissionError>;
}

/// Single authoritative owner of the camera [`PermissionState`].
pub struct PermissionCoordinator<S> {
    source: S,
    state: PermissionState,
}

impl<S: PermissionSource> PermissionCoordinator<S> {
    /// Create a coordinator; the state starts as `Unknown` until evaluated.
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: PermissionState::Unknown,
        }
    }

    /// Current state. Re-query after every transition; do not cache.
    pub fn state(&self) -> PermissionState {
        self.state
    }

    /// Inspect the system permission. Returns `Granted` or `Unknown`.
    pub fn evaluate(&mut self) -> PermissionState {
        let event = if self.source.is_granted() {
            PermissionEvent::SystemGranted
        } else {
            PermissionEvent::SystemNotGranted
        };
        self.apply(event);

        if self.state == PermissionState::Granted {
            PermissionState::Granted
        } else {
            PermissionState::Unknown
        }
    }

    /// Record the user's answer to the permission prompt.
    pub fn on_user_responded(&mut self, granted: bool) -> PermissionState {
        let event = if granted {
            PermissionEvent::UserGranted
        } else {
            PermissionEvent::UserDenied {
                can_retry: self.source.should_show_rationale(),
            }
        };
        self.apply(event)
    }

    /// Whether to explain why the camera is needed before asking.
    pub fn should_show_rationale(&self) -> bool {
        self.source.should_show_rationale()
    }

    /// What to do next, given the current state.
    pub fn next_action(&self) -> PermissionAction {
        PermissionAction::decide(self.state, self.should_show_rationale())
    }

    /// Issue the permission prompt and apply the answer.
    ///
    /// Fails with `DeniedPermanently` from `Denied`, where asking again is not
    /// allowed. Requesting while already `Granted` does not prompt.
    pub fn request(&mut self) -> Result<PermissionState, PermissionError> {
        match self.state {
            PermissionState::Granted => return Ok(self.state),
            PermissionState::Denied => return Err(PermissionError::DeniedPermanently),
            PermissionState::Unknown | PermissionState::DeniedCanRetry => {}
        }

        let granted = self.source.request()?;
        Ok(self.on_user_responded(granted))
    }

    /// Reset after the user changed the permission in settings.
    pub fn reset(&mut self) -> PermissionState {
        self.apply(PermissionEvent::Reset)
    }

    /// Borrow the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    fn apply(&mut self, event: PermissionEvent) -> PermissionState {
        let next = self.state.transition(event);
        if next != self.state {
            tracing::debug!("Camera permission: {:?} -> {:?}", self.state, next);
        }
        self.state = next;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted permission system.
    struct ScriptedSource {
        granted: bool,
        rationale: bool,
        answers: VecDeque<(bool, bool)>,
        prompts: usize,
    }

    impl ScriptedSource {
        fn new(granted: bool) -> Self {
            Self {
                granted,
                rationale: false,
                answers: VecDeque::new(),
                prompts: 0,
            }
        }

        /// Queue an answer: (granted, never_ask_again).
        fn answer(mut self, granted: bool, never_ask_again: bool) -> Self {
            self.answers.push_back((granted, never_ask_again));
            self
        }
    }

    impl PermissionSource for ScriptedSource {
        fn is_granted(&self) -> bool {
            self.granted
        }

        fn should_show_rationale(&self) -> bool {
            self.rationale
        }

        fn request(&mut self) -> Result<bool, PermissionError> {
            self.prompts += 1;
            let (granted, never_ask_again) = self
                .answers
                .pop_front()
                .ok_or_else(|| PermissionError::Prompt("no scripted answer".into()))?;
            self.granted = granted;
            self.rationale = !granted && !never_ask_again;
            Ok(granted)
        }
    }

    #[test]
    fn test_evaluate_reports_granted_or_unknown() {
        let mut coordinator = PermissionCoordinator::new(ScriptedSource::new(true));
        assert_eq!(coordinator.evaluate(), PermissionState::Granted);
        assert_eq!(coordinator.next_action(), PermissionAction::Proceed);

        let mut coordinator = PermissionCoordinator::new(ScriptedSource::new(false));
        assert_eq!(coordinator.evaluate(), PermissionState::Unknown);
        assert_eq!(coordinator.next_action(), PermissionAction::Request);
    }

    #[test]
    fn test_first_denial_can_retry() {
        let source = ScriptedSource::new(false).answer(false, false).answer(true, false);
        let mut coordinator = PermissionCoordinator::new(source);
        coordinator.evaluate();

        assert_eq!(coordinator.request().unwrap(), PermissionState::DeniedCanRetry);
        assert!(coordinator.should_show_rationale());
        assert_eq!(coordinator.next_action(), PermissionAction::ShowRationale);

        assert_eq!(coordinator.request().unwrap(), PermissionState::Granted);
        assert_eq!(coordinator.source().prompts, 2);
    }

    #[test]
    fn test_never_ask_again_is_terminal() {
        let source = ScriptedSource::new(false).answer(false, true).answer(true, false);
        let mut coordinator = PermissionCoordinator::new(source);
        coordinator.evaluate();

        assert_eq!(coordinator.request().unwrap(), PermissionState::Denied);
        assert_eq!(coordinator.next_action(), PermissionAction::Blocked);
        assert_eq!(
            coordinator.request().unwrap_err(),
            PermissionError::DeniedPermanently
        );
        // The second scripted answer was never consumed.
        assert_eq!(coordinator.source().prompts, 1);

        // Evaluating again does not lift the denial.
        assert_eq!(coordinator.evaluate(), PermissionState::Unknown);
        assert_eq!(coordinator.state(), PermissionState::Denied);
    }

    #[test]
    fn test_reset_reopens_request() {
        let source = ScriptedSource::new(false).answer(false, true).answer(true, false);
        let mut coordinator = PermissionCoordinator::new(source);
        coordinator.request().unwrap();
        assert_eq!(coordinator.state(), PermissionState::Denied);

        assert_eq!(coordinator.reset(), PermissionState::Unknown);
        assert_eq!(coordinator.request().unwrap(), PermissionState::Granted);
    }

    #[test]
    fn test_request_when_granted_does_not_prompt() {
        let mut coordinator = PermissionCoordinator::new(ScriptedSource::new(true));
        coordinator.evaluate();
        assert_eq!(coordinator.request().unwrap(), PermissionState::Granted);
        assert_eq!(coordinator.source().prompts, 0);
    }

    #[test]
    fn test_revocation_drops_back_to_unknown() {
        let mut coordinator = PermissionCoordinator::new(ScriptedSource::new(true));
        coordinator.evaluate();
        coordinator.source.granted = false;
        assert_eq!(coordinator.evaluate(), PermissionState::Unknown);
        assert_eq!(coordinator.state(), PermissionState::Unknown);
    }

    #[test]
    fn test_transition_table() {
        use PermissionEvent::*;
        use PermissionState::*;

        assert_eq!(Unknown.transition(UserGranted), Granted);
        assert_eq!(Unknown.transition(UserDenied { can_retry: true }), DeniedCanRetry);
        assert_eq!(Unknown.transition(UserDenied { can_retry: false }), Denied);
        assert_eq!(DeniedCanRetry.transition(UserDenied { can_retry: false }), Denied);
        assert_eq!(Denied.transition(UserGranted), Denied);
        assert_eq!(Denied.transition(SystemGranted), Granted);
        assert_eq!(Denied.transition(Reset), Unknown);
        assert_eq!(DeniedCanRetry.transition(SystemNotGranted), DeniedCanRetry);

        assert!(Unknown.can_request());
        assert!(DeniedCanRetry.can_request());
        assert!(!Denied.can_request());
        assert!(!Granted.can_request());
    }

    #[test]
    fn test_decide_with_rationale_from_unknown() {
        assert_eq!(
            PermissionAction::decide(PermissionState::Unknown, true),
            PermissionAction::ShowRationale
        );
    }
}
