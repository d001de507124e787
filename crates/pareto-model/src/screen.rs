//! Per-screen view state machine
//!
//! ```text
//! LoggedOut -> Authenticating -> LoggedIn{List, Creating, Editing, Deleting}
//! ```
//!
//! Only an authentication failure leaves `LoggedIn`; any other failed
//! request keeps the current mode so the view stays intact.

use std::fmt;

use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    List,
    Creating,
    Editing(i64),
    Deleting(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenState {
    #[default]
    LoggedOut,
    Authenticating,
    LoggedIn(Mode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEvent {
    LoginSubmitted,
    AuthSucceeded,
    AuthFailed,
    StartCreate,
    StartEdit(i64),
    StartDelete(i64),
    Completed,
    Cancelled,
    RequestFailed,
    LoggedOut,
}

impl ScreenState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, ScreenState::LoggedIn(_))
    }

    pub fn mode(&self) -> Option<Mode> {
        match self {
            ScreenState::LoggedIn(mode) => Some(*mode),
            _ => None,
        }
    }

    /// Next state for `event`. Illegal transitions leave `self` untouched.
    pub fn apply(&mut self, event: ScreenEvent) -> Result<ScreenState> {
        let next = self.next(event).ok_or_else(|| ModelError::Transition {
            state: self.to_string(),
            event: format!("{event:?}"),
        })?;
        if next != *self {
            tracing::debug!("Screen {} -> {} on {:?}", self, next, event);
        }
        *self = next;
        Ok(next)
    }

    fn next(&self, event: ScreenEvent) -> Option<ScreenState> {
        use ScreenEvent as E;
        use ScreenState as S;

        match (*self, event) {
            (_, E::LoggedOut) => Some(S::LoggedOut),
            (S::LoggedOut, E::LoginSubmitted) => Some(S::Authenticating),
            // A stored token validated without a login form
            (S::LoggedOut, E::AuthSucceeded) => Some(S::LoggedIn(Mode::List)),
            (S::LoggedOut, E::AuthFailed) => Some(S::LoggedOut),
            (S::Authenticating, E::AuthSucceeded) => Some(S::LoggedIn(Mode::List)),
            (S::Authenticating, E::AuthFailed | E::RequestFailed) => Some(S::LoggedOut),
            (S::LoggedIn(_), E::AuthFailed) => Some(S::LoggedOut),
            (S::LoggedIn(_), E::AuthSucceeded) => Some(*self),
            (S::LoggedIn(mode), E::RequestFailed) => Some(S::LoggedIn(mode)),
            (S::LoggedIn(Mode::List), E::StartCreate) => Some(S::LoggedIn(Mode::Creating)),
            (S::LoggedIn(Mode::List), E::StartEdit(id)) => Some(S::LoggedIn(Mode::Editing(id))),
            (S::LoggedIn(Mode::List), E::StartDelete(id)) => {
                Some(S::LoggedIn(Mode::Deleting(id)))
            }
            (S::LoggedIn(_), E::Completed | E::Cancelled) => Some(S::LoggedIn(Mode::List)),
            _ => None,
        }
    }
}

impl fmt::Display for ScreenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenState::LoggedOut => write!(f, "logged out"),
            ScreenState::Authenticating => write!(f, "authenticating"),
            ScreenState::LoggedIn(Mode::List) => write!(f, "list"),
            ScreenState::LoggedIn(Mode::Creating) => write!(f, "creating"),
            ScreenState::LoggedIn(Mode::Editing(id)) => write!(f, "editing {id}"),
            ScreenState::LoggedIn(Mode::Deleting(id)) => write!(f, "deleting {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_flow_reaches_list() {
        let mut state = ScreenState::default();
        state.apply(ScreenEvent::LoginSubmitted).unwrap();
        assert_eq!(state, ScreenState::Authenticating);
        state.apply(ScreenEvent::AuthSucceeded).unwrap();
        assert_eq!(state, ScreenState::LoggedIn(Mode::List));
    }

    #[test]
    fn failed_login_returns_to_logged_out() {
        let mut state = ScreenState::Authenticating;
        state.apply(ScreenEvent::AuthFailed).unwrap();
        assert_eq!(state, ScreenState::LoggedOut);
    }

    #[test]
    fn request_failure_keeps_current_mode() {
        let mut state = ScreenState::LoggedIn(Mode::Editing(4));
        state.apply(ScreenEvent::RequestFailed).unwrap();
        assert_eq!(state, ScreenState::LoggedIn(Mode::Editing(4)));
    }

    #[test]
    fn auth_failure_logs_out_from_any_mode() {
        for mode in [Mode::List, Mode::Creating, Mode::Editing(1), Mode::Deleting(2)] {
            let mut state = ScreenState::LoggedIn(mode);
            state.apply(ScreenEvent::AuthFailed).unwrap();
            assert_eq!(state, ScreenState::LoggedOut);
        }
    }

    #[test]
    fn crud_modes_return_to_list() {
        let mut state = ScreenState::LoggedIn(Mode::List);
        state.apply(ScreenEvent::StartDelete(9)).unwrap();
        assert_eq!(state.mode(), Some(Mode::Deleting(9)));
        state.apply(ScreenEvent::Completed).unwrap();
        assert_eq!(state.mode(), Some(Mode::List));
        state.apply(ScreenEvent::StartCreate).unwrap();
        state.apply(ScreenEvent::Cancelled).unwrap();
        assert_eq!(state.mode(), Some(Mode::List));
    }

    #[test]
    fn illegal_transition_is_rejected_and_state_kept() {
        let mut state = ScreenState::LoggedOut;
        let err = state.apply(ScreenEvent::StartCreate).unwrap_err();
        assert!(err.to_string().contains("logged out"));
        assert_eq!(state, ScreenState::LoggedOut);

        let mut editing = ScreenState::LoggedIn(Mode::Editing(1));
        assert!(editing.apply(ScreenEvent::StartDelete(1)).is_err());
        assert_eq!(editing, ScreenState::LoggedIn(Mode::Editing(1)));
    }

    #[test]
    fn logout_always_succeeds() {
        let mut state = ScreenState::Authenticating;
        state.apply(ScreenEvent::LoggedOut).unwrap();
        assert_eq!(state, ScreenState::LoggedOut);
    }
}
