//! Recording session state management

/// Session state machine
///
/// Represents the lifecycle of one recording session. Transitions are
/// one-directional: once a session leaves Active it can never return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session has been started
    NotStarted,

    /// Samples are being routed and appended
    Active,

    /// Stop was requested; in-flight samples are dropped
    Stopping,

    /// The container has been finalized and cannot be reopened
    Finalized,
}

impl SessionState {
    /// Check if this state transition is valid
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        use SessionState::*;

        match (self, target) {
            (NotStarted, Active) => true,

            (Active, Stopping) => true,

            (Stopping, Finalized) => true,
            // A session that failed to reach Active finalizes directly
            (NotStarted, Finalized) => true,

            // Finalized is terminal
            (Finalized, _) => false,

            // Self-transitions
            (a, b) if a == b => true,

            _ => false,
        }
    }

    /// Get a human-readable description of this state
    pub fn description(&self) -> &'static str {
        match self {
            SessionState::NotStarted => "Not started",
            SessionState::Active => "Active",
            SessionState::Stopping => "Stopping",
            SessionState::Finalized => "Finalized",
        }
    }

    /// Check if samples should still be accepted
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }

    /// Check if the session is winding down or done
    pub fn is_stopped(&self) -> bool {
        matches!(self, SessionState::Stopping | SessionState::Finalized)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(SessionState::NotStarted.can_transition_to(&SessionState::Active));
        assert!(SessionState::Active.can_transition_to(&SessionState::Stopping));
        assert!(SessionState::Stopping.can_transition_to(&SessionState::Finalized));
        assert!(SessionState::NotStarted.can_transition_to(&SessionState::Finalized));

        // Self-transitions
        assert!(SessionState::NotStarted.can_transition_to(&SessionState::NotStarted));
        assert!(SessionState::Active.can_transition_to(&SessionState::Active));
    }

    #[test]
    fn test_no_reentry_after_stopping() {
        assert!(!SessionState::Stopping.can_transition_to(&SessionState::Active));
        assert!(!SessionState::Finalized.can_transition_to(&SessionState::Active));
        assert!(!SessionState::Finalized.can_transition_to(&SessionState::NotStarted));
        assert!(!SessionState::Finalized.can_transition_to(&SessionState::Stopping));
    }

    #[test]
    fn test_no_skipping_forward() {
        assert!(!SessionState::NotStarted.can_transition_to(&SessionState::Stopping));
        assert!(!SessionState::Active.can_transition_to(&SessionState::Finalized));
    }

    #[test]
    fn test_state_checks() {
        assert!(SessionState::Active.is_active());
        assert!(!SessionState::Active.is_stopped());

        assert!(!SessionState::Stopping.is_active());
        assert!(SessionState::Stopping.is_stopped());

        assert!(!SessionState::Finalized.is_active());
        assert!(SessionState::Finalized.is_stopped());

        assert!(!SessionState::NotStarted.is_active());
        assert!(!SessionState::NotStarted.is_stopped());
    }
}
