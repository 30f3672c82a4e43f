use std::fmt;

/// Where a print session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Preparing,
    Ready,
    Printing,
    Downloading,
    Merging,
}

impl SessionState {
    /// States in which a new operation must wait.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            SessionState::Preparing | SessionState::Printing | SessionState::Downloading | SessionState::Merging
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Preparing => "preparing",
            SessionState::Ready => "ready",
            SessionState::Printing => "printing",
            SessionState::Downloading => "downloading",
            SessionState::Merging => "merging",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_states() {
        assert!(!SessionState::Idle.is_busy());
        assert!(!SessionState::Ready.is_busy());
        assert!(SessionState::Preparing.is_busy());
        assert!(SessionState::Printing.is_busy());
        assert!(SessionState::Downloading.is_busy());
        assert!(SessionState::Merging.is_busy());
    }
}
