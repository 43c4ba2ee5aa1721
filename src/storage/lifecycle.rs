//! Server lifecycle states.

use std::fmt;

/// Where the store is in its life.
///
/// States are ordered and only ever move forward:
/// `Starting -> Running -> ShuttingDown -> Shutdown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    /// Loading the last snapshot
    Starting,
    /// Serving commands
    Running,
    /// Writing the final snapshot
    ShuttingDown,
    /// Ready to exit
    Shutdown,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Starting => "Starting",
            LifecycleState::Running => "Running",
            LifecycleState::ShuttingDown => "ShuttingDown",
            LifecycleState::Shutdown => "Shutdown",
        }
    }

    /// Commands are only dispatched while running.
    pub fn accepts_commands(&self) -> bool {
        *self == LifecycleState::Running
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_are_ordered() {
        assert!(LifecycleState::Starting < LifecycleState::Running);
        assert!(LifecycleState::Running < LifecycleState::ShuttingDown);
        assert!(LifecycleState::ShuttingDown < LifecycleState::Shutdown);
    }

    #[test]
    fn test_only_running_accepts_commands() {
        assert!(LifecycleState::Running.accepts_commands());
        assert!(!LifecycleState::Starting.accepts_commands());
        assert!(!LifecycleState::Shutdown.accepts_commands());
        assert_eq!(LifecycleState::ShuttingDown.to_string(), "ShuttingDown");
    }
}
