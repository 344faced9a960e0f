/// The five states of an independent FIX session (spec.md §4.3).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum SessionState {
    Disconnected,
    Connecting,
    LoggingOn,
    LoggedOn,
    LoggingOut,
}

impl SessionState {
    /// Whether application-level (non-admin) outbound messages may be sent.
    pub fn is_logged_on(self) -> bool {
        matches!(self, SessionState::LoggedOn)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SessionState::Disconnected => "Disconnected",
            SessionState::Connecting => "Connecting",
            SessionState::LoggingOn => "LoggingOn",
            SessionState::LoggedOn => "LoggedOn",
            SessionState::LoggingOut => "LoggingOut",
        };
        f.write_str(label)
    }
}
