//! Supervisor event vocabulary and dispatch outcomes.

use serde::{Deserialize, Serialize};

/// Supervisor events this listener understands.
///
/// Anything outside this set is a protocol desync: the listener closes
/// rather than silently ignoring an event it never subscribed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    /// Short-period wake-up tick from the supervisor.
    Tick5,
    /// The supervised process (re)started; counters must be re-armed.
    ProcessStateRunning,
}

impl EventName {
    /// Parse a supervisor `eventname` header value.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "TICK_5" => Some(EventName::Tick5),
            "PROCESS_STATE_RUNNING" => Some(EventName::ProcessStateRunning),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::Tick5 => "TICK_5",
            EventName::ProcessStateRunning => "PROCESS_STATE_RUNNING",
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-way outcome of dispatching one event.
///
/// The protocol loop maps `Success` and `BusinessFailure` to the two
/// RESULT reports; `Terminate` closes the loop without reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    BusinessFailure,
    Terminate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_events() {
        assert_eq!(EventName::parse("TICK_5"), Some(EventName::Tick5));
        assert_eq!(
            EventName::parse("PROCESS_STATE_RUNNING"),
            Some(EventName::ProcessStateRunning)
        );
    }

    #[test]
    fn test_parse_rejects_everything_else() {
        assert_eq!(EventName::parse("TICK_60"), None);
        assert_eq!(EventName::parse("PROCESS_STATE_STOPPED"), None);
        assert_eq!(EventName::parse("tick_5"), None);
        assert_eq!(EventName::parse(""), None);
    }

    #[test]
    fn test_display_round_trips() {
        for event in [EventName::Tick5, EventName::ProcessStateRunning] {
            assert_eq!(EventName::parse(&event.to_string()), Some(event));
        }
    }
}
