// Live channel connection state
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Not connected",
            ConnectionState::Connecting => "Connecting...",
            ConnectionState::Connected => "Connected",
        }
    }

    /// Status dot colour shown next to the label.
    pub fn indicator(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "red",
            ConnectionState::Connecting => "yellow",
            ConnectionState::Connected => "green",
        }
    }
}
