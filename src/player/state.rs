use serde::{Deserialize, Serialize};

/// Position snapshot broadcast in `playerUpdate` events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    /// Unix timestamp in milliseconds.
    pub time: u64,
    /// Playback position in milliseconds. Absent when no track is playing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u64>,
}
