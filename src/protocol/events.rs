use serde::Serialize;

use crate::{common::types::SessionId, player::PlayerState};

/// Messages sent from the node to the control-plane client.
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum OutgoingMessage {
    /// Player state snapshot, emitted on play and on every broadcast tick.
    #[serde(rename_all = "camelCase")]
    PlayerUpdate {
        session_id: SessionId,
        state: PlayerState,
    },

    /// One idle session reclaimed by the cleanup sweep.
    #[serde(rename_all = "camelCase")]
    Cleaned { session_id: SessionId },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn player_update_wire_shape() {
        let msg = OutgoingMessage::PlayerUpdate {
            session_id: SessionId(42),
            state: PlayerState {
                time: 1722800000000,
                position: Some(3000),
            },
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "op": "playerUpdate",
                "sessionId": 42,
                "state": { "time": 1722800000000u64, "position": 3000 }
            })
        );
    }

    #[test]
    fn player_update_omits_position_when_idle() {
        let msg = OutgoingMessage::PlayerUpdate {
            session_id: SessionId(1),
            state: PlayerState {
                time: 5,
                position: None,
            },
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert!(value["state"].get("position").is_none());
    }

    #[test]
    fn cleaned_wire_shape() {
        let msg = OutgoingMessage::Cleaned {
            session_id: SessionId(9),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({ "op": "cleaned", "sessionId": 9 })
        );
    }
}
