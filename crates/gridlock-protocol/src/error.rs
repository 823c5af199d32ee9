//! Protocol errors and the wire-level error envelope.

use serde::{Deserialize, Serialize};

/// Errors that can occur in the protocol layer itself.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, or a
    /// message type outside the closed set.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but violates a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// Stable error codes, one per kind in the server's error taxonomy.
///
/// Codes are part of the wire contract: clients switch on the string,
/// so variants are renamed rather than removed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Validation,
    RoomNotFound,
    RoomNotAcceptingPlayers,
    RoomFull,
    CannotStart,
    PlayerNotFound,
    PlayerAlreadyInGame,
    InvalidGameState,
    InvalidAction,
    TetrisLogic,
    StoreError,
    Internal,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The Display form is the wire form.
        let s = match self {
            ErrorCode::Validation => "VALIDATION",
            ErrorCode::RoomNotFound => "ROOM_NOT_FOUND",
            ErrorCode::RoomNotAcceptingPlayers => {
                "ROOM_NOT_ACCEPTING_PLAYERS"
            }
            ErrorCode::RoomFull => "ROOM_FULL",
            ErrorCode::CannotStart => "CANNOT_START",
            ErrorCode::PlayerNotFound => "PLAYER_NOT_FOUND",
            ErrorCode::PlayerAlreadyInGame => "PLAYER_ALREADY_IN_GAME",
            ErrorCode::InvalidGameState => "INVALID_GAME_STATE",
            ErrorCode::InvalidAction => "INVALID_ACTION",
            ErrorCode::TetrisLogic => "TETRIS_LOGIC",
            ErrorCode::StoreError => "STORE_ERROR",
            ErrorCode::Internal => "INTERNAL",
        };
        f.write_str(s)
    }
}

/// The error payload inside a `{success: false, error: …}` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    /// Field-level details for validation errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        mut self,
        details: serde_json::Value,
    ) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_wire_form() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::RoomNotFound).unwrap(),
            "\"ROOM_NOT_FOUND\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorCode::PlayerAlreadyInGame)
                .unwrap(),
            "\"PLAYER_ALREADY_IN_GAME\""
        );
        assert_eq!(
            ErrorCode::RoomNotFound.to_string(),
            "ROOM_NOT_FOUND"
        );
    }

    #[test]
    fn test_error_body_omits_empty_details() {
        let body = ErrorBody::new(ErrorCode::RoomFull, "room is full");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "ROOM_FULL");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_error_body_carries_validation_details() {
        let body = ErrorBody::new(ErrorCode::Validation, "bad name")
            .with_details(serde_json::json!({"field": "name"}));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["details"]["field"], "name");
    }
}
