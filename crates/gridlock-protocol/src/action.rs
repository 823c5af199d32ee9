//! The closed set of player actions.

use serde::{Deserialize, Serialize};

/// An input a client may submit for its own player.
///
/// This is the whole surface: anything that does not deserialize into
/// one of these six variants is rejected with `INVALID_ACTION` before
/// it reaches the simulation. Free-form action strings are not
/// accepted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveDown,
    Rotate,
    HardDrop,
    Hold,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::MoveLeft => "moveLeft",
            Action::MoveRight => "moveRight",
            Action::MoveDown => "moveDown",
            Action::Rotate => "rotate",
            Action::HardDrop => "hardDrop",
            Action::Hold => "hold",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_use_camel_case_wire_names() {
        assert_eq!(
            serde_json::to_string(&Action::MoveLeft).unwrap(),
            "\"moveLeft\""
        );
        assert_eq!(
            serde_json::to_string(&Action::HardDrop).unwrap(),
            "\"hardDrop\""
        );
        let a: Action = serde_json::from_str("\"hold\"").unwrap();
        assert_eq!(a, Action::Hold);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result: Result<Action, _> =
            serde_json::from_str("\"sendGarbage\"");
        assert!(result.is_err());
    }
}
