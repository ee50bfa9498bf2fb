use crate::engine::{Mark, Position};
use crate::identifiers::{ConnectionId, GameId};
use serde::{Deserialize, Serialize};

/// A player symbol as it crosses the wire. Unlike [`Mark`] there is no empty
/// state, so payloads cannot carry an unassigned symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    pub fn mark(self) -> Mark {
        match self {
            Symbol::X => Mark::X,
            Symbol::O => Mark::O,
        }
    }

    pub fn from_mark(mark: Mark) -> Option<Symbol> {
        match mark {
            Mark::X => Some(Symbol::X),
            Mark::O => Some(Symbol::O),
            Mark::Empty => None,
        }
    }

    pub fn opponent(self) -> Symbol {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

/// Events a client may send.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    FindGame,
    #[serde(rename_all = "camelCase")]
    MakeMove {
        game_id: GameId,
        row: usize,
        col: usize,
        /// Client-side win detection is a hint only; the server re-checks.
        #[serde(default)]
        client_asserted_win: bool,
    },
}

/// Events the server may send. Every payload is authoritative; clients
/// reconcile local state against it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Handshake: hands the client its transient connection identifier.
    #[serde(rename_all = "camelCase")]
    Connected { connection_id: ConnectionId },
    GameFound(GameFound),
    WaitingForOpponent,
    MoveMade(MoveMade),
    OpponentDisconnected,
    Error { message: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameFound {
    pub game_id: GameId,
    pub opponent_id: ConnectionId,
    pub is_first_player: bool,
    pub starting_player: Symbol,
    pub assigned_symbol: Symbol,
}

/// Move broadcast, asymmetric by recipient: the mover already knows what it
/// played and gets the summary only; the opponent additionally gets the mark
/// to replay locally. Two explicit payloads keep the asymmetry type-checked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "camelCase")]
pub enum MoveMade {
    Mover(MoveSummary),
    Opponent(OpponentMove),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSummary {
    pub current_player: Symbol,
    pub is_board_full: bool,
    pub new_grid_size: usize,
    pub is_winner: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Symbol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_line: Option<Vec<Position>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentMove {
    #[serde(flatten)]
    pub summary: MoveSummary,
    pub row: usize,
    pub col: usize,
    pub player: Symbol,
    pub player_id: ConnectionId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_round_trip() {
        let json = r#"{"type":"makeMove","gameId":"a-b","row":1,"col":2,"clientAssertedWin":true}"#;
        let message: ClientMessage = serde_json::from_str(json).unwrap();

        assert_eq!(
            message,
            ClientMessage::MakeMove {
                game_id: GameId::new("a-b".to_string()),
                row: 1,
                col: 2,
                client_asserted_win: true,
            }
        );
        assert_eq!(serde_json::to_string(&message).unwrap(), json);
    }

    #[test]
    fn test_find_game_has_no_payload() {
        let message: ClientMessage = serde_json::from_str(r#"{"type":"findGame"}"#).unwrap();
        assert_eq!(message, ClientMessage::FindGame);
    }

    #[test]
    fn test_client_asserted_win_defaults_to_false() {
        let json = r#"{"type":"makeMove","gameId":"a-b","row":0,"col":0}"#;
        let message: ClientMessage = serde_json::from_str(json).unwrap();

        assert!(matches!(
            message,
            ClientMessage::MakeMove {
                client_asserted_win: false,
                ..
            }
        ));
    }

    #[test]
    fn test_game_found_uses_camel_case_fields() {
        let message = ServerMessage::GameFound(GameFound {
            game_id: GameId::new("a-b".to_string()),
            opponent_id: ConnectionId::new("b".to_string()),
            is_first_player: true,
            starting_player: Symbol::O,
            assigned_symbol: Symbol::O,
        });

        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains(r#""type":"gameFound""#));
        assert!(json.contains(r#""opponentId":"b""#));
        assert!(json.contains(r#""startingPlayer":"O""#));
        assert!(json.contains(r#""assignedSymbol":"O""#));
    }

    #[test]
    fn test_move_made_payloads_are_role_tagged() {
        let summary = MoveSummary {
            current_player: Symbol::O,
            is_board_full: false,
            new_grid_size: 3,
            is_winner: false,
            winner: None,
            winning_line: None,
        };

        let mover = ServerMessage::MoveMade(MoveMade::Mover(summary.clone()));
        let mover_json = serde_json::to_string(&mover).unwrap();
        assert!(mover_json.contains(r#""role":"mover""#));
        assert!(!mover_json.contains("row"));
        assert!(!mover_json.contains("winner"));

        let opponent = ServerMessage::MoveMade(MoveMade::Opponent(OpponentMove {
            summary,
            row: 0,
            col: 1,
            player: Symbol::X,
            player_id: ConnectionId::new("a".to_string()),
        }));
        let opponent_json = serde_json::to_string(&opponent).unwrap();
        assert!(opponent_json.contains(r#""role":"opponent""#));
        assert!(opponent_json.contains(r#""row":0"#));
        assert!(opponent_json.contains(r#""playerId":"a""#));

        let parsed: ServerMessage = serde_json::from_str(&opponent_json).unwrap();
        assert_eq!(parsed, opponent);
    }

    #[test]
    fn test_winning_move_carries_winner_and_line() {
        let message = ServerMessage::MoveMade(MoveMade::Mover(MoveSummary {
            current_player: Symbol::O,
            is_board_full: false,
            new_grid_size: 3,
            is_winner: true,
            winner: Some(Symbol::X),
            winning_line: Some(vec![
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(0, 2),
            ]),
        }));

        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains(r#""winner":"X""#));
        assert!(json.contains(r#""winningLine""#));
    }
}
