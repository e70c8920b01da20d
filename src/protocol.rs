// Wire protocol and inter-task message types.
//
// Inbound/outbound JSON messages exchanged with the game server, plus the
// channel payloads passed between the WebSocket task, the app loop and the
// TUI.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message has no `messageType` tag")]
    MissingType,

    #[error("unknown message type `{0}`")]
    UnknownType(String),

    #[error("invalid cell id `{0}`")]
    InvalidCell(String),
}

// ---------------------------------------------------------------------------
// Symbol
// ---------------------------------------------------------------------------

/// A player's mark on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    /// The complementary symbol (X <-> O).
    pub fn opponent(self) -> Symbol {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Symbol::X => "X",
            Symbol::O => "O",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CellId
// ---------------------------------------------------------------------------

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// Side length of the (square) board.
pub const BOARD_SIDE: usize = 3;

const CELL_PREFIX: &str = "grid_";

/// A board position, 0..=8 in row-major order.
///
/// On the wire a cell is identified by its element id, `grid_<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellId(u8);

impl CellId {
    /// All nine cells in row-major order.
    pub const ALL: [CellId; CELL_COUNT] = [
        CellId(0),
        CellId(1),
        CellId(2),
        CellId(3),
        CellId(4),
        CellId(5),
        CellId(6),
        CellId(7),
        CellId(8),
    ];

    /// The centre cell (`grid_4`).
    pub const CENTER: CellId = CellId(4);

    pub fn new(index: usize) -> Option<CellId> {
        (index < CELL_COUNT).then_some(CellId(index as u8))
    }

    pub fn from_row_col(row: usize, col: usize) -> Option<CellId> {
        if row < BOARD_SIDE && col < BOARD_SIDE {
            CellId::new(row * BOARD_SIDE + col)
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn row(self) -> usize {
        self.index() / BOARD_SIDE
    }

    pub fn col(self) -> usize {
        self.index() % BOARD_SIDE
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CELL_PREFIX}{}", self.0)
    }
}

impl FromStr for CellId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Exactly one digit, so every accepted id re-encodes to itself.
        let digit = match s.strip_prefix(CELL_PREFIX).map(str::as_bytes) {
            Some(&[d]) if d.is_ascii_digit() => usize::from(d - b'0'),
            _ => return Err(ProtocolError::InvalidCell(s.to_string())),
        };
        CellId::new(digit).ok_or_else(|| ProtocolError::InvalidCell(s.to_string()))
    }
}

impl TryFrom<String> for CellId {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellId> for String {
    fn from(cell: CellId) -> Self {
        cell.to_string()
    }
}

// ---------------------------------------------------------------------------
// Inbound messages (server -> client)
// ---------------------------------------------------------------------------

/// Turn indicator values carried by a `turn` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnIndicator {
    YourTurn,
    Waiting,
}

/// Status field of an opponent update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveStatus {
    /// The player who made the reported move has won.
    YouWin,
    Tied,
    #[serde(other)]
    InProgress,
}

/// Explicit game result used by the oldest protocol revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameResult {
    YouWin,
    YouLose,
    Tied,
}

/// Messages pushed by the game server, discriminated by `messageType`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "messageType", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    #[serde(rename = "handshake")]
    Handshake {
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        player_letter: Option<Symbol>,
        #[serde(default, deserialize_with = "opaque_id")]
        game_id: Option<String>,
    },
    /// Registration response and turn indicator share one shape.
    #[serde(rename = "turn")]
    Turn {
        turn_indicator: TurnIndicator,
        #[serde(default)]
        player_letter: Option<Symbol>,
    },
    #[serde(rename = "response")]
    OpponentUpdate {
        grid_id: CellId,
        #[serde(default)]
        status: Option<MoveStatus>,
    },
    /// Also accepts the `game_over` tag and a `result` verdict, words from
    /// the earliest server vocabulary, but only under `messageType`. Frames
    /// keyed by `type` are not understood.
    #[serde(rename = "GAME_OVER", alias = "game_over")]
    GameOver {
        #[serde(default)]
        tied: bool,
        #[serde(default)]
        last_move_player: Option<Symbol>,
        #[serde(default)]
        last_grid_id: Option<CellId>,
        #[serde(default)]
        result: Option<GameResult>,
    },
}

const KNOWN_TYPES: &[&str] = &["handshake", "turn", "response", "GAME_OVER", "game_over"];

impl ServerMessage {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Handshake { .. } => "handshake",
            ServerMessage::Turn { .. } => "turn",
            ServerMessage::OpponentUpdate { .. } => "response",
            ServerMessage::GameOver { .. } => "GAME_OVER",
        }
    }
}

/// Accepts a game id sent either as a JSON string or a number.
fn opaque_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Parse one inbound text frame.
///
/// The tag is checked before the body so that unknown message types are
/// reported as such rather than as generic JSON errors.
pub fn parse_server_message(text: &str) -> Result<ServerMessage, ProtocolError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let tag = value
        .get("messageType")
        .and_then(|t| t.as_str())
        .ok_or(ProtocolError::MissingType)?;
    if !KNOWN_TYPES.contains(&tag) {
        return Err(ProtocolError::UnknownType(tag.to_string()));
    }
    Ok(serde_json::from_value(value)?)
}

// ---------------------------------------------------------------------------
// Outbound messages (client -> server)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "messageType")]
pub enum ClientMessage {
    #[serde(rename = "TURN")]
    Turn {
        #[serde(rename = "gridId")]
        grid_id: CellId,
    },
    #[serde(rename = "REGISTER_GAME_REQUEST")]
    RegisterGameRequest,
}

/// Serialize an outbound message into a JSON text frame.
pub fn encode(message: &ClientMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(message)?)
}

// ---------------------------------------------------------------------------
// App <-> TUI channel types
// ---------------------------------------------------------------------------

/// Lifecycle of the single server connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// Final result of a game from the local player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

/// Everything the TUI needs to draw the game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub connection: ConnectionState,
    pub own_symbol: Option<Symbol>,
    pub opponent_symbol: Option<Symbol>,
    pub is_my_turn: bool,
    pub cells: [Option<Symbol>; CELL_COUNT],
    pub status: String,
    pub outcome: Option<Outcome>,
}

/// A timestamped line for the game log panel.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub text: String,
}

impl LogEntry {
    pub fn now(text: impl Into<String>) -> Self {
        LogEntry {
            timestamp: Local::now(),
            text: text.into(),
        }
    }
}

/// Updates pushed from the app loop to the TUI.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    StateSnapshot(Box<GameSnapshot>),
    Log(LogEntry),
}

/// Commands sent from the TUI to the app loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// The user selected a cell (the terminal equivalent of clicking it).
    ClickCell(CellId),
    Quit,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
