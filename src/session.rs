// Client session state machine.
//
// One `Session` per server connection. It owns the player's symbol, turn
// ownership, the locally mirrored board and the status line, and converts
// inbound server messages and local cell clicks into state transitions.
// Side effects the session cannot perform itself (sending, timers) are
// returned to the caller as `Effect`s.

use std::fmt;

use tracing::{debug, info, warn};

use crate::protocol::{
    CellId, ClientMessage, ConnectionState, GameResult, GameSnapshot, MoveStatus, Outcome,
    ServerMessage, Symbol, TurnIndicator, BOARD_SIDE, CELL_COUNT,
};

// ---------------------------------------------------------------------------
// Status text
// ---------------------------------------------------------------------------

/// The single line of status text shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Connecting,
    WaitingForOpponent,
    FindingOpponent,
    YourTurn,
    OpponentStrategizing,
    YouWin,
    YouLose,
    /// The given symbol won, as reported by an opponent update.
    Winner(Symbol),
    Tied,
    RegistrationFailed,
    ConnectionClosed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Connecting => f.write_str("Connecting to the game server..."),
            Status::WaitingForOpponent => f.write_str("Waiting for an opponent."),
            Status::FindingOpponent => f.write_str("Finding an opponent..."),
            Status::YourTurn => f.write_str("It's your turn!"),
            Status::OpponentStrategizing => f.write_str("Your opponent is strategizing."),
            Status::YouWin => f.write_str("You win!"),
            Status::YouLose => f.write_str("You lose."),
            Status::Winner(symbol) => write!(f, "{symbol} is the winner!"),
            Status::Tied => f.write_str("The game is tied."),
            Status::RegistrationFailed => {
                f.write_str("Unable to find an opponent. Restart the client to try again.")
            }
            Status::ConnectionClosed => f.write_str("The WebSocket Connection Has Been Closed."),
        }
    }
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// Work the session asks its driver to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send(ClientMessage),
    StartRegistrationTimer,
    CancelRegistrationTimer,
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Marks applied to the 3x3 grid, as far as this client has seen them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Symbol>; CELL_COUNT],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, cell: CellId) -> Option<Symbol> {
        self.cells[cell.index()]
    }

    pub fn is_empty(&self, cell: CellId) -> bool {
        self.get(cell).is_none()
    }

    /// Place `symbol` on `cell`, replacing whatever was there.
    pub fn mark(&mut self, cell: CellId, symbol: Symbol) {
        self.cells[cell.index()] = Some(symbol);
    }

    pub fn cells(&self) -> [Option<Symbol>; CELL_COUNT] {
        self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Option<Symbol>]> {
        self.cells.chunks(BOARD_SIDE)
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Session {
    connection: ConnectionState,
    own_symbol: Option<Symbol>,
    opponent_symbol: Option<Symbol>,
    /// Server-side game id, when the handshake carries one.
    game_id: Option<String>,
    is_my_turn: bool,
    registration_pending: bool,
    board: Board,
    status: Status,
    outcome: Option<Outcome>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            connection: ConnectionState::Connecting,
            own_symbol: None,
            opponent_symbol: None,
            game_id: None,
            is_my_turn: false,
            registration_pending: false,
            board: Board::new(),
            status: Status::Connecting,
            outcome: None,
        }
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn own_symbol(&self) -> Option<Symbol> {
        self.own_symbol
    }

    pub fn opponent_symbol(&self) -> Option<Symbol> {
        self.opponent_symbol
    }

    pub fn game_id(&self) -> Option<&str> {
        self.game_id.as_deref()
    }

    pub fn is_my_turn(&self) -> bool {
        self.is_my_turn
    }

    pub fn registration_pending(&self) -> bool {
        self.registration_pending
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    // -- connection lifecycle ------------------------------------------------

    /// The socket has been established.
    pub fn on_open(&mut self) {
        if self.connection != ConnectionState::Connecting {
            warn!("Ignoring open event in state {:?}", self.connection);
            return;
        }
        self.connection = ConnectionState::Open;
        self.status = Status::WaitingForOpponent;
    }

    /// The socket has closed (or never opened). Terminal.
    pub fn on_close(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.connection == ConnectionState::Closed {
            return effects;
        }
        self.connection = ConnectionState::Closed;
        self.is_my_turn = false;
        if self.registration_pending {
            self.registration_pending = false;
            effects.push(Effect::CancelRegistrationTimer);
        }
        self.status = Status::ConnectionClosed;
        effects
    }

    // -- inbound -------------------------------------------------------------

    /// Apply one server message.
    pub fn handle_message(&mut self, msg: ServerMessage) -> Vec<Effect> {
        if self.connection != ConnectionState::Open {
            debug!(
                "Dropping {} message received while {:?}",
                msg.kind(),
                self.connection
            );
            return Vec::new();
        }

        match msg {
            ServerMessage::Handshake {
                status,
                player_letter,
                game_id,
            } => self.on_handshake(status.as_deref(), player_letter, game_id),
            ServerMessage::Turn {
                turn_indicator,
                player_letter,
            } => self.on_turn(turn_indicator, player_letter),
            ServerMessage::OpponentUpdate { grid_id, status } => {
                self.on_opponent_update(grid_id, status);
                Vec::new()
            }
            ServerMessage::GameOver {
                tied,
                last_move_player,
                last_grid_id,
                result,
            } => self.on_game_over(tied, last_move_player, last_grid_id, result),
        }
    }

    fn assign_symbol(&mut self, symbol: Symbol) {
        if let Some(existing) = self.own_symbol {
            if existing != symbol {
                info!("Server reassigned symbol from {} to {}", existing, symbol);
            }
        }
        self.own_symbol = Some(symbol);
        self.opponent_symbol = Some(symbol.opponent());
    }

    fn on_handshake(
        &mut self,
        status: Option<&str>,
        player_letter: Option<Symbol>,
        game_id: Option<String>,
    ) -> Vec<Effect> {
        if let Some(id) = game_id {
            info!("Assigned game {id}");
            self.game_id = Some(id);
        }
        if let Some(symbol) = player_letter {
            self.assign_symbol(symbol);
        }

        let ok = status.is_some_and(|s| s.eq_ignore_ascii_case("ok"));
        if ok {
            info!("Handshake accepted, requesting a game");
            self.registration_pending = true;
            self.status = Status::FindingOpponent;
            return vec![
                Effect::Send(ClientMessage::RegisterGameRequest),
                Effect::StartRegistrationTimer,
            ];
        }

        if player_letter.is_some() {
            self.status = Status::WaitingForOpponent;
        } else {
            warn!("Handshake without a symbol and with status {:?}", status);
        }
        Vec::new()
    }

    fn on_turn(&mut self, indicator: TurnIndicator, player_letter: Option<Symbol>) -> Vec<Effect> {
        if self.is_game_over() {
            debug!("Ignoring turn indicator after game over");
            return Vec::new();
        }

        let mut effects = Vec::new();
        if self.registration_pending {
            self.registration_pending = false;
            effects.push(Effect::CancelRegistrationTimer);
        }

        if let Some(symbol) = player_letter {
            self.assign_symbol(symbol);
        }
        if self.own_symbol.is_none() {
            warn!("Turn indicator before a symbol was assigned, ignoring");
            return effects;
        }

        match indicator {
            TurnIndicator::YourTurn => {
                self.is_my_turn = true;
                self.status = Status::YourTurn;
            }
            TurnIndicator::Waiting => {
                self.is_my_turn = false;
                self.status = Status::OpponentStrategizing;
            }
        }
        effects
    }

    fn on_opponent_update(&mut self, cell: CellId, status: Option<MoveStatus>) {
        let Some(opponent) = self.opponent_symbol else {
            warn!("Opponent update for {} before handshake, ignoring", cell);
            return;
        };
        if self.is_game_over() {
            debug!("Ignoring opponent update for {} after game over", cell);
            return;
        }

        self.board.mark(cell, opponent);

        match status.unwrap_or(MoveStatus::InProgress) {
            MoveStatus::YouWin => {
                self.is_my_turn = false;
                self.outcome = Some(Outcome::Loss);
                self.status = Status::Winner(opponent);
            }
            MoveStatus::Tied => {
                self.is_my_turn = false;
                self.outcome = Some(Outcome::Tie);
                self.status = Status::Tied;
            }
            MoveStatus::InProgress => {
                self.is_my_turn = true;
                self.status = Status::YourTurn;
            }
        }
    }

    fn on_game_over(
        &mut self,
        tied: bool,
        last_move_player: Option<Symbol>,
        last_grid_id: Option<CellId>,
        result: Option<GameResult>,
    ) -> Vec<Effect> {
        let Some(own) = self.own_symbol else {
            warn!("Game over before handshake, ignoring");
            return Vec::new();
        };

        let outcome = if tied {
            Outcome::Tie
        } else if let Some(last) = last_move_player {
            if last == own {
                Outcome::Win
            } else {
                Outcome::Loss
            }
        } else {
            match result {
                Some(GameResult::YouWin) => Outcome::Win,
                Some(GameResult::YouLose) => Outcome::Loss,
                Some(GameResult::Tied) => Outcome::Tie,
                None => {
                    warn!("Game over without a result or last mover, ignoring");
                    return Vec::new();
                }
            }
        };

        // The opponent's winning (or final) move may not have been reported
        // through an opponent update.
        if let (Some(last), Some(cell)) = (last_move_player, last_grid_id) {
            if last != own && self.board.is_empty(cell) {
                self.board.mark(cell, last);
            }
        }

        let mut effects = Vec::new();
        if self.registration_pending {
            self.registration_pending = false;
            effects.push(Effect::CancelRegistrationTimer);
        }

        self.is_my_turn = false;
        self.outcome = Some(outcome);
        self.status = match outcome {
            Outcome::Win => Status::YouWin,
            Outcome::Loss => Status::YouLose,
            Outcome::Tie => Status::Tied,
        };
        info!("Game over: {:?}", outcome);
        effects
    }

    // -- outbound ------------------------------------------------------------

    /// The player selected `cell`. Returns the move to send, if any.
    pub fn click(&mut self, cell: CellId) -> Option<ClientMessage> {
        if !self.is_my_turn {
            return None;
        }
        let own = self.own_symbol?;
        if !self.board.is_empty(cell) {
            debug!("Cell {} is already taken", cell);
            return None;
        }

        self.is_my_turn = false;
        self.board.mark(cell, own);
        self.status = Status::OpponentStrategizing;
        Some(ClientMessage::Turn { grid_id: cell })
    }

    /// The registration timer fired. Returns `true` if this changed anything.
    pub fn on_registration_timeout(&mut self) -> bool {
        if !self.registration_pending {
            return false;
        }
        self.registration_pending = false;
        self.status = Status::RegistrationFailed;
        true
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            connection: self.connection,
            own_symbol: self.own_symbol,
            opponent_symbol: self.opponent_symbol,
            is_my_turn: self.is_my_turn,
            cells: self.board.cells(),
            status: self.status.to_string(),
            outcome: self.outcome,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
