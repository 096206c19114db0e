use crate::board::Board;
use crate::rules::{validate, MoveError, MoveRequest};
use log::{debug, info};
use shared::{starting_roster, Piece, PieceRef, Player, Rosters, SessionSnapshot};

/// Result of a move accepted by [`GameSession::process_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The move was applied and `turn` is now due to act.
    Advanced {
        turn: Player,
        capture: Option<PieceRef>,
    },
    /// The move emptied the opposing roster. The session has already been
    /// reset to the starting layout when this is returned.
    Terminal { winner: Player },
}

/// The single authoritative game: both rosters, the derived board, whose turn
/// it is and the move log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    roster_a: Vec<Piece>,
    roster_b: Vec<Piece>,
    board: Board,
    turn: Player,
    history: Vec<String>,
}

impl GameSession {
    pub fn new() -> Self {
        Self::from_rosters(starting_roster(Player::A), starting_roster(Player::B), Player::A)
    }

    /// Builds a session from arbitrary rosters with an empty history.
    ///
    /// Rosters must not place two pieces on one cell.
    pub fn from_rosters(roster_a: Vec<Piece>, roster_b: Vec<Piece>, turn: Player) -> Self {
        let board = Board::project(&roster_a, &roster_b);
        Self {
            roster_a,
            roster_b,
            board,
            turn,
            history: Vec::new(),
        }
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn roster(&self, player: Player) -> &[Piece] {
        match player {
            Player::A => &self.roster_a,
            Player::B => &self.roster_b,
        }
    }

    fn roster_mut(&mut self, player: Player) -> &mut Vec<Piece> {
        match player {
            Player::A => &mut self.roster_a,
            Player::B => &mut self.roster_b,
        }
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Validates and applies one move, ignoring turn order.
    ///
    /// On error nothing is changed. On success the piece is moved, any
    /// opposing piece on the destination is removed, the move is logged and
    /// the board is re-projected. Returns the captured piece, if any.
    pub fn apply(&mut self, request: &MoveRequest) -> Result<Option<PieceRef>, MoveError> {
        let displacement = validate(self, request)?;
        let (x, y) = displacement.to;

        let piece = &mut self.roster_mut(request.player)[displacement.index];
        piece.x = x;
        piece.y = y;

        if let Some(captured) = displacement.capture {
            let roster = self.roster_mut(captured.owner);
            if let Some(pos) = roster.iter().position(|p| (p.x, p.y) == (x, y)) {
                roster.remove(pos);
            }
        }

        self.history.push(format!(
            "{} - {}:{}",
            request.player, request.piece, request.direction
        ));
        self.board = Board::project(&self.roster_a, &self.roster_b);
        debug_assert_eq!(
            self.board.occupied(),
            self.roster_a.len() + self.roster_b.len(),
            "board and rosters out of sync"
        );

        Ok(displacement.capture)
    }

    /// Turn-checked move processing. This is the only entry point that
    /// advances the game.
    pub fn process_move(&mut self, request: &MoveRequest) -> Result<Transition, MoveError> {
        if request.player != self.turn {
            return Err(MoveError::WrongTurn {
                expected: self.turn,
                requested: request.player,
            });
        }

        let capture = self.apply(request)?;

        if let Some(loser) = self.defeated() {
            let winner = loser.opponent();
            info!(
                "Player {} wins after {} moves, resetting session",
                winner,
                self.history.len()
            );
            self.reset();
            return Ok(Transition::Terminal { winner });
        }

        self.turn = self.turn.opponent();
        debug!(
            "Applied {} - {}:{}, {} to move",
            request.player, request.piece, request.direction, self.turn
        );
        Ok(Transition::Advanced {
            turn: self.turn,
            capture,
        })
    }

    /// Player whose roster is empty, if any.
    pub fn defeated(&self) -> Option<Player> {
        Player::ALL
            .into_iter()
            .find(|&player| self.roster(player).is_empty())
    }

    /// Restores the starting layout, clears the history and gives A the move.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            board: self.board.to_rows(),
            players: Rosters {
                a: self.roster_a.clone(),
                b: self.roster_b.clone(),
            },
            turn: self.turn,
            move_history: self.history.clone(),
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
