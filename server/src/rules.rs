//! Move legality.
//!
//! Every piece may step one cell in any of the eight compass directions. A
//! step is legal when it stays on the board and does not land on a piece of
//! the mover's own side. Landing on an opposing piece marks it for capture.
//! There are no per-kind movement rules and no path blocking.

use crate::board::in_bounds;
use crate::game::GameSession;
use shared::{ClientMessage, Direction, ParseError, PieceRef, Player};
use thiserror::Error;

/// Reasons a move request is refused. All of them leave the session untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("it is {expected}'s turn, not {requested}'s")]
    WrongTurn { expected: Player, requested: Player },
    #[error("no live piece {0} in the acting roster")]
    UnknownPiece(PieceRef),
    #[error("destination ({x}, {y}) is off the board")]
    OutOfBounds { x: i32, y: i32 },
    #[error("destination ({x}, {y}) is held by friendly piece {occupant}")]
    FriendlyOccupied { x: i32, y: i32, occupant: PieceRef },
    #[error("malformed message: {0}")]
    MalformedMessage(String),
}

impl From<ParseError> for MoveError {
    fn from(err: ParseError) -> Self {
        MoveError::MalformedMessage(err.to_string())
    }
}

impl From<serde_json::Error> for MoveError {
    fn from(err: serde_json::Error) -> Self {
        MoveError::MalformedMessage(err.to_string())
    }
}

/// A decoded move intent.
///
/// `player` is who claims to be acting; `piece` is the piece named in the
/// notation, whose owner need not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub player: Player,
    pub piece: PieceRef,
    pub direction: Direction,
}

impl MoveRequest {
    pub fn new(player: Player, piece: PieceRef, direction: Direction) -> Self {
        Self {
            player,
            piece,
            direction,
        }
    }

    /// Decodes a raw JSON payload.
    pub fn parse(raw: &str) -> Result<Self, MoveError> {
        let message: ClientMessage = serde_json::from_str(raw)?;
        Ok(message.into())
    }
}

impl From<ClientMessage> for MoveRequest {
    fn from(message: ClientMessage) -> Self {
        match message {
            ClientMessage::Move { player, notation } => {
                MoveRequest::new(player, notation.piece, notation.direction)
            }
        }
    }
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Displacement {
    /// Index of the moving piece within the acting roster.
    pub index: usize,
    pub from: (i32, i32),
    pub to: (i32, i32),
    /// Opposing piece standing on the destination, if any.
    pub capture: Option<PieceRef>,
}

/// Checks `request` against the current session without changing it.
///
/// Turn ownership is not checked here; see [`GameSession::process_move`].
pub fn validate(session: &GameSession, request: &MoveRequest) -> Result<Displacement, MoveError> {
    let unknown = || MoveError::UnknownPiece(request.piece);

    if request.piece.owner != request.player {
        return Err(unknown());
    }
    let index = session
        .roster(request.player)
        .iter()
        .position(|piece| piece.kind == request.piece.kind)
        .ok_or_else(unknown)?;
    let piece = session.roster(request.player)[index];

    let (dx, dy) = request.direction.delta();
    let (x, y) = (piece.x + dx, piece.y + dy);

    if !in_bounds(x, y) {
        return Err(MoveError::OutOfBounds { x, y });
    }

    let capture = match session.board().get(x, y) {
        Some(occupant) if occupant.owner == request.player => {
            return Err(MoveError::FriendlyOccupied { x, y, occupant });
        }
        other => other,
    };

    Ok(Displacement {
        index,
        from: (piece.x, piece.y),
        to: (x, y),
        capture,
    })
}
