//! Domain primitives and JSON wire protocol shared by the game server and its clients.
//!
//! Everything in here is plain data: players, piece kinds, compass directions,
//! the textual move notation (`"A-H1:R"`) and the message shapes exchanged over
//! the connection. Rules live in the server crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Width and height of the square board.
pub const BOARD_SIZE: i32 = 5;

/// Piece kinds on a player's home row, indexed by column.
pub const HOME_ROW: [PieceKind; BOARD_SIZE as usize] = [
    PieceKind::P1,
    PieceKind::P2,
    PieceKind::H1,
    PieceKind::P3,
    PieceKind::H2,
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed move notation: {0:?}")]
    MalformedNotation(String),
    #[error("unknown player: {0:?}")]
    UnknownPlayer(String),
    #[error("unknown piece kind: {0:?}")]
    UnknownPieceKind(String),
    #[error("unknown direction: {0:?}")]
    UnknownDirection(String),
}

/// One of the two fixed player slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    A,
    B,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::A, Player::B];

    pub fn opponent(self) -> Self {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Player::A => "A",
            Player::B => "B",
        }
    }

    /// Row the player's pieces start on.
    pub fn home_row(self) -> i32 {
        match self {
            Player::A => 0,
            Player::B => BOARD_SIZE - 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Player {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Player::A),
            "B" => Ok(Player::B),
            other => Err(ParseError::UnknownPlayer(other.to_string())),
        }
    }
}

/// Identity label of a piece. Carries no movement rules of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    P1,
    P2,
    P3,
    H1,
    H2,
}

impl PieceKind {
    pub const ALL: [PieceKind; 5] = [
        PieceKind::P1,
        PieceKind::P2,
        PieceKind::P3,
        PieceKind::H1,
        PieceKind::H2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PieceKind::P1 => "P1",
            PieceKind::P2 => "P2",
            PieceKind::P3 => "P3",
            PieceKind::H1 => "H1",
            PieceKind::H2 => "H2",
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PieceKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PieceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseError::UnknownPieceKind(s.to_string()))
    }
}

/// Compass-style single-step move.
///
/// Directions are absolute board directions, the same for both players:
/// `F` decreases `y`, `B` increases it, `L` decreases `x`, `R` increases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    L,
    R,
    F,
    B,
    FL,
    FR,
    BL,
    BR,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::L,
        Direction::R,
        Direction::F,
        Direction::B,
        Direction::FL,
        Direction::FR,
        Direction::BL,
        Direction::BR,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::L => "L",
            Direction::R => "R",
            Direction::F => "F",
            Direction::B => "B",
            Direction::FL => "FL",
            Direction::FR => "FR",
            Direction::BL => "BL",
            Direction::BR => "BR",
        }
    }

    /// Unit displacement `(dx, dy)` for this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::L => (-1, 0),
            Direction::R => (1, 0),
            Direction::F => (0, -1),
            Direction::B => (0, 1),
            Direction::FL => (-1, -1),
            Direction::FR => (1, -1),
            Direction::BL => (-1, 1),
            Direction::BR => (1, 1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|direction| direction.as_str() == s)
            .ok_or_else(|| ParseError::UnknownDirection(s.to_string()))
    }
}

/// A live piece in a player's roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    #[serde(rename = "type")]
    pub kind: PieceKind,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    pub fn new(kind: PieceKind, x: i32, y: i32) -> Self {
        Self { kind, x, y }
    }
}

/// Fresh roster for `player`, one piece per home-row column.
pub fn starting_roster(player: Player) -> Vec<Piece> {
    let y = player.home_row();
    HOME_ROW
        .iter()
        .zip(0..)
        .map(|(&kind, x)| Piece::new(kind, x, y))
        .collect()
}

/// Piece identity as owner plus kind, written `"A-H1"`.
///
/// Also used as the occupant tag of a board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PieceRef {
    pub owner: Player,
    pub kind: PieceKind,
}

impl PieceRef {
    pub fn new(owner: Player, kind: PieceKind) -> Self {
        Self { owner, kind }
    }
}

impl fmt::Display for PieceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.owner, self.kind)
    }
}

impl FromStr for PieceRef {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (owner, kind) = s
            .split_once('-')
            .ok_or_else(|| ParseError::MalformedNotation(s.to_string()))?;
        Ok(Self {
            owner: owner.parse()?,
            kind: kind.parse()?,
        })
    }
}

impl TryFrom<String> for PieceRef {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PieceRef> for String {
    fn from(piece: PieceRef) -> Self {
        piece.to_string()
    }
}

/// Textual move `"<owner>-<kind>:<direction>"`, e.g. `"A-H1:R"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MoveNotation {
    pub piece: PieceRef,
    pub direction: Direction,
}

impl MoveNotation {
    pub fn new(piece: PieceRef, direction: Direction) -> Self {
        Self { piece, direction }
    }
}

impl fmt::Display for MoveNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.piece, self.direction)
    }
}

impl FromStr for MoveNotation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (piece, direction) = s
            .split_once(':')
            .ok_or_else(|| ParseError::MalformedNotation(s.to_string()))?;
        Ok(Self {
            piece: piece.parse()?,
            direction: direction.parse()?,
        })
    }
}

impl TryFrom<String> for MoveNotation {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MoveNotation> for String {
    fn from(notation: MoveNotation) -> Self {
        notation.to_string()
    }
}

/// Messages sent from a client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    Move {
        player: Player,
        #[serde(rename = "move")]
        notation: MoveNotation,
    },
}

/// Both rosters keyed by player on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rosters {
    #[serde(rename = "A")]
    pub a: Vec<Piece>,
    #[serde(rename = "B")]
    pub b: Vec<Piece>,
}

impl Rosters {
    pub fn get(&self, player: Player) -> &[Piece] {
        match player {
            Player::A => &self.a,
            Player::B => &self.b,
        }
    }
}

/// Full session state as broadcast to clients. Rows are indexed by `y`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub board: Vec<Vec<Option<PieceRef>>>,
    pub players: Rosters,
    pub turn: Player,
    #[serde(rename = "moveHistory")]
    pub move_history: Vec<String>,
}

/// Messages sent from the server to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    Init { state: SessionSnapshot },
    Update { state: SessionSnapshot },
    GameOver { winner: Player },
    Invalid,
}
