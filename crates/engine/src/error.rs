//! Error types for the engine.
//!
//! Selection errors are recoverable and are reported back to the caller as
//! values. Map errors abort map construction and are returned as `Err`.

use crate::coord::Coord;
use thiserror::Error;

/// A rejected human selection. The session stays in the same state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("invalid start position {0}")]
    InvalidPosition(Coord),
    #[error("invalid move to {0}")]
    InvalidMove(Coord),
}

/// Map construction or catalog loading failed. No board is produced.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("duplicate coordinate {0} in map definition")]
    DuplicateCoordinate(Coord),
    #[error("map has no king spawn positions")]
    NoKingSpawnPositions,
    #[error("ran out of spawn positions placing {piece}: {placed} of {requested} placed")]
    InsufficientSpawnPositions {
        piece: String,
        placed: usize,
        requested: usize,
    },
    #[error("map {map:?}: invalid grid character {ch:?} at row {row}, column {col}")]
    InvalidGrid {
        map: String,
        row: usize,
        col: usize,
        ch: char,
    },
    #[error("unknown offset set {0:?}")]
    UnknownOffsets(String),
    #[error("map {0:?} has no positions")]
    EmptyMap(String),
    #[error("map catalog contains no maps")]
    EmptyCatalog,
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MapResult<T> = Result<T, MapError>;
