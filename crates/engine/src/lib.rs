pub mod board;
pub mod config;
pub mod constants;
pub mod coord;
pub mod engine;
pub mod error;
pub mod frontend;
pub mod map;
pub mod move_gen;
pub mod piece;
pub mod rng;

pub use board::{Board, Position};
pub use config::{Config, DifficultyConfig};
pub use constants::{GameOutcome, Highlight, PieceKind, TurnState};
pub use coord::Coord;
pub use engine::{Engine, Selection};
pub use error::{ConfigError, MapError, MapResult, SelectionError};
pub use frontend::{Frontend, Highlighter, Notification, Notifier, NullFrontend, RecordingFrontend};
pub use map::{MapCatalog, MapDefinition, PieceTemplate, RosterEntry, builtin_catalog, load_map};
pub use piece::{OffsetSet, Piece, PieceId};
pub use rng::RandomSource;
