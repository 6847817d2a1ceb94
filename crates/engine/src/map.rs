//! Map definitions, the map catalog, and board construction from a map.

use crate::board::{Board, Position};
use crate::constants::{PieceKind, named_offsets};
use crate::coord::Coord;
use crate::error::{MapError, MapResult};
use crate::piece::{OffsetSet, Piece};
use crate::rng::RandomSource;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

const BUILTIN_YAML: &str = include_str!("../data/maps.yaml");

// Parsed once on first use.
static BUILTIN_CATALOG: Lazy<MapResult<MapCatalog>> = Lazy::new(|| MapCatalog::from_yaml_str(BUILTIN_YAML));

/// The catalog shipped with the crate.
pub fn builtin_catalog() -> Result<&'static MapCatalog, &'static MapError> {
    Lazy::force(&BUILTIN_CATALOG).as_ref()
}

/// Name and offsets shared by every instance of a piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceTemplate {
    pub name: String,
    pub offsets: OffsetSet,
}

impl PieceTemplate {
    pub fn new(name: impl Into<String>, offsets: impl IntoIterator<Item = Coord>) -> Self {
        Self {
            name: name.into(),
            offsets: offsets.into_iter().collect(),
        }
    }

    pub fn spawn(&self, kind: PieceKind, coord: Coord) -> Piece {
        Piece::new(self.name.clone(), kind, coord, self.offsets.clone())
    }

    fn default_king() -> Self {
        Self::new("King", named_offsets("king").unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub piece: PieceTemplate,
    pub count: usize,
}

/// Static description of one map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDefinition {
    pub name: String,
    pub positions: Vec<Position>,
    pub king: PieceTemplate,
    pub roster: Vec<RosterEntry>,
}

/// The player template plus every playable map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapCatalog {
    pub player: PieceTemplate,
    pub maps: Vec<MapDefinition>,
}

impl MapCatalog {
    pub fn from_yaml_str(text: &str) -> MapResult<Self> {
        let raw: RawCatalog = serde_yaml::from_str(text)?;
        raw.compile()
    }

    pub fn load(path: impl AsRef<Path>) -> MapResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}

// --- Raw file format ---

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawOffsets {
    Named(String),
    List(Vec<Coord>),
}

impl RawOffsets {
    fn resolve(self) -> MapResult<Vec<Coord>> {
        match self {
            RawOffsets::Named(name) => named_offsets(&name).ok_or(MapError::UnknownOffsets(name)),
            RawOffsets::List(list) => Ok(list),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPiece {
    name: String,
    moves: RawOffsets,
}

impl RawPiece {
    fn compile(self) -> MapResult<PieceTemplate> {
        Ok(PieceTemplate::new(self.name, self.moves.resolve()?))
    }
}

#[derive(Debug, Deserialize)]
struct RawRosterEntry {
    name: String,
    moves: RawOffsets,
    count: usize,
}

#[derive(Debug, Deserialize)]
struct RawMap {
    name: String,
    #[serde(default)]
    grid: Vec<String>,
    #[serde(default)]
    positions: Vec<Position>,
    king: Option<RawPiece>,
    #[serde(default)]
    pieces: Vec<RawRosterEntry>,
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    player: RawPiece,
    maps: Vec<RawMap>,
}

impl RawCatalog {
    fn compile(self) -> MapResult<MapCatalog> {
        if self.maps.is_empty() {
            return Err(MapError::EmptyCatalog);
        }
        let player = self.player.compile()?;
        let maps = self.maps.into_iter().map(RawMap::compile).collect::<MapResult<Vec<_>>>()?;
        Ok(MapCatalog { player, maps })
    }
}

impl RawMap {
    fn compile(self) -> MapResult<MapDefinition> {
        let mut positions = parse_grid(&self.name, &self.grid)?;
        positions.extend(self.positions);
        if positions.is_empty() {
            return Err(MapError::EmptyMap(self.name));
        }

        let king = match self.king {
            Some(raw) => raw.compile()?,
            None => PieceTemplate::default_king(),
        };

        let roster = self
            .pieces
            .into_iter()
            .map(|e| {
                Ok(RosterEntry {
                    piece: PieceTemplate::new(e.name, e.moves.resolve()?),
                    count: e.count,
                })
            })
            .collect::<MapResult<Vec<_>>>()?;

        Ok(MapDefinition {
            name: self.name,
            positions,
            king,
            roster,
        })
    }
}

/// Turns grid rows into positions. The last row is `y = 0`.
fn parse_grid(map: &str, rows: &[String]) -> MapResult<Vec<Position>> {
    let mut out = Vec::new();
    let height = rows.len() as i32;
    for (row, line) in rows.iter().enumerate() {
        let y = height - 1 - row as i32;
        for (col, ch) in line.chars().enumerate() {
            let coord = Coord::new(col as i32, y);
            let pos = match ch {
                '.' => Position::new(coord),
                'S' => Position::new(coord).with_start(true),
                'K' => Position::new(coord).with_king_spawn(true),
                '#' | ' ' => continue,
                _ => {
                    return Err(MapError::InvalidGrid {
                        map: map.to_string(),
                        row,
                        col,
                        ch,
                    });
                }
            };
            out.push(pos);
        }
    }
    Ok(out)
}

/// Builds a board from a map definition and places the king and enemies.
///
/// The king goes on a uniformly chosen king-spawn cell. Enemies are drawn
/// without replacement from the cells that are neither start cells nor the
/// king's cell. Any failure returns before a board is handed out.
pub fn load_map<R: RandomSource + ?Sized>(def: &MapDefinition, rng: &mut R) -> MapResult<Board> {
    let mut board = Board::new(def.name.clone(), def.positions.iter().copied())?;

    let king_spawns: Vec<Coord> = board.king_spawn_positions().map(|p| p.coord).collect();
    if king_spawns.is_empty() {
        return Err(MapError::NoKingSpawnPositions);
    }
    let king_at = king_spawns[rng.uniform_int(0, king_spawns.len())];
    board.spawn_piece(def.king.spawn(PieceKind::King, king_at));
    debug!(map = %def.name, at = %king_at, "king placed");

    let mut pool: Vec<Coord> = board
        .positions()
        .filter(|p| !p.start && p.coord != king_at)
        .map(|p| p.coord)
        .collect();

    for entry in &def.roster {
        for placed in 0..entry.count {
            if pool.is_empty() {
                return Err(MapError::InsufficientSpawnPositions {
                    piece: entry.piece.name.clone(),
                    placed,
                    requested: entry.count,
                });
            }
            let at = pool.remove(rng.uniform_int(0, pool.len()));
            board.spawn_piece(entry.piece.spawn(PieceKind::Enemy, at));
        }
    }

    info!(map = %def.name, cells = board.len(), pieces = board.piece_count(), "map loaded");
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRandom, seeded};
    use std::collections::HashSet;

    fn rows(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    fn definition(grid: &[&str], roster: Vec<RosterEntry>) -> MapDefinition {
        MapDefinition {
            name: "test".into(),
            positions: parse_grid("test", &rows(grid)).unwrap(),
            king: PieceTemplate::default_king(),
            roster,
        }
    }

    fn pawns(count: usize) -> RosterEntry {
        RosterEntry {
            piece: PieceTemplate::new("Pawn", named_offsets("pawn").unwrap()),
            count,
        }
    }

    #[test]
    fn builtin_catalog_parses() {
        let catalog = builtin_catalog().unwrap();
        assert!(catalog.maps.len() >= 3);
        assert_eq!(catalog.player.name, "Player");
        assert_eq!(catalog.player.offsets.len(), 8);
        for map in &catalog.maps {
            assert!(map.positions.iter().any(|p| p.start), "{} has no start cells", map.name);
            assert!(map.positions.iter().any(|p| p.king_spawn), "{} has no king spawns", map.name);
        }
    }

    #[test]
    fn every_builtin_map_loads() {
        let catalog = builtin_catalog().unwrap();
        for seed in 0..8 {
            for map in &catalog.maps {
                let board = load_map(map, &mut seeded(seed)).unwrap();
                let expected: usize = 1 + map.roster.iter().map(|e| e.count).sum::<usize>();
                assert_eq!(board.piece_count(), expected);
            }
        }
    }

    #[test]
    fn grid_rows_count_down_to_zero() {
        let cells = parse_grid("g", &rows(&["K.", "#S"])).unwrap();
        assert_eq!(
            cells,
            vec![
                Position::new(Coord::new(0, 1)).with_king_spawn(true),
                Position::new(Coord::new(1, 1)),
                Position::new(Coord::new(1, 0)).with_start(true),
            ]
        );
    }

    #[test]
    fn unknown_grid_character_is_rejected() {
        let err = parse_grid("g", &rows(&["..", ".x"])).unwrap_err();
        assert!(matches!(err, MapError::InvalidGrid { row: 1, col: 1, ch: 'x', .. }));
    }

    #[test]
    fn explicit_positions_and_offset_lists() {
        let text = r#"
player: { name: Hero, moves: [[0, 1], [0, 1], [1, 0]] }
maps:
  - name: Strip
    positions:
      - { coord: [0, 0], start: true }
      - { coord: [1, 0] }
      - { coord: [2, 0], king_spawn: true }
    pieces:
      - { name: Pawn, moves: pawn, count: 1 }
"#;
        let catalog = MapCatalog::from_yaml_str(text).unwrap();
        assert_eq!(catalog.player.offsets.len(), 2);
        let map = &catalog.maps[0];
        assert_eq!(map.positions.len(), 3);
        assert_eq!(map.king.name, "King");

        let board = load_map(map, &mut seeded(1)).unwrap();
        assert_eq!(board.king_coord(), Some(Coord::new(2, 0)));
        assert_eq!(board.piece_at(Coord::new(1, 0)).map(|(_, p)| p.name.as_str()), Some("Pawn"));
    }

    #[test]
    fn unknown_offset_name_is_rejected() {
        let text = "player: { name: P, moves: dragon }\nmaps:\n  - name: M\n    grid: [\"SK\"]\n";
        assert!(matches!(MapCatalog::from_yaml_str(text), Err(MapError::UnknownOffsets(n)) if n == "dragon"));
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let text = "player: { name: P, moves: king }\nmaps: []\n";
        assert!(matches!(MapCatalog::from_yaml_str(text), Err(MapError::EmptyCatalog)));
    }

    #[test]
    fn no_king_spawn_fails_without_a_board() {
        let def = definition(&["...", "SSS"], vec![pawns(1)]);
        let result = load_map(&def, &mut seeded(3));
        assert!(matches!(result, Err(MapError::NoKingSpawnPositions)));
    }

    #[test]
    fn duplicate_coordinates_fail_map_load() {
        let mut def = definition(&["K.", "SS"], vec![]);
        def.positions.push(Position::new(Coord::new(1, 1)));
        assert!(matches!(load_map(&def, &mut seeded(0)), Err(MapError::DuplicateCoordinate(_))));
    }

    #[test]
    fn exhausted_pool_reports_progress() {
        // Pool is the two plain cells; the third pawn has nowhere to go.
        let def = definition(&["K..", "SSS"], vec![pawns(3)]);
        let err = load_map(&def, &mut seeded(0)).unwrap_err();
        match err {
            MapError::InsufficientSpawnPositions { piece, placed, requested } => {
                assert_eq!(piece, "Pawn");
                assert_eq!(placed, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn spawns_avoid_start_cells_and_each_other() {
        let def = definition(&[".K.K.", ".....", ".....", "SSSSS"], vec![pawns(6), pawns(4)]);
        for seed in 0..32 {
            let board = load_map(&def, &mut seeded(seed)).unwrap();
            let mut seen = HashSet::new();
            for (_, piece) in board.pieces() {
                assert!(seen.insert(piece.coord), "two pieces on {}", piece.coord);
                assert!(!board.is_start(piece.coord));
            }
            let king = board.king().unwrap();
            assert!(board.lookup(king.coord).unwrap().king_spawn);
        }
    }

    #[test]
    fn king_spawn_is_drawn_from_the_rng() {
        let def = definition(&["K.K", "SSS"], vec![]);
        let board = load_map(&def, &mut ScriptedRandom::new([1])).unwrap();
        assert_eq!(board.king_coord(), Some(Coord::new(2, 1)));
    }
}
