//! Configuration for a game session.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DifficultyConfig {
    /// Number of enemy picks the AI makes per turn (with replacement).
    pub simul_moves: usize,
    /// Expose enemy reach to the display layer.
    pub show_enemy_range: bool,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            simul_moves: 2,
            show_enemy_range: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub difficulty: DifficultyConfig,
    /// Accept player moves to coordinates that are not board cells, as long as
    /// the offset matches.
    pub lenient_player_moves: bool,
}

impl Config {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn with_difficulty(mut self, difficulty: DifficultyConfig) -> Self {
        self.difficulty = difficulty;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg = Config::from_yaml_str("difficulty:\n  simulMoves: 5\n").unwrap();
        assert_eq!(cfg.difficulty.simul_moves, 5);
        assert!(cfg.difficulty.show_enemy_range);
        assert!(!cfg.lenient_player_moves);
    }

    #[test]
    fn full_document() {
        let text = "difficulty:\n  simulMoves: 1\n  showEnemyRange: false\nlenientPlayerMoves: true\n";
        let cfg = Config::from_yaml_str(text).unwrap();
        assert_eq!(
            cfg,
            Config {
                difficulty: DifficultyConfig { simul_moves: 1, show_enemy_range: false },
                lenient_player_moves: true,
            }
        );
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(matches!(Config::from_yaml_str("difficulty: [1, 2"), Err(ConfigError::Yaml(_))));
    }
}
