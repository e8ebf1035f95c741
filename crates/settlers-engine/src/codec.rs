//! JSON snapshots of engine values.
//!
//! Transports and save files exchange boards, games and players as
//! `serde_json::Value`s. A snapshot decodes back into a value equal to the
//! original, field for field.

use crate::actions::Action;
use crate::board::Board;
use crate::game::GameState;
use crate::player::Player;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors from encoding or decoding a snapshot
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("snapshot encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Conversion to and from JSON snapshots
pub trait Snapshot: Serialize + DeserializeOwned {
    fn to_snapshot(&self) -> Result<Value, CodecError> {
        Ok(serde_json::to_value(self)?)
    }

    fn from_snapshot(value: Value) -> Result<Self, CodecError> {
        Ok(serde_json::from_value(value)?)
    }

    fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    fn from_json(json: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Snapshot for Board {}
impl Snapshot for GameState {}
impl Snapshot for Player {}
impl Snapshot for Action {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{PortType, Resource};
    use crate::game::GameConfig;
    use crate::player::DevCard;
    use crate::rng::GameRng;

    #[test]
    fn test_board_round_trip() {
        let mut board = Board::generate(true, &mut GameRng::new(5));
        board.place_settlement(4, 1);
        board.upgrade_to_city(4);
        board.place_road(10, 2);

        let decoded = Board::from_snapshot(board.to_snapshot().unwrap()).unwrap();
        assert_eq!(decoded, board);
    }

    #[test]
    fn test_player_round_trip() {
        let mut player = Player::new(2, "Ada");
        player.resources.add(Resource::Ore, 3);
        player.dev_cards.add(DevCard::Monopoly, 1);
        player.add_port(PortType::Specific(Resource::Sheep));

        let json = player.to_json().unwrap();
        assert_eq!(Player::from_json(&json).unwrap(), player);
    }

    #[test]
    fn test_game_round_trip() {
        let (state, _) = GameState::from_config(&GameConfig::with_players(4).with_seed(9)).unwrap();
        let decoded = GameState::from_snapshot(state.to_snapshot().unwrap()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_bad_snapshot_is_an_error() {
        assert!(matches!(
            Player::from_json("{\"index\": 0}"),
            Err(CodecError::Json(_))
        ));
    }
}
