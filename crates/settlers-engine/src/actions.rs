//! Game actions that players can take.
//!
//! `Action` is the wire contract shared with any transport or AI layer: a
//! `type`-tagged object that always names the acting `player`.
//!
//! ```
//! use settlers_engine::Action;
//!
//! let action: Action = serde_json::from_str(r#"{"type":"place_road","player":1,"edge":7}"#).unwrap();
//! assert_eq!(action, Action::PlaceRoad { player: 1, edge: 7 });
//! ```

use crate::board::{EdgeId, PlayerId, Resource, TileId, VertexId};
use crate::game::{GameError, GameState};
use crate::player::Resources;
use serde::{Deserialize, Serialize};

/// All possible actions a player can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    // ==================== Building ====================
    /// Place a settlement (free during setup)
    PlaceSettlement { player: PlayerId, vertex: VertexId },
    /// Place a road (free during setup or after Road Building)
    PlaceRoad { player: PlayerId, edge: EdgeId },
    /// Upgrade one of the player's settlements
    PlaceCity { player: PlayerId, vertex: VertexId },

    // ==================== Turn ====================
    RollDice { player: PlayerId },
    EndTurn { player: PlayerId },

    // ==================== Development Cards ====================
    /// Buy the top development card
    BuildDevCard { player: PlayerId },
    PlayKnight { player: PlayerId },
    PlayRoadBuilding { player: PlayerId },
    PlayYearOfPlenty {
        player: PlayerId,
        first: Resource,
        second: Resource,
    },
    PlayMonopoly { player: PlayerId, resource: Resource },

    // ==================== Maritime Trade ====================
    /// 4:1 with the bank
    TradeWithBank {
        player: PlayerId,
        give: Resource,
        receive: Resource,
    },
    /// 3:1 or 2:1 through an owned port
    TradeWithPort {
        player: PlayerId,
        give: Resource,
        receive: Resource,
    },

    // ==================== Robber ====================
    MoveRobber { player: PlayerId, tile: TileId },
    StealResource { player: PlayerId, victim: PlayerId },
    DiscardResources { player: PlayerId, resources: Resources },

    // ==================== Player Trade ====================
    /// Offer a trade; an empty `to` invites every opponent
    OfferTrade {
        player: PlayerId,
        #[serde(default)]
        to: Vec<PlayerId>,
        offering: Resources,
        requesting: Resources,
    },
    AcceptTrade { player: PlayerId, trade_id: u32 },
    RejectTrade { player: PlayerId, trade_id: u32 },
    CancelTrade { player: PlayerId, trade_id: u32 },
}

impl Action {
    /// The player performing this action
    pub fn player(&self) -> PlayerId {
        match self {
            Action::PlaceSettlement { player, .. }
            | Action::PlaceRoad { player, .. }
            | Action::PlaceCity { player, .. }
            | Action::RollDice { player }
            | Action::EndTurn { player }
            | Action::BuildDevCard { player }
            | Action::PlayKnight { player }
            | Action::PlayRoadBuilding { player }
            | Action::PlayYearOfPlenty { player, .. }
            | Action::PlayMonopoly { player, .. }
            | Action::TradeWithBank { player, .. }
            | Action::TradeWithPort { player, .. }
            | Action::MoveRobber { player, .. }
            | Action::StealResource { player, .. }
            | Action::DiscardResources { player, .. }
            | Action::OfferTrade { player, .. }
            | Action::AcceptTrade { player, .. }
            | Action::RejectTrade { player, .. }
            | Action::CancelTrade { player, .. } => *player,
        }
    }

    /// Peer trade actions may come from players other than the active one
    pub fn is_peer_trade(&self) -> bool {
        matches!(
            self,
            Action::AcceptTrade { .. } | Action::RejectTrade { .. }
        )
    }
}

/// Result of applying an action, in the shape transports send back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<GameState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<GameError>,
}

impl From<Result<GameState, GameError>> for ActionOutcome {
    fn from(result: Result<GameState, GameError>) -> Self {
        match result {
            Ok(state) => Self {
                success: true,
                state: Some(state),
                error: None,
            },
            Err(error) => Self {
                success: false,
                state: None,
                error: Some(error),
            },
        }
    }
}
