//! Settlers engine - rules core for a Catan-style board game
//!
//! This crate provides the game logic only, including:
//! - Hex coordinate system and board generation (tiles, vertices, edges, ports)
//! - Player state and resource management
//! - Legal-action enumeration for any player
//! - A validating state-transition processor with full rule enforcement
//! - Bank, port and player-to-player trading
//!
//! # Architecture
//!
//! The engine is synchronous and side-effect free. A transport or AI layer
//! asks [`get_legal_actions`] what a player may do and submits an [`Action`]
//! to [`apply_action`], which returns a new [`GameState`] or a [`GameError`].
//! Randomness always comes from the caller's RNG handle, usually a seeded
//! [`GameRng`], so a game can be replayed exactly.
//!
//! ```
//! use settlers_engine::{apply_action, get_legal_actions, GameConfig, GameState};
//!
//! let config = GameConfig::with_players(3).with_seed(42);
//! let (state, mut rng) = GameState::from_config(&config).unwrap();
//!
//! let first = get_legal_actions(&state, 0).remove(0);
//! let state = apply_action(&state, &first, &mut rng).unwrap();
//! assert_eq!(state.players[0].settlements_remaining, 4);
//! ```
//!
//! # Modules
//!
//! - [`hex`]: Cube coordinates and canonical corner/side keys
//! - [`board`]: Board generation and placement queries
//! - [`player`]: Player state, hands and build costs
//! - [`game`]: Game state, configuration and scoring
//! - [`actions`]: The action enum and its wire outcome
//! - [`rng`]: Seedable random number handle
//! - [`turn`]: Setup snake order and turn rotation
//! - [`rules`]: Legal actions
//! - [`processor`]: Action application
//! - [`trade`]: Maritime ratios and player offers
//! - [`codec`]: JSON snapshots

pub mod actions;
pub mod board;
pub mod codec;
pub mod game;
pub mod hex;
pub mod player;
pub mod processor;
pub mod rng;
pub mod rules;
pub mod trade;
pub mod turn;

// Re-export commonly used types
pub use actions::{Action, ActionOutcome};
pub use board::{
    generate_board, Board, Building, BuildingKind, Edge, EdgeId, HexTile, PlayerId, Port,
    PortType, Resource, Terrain, TileId, Vertex, VertexId,
};
pub use codec::{CodecError, Snapshot};
pub use game::{GameConfig, GameError, GamePhase, GameState, PendingAction, TurnState};
pub use hex::{CubeCoord, Direction, EdgeKey, VertexKey};
pub use player::{DevCard, DevCardHand, Player, PlayerColor, ResourceError, Resources};
pub use processor::apply_action;
pub use rng::GameRng;
pub use rules::get_legal_actions;
pub use trade::{port_ratio, TradeOffer, TradeStatus};
