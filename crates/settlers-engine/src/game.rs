//! Core game state.
//!
//! This module contains `GameState`, its configuration, the phase and
//! pending-action enums, the error type shared by every operation, and the
//! scoring rules (awards and victory).

use crate::board::{Board, PlayerId, VertexId};
use crate::player::{DevCard, Player, ResourceError};
use crate::rng::GameRng;
use crate::trade::TradeOffer;
use im::Vector;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Victory points needed to win
pub const VICTORY_POINTS_TO_WIN: u32 = 10;

/// Minimum road length for Longest Road
pub const MIN_LONGEST_ROAD: u32 = 5;

/// Minimum knights for Largest Army
pub const MIN_LARGEST_ARMY: u32 = 3;

/// Points granted by each award
pub const AWARD_POINTS: u32 = 2;

/// A roll of 7 makes players holding more than this many cards discard
pub const DISCARD_THRESHOLD: u32 = 7;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// Settings for a new game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// One name per seat, in seat order
    pub player_names: Vec<String>,
    /// Seed for the game's RNG; `None` draws one from entropy
    pub seed: Option<u64>,
    /// Keep 6 and 8 tokens off neighboring tiles
    pub balanced_board: bool,
}

impl GameConfig {
    pub fn new<I, S>(player_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            player_names: player_names.into_iter().map(Into::into).collect(),
            seed: None,
            balanced_board: false,
        }
    }

    /// A config with `count` default-named players
    pub fn with_players(count: usize) -> Self {
        Self::new((1..=count).map(|i| format!("Player {}", i)))
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn balanced(mut self, balanced: bool) -> Self {
        self.balanced_board = balanced;
        self
    }

    pub fn player_count(&self) -> usize {
        self.player_names.len()
    }

    /// Build the RNG this config describes
    pub fn rng(&self) -> GameRng {
        match self.seed {
            Some(seed) => GameRng::new(seed),
            None => GameRng::from_entropy(),
        }
    }

    pub fn validate(&self) -> Result<(), GameError> {
        let count = self.player_count();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
            return Err(GameError::InvalidConfig(format!(
                "expected {}-{} players, got {}",
                MIN_PLAYERS, MAX_PLAYERS, count
            )));
        }
        Ok(())
    }
}

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// First setup pass, seats 0..N-1
    SetupForward,
    /// Second setup pass, seats N-1..0
    SetupBackward,
    /// Normal turns
    Main,
    /// A player reached the victory target
    Ended,
}

impl GamePhase {
    pub fn is_setup(&self) -> bool {
        matches!(self, GamePhase::SetupForward | GamePhase::SetupBackward)
    }
}

/// What the game is waiting for within the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingAction {
    PlaceSettlement,
    PlaceRoad,
    RollDice,
    DiscardResources,
    MoveRobber,
    StealResource,
    BuildOrTrade,
}

/// Per-turn bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub active_player: PlayerId,
    /// Sum of the last roll this turn
    pub dice_roll: Option<u8>,
    pub has_rolled: bool,
    pub pending_action: PendingAction,
    /// Roads still owed by a Road Building card
    pub free_roads: u32,
    /// Players that still owe a discard after a 7
    pub discard_required: Vec<PlayerId>,
    /// Open peer-to-peer offer, if any
    pub active_trade_id: Option<u32>,
    pub dev_card_played: bool,
    /// Settlement the next setup road must touch
    pub last_settlement: Option<VertexId>,
}

impl TurnState {
    /// Turn state for a setup placement
    pub fn setup(active_player: PlayerId) -> Self {
        Self::with_pending(active_player, PendingAction::PlaceSettlement)
    }

    /// Turn state at the start of a normal turn
    pub fn main(active_player: PlayerId) -> Self {
        Self::with_pending(active_player, PendingAction::RollDice)
    }

    fn with_pending(active_player: PlayerId, pending_action: PendingAction) -> Self {
        Self {
            active_player,
            dice_roll: None,
            has_rolled: false,
            pending_action,
            free_roads: 0,
            discard_required: Vec::new(),
            active_trade_id: None,
            dev_card_played: false,
            last_settlement: None,
        }
    }

    /// Pending action once the robber has been dealt with
    pub fn resume_action(&self) -> PendingAction {
        if self.has_rolled {
            PendingAction::BuildOrTrade
        } else {
            PendingAction::RollDice
        }
    }
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("Invalid placement location")]
    InvalidLocation,

    #[error("Cannot afford this")]
    CannotAfford,

    #[error("No pieces remaining")]
    NoPiecesRemaining,

    #[error("No development cards left in deck")]
    EmptyDeck,

    #[error("Don't have that card")]
    NoSuchCard,

    #[error("A development card was already played this turn")]
    CardAlreadyPlayed,

    #[error("Invalid trade")]
    InvalidTrade,

    #[error("No trade with id {0}")]
    UnknownTrade(u32),

    #[error("Invalid discard")]
    InvalidDiscard,

    #[error("Player cannot be robbed")]
    InvalidVictim,

    #[error("No player with index {0}")]
    UnknownPlayer(PlayerId),

    #[error("Invalid game configuration: {0}")]
    InvalidConfig(String),

    #[error("Game is over")]
    GameOver,

    #[error(transparent)]
    Resources(#[from] ResourceError),
}

/// The complete game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// All players, indexed by seat
    pub players: Vec<Player>,
    /// The game board
    pub board: Board,
    pub phase: GamePhase,
    pub turn_state: TurnState,
    /// Remaining development cards; the last element is the top
    pub dev_deck: Vec<DevCard>,
    pub longest_road_owner: Option<PlayerId>,
    pub largest_army_owner: Option<PlayerId>,
    /// Every roll total, oldest first
    pub dice_history: Vector<u8>,
    /// 0 during setup, 1 for the first full round of normal turns
    pub turn_number: u32,
    pub winner: Option<PlayerId>,
    /// Every peer-to-peer offer made this game
    pub trades: Vector<TradeOffer>,
    pub next_trade_id: u32,
}

impl GameState {
    /// Create a new game: fresh board, empty hands, shuffled deck.
    pub fn new<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Result<Self, GameError> {
        config.validate()?;

        let players: Vec<Player> = config
            .player_names
            .iter()
            .enumerate()
            .map(|(i, name)| Player::new(i as PlayerId, name.as_str()))
            .collect();

        let board = Board::generate(config.balanced_board, rng);
        let dev_deck = DevCard::shuffled_deck(rng);

        debug!(players = players.len(), "new game");

        Ok(Self {
            players,
            board,
            phase: GamePhase::SetupForward,
            turn_state: TurnState::setup(0),
            dev_deck,
            longest_road_owner: None,
            largest_army_owner: None,
            dice_history: Vector::new(),
            turn_number: 0,
            winner: None,
            trades: Vector::new(),
            next_trade_id: 1,
        })
    }

    /// Create a game along with the RNG its config describes
    pub fn from_config(config: &GameConfig) -> Result<(Self, GameRng), GameError> {
        let mut rng = config.rng();
        let state = Self::new(config, &mut rng)?;
        Ok((state, rng))
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by index
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, GameError> {
        self.players
            .get_mut(id as usize)
            .ok_or(GameError::UnknownPlayer(id))
    }

    pub fn active_player(&self) -> PlayerId {
        self.turn_state.active_player
    }

    pub fn pending_action(&self) -> PendingAction {
        self.turn_state.pending_action
    }

    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::Ended
    }

    /// Seat indices starting at `start` and wrapping around
    pub fn seats_from(&self, start: PlayerId) -> impl Iterator<Item = PlayerId> {
        let count = self.players.len();
        (0..count).map(move |offset| ((start as usize + offset) % count) as PlayerId)
    }

    /// Victory points plus award bonuses
    pub fn effective_score(&self, id: PlayerId) -> u32 {
        let Some(player) = self.player(id) else {
            return 0;
        };
        let mut score = player.victory_points;
        if self.longest_road_owner == Some(id) {
            score += AWARD_POINTS;
        }
        if self.largest_army_owner == Some(id) {
            score += AWARD_POINTS;
        }
        score
    }

    /// Recompute the stored longest-road length for every player
    pub(crate) fn refresh_road_lengths(&mut self) {
        for player in &mut self.players {
            player.longest_road_length = self.board.longest_road(player.index);
        }
    }

    /// Reassign Longest Road from the stored road lengths.
    ///
    /// A challenger needs strictly more than the holder; a holder that
    /// dropped under the minimum loses the award.
    pub(crate) fn update_longest_road_owner(&mut self, acting: PlayerId) {
        let lengths: Vec<u32> = self.players.iter().map(|p| p.longest_road_length).collect();
        let owner = self.award_owner(self.longest_road_owner, acting, &lengths, MIN_LONGEST_ROAD);
        if owner != self.longest_road_owner {
            debug!(previous = ?self.longest_road_owner, current = ?owner, "longest road changed");
            self.longest_road_owner = owner;
        }
    }

    /// Reassign Largest Army from knights played
    pub(crate) fn update_largest_army_owner(&mut self, acting: PlayerId) {
        let knights: Vec<u32> = self.players.iter().map(|p| p.knights_played).collect();
        let owner = self.award_owner(self.largest_army_owner, acting, &knights, MIN_LARGEST_ARMY);
        if owner != self.largest_army_owner {
            debug!(previous = ?self.largest_army_owner, current = ?owner, "largest army changed");
            self.largest_army_owner = owner;
        }
    }

    fn award_owner(
        &self,
        holder: Option<PlayerId>,
        acting: PlayerId,
        scores: &[u32],
        minimum: u32,
    ) -> Option<PlayerId> {
        let score_of = |id: PlayerId| scores.get(id as usize).copied().unwrap_or(0);

        let mut owner = holder.filter(|&h| score_of(h) >= minimum);
        let mut best = owner.map_or(minimum - 1, score_of);
        for id in self.seats_from(acting) {
            if score_of(id) > best {
                best = score_of(id);
                owner = Some(id);
            }
        }
        owner
    }

    /// End the game if someone reached the target, checking `acting` first
    pub(crate) fn check_victory(&mut self, acting: PlayerId) {
        if self.phase == GamePhase::Ended {
            return;
        }
        let winner = self
            .seats_from(acting)
            .find(|&id| self.effective_score(id) >= VICTORY_POINTS_TO_WIN);
        if let Some(winner) = winner {
            self.phase = GamePhase::Ended;
            self.winner = Some(winner);
            info!(
                winner,
                score = self.effective_score(winner),
                turn = self.turn_number,
                "game over"
            );
        }
    }

    /// Record every port the player's buildings now touch
    pub(crate) fn sync_ports(&mut self, id: PlayerId) -> Result<(), GameError> {
        let ports = self.board.ports_for(id);
        let player = self.player_mut(id)?;
        for port in ports {
            player.add_port(port);
        }
        Ok(())
    }
}
