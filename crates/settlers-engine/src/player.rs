//! Player state and resource management.
//!
//! This module contains:
//! - `Resources`: the five named resource counters
//! - `DevCard` / `DevCardHand`: development cards and counted hands
//! - Building costs
//! - `Player`: hand, pieces, scoring counters and owned ports

use crate::board::{PlayerId, PortType, Resource};
use crate::game::GameError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pieces each player starts with
pub const MAX_SETTLEMENTS: u32 = 5;
pub const MAX_CITIES: u32 = 4;
pub const MAX_ROADS: u32 = 15;

/// Player color for UI rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    Blue,
    Orange,
    White,
}

impl PlayerColor {
    /// Get color for a player index
    pub fn for_player(id: PlayerId) -> Self {
        match id % 4 {
            0 => PlayerColor::Red,
            1 => PlayerColor::Blue,
            2 => PlayerColor::Orange,
            _ => PlayerColor::White,
        }
    }
}

/// Development card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevCard {
    /// Move robber and steal, counts toward Largest Army
    Knight,
    /// Build 2 roads for free
    RoadBuilding,
    /// Take any 2 resources from the bank
    YearOfPlenty,
    /// All players must give you all of one resource type
    Monopoly,
    /// Worth 1 VP as soon as it is drawn
    VictoryPoint,
}

impl DevCard {
    pub const ALL: [DevCard; 5] = [
        DevCard::Knight,
        DevCard::RoadBuilding,
        DevCard::YearOfPlenty,
        DevCard::Monopoly,
        DevCard::VictoryPoint,
    ];

    /// Create the standard development card deck (25 cards, unshuffled)
    pub fn standard_deck() -> Vec<DevCard> {
        let mut deck = Vec::with_capacity(25);
        deck.extend(std::iter::repeat(DevCard::Knight).take(14));
        deck.extend(std::iter::repeat(DevCard::RoadBuilding).take(2));
        deck.extend(std::iter::repeat(DevCard::YearOfPlenty).take(2));
        deck.extend(std::iter::repeat(DevCard::Monopoly).take(2));
        deck.extend(std::iter::repeat(DevCard::VictoryPoint).take(5));
        deck
    }

    /// The standard deck, shuffled with the given RNG
    pub fn shuffled_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<DevCard> {
        let mut deck = Self::standard_deck();
        deck.shuffle(rng);
        deck
    }

    /// Whether this card can be played (VP cards are never "played")
    pub fn is_playable(&self) -> bool {
        !matches!(self, DevCard::VictoryPoint)
    }
}

/// Errors from checked resource arithmetic
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ResourceError {
    #[error("insufficient {resource:?}: have {available}, need {requested}")]
    Insufficient {
        resource: Resource,
        available: u32,
        requested: u32,
    },
}

/// A hand of resources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resources {
    pub wood: u32,
    pub brick: u32,
    pub sheep: u32,
    pub wheat: u32,
    pub ore: u32,
}

impl Resources {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(wood: u32, brick: u32, sheep: u32, wheat: u32, ore: u32) -> Self {
        Self {
            wood,
            brick,
            sheep,
            wheat,
            ore,
        }
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.wood + self.brick + self.sheep + self.wheat + self.ore
    }

    /// Check if hand is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Brick => self.brick,
            Resource::Sheep => self.sheep,
            Resource::Wheat => self.wheat,
            Resource::Ore => self.ore,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Wood => &mut self.wood,
            Resource::Brick => &mut self.brick,
            Resource::Sheep => &mut self.sheep,
            Resource::Wheat => &mut self.wheat,
            Resource::Ore => &mut self.ore,
        }
    }

    /// Set count of a specific resource
    pub fn set(&mut self, resource: Resource, count: u32) {
        *self.slot(resource) = count;
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        *self.slot(resource) += amount;
    }

    /// Add another hand to this one
    pub fn add_all(&mut self, other: &Resources) {
        for (resource, amount) in other.iter() {
            self.add(resource, amount);
        }
    }

    /// Remove `amount` of one resource, failing without change if short
    pub fn remove(&mut self, resource: Resource, amount: u32) -> Result<(), ResourceError> {
        let available = self.get(resource);
        if available < amount {
            return Err(ResourceError::Insufficient {
                resource,
                available,
                requested: amount,
            });
        }
        self.set(resource, available - amount);
        Ok(())
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &Resources) -> bool {
        Resource::ALL.iter().all(|&r| self.get(r) >= cost.get(r))
    }

    /// Subtract a cost, failing without change if any resource is short
    pub fn subtract(&mut self, cost: &Resources) -> Result<(), ResourceError> {
        if let Some(resource) = Resource::ALL.iter().copied().find(|&r| self.get(r) < cost.get(r)) {
            return Err(ResourceError::Insufficient {
                resource,
                available: self.get(resource),
                requested: cost.get(resource),
            });
        }
        for resource in Resource::ALL {
            *self.slot(resource) -= cost.get(resource);
        }
        Ok(())
    }

    /// Remove every card of one resource, returning how many there were
    pub fn take_all(&mut self, resource: Resource) -> u32 {
        std::mem::take(self.slot(resource))
    }

    /// Iterate over (resource, count) pairs in `Resource::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL.into_iter().map(|r| (r, self.get(r)))
    }

    /// Which resource the `index`-th card is, counting cards in
    /// `Resource::ALL` order.
    pub fn card_at(&self, index: u32) -> Option<Resource> {
        let mut remaining = index;
        for (resource, count) in self.iter() {
            if remaining < count {
                return Some(resource);
            }
            remaining -= count;
        }
        None
    }

    /// Remove one card drawn uniformly from the card pool (robber steal).
    ///
    /// A hand with 3 wood and 1 ore loses wood three times as often as ore.
    pub fn steal_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Resource> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let resource = self.card_at(rng.gen_range(0..total))?;
        *self.slot(resource) -= 1;
        Some(resource)
    }

    /// Every distinct sub-hand of exactly `size` cards this hand contains.
    ///
    /// Each multiset is produced once, ordered by wood count first.
    pub fn sub_hands(&self, size: u32) -> Vec<Resources> {
        let mut out = Vec::new();
        if size <= self.total() {
            let mut current = [0u32; 5];
            self.collect_sub_hands(0, size, &mut current, &mut out);
        }
        out
    }

    fn collect_sub_hands(
        &self,
        slot: usize,
        remaining: u32,
        current: &mut [u32; 5],
        out: &mut Vec<Resources>,
    ) {
        if slot == Resource::ALL.len() {
            if remaining == 0 {
                let [wood, brick, sheep, wheat, ore] = *current;
                out.push(Resources::with_amounts(wood, brick, sheep, wheat, ore));
            }
            return;
        }
        // Cards still available in the slots after this one bound how few we may take here.
        let later: u32 = Resource::ALL[slot + 1..].iter().map(|&r| self.get(r)).sum();
        let max_here = self.get(Resource::ALL[slot]).min(remaining);
        let min_here = remaining.saturating_sub(later);
        for take in min_here..=max_here {
            current[slot] = take;
            self.collect_sub_hands(slot + 1, remaining - take, current, out);
        }
        current[slot] = 0;
    }
}

/// Counted hand of development cards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevCardHand {
    pub knight: u32,
    pub road_building: u32,
    pub year_of_plenty: u32,
    pub monopoly: u32,
    pub victory_point: u32,
}

impl DevCardHand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, card: DevCard) -> u32 {
        match card {
            DevCard::Knight => self.knight,
            DevCard::RoadBuilding => self.road_building,
            DevCard::YearOfPlenty => self.year_of_plenty,
            DevCard::Monopoly => self.monopoly,
            DevCard::VictoryPoint => self.victory_point,
        }
    }

    fn slot(&mut self, card: DevCard) -> &mut u32 {
        match card {
            DevCard::Knight => &mut self.knight,
            DevCard::RoadBuilding => &mut self.road_building,
            DevCard::YearOfPlenty => &mut self.year_of_plenty,
            DevCard::Monopoly => &mut self.monopoly,
            DevCard::VictoryPoint => &mut self.victory_point,
        }
    }

    pub fn add(&mut self, card: DevCard, amount: u32) {
        *self.slot(card) += amount;
    }

    /// Remove one card, returning false if none is held
    pub fn remove(&mut self, card: DevCard) -> bool {
        let slot = self.slot(card);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn add_all(&mut self, other: &DevCardHand) {
        for card in DevCard::ALL {
            self.add(card, other.get(card));
        }
    }

    pub fn total(&self) -> u32 {
        DevCard::ALL.iter().map(|&c| self.get(c)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Building costs
pub mod costs {
    use super::Resources;

    /// Cost to build a road: 1 wood, 1 brick
    pub fn road() -> Resources {
        Resources::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a settlement: 1 wood, 1 brick, 1 sheep, 1 wheat
    pub fn settlement() -> Resources {
        Resources::with_amounts(1, 1, 1, 1, 0)
    }

    /// Cost to upgrade to city: 2 wheat, 3 ore
    pub fn city() -> Resources {
        Resources::with_amounts(0, 0, 0, 2, 3)
    }

    /// Cost to buy a development card: 1 sheep, 1 wheat, 1 ore
    pub fn development_card() -> Resources {
        Resources::with_amounts(0, 0, 1, 1, 1)
    }
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Seat index (0-3)
    pub index: PlayerId,
    /// Display name
    pub name: String,
    /// Player color
    pub color: PlayerColor,
    /// Current resources
    pub resources: Resources,
    /// Development cards that may be played
    pub dev_cards: DevCardHand,
    /// Development cards bought this turn (playable from next turn)
    pub new_dev_cards: DevCardHand,
    pub settlements_remaining: u32,
    pub cities_remaining: u32,
    pub roads_remaining: u32,
    /// Points from buildings and victory-point cards (awards excluded)
    pub victory_points: u32,
    /// Ports reachable through this player's buildings
    pub ports: Vec<PortType>,
    /// Number of knights played (for Largest Army)
    pub knights_played: u32,
    /// Length of this player's longest contiguous road
    pub longest_road_length: u32,
}

impl Player {
    /// Create a new player
    pub fn new(index: PlayerId, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            color: PlayerColor::for_player(index),
            resources: Resources::new(),
            dev_cards: DevCardHand::new(),
            new_dev_cards: DevCardHand::new(),
            settlements_remaining: MAX_SETTLEMENTS,
            cities_remaining: MAX_CITIES,
            roads_remaining: MAX_ROADS,
            victory_points: 0,
            ports: Vec::new(),
            knights_played: 0,
            longest_road_length: 0,
        }
    }

    /// Can this player afford a road?
    pub fn can_afford_road(&self) -> bool {
        self.resources.can_afford(&costs::road()) && self.roads_remaining > 0
    }

    /// Can this player afford a settlement?
    pub fn can_afford_settlement(&self) -> bool {
        self.resources.can_afford(&costs::settlement()) && self.settlements_remaining > 0
    }

    /// Can this player afford a city upgrade?
    pub fn can_afford_city(&self) -> bool {
        self.resources.can_afford(&costs::city()) && self.cities_remaining > 0
    }

    /// Can this player afford a development card?
    pub fn can_afford_dev_card(&self) -> bool {
        self.resources.can_afford(&costs::development_card())
    }

    /// Take a road piece, paying for it unless it is free
    pub fn use_road(&mut self, free: bool) -> Result<(), GameError> {
        if self.roads_remaining == 0 {
            return Err(GameError::NoPiecesRemaining);
        }
        if !free {
            self.resources.subtract(&costs::road())?;
        }
        self.roads_remaining -= 1;
        Ok(())
    }

    /// Take a settlement piece, paying for it unless it is free (setup)
    pub fn use_settlement(&mut self, free: bool) -> Result<(), GameError> {
        if self.settlements_remaining == 0 {
            return Err(GameError::NoPiecesRemaining);
        }
        if !free {
            self.resources.subtract(&costs::settlement())?;
        }
        self.settlements_remaining -= 1;
        self.victory_points += 1;
        Ok(())
    }

    /// Upgrade a settlement: the settlement piece returns to the supply
    pub fn use_city(&mut self) -> Result<(), GameError> {
        if self.cities_remaining == 0 {
            return Err(GameError::NoPiecesRemaining);
        }
        self.resources.subtract(&costs::city())?;
        self.cities_remaining -= 1;
        self.settlements_remaining += 1;
        self.victory_points += 1;
        Ok(())
    }

    /// Buy a development card into the not-yet-playable hand
    pub fn buy_dev_card(&mut self, card: DevCard) -> Result<(), GameError> {
        self.resources.subtract(&costs::development_card())?;
        self.new_dev_cards.add(card, 1);
        if card == DevCard::VictoryPoint {
            self.victory_points += 1;
        }
        Ok(())
    }

    /// Called at end of turn - move bought cards to the playable hand
    pub fn end_turn(&mut self) {
        let bought = std::mem::take(&mut self.new_dev_cards);
        self.dev_cards.add_all(&bought);
    }

    /// Check if player has a playable development card of given type
    pub fn has_playable_dev_card(&self, card: DevCard) -> bool {
        card.is_playable() && self.dev_cards.get(card) > 0
    }

    /// Play a development card from the playable hand
    pub fn play_dev_card(&mut self, card: DevCard) -> bool {
        if !card.is_playable() || !self.dev_cards.remove(card) {
            return false;
        }
        if card == DevCard::Knight {
            self.knights_played += 1;
        }
        true
    }

    /// Record access to a port (kept unique)
    pub fn add_port(&mut self, port: PortType) {
        if !self.ports.contains(&port) {
            self.ports.push(port);
        }
    }
}
