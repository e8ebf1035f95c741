//! Action validation and application.
//!
//! `apply_action` never touches its input: it applies the action to a clone
//! and hands the clone back only if every step succeeded. Board collections
//! are persistent vectors, so the clone shares almost all of its structure.

use crate::actions::Action;
use crate::board::{Building, EdgeId, PlayerId, Resource, TileId, VertexId};
use crate::game::{GameError, GamePhase, GameState, PendingAction, DISCARD_THRESHOLD};
use crate::player::{costs, DevCard, Resources};
use crate::rules::{discard_size, robbery_victims};
use crate::trade::{port_ratio, BANK_RATIO};
use rand::Rng;
use tracing::{debug, trace};

/// Validate `action` against `state` and return the resulting state.
pub fn apply_action<R: Rng + ?Sized>(
    state: &GameState,
    action: &Action,
    rng: &mut R,
) -> Result<GameState, GameError> {
    let mut next = state.clone();
    match next.apply(action, rng) {
        Ok(()) => {
            debug!(?action, turn = next.turn_number, "action applied");
            Ok(next)
        }
        Err(err) => {
            trace!(?action, %err, "action rejected");
            Err(err)
        }
    }
}

impl GameState {
    fn apply<R: Rng + ?Sized>(&mut self, action: &Action, rng: &mut R) -> Result<(), GameError> {
        if self.phase == GamePhase::Ended {
            return Err(GameError::GameOver);
        }
        let player = action.player();
        if self.player(player).is_none() {
            return Err(GameError::UnknownPlayer(player));
        }
        let off_turn_allowed =
            action.is_peer_trade() || matches!(action, Action::DiscardResources { .. });
        if !off_turn_allowed && player != self.turn_state.active_player {
            return Err(GameError::NotYourTurn);
        }

        match action {
            Action::PlaceSettlement { vertex, .. } => self.place_settlement(player, *vertex),
            Action::PlaceRoad { edge, .. } => self.place_road(player, *edge),
            Action::PlaceCity { vertex, .. } => self.place_city(player, *vertex),
            Action::RollDice { .. } => self.roll_dice(rng),
            Action::EndTurn { .. } => self.end_turn(player),
            Action::BuildDevCard { .. } => self.build_dev_card(player),
            Action::PlayKnight { .. } => self.play_knight(player),
            Action::PlayRoadBuilding { .. } => self.play_road_building(player),
            Action::PlayYearOfPlenty { first, second, .. } => {
                self.play_year_of_plenty(player, *first, *second)
            }
            Action::PlayMonopoly { resource, .. } => self.play_monopoly(player, *resource),
            Action::TradeWithBank { give, receive, .. } => {
                self.require_main(PendingAction::BuildOrTrade)?;
                self.maritime_trade(player, *give, *receive, BANK_RATIO)
            }
            Action::TradeWithPort { give, receive, .. } => self.port_trade(player, *give, *receive),
            Action::MoveRobber { tile, .. } => self.move_robber(player, *tile),
            Action::StealResource { victim, .. } => self.steal_resource(player, *victim, rng),
            Action::DiscardResources { resources, .. } => self.discard(player, resources),
            Action::OfferTrade {
                to,
                offering,
                requesting,
                ..
            } => self
                .create_offer(player, to, *offering, *requesting)
                .map(|_| ()),
            Action::AcceptTrade { trade_id, .. } => {
                self.require_main(PendingAction::BuildOrTrade)?;
                self.accept_offer(player, *trade_id)
            }
            Action::RejectTrade { trade_id, .. } => {
                self.require_main(PendingAction::BuildOrTrade)?;
                self.reject_offer(player, *trade_id)
            }
            Action::CancelTrade { trade_id, .. } => self.cancel_offer(player, *trade_id),
        }?;

        self.check_victory(player);
        Ok(())
    }

    fn require_phase(&self, phase: GamePhase) -> Result<(), GameError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(GameError::InvalidPhase)
        }
    }

    fn require_main(&self, pending: PendingAction) -> Result<(), GameError> {
        self.require_phase(GamePhase::Main)?;
        if self.turn_state.pending_action == pending {
            Ok(())
        } else {
            Err(GameError::InvalidPhase)
        }
    }

    // ==================== Building ====================

    fn place_settlement(&mut self, player: PlayerId, vertex: VertexId) -> Result<(), GameError> {
        match self.phase {
            GamePhase::SetupForward | GamePhase::SetupBackward => {
                if self.turn_state.pending_action != PendingAction::PlaceSettlement {
                    return Err(GameError::InvalidPhase);
                }
                if !self.board.is_vertex_free(vertex) {
                    return Err(GameError::InvalidLocation);
                }
                self.player_mut(player)?.use_settlement(true)?;
                self.board.place_settlement(vertex, player);
                self.sync_ports(player)?;

                if self.phase == GamePhase::SetupBackward {
                    self.grant_starting_resources(player, vertex)?;
                }
                self.turn_state.last_settlement = Some(vertex);
                self.turn_state.pending_action = PendingAction::PlaceRoad;
                Ok(())
            }
            GamePhase::Main => {
                self.require_main(PendingAction::BuildOrTrade)?;
                if !self.board.is_vertex_free(vertex)
                    || !self.board.settlement_spots(player).contains(&vertex)
                {
                    return Err(GameError::InvalidLocation);
                }
                let me = self.player_mut(player)?;
                if me.settlements_remaining == 0 {
                    return Err(GameError::NoPiecesRemaining);
                }
                if !me.resources.can_afford(&costs::settlement()) {
                    return Err(GameError::CannotAfford);
                }
                me.use_settlement(false)?;
                self.board.place_settlement(vertex, player);
                self.sync_ports(player)?;

                // A new settlement can split an opponent's road
                self.refresh_road_lengths();
                self.update_longest_road_owner(player);
                Ok(())
            }
            GamePhase::Ended => Err(GameError::GameOver),
        }
    }

    /// One card per producing tile around the second setup settlement
    fn grant_starting_resources(&mut self, player: PlayerId, vertex: VertexId) -> Result<(), GameError> {
        let produced: Vec<Resource> = self
            .board
            .vertex(vertex)
            .map(|v| {
                v.adjacent_tiles
                    .iter()
                    .filter_map(|&t| self.board.tile(t).and_then(|tile| tile.resource()))
                    .collect()
            })
            .unwrap_or_default();

        let hand = &mut self.player_mut(player)?.resources;
        for resource in produced {
            hand.add(resource, 1);
        }
        Ok(())
    }

    fn place_road(&mut self, player: PlayerId, edge: EdgeId) -> Result<(), GameError> {
        match self.phase {
            GamePhase::SetupForward | GamePhase::SetupBackward => {
                if self.turn_state.pending_action != PendingAction::PlaceRoad {
                    return Err(GameError::InvalidPhase);
                }
                let touches_settlement = self
                    .turn_state
                    .last_settlement
                    .is_some_and(|v| self.board.vertex_touches_edge(v, edge));
                if !touches_settlement || self.board.road_at(edge).is_some() {
                    return Err(GameError::InvalidLocation);
                }
                self.player_mut(player)?.use_road(true)?;
                self.board.place_road(edge, player);
                self.player_mut(player)?.longest_road_length = self.board.longest_road(player);
                self.advance_setup();
                Ok(())
            }
            GamePhase::Main => {
                self.require_main(PendingAction::BuildOrTrade)?;
                if self.board.road_at(edge).is_some() || !self.board.is_road_connected(edge, player)
                {
                    return Err(GameError::InvalidLocation);
                }
                let free = self.turn_state.free_roads > 0;
                let me = self.player_mut(player)?;
                if me.roads_remaining == 0 {
                    return Err(GameError::NoPiecesRemaining);
                }
                if !free && !me.resources.can_afford(&costs::road()) {
                    return Err(GameError::CannotAfford);
                }
                me.use_road(free)?;
                if free {
                    self.turn_state.free_roads -= 1;
                }
                self.board.place_road(edge, player);
                self.player_mut(player)?.longest_road_length = self.board.longest_road(player);
                self.update_longest_road_owner(player);
                Ok(())
            }
            GamePhase::Ended => Err(GameError::GameOver),
        }
    }

    fn place_city(&mut self, player: PlayerId, vertex: VertexId) -> Result<(), GameError> {
        self.require_main(PendingAction::BuildOrTrade)?;
        if self.board.building_at(vertex) != Some(Building::settlement(player)) {
            return Err(GameError::InvalidLocation);
        }
        let me = self.player_mut(player)?;
        if me.cities_remaining == 0 {
            return Err(GameError::NoPiecesRemaining);
        }
        if !me.resources.can_afford(&costs::city()) {
            return Err(GameError::CannotAfford);
        }
        me.use_city()?;
        self.board.upgrade_to_city(vertex);
        Ok(())
    }

    // ==================== Dice ====================

    fn roll_dice<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GameError> {
        self.require_main(PendingAction::RollDice)?;

        let roll = rng.gen_range(1..=6u8) + rng.gen_range(1..=6u8);
        self.turn_state.dice_roll = Some(roll);
        self.turn_state.has_rolled = true;
        self.dice_history.push_back(roll);

        if roll == 7 {
            let must_discard: Vec<PlayerId> = self
                .players
                .iter()
                .filter(|p| p.resources.total() > DISCARD_THRESHOLD)
                .map(|p| p.index)
                .collect();
            self.turn_state.pending_action = if must_discard.is_empty() {
                PendingAction::MoveRobber
            } else {
                PendingAction::DiscardResources
            };
            debug!(discarding = ?must_discard, "seven rolled");
            self.turn_state.discard_required = must_discard;
            return Ok(());
        }

        for (owner, resource, amount) in self.board.production_for_roll(roll) {
            self.player_mut(owner)?.resources.add(resource, amount);
        }
        self.turn_state.pending_action = PendingAction::BuildOrTrade;
        Ok(())
    }

    // ==================== Development Cards ====================

    fn build_dev_card(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.require_main(PendingAction::BuildOrTrade)?;
        if self.dev_deck.is_empty() {
            return Err(GameError::EmptyDeck);
        }
        if !self.player_mut(player)?.can_afford_dev_card() {
            return Err(GameError::CannotAfford);
        }
        let card = self.dev_deck.pop().ok_or(GameError::EmptyDeck)?;
        self.player_mut(player)?.buy_dev_card(card)
    }

    /// Take a card out of the playable hand, enforcing one card per turn
    fn consume_card(&mut self, player: PlayerId, card: DevCard) -> Result<(), GameError> {
        if self.turn_state.dev_card_played {
            return Err(GameError::CardAlreadyPlayed);
        }
        if !self.player_mut(player)?.play_dev_card(card) {
            return Err(GameError::NoSuchCard);
        }
        self.turn_state.dev_card_played = true;
        Ok(())
    }

    fn play_knight(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.require_phase(GamePhase::Main)?;
        if !matches!(
            self.turn_state.pending_action,
            PendingAction::RollDice | PendingAction::BuildOrTrade
        ) {
            return Err(GameError::InvalidPhase);
        }
        self.consume_card(player, DevCard::Knight)?;
        self.update_largest_army_owner(player);
        self.turn_state.pending_action = PendingAction::MoveRobber;
        Ok(())
    }

    fn play_road_building(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.require_main(PendingAction::BuildOrTrade)?;
        let roads = self.player_mut(player)?.roads_remaining;
        if roads == 0 {
            return Err(GameError::NoPiecesRemaining);
        }
        self.consume_card(player, DevCard::RoadBuilding)?;
        self.turn_state.free_roads = roads.min(2);
        Ok(())
    }

    fn play_year_of_plenty(
        &mut self,
        player: PlayerId,
        first: Resource,
        second: Resource,
    ) -> Result<(), GameError> {
        self.require_main(PendingAction::BuildOrTrade)?;
        self.consume_card(player, DevCard::YearOfPlenty)?;
        let hand = &mut self.player_mut(player)?.resources;
        hand.add(first, 1);
        hand.add(second, 1);
        Ok(())
    }

    fn play_monopoly(&mut self, player: PlayerId, resource: Resource) -> Result<(), GameError> {
        self.require_main(PendingAction::BuildOrTrade)?;
        self.consume_card(player, DevCard::Monopoly)?;
        let taken: u32 = self
            .players
            .iter_mut()
            .filter(|p| p.index != player)
            .map(|p| p.resources.take_all(resource))
            .sum();
        self.player_mut(player)?.resources.add(resource, taken);
        debug!(player, ?resource, taken, "monopoly");
        Ok(())
    }

    // ==================== Trading ====================

    fn port_trade(&mut self, player: PlayerId, give: Resource, receive: Resource) -> Result<(), GameError> {
        self.require_main(PendingAction::BuildOrTrade)?;
        let ratio = self
            .player(player)
            .map_or(BANK_RATIO, |p| port_ratio(p, give));
        if ratio >= BANK_RATIO {
            return Err(GameError::InvalidTrade);
        }
        self.maritime_trade(player, give, receive, ratio)
    }

    // ==================== Robber ====================

    fn move_robber(&mut self, player: PlayerId, tile: TileId) -> Result<(), GameError> {
        self.require_main(PendingAction::MoveRobber)?;
        if tile >= self.board.tile_count() || tile == self.board.robber_tile() {
            return Err(GameError::InvalidLocation);
        }
        self.board.move_robber(tile);

        self.turn_state.pending_action = if robbery_victims(self, player).is_empty() {
            self.turn_state.resume_action()
        } else {
            PendingAction::StealResource
        };
        Ok(())
    }

    fn steal_resource<R: Rng + ?Sized>(
        &mut self,
        player: PlayerId,
        victim: PlayerId,
        rng: &mut R,
    ) -> Result<(), GameError> {
        self.require_main(PendingAction::StealResource)?;
        if !robbery_victims(self, player).contains(&victim) {
            return Err(GameError::InvalidVictim);
        }
        if let Some(resource) = self.player_mut(victim)?.resources.steal_random(rng) {
            self.player_mut(player)?.resources.add(resource, 1);
        }
        self.turn_state.pending_action = self.turn_state.resume_action();
        Ok(())
    }

    fn discard(&mut self, player: PlayerId, resources: &Resources) -> Result<(), GameError> {
        self.require_main(PendingAction::DiscardResources)?;
        if !self.turn_state.discard_required.contains(&player) {
            return Err(GameError::InvalidDiscard);
        }
        let hand = &mut self.player_mut(player)?.resources;
        if resources.total() != discard_size(hand.total()) || !hand.can_afford(resources) {
            return Err(GameError::InvalidDiscard);
        }
        hand.subtract(resources)?;

        self.turn_state.discard_required.retain(|&p| p != player);
        if self.turn_state.discard_required.is_empty() {
            self.turn_state.pending_action = PendingAction::MoveRobber;
        }
        Ok(())
    }

    // ==================== Turn ====================

    fn end_turn(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.require_main(PendingAction::BuildOrTrade)?;
        self.cancel_open_offers(player);
        self.player_mut(player)?.end_turn();
        self.advance_turn();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, TurnState};
    use crate::rng::GameRng;

    fn game(players: usize) -> GameState {
        GameState::from_config(&GameConfig::with_players(players).with_seed(42))
            .unwrap()
            .0
    }

    fn build_phase(players: usize) -> GameState {
        let mut state = game(players);
        state.phase = GamePhase::Main;
        state.turn_number = 1;
        state.turn_state = TurnState::main(0);
        state.turn_state.has_rolled = true;
        state.turn_state.pending_action = PendingAction::BuildOrTrade;
        state
    }

    fn center_ring(state: &GameState) -> Vec<EdgeId> {
        state
            .board
            .edges()
            .filter(|e| e.adjacent_tiles.contains(&0))
            .map(|e| e.id)
            .collect()
    }

    #[test]
    fn test_input_is_not_mutated() {
        let state = game(2);
        let before = state.clone();
        let next = apply_action(
            &state,
            &Action::PlaceSettlement {
                player: 0,
                vertex: 5,
            },
            &mut GameRng::new(1),
        )
        .unwrap();
        assert_eq!(state, before);
        assert_ne!(next, before);
    }

    #[test]
    fn test_wrong_player_rejected() {
        let state = game(2);
        let result = apply_action(
            &state,
            &Action::PlaceSettlement {
                player: 1,
                vertex: 5,
            },
            &mut GameRng::new(1),
        );
        assert_eq!(result, Err(GameError::NotYourTurn));

        let result = apply_action(&state, &Action::EndTurn { player: 7 }, &mut GameRng::new(1));
        assert_eq!(result, Err(GameError::UnknownPlayer(7)));
    }

    #[test]
    fn test_setup_settlement_then_road() {
        let mut rng = GameRng::new(1);
        let state = game(2);
        let state = apply_action(
            &state,
            &Action::PlaceSettlement {
                player: 0,
                vertex: 5,
            },
            &mut rng,
        )
        .unwrap();
        assert_eq!(state.pending_action(), PendingAction::PlaceRoad);
        assert_eq!(state.turn_state.last_settlement, Some(5));

        // A road away from the settlement is refused
        let far = state
            .board
            .edges()
            .find(|e| !e.vertices.contains(&5))
            .unwrap()
            .id;
        assert_eq!(
            apply_action(&state, &Action::PlaceRoad { player: 0, edge: far }, &mut rng),
            Err(GameError::InvalidLocation)
        );

        let edge = state.board.vertex(5).unwrap().adjacent_edges[0];
        let state = apply_action(&state, &Action::PlaceRoad { player: 0, edge }, &mut rng).unwrap();
        assert_eq!(state.active_player(), 1);
        assert_eq!(state.pending_action(), PendingAction::PlaceSettlement);
        assert_eq!(state.players[0].roads_remaining, 14);
    }

    #[test]
    fn test_second_setup_settlement_grants_resources() {
        let mut state = game(2);
        state.phase = GamePhase::SetupBackward;
        state.turn_state = TurnState::setup(0);
        let vertex = state
            .board
            .vertices()
            .find(|v| v.adjacent_tiles.len() == 3)
            .unwrap()
            .clone();

        let next = apply_action(
            &state,
            &Action::PlaceSettlement {
                player: 0,
                vertex: vertex.id,
            },
            &mut GameRng::new(1),
        )
        .unwrap();
        let producing = vertex
            .adjacent_tiles
            .iter()
            .filter(|&&t| state.board.tile(t).unwrap().resource().is_some())
            .count() as u32;
        assert_eq!(next.players[0].resources.total(), producing);
    }

    #[test]
    fn test_roll_produces_or_robs() {
        let mut state = game(2);
        state.phase = GamePhase::Main;
        state.turn_state = TurnState::main(0);

        for seed in 0..20 {
            let next =
                apply_action(&state, &Action::RollDice { player: 0 }, &mut GameRng::new(seed))
                    .unwrap();
            let roll = next.turn_state.dice_roll.unwrap();
            assert!((2..=12).contains(&roll));
            assert!(next.turn_state.has_rolled);
            assert_eq!(next.dice_history.back(), Some(&roll));
            let expected = if roll == 7 {
                PendingAction::MoveRobber
            } else {
                PendingAction::BuildOrTrade
            };
            assert_eq!(next.pending_action(), expected);
        }
    }

    #[test]
    fn test_build_road_costs_or_uses_free_road() {
        let mut state = build_phase(2);
        let ring = center_ring(&state);
        let home = state.board.edge(ring[0]).unwrap().vertices[0];
        state.board.place_settlement(home, 0);
        let mut rng = GameRng::new(1);

        let road = Action::PlaceRoad {
            player: 0,
            edge: ring[0],
        };
        assert_eq!(apply_action(&state, &road, &mut rng), Err(GameError::CannotAfford));

        state.turn_state.free_roads = 1;
        let next = apply_action(&state, &road, &mut rng).unwrap();
        assert_eq!(next.turn_state.free_roads, 0);
        assert_eq!(next.board.road_at(ring[0]), Some(0));
        assert_eq!(next.players[0].longest_road_length, 1);

        state.turn_state.free_roads = 0;
        state.players[0].resources = costs::road();
        let next = apply_action(&state, &road, &mut rng).unwrap();
        assert!(next.players[0].resources.is_empty());
    }

    #[test]
    fn test_city_upgrade() {
        let mut state = build_phase(2);
        state.board.place_settlement(3, 0);
        state.players[0].victory_points = 1;
        state.players[0].settlements_remaining = 4;
        state.players[0].resources = costs::city();

        let next = apply_action(
            &state,
            &Action::PlaceCity {
                player: 0,
                vertex: 3,
            },
            &mut GameRng::new(1),
        )
        .unwrap();
        assert_eq!(next.players[0].victory_points, 2);
        assert_eq!(next.players[0].cities_remaining, 3);
        assert_eq!(next.players[0].settlements_remaining, 5);
        assert!(next.players[0].resources.is_empty());

        assert_eq!(
            apply_action(
                &next,
                &Action::PlaceCity {
                    player: 0,
                    vertex: 3
                },
                &mut GameRng::new(1)
            ),
            Err(GameError::InvalidLocation)
        );
    }

    #[test]
    fn test_buy_dev_card_is_not_playable_this_turn() {
        let mut state = build_phase(2);
        state.players[0].resources = costs::development_card();
        let deck = state.dev_deck.len();

        let next = apply_action(&state, &Action::BuildDevCard { player: 0 }, &mut GameRng::new(1))
            .unwrap();
        assert_eq!(next.dev_deck.len(), deck - 1);
        assert_eq!(next.players[0].new_dev_cards.total(), 1);
        assert_eq!(next.players[0].dev_cards.total(), 0);
    }

    #[test]
    fn test_one_dev_card_per_turn() {
        let mut state = build_phase(2);
        state.players[0].dev_cards.add(DevCard::YearOfPlenty, 2);
        let mut rng = GameRng::new(1);
        let play = Action::PlayYearOfPlenty {
            player: 0,
            first: Resource::Ore,
            second: Resource::Ore,
        };

        let next = apply_action(&state, &play, &mut rng).unwrap();
        assert_eq!(next.players[0].resources.get(Resource::Ore), 2);
        assert_eq!(apply_action(&next, &play, &mut rng), Err(GameError::CardAlreadyPlayed));
    }

    #[test]
    fn test_knight_before_roll_returns_to_roll() {
        let mut state = game(2);
        state.phase = GamePhase::Main;
        state.turn_state = TurnState::main(0);
        state.players[0].dev_cards.add(DevCard::Knight, 1);
        let mut rng = GameRng::new(1);

        let state = apply_action(&state, &Action::PlayKnight { player: 0 }, &mut rng).unwrap();
        assert_eq!(state.pending_action(), PendingAction::MoveRobber);
        assert_eq!(state.players[0].knights_played, 1);

        let target = (state.board.robber_tile() + 1) % state.board.tile_count();
        let state = apply_action(
            &state,
            &Action::MoveRobber {
                player: 0,
                tile: target,
            },
            &mut rng,
        )
        .unwrap();
        assert_eq!(state.pending_action(), PendingAction::RollDice);
    }

    #[test]
    fn test_robber_steal() {
        let mut state = build_phase(2);
        state.turn_state.pending_action = PendingAction::MoveRobber;
        let target = (state.board.robber_tile() + 1) % state.board.tile_count();
        let corner = state.board.tile_vertices(target)[0];
        state.board.place_settlement(corner, 1);
        state.players[1].resources.add(Resource::Brick, 2);
        let mut rng = GameRng::new(1);

        let same = Action::MoveRobber {
            player: 0,
            tile: state.board.robber_tile(),
        };
        assert_eq!(apply_action(&state, &same, &mut rng), Err(GameError::InvalidLocation));

        let state = apply_action(
            &state,
            &Action::MoveRobber {
                player: 0,
                tile: target,
            },
            &mut rng,
        )
        .unwrap();
        assert_eq!(state.pending_action(), PendingAction::StealResource);

        assert_eq!(
            apply_action(
                &state,
                &Action::StealResource {
                    player: 0,
                    victim: 0
                },
                &mut rng
            ),
            Err(GameError::InvalidVictim)
        );

        let state = apply_action(
            &state,
            &Action::StealResource {
                player: 0,
                victim: 1,
            },
            &mut rng,
        )
        .unwrap();
        assert_eq!(state.players[0].resources.get(Resource::Brick), 1);
        assert_eq!(state.players[1].resources.get(Resource::Brick), 1);
        assert_eq!(state.pending_action(), PendingAction::BuildOrTrade);
    }

    #[test]
    fn test_monopoly_takes_from_everyone() {
        let mut state = build_phase(3);
        state.players[0].dev_cards.add(DevCard::Monopoly, 1);
        state.players[1].resources.add(Resource::Sheep, 2);
        state.players[2].resources.add(Resource::Sheep, 3);

        let next = apply_action(
            &state,
            &Action::PlayMonopoly {
                player: 0,
                resource: Resource::Sheep,
            },
            &mut GameRng::new(1),
        )
        .unwrap();
        assert_eq!(next.players[0].resources.get(Resource::Sheep), 5);
        assert_eq!(next.players[1].resources.get(Resource::Sheep), 0);
        assert_eq!(next.players[2].resources.get(Resource::Sheep), 0);
    }

    #[test]
    fn test_road_building_caps_at_remaining_roads() {
        let mut state = build_phase(2);
        state.players[0].dev_cards.add(DevCard::RoadBuilding, 1);
        state.players[0].roads_remaining = 1;

        let next = apply_action(&state, &Action::PlayRoadBuilding { player: 0 }, &mut GameRng::new(1))
            .unwrap();
        assert_eq!(next.turn_state.free_roads, 1);
    }

    #[test]
    fn test_road_building_without_roads_keeps_the_card() {
        let mut state = build_phase(2);
        state.players[0].dev_cards.add(DevCard::RoadBuilding, 1);
        state.players[0].roads_remaining = 0;
        let play = Action::PlayRoadBuilding { player: 0 };
        assert!(!crate::rules::get_legal_actions(&state, 0).contains(&play));

        assert_eq!(
            apply_action(&state, &play, &mut GameRng::new(1)),
            Err(GameError::NoPiecesRemaining)
        );
        assert_eq!(state.players[0].dev_cards.get(DevCard::RoadBuilding), 1);
        assert!(!state.turn_state.dev_card_played);
    }

    #[test]
    fn test_offer_cannot_be_answered_during_robbery() {
        let mut state = build_phase(2);
        state.players[0].resources.add(Resource::Wood, 1);
        state.players[0].dev_cards.add(DevCard::Knight, 1);
        state.players[1].resources.add(Resource::Ore, 1);
        let mut rng = GameRng::new(1);

        let state = apply_action(
            &state,
            &Action::OfferTrade {
                player: 0,
                to: vec![1],
                offering: Resources::single(Resource::Wood, 1),
                requesting: Resources::single(Resource::Ore, 1),
            },
            &mut rng,
        )
        .unwrap();
        let id = state.turn_state.active_trade_id.unwrap();
        let robbing = apply_action(&state, &Action::PlayKnight { player: 0 }, &mut rng).unwrap();
        assert_eq!(robbing.pending_action(), PendingAction::MoveRobber);

        let accept = Action::AcceptTrade {
            player: 1,
            trade_id: id,
        };
        let reject = Action::RejectTrade {
            player: 1,
            trade_id: id,
        };
        assert_eq!(apply_action(&robbing, &accept, &mut rng), Err(GameError::InvalidPhase));
        assert_eq!(apply_action(&robbing, &reject, &mut rng), Err(GameError::InvalidPhase));

        // Back in the build step the offer can still be taken
        let target = (robbing.board.robber_tile() + 1) % robbing.board.tile_count();
        let resumed = apply_action(
            &robbing,
            &Action::MoveRobber {
                player: 0,
                tile: target,
            },
            &mut rng,
        )
        .unwrap();
        assert_eq!(resumed.pending_action(), PendingAction::BuildOrTrade);
        let traded = apply_action(&resumed, &accept, &mut rng).unwrap();
        assert_eq!(traded.players[0].resources, Resources::single(Resource::Ore, 1));
        assert_eq!(traded.players[1].resources, Resources::single(Resource::Wood, 1));
    }

    #[test]
    fn test_settlement_on_port_grants_access() {
        let state = game(2);
        let port = state.board.ports()[0].clone();
        assert!(state.players[0].ports.is_empty());

        let next = apply_action(
            &state,
            &Action::PlaceSettlement {
                player: 0,
                vertex: port.vertices[0],
            },
            &mut GameRng::new(1),
        )
        .unwrap();
        assert_eq!(next.players[0].ports, vec![port.port_type]);
        assert!(next.players[1].ports.is_empty());
    }

    #[test]
    fn test_third_knight_claims_largest_army() {
        let mut state = build_phase(2);
        state.players[0].knights_played = 2;
        state.players[0].victory_points = 3;
        state.players[0].dev_cards.add(DevCard::Knight, 1);
        assert_eq!(state.effective_score(0), 3);

        let next = apply_action(&state, &Action::PlayKnight { player: 0 }, &mut GameRng::new(1))
            .unwrap();
        assert_eq!(next.players[0].knights_played, 3);
        assert_eq!(next.largest_army_owner, Some(0));
        assert_eq!(next.effective_score(0), 5);
    }

    #[test]
    fn test_port_trade_requires_port() {
        let mut state = build_phase(2);
        state.players[0].resources.add(Resource::Ore, 3);
        let trade = Action::TradeWithPort {
            player: 0,
            give: Resource::Ore,
            receive: Resource::Wood,
        };
        assert_eq!(
            apply_action(&state, &trade, &mut GameRng::new(1)),
            Err(GameError::InvalidTrade)
        );

        state.players[0].add_port(crate::board::PortType::Generic);
        let next = apply_action(&state, &trade, &mut GameRng::new(1)).unwrap();
        assert_eq!(next.players[0].resources, Resources::single(Resource::Wood, 1));
    }

    #[test]
    fn test_end_turn_promotes_cards_and_cancels_offer() {
        let mut state = build_phase(2);
        state.players[0].new_dev_cards.add(DevCard::Knight, 1);
        state.players[0].resources.add(Resource::Wood, 1);
        let mut rng = GameRng::new(1);
        let state = apply_action(
            &state,
            &Action::OfferTrade {
                player: 0,
                to: vec![],
                offering: Resources::single(Resource::Wood, 1),
                requesting: Resources::single(Resource::Ore, 1),
            },
            &mut rng,
        )
        .unwrap();
        let id = state.turn_state.active_trade_id.unwrap();

        let next = apply_action(&state, &Action::EndTurn { player: 0 }, &mut rng).unwrap();
        assert_eq!(next.active_player(), 1);
        assert_eq!(next.players[0].dev_cards.get(DevCard::Knight), 1);
        assert_eq!(next.players[0].new_dev_cards.total(), 0);
        assert!(!next.trade(id).unwrap().is_open());
        assert_eq!(
            apply_action(&next, &Action::AcceptTrade { player: 1, trade_id: id }, &mut rng),
            Err(GameError::InvalidTrade)
        );
    }

    #[test]
    fn test_settlement_cuts_longest_road() {
        let mut state = build_phase(2);
        let ring = center_ring(&state);
        for &e in &ring[..5] {
            state.board.place_road(e, 1);
        }
        state.players[1].longest_road_length = 5;
        state.longest_road_owner = Some(1);

        // Player 0 builds on the vertex between ring[1] and ring[2]
        let cut = state.board.edge(ring[1]).unwrap().vertices[1];
        let spur = state
            .board
            .vertex(cut)
            .unwrap()
            .adjacent_edges
            .iter()
            .copied()
            .find(|e| !ring.contains(e))
            .unwrap();
        state.board.place_road(spur, 0);
        state.players[0].resources = costs::settlement();

        let next = apply_action(
            &state,
            &Action::PlaceSettlement {
                player: 0,
                vertex: cut,
            },
            &mut GameRng::new(1),
        )
        .unwrap();
        assert_eq!(next.players[1].longest_road_length, 3);
        assert_eq!(next.longest_road_owner, None);
    }

    #[test]
    fn test_game_over_rejects_everything() {
        let mut state = build_phase(2);
        state.phase = GamePhase::Ended;
        state.winner = Some(0);
        assert_eq!(
            apply_action(&state, &Action::EndTurn { player: 0 }, &mut GameRng::new(1)),
            Err(GameError::GameOver)
        );
    }
}
