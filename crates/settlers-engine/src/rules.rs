//! Legal-action enumeration.
//!
//! `get_legal_actions` lists every action a player may submit right now.
//! Peer trading is the exception: free-form offers cannot be enumerated, and
//! invitees answer an offer out of turn, so `OfferTrade`, `AcceptTrade` and
//! `RejectTrade` are never listed.

use crate::actions::Action;
use crate::board::{PlayerId, Resource};
use crate::game::{GamePhase, GameState, PendingAction};
use crate::player::{DevCard, Player};
use crate::trade::{port_ratio, BANK_RATIO};

/// Every action `player` may take in `state`; empty when there is nothing to do.
pub fn get_legal_actions(state: &GameState, player: PlayerId) -> Vec<Action> {
    let Some(me) = state.player(player) else {
        return Vec::new();
    };
    let turn = &state.turn_state;

    match state.phase {
        GamePhase::Ended => Vec::new(),
        _ if turn.pending_action == PendingAction::DiscardResources => discard_actions(state, me),
        _ if player != turn.active_player => Vec::new(),
        GamePhase::SetupForward | GamePhase::SetupBackward => setup_actions(state, player),
        GamePhase::Main => main_actions(state, me),
    }
}

/// Number of cards a player holding `total` must discard after a 7
pub fn discard_size(total: u32) -> u32 {
    total - total / 2
}

/// Opponents the robber's owner may steal from: a building on the robber's
/// tile and at least one card in hand
pub fn robbery_victims(state: &GameState, thief: PlayerId) -> Vec<PlayerId> {
    state
        .board
        .players_on_tile(state.board.robber_tile())
        .into_iter()
        .filter(|&p| p != thief)
        .filter(|&p| state.player(p).is_some_and(|v| !v.resources.is_empty()))
        .collect()
}

/// Whether `player` may play `card` this turn
pub fn can_play_card(state: &GameState, player: &Player, card: DevCard) -> bool {
    !state.turn_state.dev_card_played && player.has_playable_dev_card(card)
}

fn discard_actions(state: &GameState, me: &Player) -> Vec<Action> {
    if !state.turn_state.discard_required.contains(&me.index) {
        return Vec::new();
    }
    me.resources
        .sub_hands(discard_size(me.resources.total()))
        .into_iter()
        .map(|resources| Action::DiscardResources {
            player: me.index,
            resources,
        })
        .collect()
}

fn setup_actions(state: &GameState, player: PlayerId) -> Vec<Action> {
    match state.turn_state.pending_action {
        PendingAction::PlaceSettlement => state
            .board
            .setup_settlement_spots()
            .into_iter()
            .map(|vertex| Action::PlaceSettlement { player, vertex })
            .collect(),
        PendingAction::PlaceRoad => state
            .turn_state
            .last_settlement
            .map(|vertex| state.board.open_edges_at(vertex))
            .unwrap_or_default()
            .into_iter()
            .map(|edge| Action::PlaceRoad { player, edge })
            .collect(),
        _ => Vec::new(),
    }
}

fn main_actions(state: &GameState, me: &Player) -> Vec<Action> {
    let player = me.index;
    match state.turn_state.pending_action {
        PendingAction::RollDice => {
            let mut actions = vec![Action::RollDice { player }];
            if can_play_card(state, me, DevCard::Knight) {
                actions.push(Action::PlayKnight { player });
            }
            actions
        }
        PendingAction::MoveRobber => state
            .board
            .tiles()
            .filter(|t| t.index != state.board.robber_tile())
            .map(|t| Action::MoveRobber {
                player,
                tile: t.index,
            })
            .collect(),
        PendingAction::StealResource => robbery_victims(state, player)
            .into_iter()
            .map(|victim| Action::StealResource { player, victim })
            .collect(),
        PendingAction::BuildOrTrade => build_or_trade_actions(state, me),
        PendingAction::PlaceSettlement
        | PendingAction::PlaceRoad
        | PendingAction::DiscardResources => Vec::new(),
    }
}

fn build_or_trade_actions(state: &GameState, me: &Player) -> Vec<Action> {
    let player = me.index;
    let board = &state.board;
    let turn = &state.turn_state;
    let mut actions = Vec::new();

    // Building
    if me.can_afford_settlement() {
        for vertex in board.settlement_spots(player) {
            actions.push(Action::PlaceSettlement { player, vertex });
        }
    }
    if me.roads_remaining > 0 && (turn.free_roads > 0 || me.can_afford_road()) {
        for edge in board.road_spots(player) {
            actions.push(Action::PlaceRoad { player, edge });
        }
    }
    if me.can_afford_city() {
        for vertex in board.city_spots(player) {
            actions.push(Action::PlaceCity { player, vertex });
        }
    }
    if !state.dev_deck.is_empty() && me.can_afford_dev_card() {
        actions.push(Action::BuildDevCard { player });
    }

    // Maritime trades
    for give in Resource::ALL {
        let held = me.resources.get(give);
        let ratio = port_ratio(me, give);
        for receive in Resource::ALL.into_iter().filter(|r| *r != give) {
            if held >= BANK_RATIO {
                actions.push(Action::TradeWithBank {
                    player,
                    give,
                    receive,
                });
            }
            if ratio < BANK_RATIO && held >= ratio {
                actions.push(Action::TradeWithPort {
                    player,
                    give,
                    receive,
                });
            }
        }
    }

    // Development cards
    if can_play_card(state, me, DevCard::Knight) {
        actions.push(Action::PlayKnight { player });
    }
    if can_play_card(state, me, DevCard::RoadBuilding) && me.roads_remaining > 0 {
        actions.push(Action::PlayRoadBuilding { player });
    }
    if can_play_card(state, me, DevCard::YearOfPlenty) {
        for (i, &first) in Resource::ALL.iter().enumerate() {
            for &second in &Resource::ALL[i..] {
                actions.push(Action::PlayYearOfPlenty {
                    player,
                    first,
                    second,
                });
            }
        }
    }
    if can_play_card(state, me, DevCard::Monopoly) {
        for resource in Resource::ALL {
            actions.push(Action::PlayMonopoly { player, resource });
        }
    }

    if let Some(trade_id) = turn.active_trade_id {
        if state.trade(trade_id).is_some_and(|t| t.from == player) {
            actions.push(Action::CancelTrade { player, trade_id });
        }
    }

    actions.push(Action::EndTurn { player });
    actions
}
