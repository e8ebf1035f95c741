//! Trading: maritime ratios and the peer-to-peer offer lifecycle.
//!
//! Maritime trades (bank or port) are a single player's action. Peer offers
//! need the consent of another player, so they live in `GameState::trades`
//! and move through create, accept, reject and cancel as separate actions.

use crate::board::{PlayerId, PortType, Resource};
use crate::game::{GameError, GamePhase, GameState, PendingAction};
use crate::player::{Player, Resources};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bank exchange rate without a port
pub const BANK_RATIO: u32 = 4;

/// Best rate at which `player` can give away `give`.
///
/// A matching 2:1 port beats a generic 3:1 port, which beats the bank.
pub fn port_ratio(player: &Player, give: Resource) -> u32 {
    if player.ports.contains(&PortType::Specific(give)) {
        2
    } else if player.ports.contains(&PortType::Generic) {
        3
    } else {
        BANK_RATIO
    }
}

/// Where an offer is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum TradeStatus {
    Open,
    Accepted { by: PlayerId },
    /// Every invitee rejected it
    Rejected,
    Cancelled,
}

/// A peer-to-peer trade offer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOffer {
    pub id: u32,
    pub from: PlayerId,
    /// Invited players
    pub to: Vec<PlayerId>,
    /// What the offering player gives
    pub offering: Resources,
    /// What the offering player wants in return
    pub requesting: Resources,
    pub rejected_by: Vec<PlayerId>,
    pub status: TradeStatus,
}

impl TradeOffer {
    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    pub fn is_invited(&self, player: PlayerId) -> bool {
        self.to.contains(&player)
    }
}

impl GameState {
    /// Look up an offer by id
    pub fn trade(&self, id: u32) -> Option<&TradeOffer> {
        self.trades.iter().find(|t| t.id == id)
    }

    fn trade_mut(&mut self, id: u32) -> Result<&mut TradeOffer, GameError> {
        self.trades
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(GameError::UnknownTrade(id))
    }

    /// Exchange `ratio` of `give` for one `receive`
    pub(crate) fn maritime_trade(
        &mut self,
        player: PlayerId,
        give: Resource,
        receive: Resource,
        ratio: u32,
    ) -> Result<(), GameError> {
        if give == receive {
            return Err(GameError::InvalidTrade);
        }
        let hand = &mut self.player_mut(player)?.resources;
        if hand.get(give) < ratio {
            return Err(GameError::CannotAfford);
        }
        hand.remove(give, ratio)?;
        hand.add(receive, 1);
        Ok(())
    }

    /// Open a new offer from the active player.
    ///
    /// An empty invitee list invites every opponent.
    pub(crate) fn create_offer(
        &mut self,
        from: PlayerId,
        to: &[PlayerId],
        offering: Resources,
        requesting: Resources,
    ) -> Result<u32, GameError> {
        if self.phase != GamePhase::Main
            || self.turn_state.pending_action != PendingAction::BuildOrTrade
        {
            return Err(GameError::InvalidPhase);
        }
        if from != self.turn_state.active_player {
            return Err(GameError::NotYourTurn);
        }
        if self.turn_state.active_trade_id.is_some() {
            return Err(GameError::InvalidTrade);
        }
        if offering.is_empty() || requesting.is_empty() {
            return Err(GameError::InvalidTrade);
        }
        let hand = self.player(from).ok_or(GameError::UnknownPlayer(from))?.resources;
        if !hand.can_afford(&offering) {
            return Err(GameError::CannotAfford);
        }

        let mut invitees: Vec<PlayerId> = if to.is_empty() {
            self.seats_from(from).filter(|&p| p != from).collect()
        } else {
            to.to_vec()
        };
        invitees.sort_unstable();
        invitees.dedup();
        for &p in &invitees {
            if self.player(p).is_none() {
                return Err(GameError::UnknownPlayer(p));
            }
            if p == from {
                return Err(GameError::InvalidTrade);
            }
        }
        if invitees.is_empty() {
            return Err(GameError::InvalidTrade);
        }

        let id = self.next_trade_id;
        self.next_trade_id += 1;
        self.trades.push_back(TradeOffer {
            id,
            from,
            to: invitees,
            offering,
            requesting,
            rejected_by: Vec::new(),
            status: TradeStatus::Open,
        });
        self.turn_state.active_trade_id = Some(id);
        debug!(id, from, "trade offered");
        Ok(id)
    }

    /// Accept an open offer; both hands are re-checked before the swap.
    pub(crate) fn accept_offer(&mut self, player: PlayerId, id: u32) -> Result<(), GameError> {
        let offer = self.trade(id).ok_or(GameError::UnknownTrade(id))?.clone();
        if !offer.is_open() || !offer.is_invited(player) || offer.rejected_by.contains(&player) {
            return Err(GameError::InvalidTrade);
        }

        let mut offerer = self.player_mut(offer.from)?.resources;
        let mut acceptor = self.player_mut(player)?.resources;
        if !offerer.can_afford(&offer.offering) || !acceptor.can_afford(&offer.requesting) {
            return Err(GameError::CannotAfford);
        }
        offerer.subtract(&offer.offering)?;
        offerer.add_all(&offer.requesting);
        acceptor.subtract(&offer.requesting)?;
        acceptor.add_all(&offer.offering);

        self.player_mut(offer.from)?.resources = offerer;
        self.player_mut(player)?.resources = acceptor;
        self.trade_mut(id)?.status = TradeStatus::Accepted { by: player };
        self.close_active_trade(id);
        debug!(id, from = offer.from, by = player, "trade accepted");
        Ok(())
    }

    /// Reject an offer. Rejecting twice is a no-op; the offer closes once
    /// every invitee has rejected it.
    pub(crate) fn reject_offer(&mut self, player: PlayerId, id: u32) -> Result<(), GameError> {
        let offer = self.trade_mut(id)?;
        if !offer.is_invited(player) {
            return Err(GameError::InvalidTrade);
        }
        if offer.rejected_by.contains(&player) {
            return Ok(());
        }
        if !offer.is_open() {
            return Err(GameError::InvalidTrade);
        }

        offer.rejected_by.push(player);
        let everyone_rejected = offer.to.iter().all(|p| offer.rejected_by.contains(p));
        if everyone_rejected {
            offer.status = TradeStatus::Rejected;
            self.close_active_trade(id);
            debug!(id, "trade rejected by every invitee");
        }
        Ok(())
    }

    /// Withdraw an open offer (offering player only)
    pub(crate) fn cancel_offer(&mut self, player: PlayerId, id: u32) -> Result<(), GameError> {
        let offer = self.trade_mut(id)?;
        if offer.from != player {
            return Err(GameError::NotYourTurn);
        }
        if !offer.is_open() {
            return Err(GameError::InvalidTrade);
        }
        offer.status = TradeStatus::Cancelled;
        self.close_active_trade(id);
        Ok(())
    }

    /// Cancel whatever the player still has open
    pub(crate) fn cancel_open_offers(&mut self, player: PlayerId) {
        for offer in self.trades.iter_mut() {
            if offer.from == player && offer.is_open() {
                offer.status = TradeStatus::Cancelled;
            }
        }
        self.turn_state.active_trade_id = None;
    }

    fn close_active_trade(&mut self, id: u32) {
        if self.turn_state.active_trade_id == Some(id) {
            self.turn_state.active_trade_id = None;
        }
    }
}
