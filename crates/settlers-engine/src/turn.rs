//! Turn order: snake-order setup and the main-phase rotation.

use crate::board::PlayerId;
use crate::game::{GamePhase, GameState, TurnState};
use tracing::debug;

impl GameState {
    /// Move to the next setup placement after a setup road.
    ///
    /// The forward pass runs 0..N-1 and the last seat starts the backward
    /// pass, so it places twice in a row. Player 0's backward road is the only
    /// way into the main phase.
    pub(crate) fn advance_setup(&mut self) {
        let active = self.turn_state.active_player;
        let last = (self.players.len() - 1) as PlayerId;

        match self.phase {
            GamePhase::SetupForward if active < last => {
                self.turn_state = TurnState::setup(active + 1);
            }
            GamePhase::SetupForward => {
                self.phase = GamePhase::SetupBackward;
                self.turn_state = TurnState::setup(active);
            }
            GamePhase::SetupBackward if active > 0 => {
                self.turn_state = TurnState::setup(active - 1);
            }
            GamePhase::SetupBackward => {
                self.phase = GamePhase::Main;
                self.turn_number = 1;
                self.turn_state = TurnState::main(0);
                debug!("setup complete");
            }
            GamePhase::Main | GamePhase::Ended => {}
        }
    }

    /// Pass the turn to the next seat, wrapping around.
    pub(crate) fn advance_turn(&mut self) {
        let next = ((self.turn_state.active_player as usize + 1) % self.players.len()) as PlayerId;
        if next == 0 {
            self.turn_number += 1;
        }
        self.turn_state = TurnState::main(next);
        debug!(player = next, turn = self.turn_number, "turn started");
    }
}
