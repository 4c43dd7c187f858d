/*!
    local decision to take the bus

    nodes never coordinate before starting a round: two nodes requesting the bus in the same cycle are resolved by the wired-AND arbitration of the hardware, the loser simply hears the winner's round.
*/

use log::*;

use crate::{
    game::{Game, Phase, Exchange, Transmit},
    transceiver::Transceiver,
    };


impl Game {
    /**
        take-bus intent, called from the button interrupt

        a start condition is requested only in phases where this node has something to broadcast and while it does not already own a round. Returns whether a start was requested.
    */
    pub fn request_bus<B: Transceiver>(&mut self, bus: &mut B) -> bool {
        if ! matches!(self.phase, Phase::Lobby | Phase::Countdown | Phase::Playing) {
            debug!("nothing to broadcast in {}", self.phase);
            return false;
        }
        if self.busy {
            debug!("bus already requested");
            return false;
        }
        self.arm(bus);
        true
    }

    /// request a start condition, a listener round in progress completes first
    pub(crate) fn arm<B: Transceiver>(&mut self, bus: &mut B) {
        bus.begin_transaction();
        self.busy = true;
        self.exchange = match self.exchange {
            Exchange::Listen {..} => Exchange::Listen {resume: true},
            _ => Exchange::Transmit(Transmit::Start),
        };
    }
}
