/*!
    buttons of a node

    a button pin interrupts on both edges. The pin level is not read back, each edge toggles the believed state, so bounces must be absorbed by the caller waiting [Config::debounce_ms](crate::config::Config::debounce_ms) and discarding the edges raised meanwhile.
*/

use log::*;

use crate::{
    game::Game,
    transceiver::Transceiver,
    };


/// what a button press asks for
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// broadcast whatever the current phase has to say
    TakeBus,
    /// print the node state on the diagnostic channel, no effect on the game
    QueryStatus,
}
impl Intent {
    pub fn apply<B: Transceiver>(self, game: &mut Game, bus: &mut B) {
        match self {
            Self::TakeBus => {
                if ! game.request_bus(bus)
                    {debug!("press ignored in {}", game.phase())}
            },
            Self::QueryStatus => game.report(),
        }
    }
}

/// edge-toggled button state
#[derive(Copy, Clone, Debug)]
pub struct Button {
    pressed: bool,
    intent: Intent,
}
impl Button {
    pub const fn new(intent: Intent) -> Self {
        Self {pressed: false, intent}
    }
    pub fn pressed(&self) -> bool {self.pressed}
    /// an edge was seen, returns the intent when this edge is a press
    pub fn edge(&mut self) -> Option<Intent> {
        self.pressed = ! self.pressed;
        self.pressed.then_some(self.intent)
    }
}
