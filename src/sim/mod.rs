/*!
    host simulation of several nodes sharing one bus

    every node runs the real [Game](crate::game::Game) on a [SimTwi] peripheral. The [Network] plays the role of the wires: it sequences start conditions, wired-AND acknowledges and bitwise arbitration, and raises on each node the status code its TWI peripheral would report.
*/

mod twi;
mod network;

pub use twi::*;
pub use network::*;

use thiserror::Error;


/// error regarding a simulation run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("bus still requested after {rounds} rounds")]
    Livelock {rounds: usize},
    #[error("no node at index {index}")]
    NoSuchNode {index: usize},
    #[error("invalid node setup")]
    Config(crate::Error),
}
impl From<crate::Error> for Error {
    fn from(error: crate::Error) -> Self {
        Self::Config(error)
    }
}
