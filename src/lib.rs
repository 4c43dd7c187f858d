/*!
    master-less game synchronization over a shared two-wire bus

    identical nodes agree on a small game (lobby, countdown, race) by broadcasting one byte general calls. There is no bus master: any node may start a round, the hardware arbitration picks one transmitter, and listeners close every round with a NACK meaning "read".

    the crate is `no_std`, the node firmware provides a [transceiver::Transceiver] and an [render::Indicator]. The `sim` feature adds a host simulation of a whole bus.
*/
#![cfg_attr(not(test), no_std)]
#[cfg(all(feature = "std", not(test)))]
extern crate std;

mod error;

pub mod registers;
pub mod transceiver;
pub mod event;
pub mod payload;
pub mod config;
pub mod game;
pub mod arbiter;
pub mod render;
pub mod button;
pub mod journal;
#[cfg(feature = "sim")]
pub mod sim;

pub use error::Error;
pub use config::Config;
