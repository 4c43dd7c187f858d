/*!
    abstract bus events, as seen by the game

    the game runs an inverted acknowledge convention: a listener answers the payload byte with NACK to say it has read it. The `*Nacked` events that close a round are therefore the success path, while [BusEvent::ByteAcked] means a peer is still expecting bytes and the round went wrong.
*/

use crate::registers::Status;


/// closed set of bus events a node reacts to
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusEvent {
    /// our start condition (or repeated start) was emitted, we own the bus
    StartSent,
    /// the general call was acknowledged by at least one listener
    AddressAcked,
    /// nobody acknowledged the general call, we are alone on the bus
    AddressNacked,
    /// a listener acknowledged our payload byte and waits for more, this is not a successful round
    ByteAcked,
    /// every listener closed the round with NACK after reading our payload, the broadcast succeeded
    ByteNacked,
    /// a peer's general call addressed us
    AddressedAsListener,
    /// we read a peer's payload byte and answered NACK, the byte is ours to dispatch
    ListenerDataNacked,
    /// a peer won the bus while we were transmitting, `addressed` if its general call addressed us in the same step
    ArbitrationLost {addressed: bool},
    /// any other hardware status, carried raw for the log
    Unrecognized(u8),
}

/// map a raw status register value to an event, prescaler bits are ignored
pub fn classify(twsr: u8) -> BusEvent {
    match Status::read(twsr) {
        Status::Start | Status::RepeatedStart => BusEvent::StartSent,
        Status::AddressAck => BusEvent::AddressAcked,
        Status::AddressNack => BusEvent::AddressNacked,
        Status::DataAck => BusEvent::ByteAcked,
        Status::DataNack => BusEvent::ByteNacked,
        Status::ArbitrationLost => BusEvent::ArbitrationLost {addressed: false},
        Status::ArbitrationLostGeneralCall => BusEvent::ArbitrationLost {addressed: true},
        Status::GeneralCall => BusEvent::AddressedAsListener,
        Status::GeneralCallDataNack => BusEvent::ListenerDataNacked,
        Status::BusError
        | Status::GeneralCallDataAck
        | Status::StopReceived
        | Status::NoInfo
        | Status::Unknown => BusEvent::Unrecognized(twsr),
    }
}
