/*!
    bytes exchanged on the bus

    every round is a general call followed by exactly one payload byte. Ready counts take the low range `0 .. node_count`, the sentinels take the top of the byte range so that they never collide with a count.
*/

use packbytes::{FromBytes, ToBytes};


/// address byte of a general call with the write bit, heard by every node
pub const GENERAL_CALL: u8 = 0x00;
/// a peer lost the race
pub const LOSE: u8 = 0xfe;
/// a peer won the race
pub const WIN: u8 = 0xfd;
/// a peer detected a protocol violation, everyone must reset
pub const ERROR: u8 = 0xff;

/// meaning of a payload byte
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// the sender's ready count before it pressed
    Ready(u8),
    Lose,
    Win,
    Error,
}

impl From<u8> for Payload {
    fn from(byte: u8) -> Self {
        match byte {
            LOSE => Self::Lose,
            WIN => Self::Win,
            ERROR => Self::Error,
            count => Self::Ready(count),
        }
    }
}
impl From<Payload> for u8 {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Ready(count) => count,
            Payload::Lose => LOSE,
            Payload::Win => WIN,
            Payload::Error => ERROR,
        }
    }
}
impl ToBytes for Payload {
    type Bytes = [u8; 1];
    fn to_le_bytes(self) -> Self::Bytes {[u8::from(self)]}
    fn to_be_bytes(self) -> Self::Bytes {[u8::from(self)]}
}
impl FromBytes for Payload {
    type Bytes = [u8; 1];
    fn from_le_bytes(bytes: Self::Bytes) -> Self {Self::from(bytes[0])}
    fn from_be_bytes(bytes: Self::Bytes) -> Self {Self::from(bytes[0])}
}

/// one complete round as seen on the wires
#[derive(Copy, Clone, FromBytes, ToBytes, Debug, PartialEq, Eq)]
pub struct Frame {
    /// address byte, including the read/write bit
    pub address: u8,
    pub payload: Payload,
}
impl Frame {
    pub fn broadcast(payload: Payload) -> Self {
        Self {address: GENERAL_CALL, payload}
    }
    pub fn is_broadcast(&self) -> bool {
        self.address == GENERAL_CALL
    }
}
