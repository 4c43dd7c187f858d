use thiserror::Error;

/// error raised when setting a node up, the protocol itself never fails with a rust error
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("a game needs at least one node")]
    NoNodes,
    /// ready counts of that many nodes would reach the sentinel bytes
    #[error("{count} nodes make ready counts collide with sentinel bytes")]
    TooManyNodes { count: u8 },
    #[error("scl frequency of {scl} Hz is out of reach of the bit rate register")]
    BitRate { scl: u32 },
}
