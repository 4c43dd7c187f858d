/*!
    per-build settings of a node

    the node count is the quorum of the lobby, it is fixed for a build and never changes at runtime. The other fields only pace the local animations.
*/

use crate::{
    error::Error,
    payload,
    };


/// greatest node count whose ready broadcasts (`0 .. count`) stay below the sentinel bytes
pub const MAX_NODES: u8 = payload::WIN;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// number of nodes on the bus, all of them must be ready to leave the lobby
    pub node_count: u8,
    /// frames of the countdown animation, one bar level is dropped every `countdown_frames / 4`
    pub countdown_frames: u8,
    /// duration of one animation frame
    pub frame_ms: u16,
    /// frames of the win/lose animation before going back to the lobby
    pub finale_frames: u8,
    /// frames of the error animation before going back to the lobby
    pub error_frames: u8,
    /// settle time of a button after an edge
    pub debounce_ms: u16,
}
impl Config {
    pub const fn new(node_count: u8) -> Result<Self, Error> {
        if node_count == 0
            {return Err(Error::NoNodes)}
        if node_count > MAX_NODES
            {return Err(Error::TooManyNodes {count: node_count})}
        Ok(Self {
            node_count,
            countdown_frames: 4,
            frame_ms: 500,
            finale_frames: 6,
            error_frames: 8,
            debounce_ms: 5,
        })
    }
    pub const fn with_countdown(mut self, frames: u8, frame_ms: u16) -> Self {
        self.countdown_frames = if frames == 0 {1} else {frames};
        self.frame_ms = frame_ms;
        self
    }
    pub const fn with_finale(mut self, frames: u8) -> Self {
        self.finale_frames = if frames == 0 {1} else {frames};
        self
    }
    pub const fn with_error(mut self, frames: u8) -> Self {
        self.error_frames = if frames == 0 {1} else {frames};
        self
    }
    pub const fn with_debounce(mut self, debounce_ms: u16) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_count_bounds() {
        assert_eq!(Config::new(0), Err(Error::NoNodes));
        assert_eq!(Config::new(0xFE), Err(Error::TooManyNodes {count: 0xFE}));
        assert_eq!(Config::new(MAX_NODES).map(|c| c.node_count), Ok(0xFD));
        assert_eq!(Config::new(1).map(|c| c.node_count), Ok(1));
    }

    #[test]
    fn zero_frames_are_clamped() {
        let config = Config::new(3).unwrap()
            .with_countdown(0, 10)
            .with_finale(0)
            .with_error(0);
        assert_eq!(config.countdown_frames, 1);
        assert_eq!(config.frame_ms, 10);
        assert_eq!(config.finale_frames, 1);
        assert_eq!(config.error_frames, 1);
    }
}
