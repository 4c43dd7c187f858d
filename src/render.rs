/*!
    local animations, stepped frame by frame by the main loop

    the renderer never blocks: each call draws one frame and tells the loop how long to wait and whether the animation asks to leave the phase. Leaving is done by the loop through [Exit::apply], which only acts if the bus interrupt did not move the phase meanwhile.
*/

use crate::{
    config::Config,
    game::{Game, Phase},
    };


#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Color {
    Off,
    Red,
    Green,
    Blue,
}

/// LEDs of a node
pub trait Indicator {
    /// show the 4 low bits on the bar graph
    fn display(&mut self, value: u8);
    fn set_indicator(&mut self, color: Color);
}

/// phase change requested by an animation reaching its end
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Exit {
    /// countdown elapsed
    Play,
    /// finale or error animation played
    Reset,
}
impl Exit {
    /// apply to a game last observed in phase `observed`, returns whether the phase changed
    pub fn apply(self, game: &mut Game, observed: Phase) -> bool {
        match self {
            Self::Play => game.finish_countdown(),
            Self::Reset => game.reset_from(observed),
        }
    }
}

/// outcome of one frame
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tick {
    pub delay_ms: u16,
    pub exit: Option<Exit>,
}

/// bar graph pattern lighting the `n` first LEDs
pub fn bar(n: u8) -> u8 {
    (1 << n.min(4)) - 1
}

pub struct Renderer {
    config: Config,
    shown: Option<Phase>,
    frame: u8,
}
impl Renderer {
    pub const fn new(config: Config) -> Self {
        Self {config, shown: None, frame: 0}
    }
    /// frames already drawn in the current phase
    pub fn elapsed(&self) -> u8 {self.frame}

    /// draw the next frame of `phase`, animations restart whenever the phase changes
    pub fn frame<I: Indicator>(&mut self, phase: Phase, ready: u8, sink: &mut I) -> Tick {
        if self.shown != Some(phase) {
            self.shown = Some(phase);
            self.frame = 0;
        }
        let frame = self.frame;
        self.frame = self.frame.saturating_add(1);
        let blink = frame % 2 == 0;
        let last = |frames: u8| frame.saturating_add(1) >= frames;

        let exit = match phase {
            Phase::Lobby => {
                sink.set_indicator(Color::Red);
                sink.display(bar(ready));
                None
            },
            Phase::Ready => {
                sink.set_indicator(Color::Green);
                sink.display(bar(ready));
                None
            },
            Phase::Countdown => {
                let frames = self.config.countdown_frames.max(1);
                let elapsed = u16::from(frame) * 4 / u16::from(frames);
                let level = 4u16.saturating_sub(elapsed).max(1) as u8;
                sink.set_indicator(if u16::from(frame) * 2 < u16::from(frames) {Color::Green} else {Color::Blue});
                sink.display(bar(level));
                last(frames).then_some(Exit::Play)
            },
            Phase::Playing => {
                sink.set_indicator(Color::Blue);
                sink.display(0);
                None
            },
            Phase::Win => {
                sink.set_indicator(Color::Green);
                sink.display(if blink {0b1111} else {0});
                last(self.config.finale_frames).then_some(Exit::Reset)
            },
            Phase::Lose => {
                sink.set_indicator(Color::Red);
                sink.display(0);
                last(self.config.finale_frames).then_some(Exit::Reset)
            },
            Phase::SenderError => {
                error_frame(sink, blink);
                None
            },
            Phase::ReceiverError => {
                error_frame(sink, blink);
                last(self.config.error_frames).then_some(Exit::Reset)
            },
        };
        Tick {delay_ms: self.config.frame_ms, exit}
    }
}

fn error_frame<I: Indicator>(sink: &mut I, blink: bool) {
    sink.set_indicator(if blink {Color::Red} else {Color::Off});
    sink.display(if blink {0b1001} else {0});
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;
    use crate::game::tests::game;

    #[derive(Default)]
    struct Leds {
        bars: Vec<u8>,
        colors: Vec<Color>,
    }
    impl Indicator for Leds {
        fn display(&mut self, value: u8) {self.bars.push(value)}
        fn set_indicator(&mut self, color: Color) {self.colors.push(color)}
    }

    fn config() -> Config {
        Config::new(3).unwrap()
            .with_countdown(4, 250)
            .with_finale(3)
            .with_error(2)
    }

    #[test]
    fn bar_graph() {
        assert_eq!(bar(0), 0b0000);
        assert_eq!(bar(1), 0b0001);
        assert_eq!(bar(3), 0b0111);
        assert_eq!(bar(4), 0b1111);
        assert_eq!(bar(9), 0b1111);
    }

    #[test]
    fn lobby_shows_ready_count() {
        let mut renderer = Renderer::new(config());
        let mut leds = Leds::default();
        let tick = renderer.frame(Phase::Lobby, 2, &mut leds);
        assert_eq!(tick, Tick {delay_ms: 250, exit: None});
        renderer.frame(Phase::Ready, 3, &mut leds);
        assert_eq!(leds.colors, [Color::Red, Color::Green]);
        assert_eq!(leds.bars, [0b0011, 0b0111]);
    }

    #[test]
    fn countdown_decays_then_plays() {
        let mut renderer = Renderer::new(config());
        let mut leds = Leds::default();
        let exits: Vec<_> = (0 .. 4)
            .map(|_| renderer.frame(Phase::Countdown, 3, &mut leds).exit)
            .collect();
        assert_eq!(exits, [None, None, None, Some(Exit::Play)]);
        assert_eq!(leds.bars, [0b1111, 0b0111, 0b0011, 0b0001]);
        assert_eq!(leds.colors, [Color::Green, Color::Green, Color::Blue, Color::Blue]);
    }

    #[test]
    fn empty_countdown_plays_at_once() {
        let config = Config {countdown_frames: 0, .. config()};
        let mut renderer = Renderer::new(config);
        let mut leds = Leds::default();
        assert_eq!(renderer.frame(Phase::Countdown, 3, &mut leds).exit, Some(Exit::Play));
        assert_eq!(leds.bars, [0b1111]);
        assert_eq!(leds.colors, [Color::Green]);
    }

    #[test]
    fn finale_resets() {
        let mut renderer = Renderer::new(config());
        let mut leds = Leds::default();
        let exits: Vec<_> = (0 .. 3)
            .map(|_| renderer.frame(Phase::Win, 3, &mut leds).exit)
            .collect();
        assert_eq!(exits, [None, None, Some(Exit::Reset)]);
        assert_eq!(leds.bars, [0b1111, 0, 0b1111]);

        // a new phase restarts the animation
        assert_eq!(renderer.frame(Phase::Lose, 3, &mut leds).exit, None);
        assert_eq!(renderer.elapsed(), 1);
    }

    #[test]
    fn errors_blink() {
        let mut renderer = Renderer::new(config());
        let mut leds = Leds::default();
        for _ in 0 .. 4 {
            assert_eq!(renderer.frame(Phase::SenderError, 0, &mut leds).exit, None);
        }
        assert_eq!(leds.colors, [Color::Red, Color::Off, Color::Red, Color::Off]);
        assert_eq!(leds.bars, [0b1001, 0, 0b1001, 0]);

        let mut renderer = Renderer::new(config());
        assert_eq!(renderer.frame(Phase::ReceiverError, 0, &mut leds).exit, None);
        assert_eq!(renderer.frame(Phase::ReceiverError, 0, &mut leds).exit, Some(Exit::Reset));
    }

    #[test]
    fn exits_only_apply_to_the_observed_phase() {
        let mut game = game(2);
        game.phase = Phase::Countdown;
        assert!(Exit::Play.apply(&mut game, Phase::Countdown));
        assert_eq!(game.phase(), Phase::Playing);
        // the interrupt moved the phase between the frame and its exit
        game.phase = Phase::Lose;
        assert!(! Exit::Play.apply(&mut game, Phase::Countdown));
        assert!(! Exit::Reset.apply(&mut game, Phase::Win));
        assert_eq!(game.phase(), Phase::Lose);
        assert!(Exit::Reset.apply(&mut game, Phase::Lose));
        assert_eq!(game.phase(), Phase::Lobby);
    }
}
