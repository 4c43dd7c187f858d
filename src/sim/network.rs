use std::vec::Vec;
use log::*;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    config::Config,
    game::{Game, Phase},
    button::{Button, Intent},
    payload::{Frame, Payload},
    render::{Renderer, Indicator, Color, Tick, Exit},
    transceiver::Registers,
    };
use super::{
    Error,
    twi::{SimTwi, status},
    };


/// bounded number of rounds [Network::settle] runs before reporting a livelock
pub const MAX_ROUNDS: usize = 64;

/// state of the LEDs of a simulated node
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Leds {
    pub bar: u8,
    pub color: Color,
}
impl Default for Leds {
    fn default() -> Self {
        Self {bar: 0, color: Color::Off}
    }
}
impl Indicator for Leds {
    fn display(&mut self, value: u8) {self.bar = value & 0b1111}
    fn set_indicator(&mut self, color: Color) {self.color = color}
}

/// one simulated board
pub struct SimNode {
    pub game: Game,
    pub twi: SimTwi,
    pub renderer: Renderer,
    pub leds: Leds,
    pub take: Button,
    pub query: Button,
    /// byte this node will read instead of the next payload on the wires
    corrupt: Option<u8>,
}
impl SimNode {
    fn new(config: Config) -> Self {
        Self {
            game: Game::new(config),
            twi: SimTwi::new(),
            renderer: Renderer::new(config),
            leds: Leds::default(),
            take: Button::new(Intent::TakeBus),
            query: Button::new(Intent::QueryStatus),
            corrupt: None,
        }
    }
    /// press and release a button
    fn click(&mut self, intent: Intent) {
        let button = match intent {
            Intent::TakeBus => &mut self.take,
            Intent::QueryStatus => &mut self.query,
        };
        let pressed = button.edge();
        button.edge();
        if let Some(intent) = pressed
            {intent.apply(&mut self.game, &mut self.twi)}
    }
}

/// nodes sharing one simulated bus
pub struct Network {
    nodes: Vec<SimNode>,
    rng: StdRng,
    trace: Vec<Frame>,
    rounds: usize,
}

impl Network {
    /// as many nodes as the config counts, interrupts serviced in a fixed pseudo random order
    pub fn new(config: Config) -> Self {
        Self::with_seed(config, 0)
    }
    pub fn with_seed(config: Config, seed: u64) -> Self {
        let mut nodes = Vec::new();
        for _ in 0 .. config.node_count
            {nodes.push(SimNode::new(config))}
        Self {
            nodes,
            rng: StdRng::seed_from_u64(seed),
            trace: Vec::new(),
            rounds: 0,
        }
    }
    /// network of `count` nodes with the default pacing
    pub fn with_nodes(count: u8) -> Result<Self, Error> {
        Ok(Self::new(Config::new(count)?))
    }

    pub fn len(&self) -> usize {self.nodes.len()}
    pub fn is_empty(&self) -> bool {self.nodes.is_empty()}
    pub fn node(&self, index: usize) -> Result<&SimNode, Error> {
        self.nodes.get(index).ok_or(Error::NoSuchNode {index})
    }
    fn node_mut(&mut self, index: usize) -> Result<&mut SimNode, Error> {
        self.nodes.get_mut(index).ok_or(Error::NoSuchNode {index})
    }
    pub fn phase(&self, index: usize) -> Result<Phase, Error> {
        Ok(self.node(index)?.game.phase())
    }
    pub fn ready(&self, index: usize) -> Result<u8, Error> {
        Ok(self.node(index)?.game.ready())
    }
    pub fn phases(&self) -> Vec<Phase> {
        self.nodes.iter().map(|node| node.game.phase()).collect()
    }
    /// every payload that went over the wires, in order
    pub fn trace(&self) -> &[Frame] {&self.trace}
    /// bus rounds run since creation
    pub fn rounds(&self) -> usize {self.rounds}

    /// take-bus button of a node, the round only happens on [Self::settle]
    pub fn press(&mut self, index: usize) -> Result<(), Error> {
        debug!("press {}", index);
        self.node_mut(index)?.click(Intent::TakeBus);
        Ok(())
    }
    /// status query button of a node
    pub fn query(&mut self, index: usize) -> Result<(), Error> {
        self.node_mut(index)?.click(Intent::QueryStatus);
        Ok(())
    }
    /// line noise: the node reads `byte` instead of the next payload broadcast by a peer
    pub fn corrupt_next(&mut self, index: usize, byte: u8) -> Result<(), Error> {
        self.node_mut(index)?.corrupt = Some(byte);
        Ok(())
    }

    /// draw one frame on a node and apply the exit it requests
    pub fn render(&mut self, index: usize) -> Result<Tick, Error> {
        let node = self.node_mut(index)?;
        let phase = node.game.phase();
        let tick = node.renderer.frame(phase, node.game.ready(), &mut node.leds);
        if let Some(exit) = tick.exit
            {exit.apply(&mut node.game, phase);}
        Ok(tick)
    }
    /**
        render a node until its current animation requests an exit, return that exit

        phases without a finite animation draw a single frame and return `None`.
    */
    pub fn finish_animation(&mut self, index: usize) -> Result<Option<Exit>, Error> {
        let phase = self.phase(index)?;
        if ! matches!(phase, Phase::Countdown | Phase::Win | Phase::Lose | Phase::ReceiverError) {
            self.render(index)?;
            return Ok(None);
        }
        loop {
            let tick = self.render(index)?;
            if tick.exit.is_some()
                {return Ok(tick.exit)}
        }
    }

    /// run bus rounds until no node requests the bus, returns the number of rounds run
    pub fn settle(&mut self) -> Result<usize, Error> {
        for rounds in 0 .. MAX_ROUNDS {
            let starters: Vec<usize> = (0 .. self.nodes.len())
                .filter(|&i| self.nodes[i].twi.starting())
                .collect();
            if starters.is_empty()
                {return Ok(rounds)}
            self.round(starters);
        }
        Err(Error::Livelock {rounds: MAX_ROUNDS})
    }

    /// one transaction, from the start conditions to the stop
    fn round(&mut self, starters: Vec<usize>) {
        self.rounds += 1;
        trace!("round {} started by {:?}", self.rounds, starters);
        // idle nodes with acknowledge enabled answer the general call
        let listeners: Vec<usize> = (0 .. self.nodes.len())
            .filter(|i| ! starters.contains(i) && self.nodes[*i].twi.acknowledging())
            .collect();

        self.step(&starters, |_| status::START);
        let transmitters = self.still_sending(&starters);
        let Some(address) = self.lowest(&transmitters)
            else {return};
        let (transmitters, losers) = self.arbitrate(transmitters, address);
        self.step(&losers, |_| status::ARBITRATION_LOST);

        self.step(&listeners, |_| status::GENERAL_CALL);
        let acked = ! listeners.is_empty();
        self.step(&transmitters, |_| if acked {status::ADDRESS_ACK} else {status::ADDRESS_NACK});
        let transmitters = self.still_sending(&transmitters);
        let Some(byte) = self.lowest(&transmitters)
            else {
                // released right after the address
                self.step(&listeners, |_| status::STOP_RECEIVED);
                return;
            };
        let (transmitters, losers) = self.arbitrate(transmitters, byte);
        self.step(&losers, |_| status::ARBITRATION_LOST);

        for &i in &listeners {
            let node = &mut self.nodes[i];
            let received = node.corrupt.take().unwrap_or(byte);
            node.twi.latch(received);
        }
        let acked = listeners.iter().any(|&i| self.nodes[i].twi.acknowledging());
        self.step(&listeners, |twi| if twi.acknowledging() {status::GENERAL_CALL_DATA_ACK} else {status::GENERAL_CALL_DATA_NACK});
        self.step(&transmitters, |_| if acked {status::DATA_ACK} else {status::DATA_NACK});
        let left = self.still_sending(&transmitters);
        if ! left.is_empty()
            {warn!("nodes {:?} kept the bus after their byte", left)}

        let frame = Frame {address, payload: Payload::from(byte)};
        debug!("round {}: {:?}", self.rounds, frame);
        if ! frame.is_broadcast()
            {warn!("round {} was addressed to {:#04x}", self.rounds, address)}
        self.trace.push(frame);
    }

    /// raise a status on the given nodes and service their interrupts in shuffled order
    fn step(&mut self, members: &[usize], code: impl Fn(&SimTwi) -> u8) {
        let mut order = members.to_vec();
        order.shuffle(&mut self.rng);
        for i in order {
            let node = &mut self.nodes[i];
            let status = code(&node.twi);
            node.twi.raise(status);
            node.game.on_interrupt(&mut node.twi);
            if node.twi.held() {
                warn!("node {} did not release the bus", i);
                node.twi.release();
            }
        }
    }

    /// nodes of `members` that did not emit a stop condition
    fn still_sending(&mut self, members: &[usize]) -> Vec<usize> {
        members.iter()
            .copied()
            .filter(|&i| ! self.nodes[i].twi.take_stop())
            .collect()
    }

    /// wired-AND of the bytes written by `members`
    fn lowest(&self, members: &[usize]) -> Option<u8> {
        members.iter()
            .map(|&i| self.nodes[i].twi.data())
            .min()
    }

    /// split between the nodes that wrote the winning byte and the others
    fn arbitrate(&self, members: Vec<usize>, winner: u8) -> (Vec<usize>, Vec<usize>) {
        members.into_iter()
            .partition(|&i| self.nodes[i].twi.data() == winner)
    }
}
