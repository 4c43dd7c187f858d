/*!
    the game state machine, run entirely from the TWI interrupt

    a node is either transmitting its own broadcast round (it issued a start condition) or listening to a peer's round. Both roles progress one bus step per interrupt, the current step is kept in [Exchange] so that a scripted sequence of [BusEvent] drives the machine without hardware.

    the render loop only touches the state through [Game::finish_countdown], [Game::reset_from] and [Game::request_bus](crate::arbiter), between bus steps.
*/

use core::fmt;
use log::*;

use crate::{
    config::Config,
    event::{BusEvent, classify},
    payload::{Payload, GENERAL_CALL},
    transceiver::Transceiver,
    };


/// game phase of a node, the only state rendered
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// waiting for the quorum, this node did not press yet
    Lobby,
    /// this node pressed, waiting for the others
    Ready,
    /// quorum reached, local countdown animation running
    Countdown,
    /// local countdown elapsed, first to press wins
    Playing,
    Win,
    Lose,
    /// this node detected a protocol violation and broadcasts ERROR until heard
    SenderError,
    /// an ERROR broadcast was exchanged, the node resets after its error animation
    ReceiverError,
}
impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lobby => "lobby",
            Self::Ready => "ready",
            Self::Countdown => "countdown",
            Self::Playing => "playing",
            Self::Win => "win",
            Self::Lose => "lose",
            Self::SenderError => "sender error",
            Self::ReceiverError => "receiver error",
        })
    }
}

/// step of a broadcast round this node transmits
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transmit {
    /// start condition requested, not emitted yet
    Start,
    /// general call address sent
    Address,
    /// payload byte sent
    Data(Payload),
}

/// what the node does on the bus at the moment
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Exchange {
    Idle,
    Transmit(Transmit),
    /// reading a peer's broadcast, `resume` if our own start condition is still pending behind it
    Listen {resume: bool},
}

/// state of one node
#[derive(Clone, Debug)]
pub struct Game {
    pub(crate) config: Config,
    pub(crate) phase: Phase,
    pub(crate) ready: u8,
    pub(crate) busy: bool,
    pub(crate) exchange: Exchange,
}

impl Game {
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            phase: Phase::Lobby,
            ready: 0,
            busy: false,
            exchange: Exchange::Idle,
        }
    }
    pub fn config(&self) -> &Config {&self.config}
    pub fn phase(&self) -> Phase {self.phase}
    /// number of ready broadcasts this node accounted since the last lobby
    pub fn ready(&self) -> u8 {self.ready}
    /// true from our start request until our stop condition
    pub fn busy(&self) -> bool {self.busy}
    pub fn exchange(&self) -> Exchange {self.exchange}

    pub(crate) fn enter(&mut self, phase: Phase) {
        if phase != self.phase
            {info!("{} -> {}", self.phase, phase)}
        self.phase = phase;
        if phase == Phase::Lobby
            {self.ready = 0}
    }

    /// TWI interrupt entry point
    pub fn on_interrupt<B: Transceiver>(&mut self, bus: &mut B) {
        let event = classify(bus.status());
        self.handle(bus, event);
    }

    /// advance the machine by one bus event
    pub fn handle<B: Transceiver>(&mut self, bus: &mut B, event: BusEvent) {
        trace!("{:?} in {} {:?}", event, self.phase, self.exchange);
        match event {
            BusEvent::StartSent => self.start_sent(bus),
            BusEvent::AddressAcked => self.address_acked(bus),
            BusEvent::AddressNacked => {
                debug!("nobody listening");
                self.finish(bus);
                self.retry_error(bus);
            },
            BusEvent::ByteAcked => {
                warn!("a listener left the round open");
                self.finish(bus);
                self.retry_error(bus);
            },
            BusEvent::ByteNacked => self.byte_nacked(bus),
            BusEvent::AddressedAsListener => self.addressed(bus),
            BusEvent::ListenerDataNacked => self.received(bus),
            BusEvent::ArbitrationLost {addressed} => self.arbitration_lost(bus, addressed),
            BusEvent::Unrecognized(status) => {
                error!("unrecognized bus status {:#04x}", status);
                match self.exchange {
                    Exchange::Listen {resume} => self.exchange = resumed(resume),
                    Exchange::Transmit(Transmit::Address | Transmit::Data(_)) => {
                        self.busy = false;
                        self.exchange = Exchange::Idle;
                    },
                    _ => {},
                }
                bus.set_ack(true);
            },
        }
    }

    fn start_sent<B: Transceiver>(&mut self, bus: &mut B) {
        self.busy = true;
        self.exchange = Exchange::Transmit(Transmit::Address);
        bus.write_byte(GENERAL_CALL);
    }

    fn address_acked<B: Transceiver>(&mut self, bus: &mut B) {
        match self.outgoing() {
            Some(payload) => {
                debug!("send {:?}", payload);
                self.exchange = Exchange::Transmit(Transmit::Data(payload));
                bus.write_byte(payload.into());
            },
            None => {
                debug!("nothing to send in {}", self.phase);
                self.finish(bus);
            },
        }
    }

    fn byte_nacked<B: Transceiver>(&mut self, bus: &mut B) {
        let Exchange::Transmit(Transmit::Data(payload)) = self.exchange
            else {
                warn!("round closed while not sending");
                return self.finish(bus);
            };
        match payload {
            Payload::Ready(_) => {
                self.ready = self.ready.saturating_add(1);
                if self.ready >= self.config.node_count
                    {self.enter(Phase::Countdown)}
                else
                    {self.enter(Phase::Ready)}
            },
            Payload::Lose => self.enter(Phase::Lose),
            Payload::Win => self.enter(Phase::Win),
            Payload::Error => self.enter(Phase::ReceiverError),
        }
        self.finish(bus);
    }

    fn addressed<B: Transceiver>(&mut self, bus: &mut B) {
        let resume = matches!(self.exchange,
            Exchange::Transmit(Transmit::Start) | Exchange::Listen {resume: true});
        self.exchange = Exchange::Listen {resume};
        bus.set_ack(false);
    }

    fn received<B: Transceiver>(&mut self, bus: &mut B) {
        let payload = Payload::from(bus.read_byte());
        debug!("received {:?}", payload);
        self.dispatch(payload);
        self.exchange = match self.exchange {
            Exchange::Listen {resume} => resumed(resume),
            other => other,
        };
        bus.set_ack(true);
        if self.phase == Phase::SenderError && ! self.busy
            {self.arm(bus)}
    }

    fn arbitration_lost<B: Transceiver>(&mut self, bus: &mut B, addressed: bool) {
        debug!("arbitration lost");
        self.busy = false;
        if addressed {
            self.exchange = Exchange::Listen {resume: false};
            bus.set_ack(false);
        }
        else {
            let sent = self.exchange;
            self.exchange = Exchange::Idle;
            bus.set_ack(true);
            if let Exchange::Transmit(Transmit::Data(payload)) = sent
                {self.outbid(payload)}
            self.retry_error(bus);
        }
    }

    /// the winner of a data phase sent a lower byte than ours, deduce what it was
    fn outbid(&mut self, payload: Payload) {
        match payload {
            // only WIN is below LOSE
            Payload::Lose => self.enter(Phase::Lose),
            Payload::Ready(count) => {
                warn!("a peer sent a ready count below {}", count);
                self.enter(Phase::SenderError);
            },
            Payload::Win => {
                warn!("a peer sent a ready count while racing");
                self.enter(Phase::SenderError);
            },
            Payload::Error => {},
        }
    }

    /// payload of a round started in the current phase
    fn outgoing(&self) -> Option<Payload> {
        match self.phase {
            Phase::Lobby => Some(Payload::Ready(self.ready)),
            Phase::Countdown => Some(Payload::Lose),
            Phase::Playing => Some(Payload::Win),
            Phase::SenderError => Some(Payload::Error),
            Phase::Ready | Phase::Win | Phase::Lose | Phase::ReceiverError => None,
        }
    }

    fn finish<B: Transceiver>(&mut self, bus: &mut B) {
        bus.end_transaction();
        self.busy = false;
        self.exchange = Exchange::Idle;
    }

    fn retry_error<B: Transceiver>(&mut self, bus: &mut B) {
        if self.phase == Phase::SenderError
            {self.arm(bus)}
    }

    /// apply a peer's payload
    fn dispatch(&mut self, payload: Payload) {
        match self.phase {
            Phase::Lobby | Phase::Ready => self.n_ready(payload),
            Phase::Countdown | Phase::Playing => self.race_result(payload),
            Phase::Win | Phase::Lose | Phase::SenderError => {
                if payload == Payload::Error
                    {self.enter(Phase::ReceiverError)}
                else
                    {debug!("ignored {:?} in {}", payload, self.phase)}
            },
            Phase::ReceiverError => {},
        }
    }

    /// a peer announced its ready count, it must match ours
    fn n_ready(&mut self, payload: Payload) {
        match payload {
            Payload::Ready(count) if count == self.ready => {
                self.ready = self.ready.saturating_add(1);
                if self.ready >= self.config.node_count
                    {self.enter(Phase::Countdown)}
            },
            Payload::Error => self.enter(Phase::ReceiverError),
            Payload::Lose | Payload::Win => debug!("ignored {:?} in {}", payload, self.phase),
            Payload::Ready(count) => {
                warn!("peer is {} ready, expected {}", count, self.ready);
                self.enter(Phase::SenderError);
            },
        }
    }

    /// a peer announced the end of the race
    fn race_result(&mut self, payload: Payload) {
        match payload {
            // whoever presses during the countdown loses, so we win
            Payload::Lose => self.enter(Phase::Win),
            Payload::Win => self.enter(Phase::Lose),
            Payload::Error => self.enter(Phase::ReceiverError),
            Payload::Ready(count) => {
                warn!("peer is {} ready while racing", count);
                self.enter(Phase::SenderError);
            },
        }
    }

    /// local countdown elapsed, start playing unless a peer already ended the race
    pub fn finish_countdown(&mut self) -> bool {
        if self.phase != Phase::Countdown
            {return false}
        self.enter(Phase::Playing);
        true
    }

    /// go back to the lobby if the phase is still `from`
    pub fn reset_from(&mut self, from: Phase) -> bool {
        if self.phase != from
            {return false}
        self.enter(Phase::Lobby);
        true
    }

    /// log the node state, answer to the status query button
    pub fn report(&self) {
        info!("{}, {}/{} ready{}",
            self.phase,
            self.ready,
            self.config.node_count,
            if self.busy {", bus busy"} else {""},
            );
    }
}

fn resumed(resume: bool) -> Exchange {
    if resume {Exchange::Transmit(Transmit::Start)}
    else {Exchange::Idle}
}
