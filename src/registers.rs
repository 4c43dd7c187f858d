/*!
    layout of the ATmega328P two-wire interface registers

    bit layouts are declared with `bilge` so that register values can be composed field by field and still be written as a single byte. Status codes are an enum with a fallback, every byte read from TWSR maps to a variant.
*/

use bilge::prelude::*;
use crate::error::Error;


/// TWCR, control register
#[bitsize(8)]
#[derive(Copy, Clone, FromBits, DebugBits, PartialEq, Default)]
pub struct Control {
    /// TWIE, raise the TWI interrupt while `interrupt` is set
    pub interrupt_enable: bool,
    _reserved: u1,
    /// TWEN, connect the peripheral to the SDA/SCL pins
    pub enable: bool,
    /// TWWC, data register written while the peripheral was busy
    pub write_collision: bool,
    /// TWSTO, emit a stop condition
    pub stop: bool,
    /// TWSTA, emit a start condition as soon as the bus is free
    pub start: bool,
    /// TWEA, acknowledge the next byte received (or our address)
    pub acknowledge: bool,
    /**
        TWINT, set by hardware when a bus step completed

        the bus is held until software writes it to 1, which clears it. Every value written with this bit set therefore releases the bus.
    */
    pub interrupt: bool,
}

impl Control {
    /// value written at boot: peripheral enabled, listening to the general call, interrupt driven
    pub fn enabled() -> Self {
        let mut control = Self::from(0);
        control.set_enable(true);
        control.set_acknowledge(true);
        control.set_interrupt_enable(true);
        control
    }
    /**
        request a start condition

        when a bus step is waiting for service (`interrupt` set), the flag is written back to 0 so that the step is not acknowledged behind the interrupt handler's back. The start is then emitted once the handler releases the bus.
    */
    pub fn begin(self) -> Self {
        let mut control = self;
        control.set_start(true);
        control.set_interrupt(! self.interrupt());
        control
    }
    /// request a stop condition and release the bus
    pub fn end(self) -> Self {
        let mut control = self;
        control.set_start(false);
        control.set_stop(true);
        control.set_interrupt(true);
        control
    }
    /// send the byte loaded in TWDR
    pub fn transmit(self) -> Self {
        let mut control = self;
        control.set_start(false);
        control.set_interrupt(true);
        control
    }
    /// choose the acknowledge bit answered to the next received byte and release the bus, a pending start stays armed
    pub fn acknowledge_next(self, ack: bool) -> Self {
        let mut control = self;
        control.set_acknowledge(ack);
        control.set_interrupt(true);
        control
    }
}

/// TWAR, own slave address
#[bitsize(8)]
#[derive(Copy, Clone, FromBits, DebugBits, PartialEq, Default)]
pub struct SlaveAddress {
    /// TWGCE, answer the general call address
    pub general_call: bool,
    /// TWA, own 7 bit address
    pub address: u7,
}

impl SlaveAddress {
    /// the game only talks through the general call, the own address is left to 0
    pub fn general_call_only() -> Self {
        Self::new(true, u7::new(0))
    }
}

/// mask removing the prescaler bits from TWSR
pub const STATUS_MASK: u8 = 0xf8;

/// TWSR status codes met by a node both transmitting and receiving general calls
#[bitsize(8)]
#[derive(Copy, Clone, FromBits, Debug, PartialEq)]
pub enum Status {
    /// illegal start or stop seen on the bus
    BusError = 0x00,
    Start = 0x08,
    RepeatedStart = 0x10,
    /// address + write sent, acknowledged
    AddressAck = 0x18,
    /// address + write sent, not acknowledged
    AddressNack = 0x20,
    /// data sent, acknowledged
    DataAck = 0x28,
    /// data sent, not acknowledged
    DataNack = 0x30,
    /// arbitration lost while sending address or data
    ArbitrationLost = 0x38,
    /// general call received, acknowledged
    GeneralCall = 0x70,
    /// arbitration lost, then addressed by the general call of the winner
    ArbitrationLostGeneralCall = 0x78,
    /// general call data received, acknowledged
    GeneralCallDataAck = 0x90,
    /// general call data received, not acknowledged
    GeneralCallDataNack = 0x98,
    /// stop or repeated start received while addressed
    StopReceived = 0xa0,
    /// no relevant state information
    NoInfo = 0xf8,
    #[fallback]
    Unknown = 0xff,
}

impl Status {
    /// status from a raw TWSR value, whatever its prescaler bits
    pub fn read(twsr: u8) -> Self {
        Self::from(twsr & STATUS_MASK)
    }
}

/// TWBR value giving the requested SCL frequency with prescaler 1, as `scl = cpu / (16 + 2 * TWBR)`
pub const fn bit_rate(cpu: u32, scl: u32) -> Result<u8, Error> {
    if scl == 0 || cpu / scl < 16
        {return Err(Error::BitRate {scl})}
    let twbr = (cpu / scl - 16) / 2;
    if twbr > u8::MAX as u32
        {return Err(Error::BitRate {scl})}
    Ok(twbr as u8)
}

/// SCL frequency obtained with the given TWBR value and prescaler 1
pub const fn scl_frequency(cpu: u32, twbr: u8) -> u32 {
    cpu / (16 + 2 * twbr as u32)
}
