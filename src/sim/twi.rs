use crate::{
    registers::{Control, STATUS_MASK},
    transceiver::Registers,
    };


/// status codes raised by the simulated wires
pub mod status {
    pub const START: u8 = 0x08;
    pub const ADDRESS_ACK: u8 = 0x18;
    pub const ADDRESS_NACK: u8 = 0x20;
    pub const DATA_ACK: u8 = 0x28;
    pub const DATA_NACK: u8 = 0x30;
    pub const ARBITRATION_LOST: u8 = 0x38;
    pub const GENERAL_CALL: u8 = 0x70;
    pub const GENERAL_CALL_DATA_ACK: u8 = 0x90;
    pub const GENERAL_CALL_DATA_NACK: u8 = 0x98;
    pub const STOP_RECEIVED: u8 = 0xa0;
    pub const NO_INFO: u8 = 0xf8;
}

/**
    registers of a simulated TWI peripheral

    software side, it behaves like the chip: TWINT is cleared by writing it to 1 and left untouched when written to 0. Hardware side, the network raises status codes and consumes stop conditions.
*/
#[derive(Clone, Debug)]
pub struct SimTwi {
    control: Control,
    data: u8,
    status: u8,
    start_requests: usize,
}

impl Default for SimTwi {
    fn default() -> Self {Self::new()}
}
impl SimTwi {
    /// peripheral as configured at boot
    pub fn new() -> Self {
        Self {
            control: Control::enabled(),
            data: 0,
            status: status::NO_INFO,
            start_requests: 0,
        }
    }
    /// number of start conditions software armed so far
    pub fn start_requests(&self) -> usize {self.start_requests}

    /// a bus step completed
    pub fn raise(&mut self, status: u8) {
        self.status = status & STATUS_MASK;
        self.control.set_interrupt(true);
    }
    /// a step is waiting for software
    pub fn held(&self) -> bool {
        self.control.interrupt()
    }
    /// force the bus free, as if software had written TWINT
    pub fn release(&mut self) {
        self.control.set_interrupt(false);
        self.status = status::NO_INFO;
    }
    /// a start condition is armed and the bus released
    pub fn starting(&self) -> bool {
        self.control.start() && ! self.control.interrupt()
    }
    /// acknowledge bit of the next incoming byte
    pub fn acknowledging(&self) -> bool {
        self.control.acknowledge()
    }
    /// emit the requested stop condition if any, the hardware clears TWSTO by itself
    pub fn take_stop(&mut self) -> bool {
        let stop = self.control.stop();
        self.control.set_stop(false);
        stop
    }
    /// byte shifted in from the wires
    pub fn latch(&mut self, byte: u8) {
        self.data = byte;
    }
}

impl Registers for SimTwi {
    fn control(&self) -> Control {self.control}
    fn set_control(&mut self, control: Control) {
        if control.start() && ! self.control.start()
            {self.start_requests += 1}
        let held = self.control.interrupt() && ! control.interrupt();
        self.control = control;
        self.control.set_interrupt(held);
        if ! held
            {self.status = status::NO_INFO}
    }
    fn data(&self) -> u8 {self.data}
    fn set_data(&mut self, byte: u8) {self.data = byte}
    fn status_register(&self) -> u8 {self.status}
}
