/*!
    primitives driving the shared bus

    every operation arms the peripheral and returns immediately, the next bus step is announced by the next TWI interrupt. Only [Transceiver::wait_ready] blocks, and it is meant for boot.
*/

use crate::registers::Control;


/// one node's access to the shared bus
pub trait Transceiver {
    /// request a start condition, nothing happens if one is already pending
    fn begin_transaction(&mut self);
    /// emit a stop condition and release the bus
    fn end_transaction(&mut self);
    /// send a byte and let the bus continue
    fn write_byte(&mut self, byte: u8);
    /// last byte latched by the peripheral
    fn read_byte(&mut self) -> u8;
    /**
        choose whether the next incoming byte (or address) is acknowledged, and let the bus continue

        acknowledging keeps this node in the round, not acknowledging closes it. The game uses the later as its receipt.
    */
    fn set_ack(&mut self, ack: bool);
    /// raw status register
    fn status(&self) -> u8;
    /// block until a bus step completed and return the status, boot only
    fn wait_ready(&mut self) -> u8;
}

/// raw register access of a two-wire peripheral, any implementor gets [Transceiver] for free
pub trait Registers {
    fn control(&self) -> Control;
    fn set_control(&mut self, control: Control);
    fn data(&self) -> u8;
    fn set_data(&mut self, byte: u8);
    fn status_register(&self) -> u8;
}

impl<R: Registers> Transceiver for R {
    fn begin_transaction(&mut self) {
        let control = self.control();
        if control.start()
            {return}
        self.set_control(control.begin());
    }
    fn end_transaction(&mut self) {
        let control = self.control();
        self.set_control(control.end());
    }
    fn write_byte(&mut self, byte: u8) {
        self.set_data(byte);
        let control = self.control();
        self.set_control(control.transmit());
    }
    fn read_byte(&mut self) -> u8 {
        self.data()
    }
    fn set_ack(&mut self, ack: bool) {
        let control = self.control();
        self.set_control(control.acknowledge_next(ack));
    }
    fn status(&self) -> u8 {
        self.status_register()
    }
    fn wait_ready(&mut self) -> u8 {
        while ! self.control().interrupt()
            {core::hint::spin_loop()}
        self.status_register()
    }
}
