/*!
    two-wire peripheral of the ATmega328P, driven through its raw registers
*/

use arduino_hal::pac::TWI;
use racebus::{
    registers::{Control, SlaveAddress},
    transceiver::Registers,
    };


pub struct AvrTwi {
    twi: TWI,
}

impl AvrTwi {
    /// configure the peripheral: prescaler 1, general call recognition, interrupt driven
    pub fn new(twi: TWI, bit_rate: u8) -> Self {
        twi.twbr().write(|w| unsafe {w.bits(bit_rate)});
        twi.twsr().write(|w| unsafe {w.bits(0)});
        twi.twar().write(|w| unsafe {w.bits(SlaveAddress::general_call_only().into())});
        twi.twcr().write(|w| unsafe {w.bits(Control::enabled().into())});
        Self {twi}
    }
}

impl Registers for AvrTwi {
    fn control(&self) -> Control {
        Control::from(self.twi.twcr().read().bits())
    }
    fn set_control(&mut self, control: Control) {
        self.twi.twcr().write(|w| unsafe {w.bits(control.into())});
    }
    fn data(&self) -> u8 {
        self.twi.twdr().read().bits()
    }
    fn set_data(&mut self, byte: u8) {
        self.twi.twdr().write(|w| unsafe {w.bits(byte)});
    }
    fn status_register(&self) -> u8 {
        self.twi.twsr().read().bits()
    }
}
