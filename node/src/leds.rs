/*!
    LEDs of a board

    - bar graph on d8, d9, d10, d12 (PB0, PB1, PB2, PB4)
    - status indicator on d6 (red), d5 (green), d3 (blue)
*/

use arduino_hal::port::{Pin, mode::Output};
use racebus::render::{Color, Indicator};


pub struct Leds {
    pub bar: [Pin<Output>; 4],
    pub red: Pin<Output>,
    pub green: Pin<Output>,
    pub blue: Pin<Output>,
}

fn set(pin: &mut Pin<Output>, on: bool) {
    if on {pin.set_high()}
    else {pin.set_low()}
}

impl Indicator for Leds {
    fn display(&mut self, value: u8) {
        for (i, led) in self.bar.iter_mut().enumerate() {
            set(led, value & (1 << i) != 0);
        }
    }
    fn set_indicator(&mut self, color: Color) {
        set(&mut self.red, color == Color::Red);
        set(&mut self.green, color == Color::Green);
        set(&mut self.blue, color == Color::Blue);
    }
}
