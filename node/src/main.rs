//! firmware of one game node, every board of the bus runs the same program

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]

mod twi;
mod leds;

use core::cell::RefCell;
use critical_section::{CriticalSection, Mutex};
use panic_halt as _;
use arduino_hal::pac;
use avr_device::interrupt;
use log::*;

use racebus::{
    Config,
    game::Game,
    button::{Button, Intent},
    render::Renderer,
    journal::Journal,
    registers,
    };
use crate::{
    twi::AvrTwi,
    leds::Leds,
    };

include!(concat!(env!("OUT_DIR"), "/nodes.rs"));

const CPU: u32 = 16_000_000;
const SCL: u32 = 100_000;
const BAUDRATE: u32 = 57600;

const CONFIG: Config = match Config::new(NODE_COUNT) {
    Ok(config) => config,
    Err(_) => panic!("RACEBUS_NODE_COUNT out of range"),
};
const BIT_RATE: u8 = match registers::bit_rate(CPU, SCL) {
    Ok(twbr) => twbr,
    Err(_) => panic!("SCL frequency unreachable"),
};

static GAME: Mutex<RefCell<Game>> = Mutex::new(RefCell::new(Game::new(CONFIG)));
static BUS: Mutex<RefCell<Option<AvrTwi>>> = Mutex::new(RefCell::new(None));
static TAKE: Mutex<RefCell<Button>> = Mutex::new(RefCell::new(Button::new(Intent::TakeBus)));
static QUERY: Mutex<RefCell<Button>> = Mutex::new(RefCell::new(Button::new(Intent::QueryStatus)));
static JOURNAL: Journal<8> = Journal::new(LevelFilter::Info);


#[arduino_hal::entry]
fn main() -> ! {
    let dp = arduino_hal::Peripherals::take().unwrap();
    let pins = arduino_hal::pins!(dp);
    let mut serial = arduino_hal::default_serial!(dp, pins, BAUDRATE);

    // SAFETY: interrupts are not enabled yet, nothing else logs
    unsafe {
        log::set_logger_racy(&JOURNAL).ok();
        log::set_max_level_racy(JOURNAL.level());
    }

    let mut leds = Leds {
        bar: [
            pins.d8.into_output().downgrade(),
            pins.d9.into_output().downgrade(),
            pins.d10.into_output().downgrade(),
            pins.d12.into_output().downgrade(),
            ],
        red: pins.d6.into_output().downgrade(),
        green: pins.d5.into_output().downgrade(),
        blue: pins.d3.into_output().downgrade(),
    };

    // buttons pull to ground, both edges interrupt
    let _take = pins.d2.into_pull_up_input();
    let _query = pins.d4.into_pull_up_input();
    // INT0 on any logical change of d2
    dp.EXINT.eicra().write(|w| unsafe {w.bits(0b01)});
    dp.EXINT.eimsk().write(|w| unsafe {w.bits(0b01)});
    // PCINT20 (d4) through the port D pin change interrupt
    dp.EXINT.pcicr().write(|w| unsafe {w.bits(0b100)});
    dp.EXINT.pcmsk2().write(|w| unsafe {w.bits(1 << 4)});

    // open drain lines of the bus, external pull-ups are still advised
    let _sda = pins.a4.into_pull_up_input();
    let _scl = pins.a5.into_pull_up_input();
    let bus = AvrTwi::new(dp.TWI, BIT_RATE);
    critical_section::with(|cs| BUS.borrow_ref_mut(cs).replace(bus));

    info!("node of {} at {} Hz", NODE_COUNT, registers::scl_frequency(CPU, BIT_RATE));
    // SAFETY: we are not inside a critical section
    unsafe {interrupt::enable()};

    let mut renderer = Renderer::new(CONFIG);
    let mut dropped = 0;
    loop {
        let (phase, ready) = critical_section::with(|cs| {
            let game = GAME.borrow_ref(cs);
            (game.phase(), game.ready())
        });
        let tick = renderer.frame(phase, ready, &mut leds);

        JOURNAL.drain(|line| {
            for byte in line.bytes()
                {serial.write_byte(byte)}
            serial.write_byte(b'\n');
        });
        if JOURNAL.dropped() != dropped {
            dropped = JOURNAL.dropped();
            for byte in b"log lines lost\n"
                {serial.write_byte(*byte)}
        }

        arduino_hal::delay_ms(tick.delay_ms.into());
        if let Some(exit) = tick.exit {
            critical_section::with(|cs| exit.apply(&mut GAME.borrow_ref_mut(cs), phase));
        }
    }
}

/// run a button intent against the game, the bus interrupt cannot fire meanwhile
fn apply(cs: CriticalSection, intent: Intent) {
    if let Some(bus) = BUS.borrow_ref_mut(cs).as_mut() {
        intent.apply(&mut GAME.borrow_ref_mut(cs), bus);
    }
}

/// wait for a button to settle and forget the edges it raised meanwhile
fn debounce(flags: impl FnOnce(&pac::EXINT)) {
    arduino_hal::delay_ms(CONFIG.debounce_ms.into());
    // SAFETY: only the flag registers are written, and only from interrupts which cannot nest
    let dp = unsafe {pac::Peripherals::steal()};
    flags(&dp.EXINT);
}

#[interrupt(atmega328p)]
fn TWI() {
    critical_section::with(|cs| {
        if let Some(bus) = BUS.borrow_ref_mut(cs).as_mut() {
            GAME.borrow_ref_mut(cs).on_interrupt(bus);
        }
    });
}

#[interrupt(atmega328p)]
fn INT0() {
    critical_section::with(|cs| {
        if let Some(intent) = TAKE.borrow_ref_mut(cs).edge() {
            apply(cs, intent);
        }
    });
    // writing one clears INTF0
    debounce(|exint| exint.eifr().write(|w| unsafe {w.bits(0b01)}));
}

#[interrupt(atmega328p)]
fn PCINT2() {
    critical_section::with(|cs| {
        if let Some(intent) = QUERY.borrow_ref_mut(cs).edge() {
            apply(cs, intent);
        }
    });
    // writing one clears PCIF2
    debounce(|exint| exint.pcifr().write(|w| unsafe {w.bits(0b100)}));
}
