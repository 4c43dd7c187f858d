/*!
    log sink usable from interrupt context

    records are formatted into fixed size lines and queued, the main loop drains them to a slow output (the serial line on target). Nothing blocks on the output while logging, when the queue is full the oldest line is lost and counted.
*/

use core::{
    cell::RefCell,
    fmt::{self, Write},
    };
use critical_section::Mutex;
use heapless::{Deque, String};
use log::{Log, Metadata, Record, LevelFilter};


/// maximum length of a logged line, longer records are truncated
pub const LINE: usize = 80;
pub type Line = String<LINE>;

pub struct Journal<const LINES: usize> {
    level: LevelFilter,
    buffer: Mutex<RefCell<Buffer<LINES>>>,
}
struct Buffer<const LINES: usize> {
    lines: Deque<Line, LINES>,
    dropped: u32,
}

impl<const LINES: usize> Journal<LINES> {
    pub const fn new(level: LevelFilter) -> Self {
        Self {
            level,
            buffer: Mutex::new(RefCell::new(Buffer {
                lines: Deque::new(),
                dropped: 0,
            })),
        }
    }
    pub fn level(&self) -> LevelFilter {self.level}
    /// number of lines lost because the queue was full
    pub fn dropped(&self) -> u32 {
        critical_section::with(|cs| self.buffer.borrow_ref(cs).dropped)
    }
    /// pass every queued line to `output`, oldest first, the queue is only locked while taking each line
    pub fn drain(&self, mut output: impl FnMut(&str)) {
        while let Some(line) = critical_section::with(|cs| self.buffer.borrow_ref_mut(cs).lines.pop_front()) {
            output(&line);
        }
    }
    fn push(&self, line: Line) {
        critical_section::with(|cs| {
            let mut buffer = self.buffer.borrow_ref_mut(cs);
            if buffer.lines.is_full() {
                buffer.lines.pop_front();
                buffer.dropped = buffer.dropped.wrapping_add(1);
            }
            buffer.lines.push_back(line).ok();
        })
    }
}

impl<const LINES: usize> Log for Journal<LINES> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }
    fn log(&self, record: &Record) {
        if ! self.enabled(record.metadata())
            {return}
        let mut line = Line::new();
        // a truncated line is still worth keeping
        write!(Truncate(&mut line), "{} {}", record.level(), record.args()).ok();
        self.push(line);
    }
    fn flush(&self) {}
}

/// writer dropping whatever does not fit
struct Truncate<'a>(&'a mut Line);
impl fmt::Write for Truncate<'_> {
    fn write_str(&mut self, text: &str) -> fmt::Result {
        for c in text.chars() {
            if self.0.push(c).is_err()
                {break}
        }
        Ok(())
    }
}
