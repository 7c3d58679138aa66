//! Scripted mock data line for integration tests.
//!
//! Models the sensor side of the single-wire bus as a level timeline that
//! starts playing the moment the driver hands the line over (the switch to
//! input).  `delay_us` advances a virtual clock instead of sleeping, so a
//! whole transaction — including the 19 ms start hold — runs in
//! microseconds of real time, deterministically.
//!
//! Every direction/level operation is recorded together with the calling
//! thread, so tests can assert that two transactions never interleave.

use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

use embedded_hal::digital::PinState;
use roomsense::sensors::line::{DataLine, Direction};

/// One recorded line operation, tagged with the calling thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOp {
    SetDirection(Direction),
    SetLevel(PinState),
}

struct Inner {
    now_us: u64,
    direction: Direction,
    driven: PinState,
    /// `(duration µs, level)` segments, played from the switch to input.
    script: Vec<(u64, PinState)>,
    script_start_us: Option<u64>,
    /// Level once the script is exhausted (or when there is none).
    idle: PinState,
    ops: Vec<(ThreadId, LineOp)>,
}

impl Inner {
    fn scripted_level(&self) -> PinState {
        let Some(start) = self.script_start_us else {
            return self.idle;
        };
        let mut t = self.now_us.saturating_sub(start);
        for (dur, level) in &self.script {
            if t < *dur {
                return *level;
            }
            t -= *dur;
        }
        self.idle
    }
}

/// Cloneable handle: the driver takes one clone, the test keeps another
/// for inspection.
#[derive(Clone)]
pub struct MockLine(Arc<Mutex<Inner>>);

impl MockLine {
    /// A sensor that acknowledges and transmits all 40 bits of `bytes`.
    pub fn with_frame(bytes: [u8; 5]) -> Self {
        Self::from_script(script_for(&bytes, 40), PinState::High)
    }

    /// A sensor that transmits only the first `bits` pulses, then holds
    /// the line low forever (mid-frame stall).
    pub fn stalling_after(bytes: [u8; 5], bits: usize) -> Self {
        Self::from_script(script_for(&bytes, bits), PinState::Low)
    }

    /// No sensor on the bus: the pull-up keeps the line high.
    pub fn silent() -> Self {
        Self::from_script(Vec::new(), PinState::High)
    }

    fn from_script(script: Vec<(u64, PinState)>, idle: PinState) -> Self {
        Self(Arc::new(Mutex::new(Inner {
            now_us: 0,
            direction: Direction::Input,
            driven: PinState::High,
            script,
            script_start_us: None,
            idle,
            ops: Vec::new(),
        })))
    }

    pub fn ops(&self) -> Vec<(ThreadId, LineOp)> {
        self.0.lock().unwrap().ops.clone()
    }

    /// Virtual microseconds consumed so far.
    pub fn elapsed_us(&self) -> u64 {
        self.0.lock().unwrap().now_us
    }
}

impl DataLine for MockLine {
    fn set_direction(&mut self, dir: Direction) {
        let mut g = self.0.lock().unwrap();
        g.direction = dir;
        if dir == Direction::Input {
            // Handover: the sensor timeline starts now.
            let start = g.now_us;
            g.script_start_us = Some(start);
        }
        g.ops
            .push((std::thread::current().id(), LineOp::SetDirection(dir)));
    }

    fn set_level(&mut self, level: PinState) {
        let mut g = self.0.lock().unwrap();
        g.driven = level;
        g.ops
            .push((std::thread::current().id(), LineOp::SetLevel(level)));
    }

    fn level(&mut self) -> PinState {
        let g = self.0.lock().unwrap();
        match g.direction {
            Direction::Output => g.driven,
            Direction::Input => g.scripted_level(),
        }
    }

    fn delay_us(&mut self, us: u32) {
        self.0.lock().unwrap().now_us += u64::from(us);
    }
}

/// Build the sensor-side timeline: response delay, the 80 µs / 80 µs
/// acknowledge pair, then the first `nbits` pulses (50 µs low separator +
/// width-encoded high), MSB first, with the closing separator after a
/// complete frame.
fn script_for(bytes: &[u8; 5], nbits: usize) -> Vec<(u64, PinState)> {
    let mut s = vec![
        (30, PinState::High),
        (80, PinState::Low),
        (80, PinState::High),
    ];
    for bit in 0..nbits {
        let byte = bytes[bit / 8];
        let one = (byte >> (7 - (bit % 8))) & 1 == 1;
        s.push((50, PinState::Low));
        s.push((if one { 70 } else { 26 }, PinState::High));
    }
    if nbits == 40 {
        s.push((50, PinState::Low));
    }
    s
}
