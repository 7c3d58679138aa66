//! DHT11 single-wire protocol driver.
//!
//! One transaction is a tight, blocking sequence: an 18 ms start-signal
//! hold, the sensor's 80 µs / 80 µs acknowledge, then 40 bits encoded as
//! pulse widths (a 50 µs low separator before every bit, then ~26–28 µs
//! high for "0" and ~70 µs high for "1").  The whole exchange finishes in
//! under 25 ms and must not be preempted mid-bit, so the driver busy-polls
//! with microsecond delays instead of sleeping.
//!
//! Every level wait is bounded.  A sensor that never answers costs the
//! caller a few hundred microseconds past the start signal, not a hung
//! serving thread.

use std::sync::{Mutex, PoisonError};

use embedded_hal::digital::PinState;
use log::debug;

use crate::config::SensorTiming;
use crate::error::SensorError;
use crate::sensors::frame::{self, RawFrame, Reading, FRAME_BITS};
use crate::sensors::line::{DataLine, Direction};

/// Protocol phase of the in-flight transaction.  Ephemeral: created when a
/// read starts, gone when it returns.  On a timeout, the phase picks the
/// error kind — a miss during the handshake means the sensor never showed
/// up, a miss mid-frame means it stalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Requesting,
    AwaitingAck,
    Ready,
    Bit(u8),
}

/// DHT11 transport: owns the data line and runs end-to-end transactions.
///
/// Concurrent callers are serialized: the line is guarded by a mutex held
/// for the whole transaction, so a second `read` blocks until the first
/// completes.  There is no automatic retry — every error kind is surfaced
/// to the caller, which decides whether to try again.
pub struct Dht11<L: DataLine> {
    line: Mutex<L>,
    timing: SensorTiming,
}

impl<L: DataLine> Dht11<L> {
    pub fn new(line: L, timing: SensorTiming) -> Self {
        Self {
            line: Mutex::new(line),
            timing,
        }
    }

    /// Run one full transaction: handshake, 40-bit capture, checksum
    /// validation.  Blocks while another caller's transaction is in flight.
    pub fn read(&self) -> Result<Reading, SensorError> {
        let mut line = self
            .line
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let captured = Transaction::new(&mut *line, &self.timing).run();

        // Idle the bus high again whether or not the transaction succeeded,
        // so the sensor can recharge for the next start signal.
        line.set_direction(Direction::Output);
        line.set_level(PinState::High);

        let reading = captured?.decode()?;
        debug!(
            "dht11: {}%RH {}°C",
            reading.humidity_percent, reading.temperature_celsius
        );
        Ok(reading)
    }
}

/// One in-flight transaction over an exclusively-held line.
struct Transaction<'a, L: DataLine> {
    line: &'a mut L,
    timing: &'a SensorTiming,
    phase: Phase,
}

impl<'a, L: DataLine> Transaction<'a, L> {
    fn new(line: &'a mut L, timing: &'a SensorTiming) -> Self {
        Self {
            line,
            timing,
            phase: Phase::Idle,
        }
    }

    fn run(mut self) -> Result<RawFrame, SensorError> {
        self.handshake()?;
        self.capture_frame()
    }

    /// Drive the start handshake.
    ///
    /// Hold the line low long enough for the sensor to notice, release it,
    /// hand the line over, then require the sensor's low/high acknowledge
    /// pair before any bit is trusted.
    fn handshake(&mut self) -> Result<(), SensorError> {
        self.phase = Phase::Requesting;
        self.line.set_direction(Direction::Output);
        self.line.set_level(PinState::Low);
        self.line.delay_us(self.timing.start_hold_us);

        self.line.set_level(PinState::High);
        self.line.delay_us(self.timing.release_us);
        self.line.set_direction(Direction::Input);

        self.phase = Phase::AwaitingAck;
        self.wait_for(PinState::Low, self.timing.ack_timeout_us)?;
        self.wait_for(PinState::High, self.timing.ack_timeout_us)?;

        self.phase = Phase::Ready;
        Ok(())
    }

    /// Pull 40 bits off the line and fold them into the payload bytes.
    fn capture_frame(&mut self) -> Result<RawFrame, SensorError> {
        let mut bits = [false; FRAME_BITS];
        for (i, bit) in bits.iter_mut().enumerate() {
            *bit = self.sample_bit(i as u8)?;
        }
        Ok(frame::assemble(&bits))
    }

    /// Extract one bit from pulse width.
    ///
    /// Synchronise on the low→high transition that ends the 50 µs
    /// separator, wait out the sample delay, and read the level: a "0"
    /// pulse has already dropped by then, a "1" pulse is still high.
    /// Then wait for the line to fall so the next call starts aligned.
    fn sample_bit(&mut self, index: u8) -> Result<bool, SensorError> {
        self.phase = Phase::Bit(index);
        self.wait_for(PinState::Low, self.timing.bit_timeout_us)?;
        self.wait_for(PinState::High, self.timing.bit_timeout_us)?;

        self.line.delay_us(self.timing.sample_delay_us);
        let bit = self.line.level() == PinState::High;

        self.wait_for(PinState::Low, self.timing.bit_timeout_us)?;
        Ok(bit)
    }

    /// Poll until the line reads `level`, at most `timeout_us` iterations
    /// of 1 µs each.  Converts an electrical fault from "hang forever"
    /// into a typed error for the current phase.
    fn wait_for(&mut self, level: PinState, timeout_us: u32) -> Result<(), SensorError> {
        for _ in 0..timeout_us {
            if self.line.level() == level {
                return Ok(());
            }
            self.line.delay_us(1);
        }
        Err(self.timeout_error())
    }

    fn timeout_error(&self) -> SensorError {
        match self.phase {
            Phase::Bit(bit) => SensorError::LineTimeout { bit },
            Phase::Idle | Phase::Requesting | Phase::AwaitingAck | Phase::Ready => {
                SensorError::NotResponding
            }
        }
    }
}
