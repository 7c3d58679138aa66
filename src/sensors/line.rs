//! Data-line capability contract for single-wire sensors.
//!
//! The protocol driver never touches a GPIO register directly — it drives
//! this trait, and the adapter behind it decides whether that means real
//! hardware ([`GpioLine`](crate::drivers::gpio_line::GpioLine)) or a
//! software-simulated line in the host test suite.
//!
//! Implementations must have bounded, predictable call latency: the bit
//! windows are tens of microseconds, and a slow `level()` poll corrupts a
//! read just as surely as a slow sensor.

use embedded_hal::digital::PinState;

/// Direction of the shared data line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// MCU drives the line.
    Output,
    /// Sensor drives the line; MCU samples.
    Input,
}

/// Exclusive handle on the single-wire bus.
///
/// Methods are infallible at this boundary: a platform-level GPIO fault is
/// logged inside the adapter, and the protocol layer observes it as a level
/// that never changes, which its bounded waits already handle.
pub trait DataLine {
    /// Switch the line between MCU-driven and sensor-driven.
    fn set_direction(&mut self, dir: Direction);

    /// Drive the line level.  Only meaningful in [`Direction::Output`].
    fn set_level(&mut self, level: PinState);

    /// Sample the current line level.
    fn level(&mut self) -> PinState;

    /// Busy-wait for `us` microseconds without yielding to the scheduler.
    fn delay_us(&mut self, us: u32);
}
