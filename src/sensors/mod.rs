//! Sensor subsystem — the single-wire protocol driver and its contracts.
//!
//! Read leaf-first: [`line`] is the capability the driver consumes,
//! [`frame`] turns sampled bits into validated readings, and [`dht11`]
//! owns the line and runs the timing-critical transaction.

pub mod dht11;
pub mod frame;
pub mod line;

pub use dht11::Dht11;
pub use frame::{RawFrame, Reading};
