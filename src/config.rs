//! System configuration parameters
//!
//! All tunable parameters for the RoomSense monitor.  Defaults come from the
//! DHT11 datasheet and the board pin map; WiFi credentials are normally
//! injected at build time (see `main.rs`).

use serde::{Deserialize, Serialize};

use crate::pins;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// GPIO of the sensor data line.
    pub dht_gpio: i32,
    /// Protocol timing for the single-wire transaction.
    pub sensor: SensorTiming,
    /// Station-mode WiFi parameters.
    pub wifi: WifiConfig,
    /// TCP port for the monitor page.
    pub http_port: u16,
}

/// Timing constants for one sensor transaction.
///
/// The datasheet values are deliberately configuration fields rather than
/// literals in the driver: marginal sensors sometimes need a longer start
/// hold or a shifted sample point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensorTiming {
    /// Start-signal low hold (µs).  The datasheet minimum is 18 ms.
    pub start_hold_us: u32,
    /// High release before the line switches to input (µs).
    pub release_us: u32,
    /// Bound on each acknowledge-pulse wait during the handshake (µs).
    /// The sensor answers within 20–40 µs with 80 µs pulses.
    pub ack_timeout_us: u32,
    /// Bound on each level wait while sampling a bit (µs).  The separator
    /// is 50 µs and a "1" pulse tops out near 70 µs.
    pub bit_timeout_us: u32,
    /// Settle delay after a bit's rising edge before sampling (µs).
    /// Must land after a "0" pulse ends (~26–28 µs) and before a "1"
    /// pulse does.
    pub sample_delay_us: u32,
}

/// Station-mode WiFi parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiConfig {
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
    /// Join attempts before the adapter gives up and reports failure.
    pub max_retries: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            dht_gpio: pins::DHT_DATA_GPIO,
            sensor: SensorTiming::default(),
            wifi: WifiConfig::default(),
            http_port: 80,
        }
    }
}

impl Default for SensorTiming {
    fn default() -> Self {
        Self {
            start_hold_us: 19_000,
            release_us: 30,
            ack_timeout_us: 200,
            bit_timeout_us: 150,
            sample_delay_us: 30,
        }
    }
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            max_retries: 20,
        }
    }
}
