//! GPIO pin assignments for the RoomSense board.
//!
//! Single source of truth — drivers reference this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

/// DHT11 single-wire data line.  Requires an external ~5 kΩ pull-up; the
/// bus idles high and either end may pull it low.
pub const DHT_DATA_GPIO: i32 = 4;

/// Blue status LED (active HIGH).  Lit while the station is associated.
pub const STATUS_LED_GPIO: i32 = 16;
