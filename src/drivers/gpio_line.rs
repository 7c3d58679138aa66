//! ESP-IDF implementation of the single-wire data line.
//!
//! Thin wrapper over the IDF GPIO driver plus the ROM busy-delay, the same
//! primitives the sensor's timing diagram is written against.  Direction
//! and level calls go straight to the registers; the microsecond delay is
//! `esp_rom_delay_us`, which spins without yielding to FreeRTOS.
//!
//! On host targets the line is simulated as permanently pulled up with no
//! sensor attached: every transaction ends in a not-responding error.  The
//! test suite uses its own scripted line instead.

use embedded_hal::digital::PinState;
#[cfg(target_os = "espidf")]
use log::error;

use crate::error::{Error, Result};
use crate::sensors::line::{DataLine, Direction};

/// Exclusive handle on the sensor's GPIO.
pub struct GpioLine {
    gpio: i32,
}

impl GpioLine {
    /// Claim `gpio` for single-wire use and idle it high.
    pub fn new(gpio: i32) -> Result<Self> {
        if !(0..=39).contains(&gpio) {
            return Err(Error::Init("data line GPIO out of range"));
        }
        let mut line = Self { gpio };
        line.platform_init()?;
        line.set_direction(Direction::Output);
        line.set_level(PinState::High);
        Ok(line)
    }

    #[cfg(target_os = "espidf")]
    fn platform_init(&mut self) -> Result<()> {
        // SAFETY: gpio is range-checked in new(); reset only touches this
        // pin's own pad configuration.
        let ret = unsafe { esp_idf_sys::gpio_reset_pin(self.gpio) };
        if ret != esp_idf_sys::ESP_OK {
            return Err(Error::Init("gpio_reset_pin failed"));
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_init(&mut self) -> Result<()> {
        log::info!("gpio_line(sim): GPIO{} idles high, no sensor attached", self.gpio);
        Ok(())
    }
}

#[cfg(target_os = "espidf")]
impl DataLine for GpioLine {
    fn set_direction(&mut self, dir: Direction) {
        let mode = match dir {
            Direction::Output => esp_idf_sys::gpio_mode_t_GPIO_MODE_OUTPUT,
            Direction::Input => esp_idf_sys::gpio_mode_t_GPIO_MODE_INPUT,
        };
        // SAFETY: gpio validated at construction; the IDF driver serialises
        // pad configuration internally.
        let ret = unsafe { esp_idf_sys::gpio_set_direction(self.gpio, mode) };
        if ret != esp_idf_sys::ESP_OK {
            error!("gpio_line: set_direction failed (rc={ret})");
        }
    }

    fn set_level(&mut self, level: PinState) {
        // SAFETY: same contract as set_direction.
        let ret =
            unsafe { esp_idf_sys::gpio_set_level(self.gpio, matches!(level, PinState::High) as u32) };
        if ret != esp_idf_sys::ESP_OK {
            error!("gpio_line: set_level failed (rc={ret})");
        }
    }

    fn level(&mut self) -> PinState {
        // SAFETY: gpio_get_level is a register read, cannot fail.
        if unsafe { esp_idf_sys::gpio_get_level(self.gpio) } == 0 {
            PinState::Low
        } else {
            PinState::High
        }
    }

    fn delay_us(&mut self, us: u32) {
        // SAFETY: ROM spin-delay, no side effects.
        unsafe { esp_idf_sys::esp_rom_delay_us(us) };
    }
}

#[cfg(not(target_os = "espidf"))]
impl DataLine for GpioLine {
    fn set_direction(&mut self, _dir: Direction) {}

    fn set_level(&mut self, _level: PinState) {}

    fn level(&mut self) -> PinState {
        PinState::High
    }

    fn delay_us(&mut self, _us: u32) {}
}
