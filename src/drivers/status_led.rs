//! Blue status LED driver.
//!
//! Plain on/off GPIO, no PWM.  The main loop lights it while the station
//! is associated so the board shows network state at a glance.

#[cfg(target_os = "espidf")]
use log::error;

/// Active-high status LED.
pub struct StatusLed {
    gpio: i32,
    lit: bool,
}

impl StatusLed {
    pub fn new(gpio: i32) -> Self {
        let mut led = Self { gpio, lit: false };
        led.platform_init();
        led.set(false);
        led
    }

    /// Light or extinguish the LED.  Redundant writes are skipped.
    pub fn set(&mut self, lit: bool) {
        if lit == self.lit {
            return;
        }
        self.lit = lit;
        self.platform_write(lit);
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    #[cfg(target_os = "espidf")]
    fn platform_init(&mut self) {
        // SAFETY: pad reset + direction on this LED's own pin only.
        unsafe {
            if esp_idf_sys::gpio_reset_pin(self.gpio) != esp_idf_sys::ESP_OK {
                error!("status_led: gpio_reset_pin failed");
            }
            if esp_idf_sys::gpio_set_direction(
                self.gpio,
                esp_idf_sys::gpio_mode_t_GPIO_MODE_OUTPUT,
            ) != esp_idf_sys::ESP_OK
            {
                error!("status_led: gpio_set_direction failed");
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_init(&mut self) {}

    #[cfg(target_os = "espidf")]
    fn platform_write(&mut self, lit: bool) {
        // SAFETY: gpio configured as output in platform_init.
        if unsafe { esp_idf_sys::gpio_set_level(self.gpio, lit as u32) } != esp_idf_sys::ESP_OK {
            error!("status_led: gpio_set_level failed");
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_write(&mut self, lit: bool) {
        log::debug!("status_led(sim): GPIO{} {}", self.gpio, if lit { "on" } else { "off" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_requested_state() {
        let mut led = StatusLed::new(16);
        assert!(!led.is_lit());
        led.set(true);
        assert!(led.is_lit());
        led.set(true);
        assert!(led.is_lit());
        led.set(false);
        assert!(!led.is_lit());
    }
}
