//! RoomSense firmware — main entry point.
//!
//! Boot order follows the appliance's dependency chain: platform patches,
//! logger, NVS (the WiFi stack's calibration store), WiFi station join,
//! sensor transport, HTTP monitor, then the status/reconnect poll loop.
//!
//! The binary is ESP-IDF only (`required-features = ["espidf"]`); all
//! host-side testing goes through the library crate.

#![deny(unused_must_use)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use roomsense::adapters::httpd::HttpMonitor;
use roomsense::adapters::wifi::{ConnectivityPort, WifiAdapter, WifiState};
use roomsense::config::SystemConfig;
use roomsense::drivers::gpio_line::GpioLine;
use roomsense::drivers::status_led::StatusLed;
use roomsense::pins;
use roomsense::sensors::Dht11;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("RoomSense v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    // Credentials come in at build time, sdkconfig-style.
    let mut config = SystemConfig::default();
    if let Some(ssid) = option_env!("ROOMSENSE_WIFI_SSID") {
        config
            .wifi
            .ssid
            .push_str(ssid)
            .map_err(|_| anyhow::anyhow!("ROOMSENSE_WIFI_SSID exceeds 32 bytes"))?;
    }
    if let Some(pass) = option_env!("ROOMSENSE_WIFI_PASS") {
        config
            .wifi
            .password
            .push_str(pass)
            .map_err(|_| anyhow::anyhow!("ROOMSENSE_WIFI_PASS exceeds 64 bytes"))?;
    }

    // ── 3. WiFi station join ──────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let driver = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?;
    let mut wifi = WifiAdapter::new(driver, config.wifi.max_retries);
    wifi.set_credentials(config.wifi.ssid.as_str(), config.wifi.password.as_str())
        .map_err(roomsense::error::Error::from)?;
    if let Err(e) = wifi.connect() {
        // Not fatal: the monitor still serves (with sensor data only) and
        // the poll loop keeps retrying up to the configured budget.
        warn!("initial WiFi join failed ({}); retrying in the loop", e);
    }

    // ── 4. Sensor transport + HTTP monitor ────────────────────
    let line = GpioLine::new(config.dht_gpio)?;
    let dht = Arc::new(Dht11::new(line, config.sensor));
    let _monitor = HttpMonitor::start(Arc::clone(&dht), config.http_port)?;

    // ── 5. Status / reconnect loop ────────────────────────────
    let mut led = StatusLed::new(pins::STATUS_LED_GPIO);
    loop {
        wifi.poll();
        led.set(wifi.is_connected());
        let sleep_secs = match wifi.state() {
            WifiState::Reconnecting { .. } => u64::from(wifi.backoff_secs().max(1)),
            _ => 1,
        };
        thread::sleep(Duration::from_secs(sleep_secs));
    }
}
