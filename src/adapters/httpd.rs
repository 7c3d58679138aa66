//! HTTP monitor adapter.
//!
//! Serves the readings page on `/`.  Each inbound request triggers exactly
//! one sensor transaction; the handler formats the result and never lets a
//! sensor failure escape as anything worse than a fallback page.
//!
//! Page rendering is a pure function so the host test suite can cover it
//! without a server; the `EspHttpServer` wiring is ESP-IDF only.

use std::sync::Arc;

use log::{info, warn};

use crate::error::SensorError;
#[cfg(target_os = "espidf")]
use crate::error::{CommsError, Error};
use crate::sensors::dht11::Dht11;
use crate::sensors::frame::Reading;
use crate::sensors::line::DataLine;

/// Path of the monitor page.
pub const INDEX_PATH: &str = "/";

/// Render the monitor page for one read outcome.
///
/// Only whole-unit readings are shown; on failure the readings section is
/// replaced by a sensor-error indication rather than stale or garbage
/// values.
pub fn render_page(result: &Result<Reading, SensorError>) -> String {
    let body = match result {
        Ok(r) => format!(
            "<p>DHT11 Temperature Reading: {}&deg;C</p>\n<p>DHT11 Humidity Reading: {}%</p>",
            r.temperature_celsius, r.humidity_percent
        ),
        Err(_) => "<p>DHT11 sensor error</p>".to_string(),
    };
    format!(
        "<!DOCTYPE html><html>\n<head>\n<style>\nhtml {{font-family: sans-serif; text-align: center;}}\n</style>\n</head>\n<body>\n<div>\n<h1>RoomSense IoT Server</h1>\n</div>\n<div>\n<h3>Temperature and Humidity Monitor</h3>\n{body}\n</div>\n</body>\n</html>"
    )
}

/// Handle one monitor request: read the sensor, log the outcome, render.
pub fn handle_index<L: DataLine>(dht: &Dht11<L>) -> String {
    let result = dht.read();
    match &result {
        Ok(r) => info!("monitor: {}%RH {}°C", r.humidity_percent, r.temperature_celsius),
        Err(e) => warn!("monitor: read failed — {}", e),
    }
    render_page(&result)
}

/// Running HTTP server; dropping it stops the listener.
pub struct HttpMonitor {
    #[cfg(target_os = "espidf")]
    _server: esp_idf_svc::http::server::EspHttpServer<'static>,
}

#[cfg(target_os = "espidf")]
impl HttpMonitor {
    /// Bind `port` and register the monitor page handler.
    pub fn start<L>(dht: Arc<Dht11<L>>, port: u16) -> crate::error::Result<Self>
    where
        L: DataLine + Send + 'static,
    {
        use esp_idf_svc::http::server::{Configuration, EspHttpServer};
        use esp_idf_svc::http::Method;
        use esp_idf_svc::io::Write;

        let conf = Configuration {
            http_port: port,
            ..Default::default()
        };
        let mut server =
            EspHttpServer::new(&conf).map_err(|_| Error::Comms(CommsError::HttpStartFailed))?;

        server
            .fn_handler(INDEX_PATH, Method::Get, move |req| -> anyhow::Result<()> {
                let page = handle_index(&dht);
                req.into_ok_response()?.write_all(page.as_bytes())?;
                Ok(())
            })
            .map_err(|_| Error::Comms(CommsError::HttpStartFailed))?;

        info!("monitor: serving on port {}", port);
        Ok(Self { _server: server })
    }
}

#[cfg(not(target_os = "espidf"))]
impl HttpMonitor {
    /// Host simulation: no listener, rendering is exercised directly.
    pub fn start<L>(dht: Arc<Dht11<L>>, port: u16) -> crate::error::Result<Self>
    where
        L: DataLine + Send + 'static,
    {
        let _ = dht;
        info!("monitor(sim): no listener bound (port {})", port);
        Ok(Self {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_page_shows_integer_readings() {
        let page = render_page(&Ok(Reading {
            humidity_percent: 37,
            temperature_celsius: 25,
        }));
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("25&deg;C"));
        assert!(page.contains("37%"));
    }

    #[test]
    fn error_page_shows_fallback_not_readings() {
        let page = render_page(&Err(SensorError::Checksum {
            frame: [37, 0, 25, 0, 63],
        }));
        assert!(page.contains("sensor error"));
        assert!(!page.contains("&deg;C"));
    }

    #[test]
    fn every_error_kind_renders_the_same_fallback() {
        for e in [
            SensorError::NotResponding,
            SensorError::LineTimeout { bit: 7 },
            SensorError::Checksum { frame: [0; 5] },
        ] {
            assert!(render_page(&Err(e)).contains("sensor error"));
        }
    }
}
