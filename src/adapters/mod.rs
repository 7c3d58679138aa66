//! Adapters — platform glue around the protocol core.
//!
//! | Adapter | Implements       | Connects to            |
//! |---------|------------------|------------------------|
//! | `wifi`  | ConnectivityPort | ESP-IDF WiFi STA       |
//! | `httpd` | monitor page     | ESP-IDF HTTP server    |

pub mod httpd;
pub mod wifi;
