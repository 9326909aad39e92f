//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements         | Connects to                    |
//! |--------------|--------------------|--------------------------------|
//! | `hardware`   | ActuatorPort       | I²C motor shield, status lamp  |
//! |              | BatteryPort        | ESP32 ADC1                     |
//! | `log_sink`   | EventSink          | Serial log output              |
//! | `platform`   | BootPort           | the four adapters below        |
//! | `filesystem` |                    | SPIFFS via the VFS             |
//! | `wifi`       |                    | ESP-IDF WiFi AP                |
//! | `mdns`       |                    | ESP-IDF mDNS component         |
//! | `http`       |                    | ESP-IDF HTTP server            |
//! | `time`       | ClockPort          | ESP32 system timer             |

pub mod filesystem;
pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod mdns;
pub mod platform;
pub mod time;
pub mod wifi;
