//! HTTP command server adapter.
//!
//! | Route            | Method | Body                                   |
//! |------------------|--------|----------------------------------------|
//! | `/command`       | PUT    | `{"Throttle": f32, "Steering": f32}`   |
//! | `/telemetry`     | GET    | `{"Battery": f32, "State": "<NAME>"}`  |
//! | `/*`             | GET    | static files from the mounted volume   |
//!
//! Handlers run on the HTTP server task, so they never touch loop state.
//! A command is range-checked here (to answer the client) and then posted
//! to the [`inbox`](crate::inbox); the loop takes it on its next
//! iteration.  Telemetry is read from a [`TelemetrySnapshot`] that the
//! loop refreshes every tick.
//!
//! The request/response logic is plain functions so it can be tested on
//! the host; only the server wiring is `espidf`-gated.

use std::sync::{Arc, Mutex, PoisonError};

use log::info;
use serde::Serialize;
use serde_json::Value;

use crate::app::commands::RemoteCommand;
use crate::app::events::TelemetryData;
use crate::error::{CommandError, InboxError, PlatformError};
use crate::fsm::DeviceState;
use crate::inbox::InboxSender;
use crate::sensors::battery::BatteryLevel;

/// Largest command body accepted.
pub const MAX_COMMAND_BODY: usize = 128;

// ───────────────────────────────────────────────────────────────
// Payloads
// ───────────────────────────────────────────────────────────────

/// Parse a command body.  Range checking is left to
/// [`RemoteCommand::validate`].
///
/// Only a body that is not JSON at all is malformed.  A missing or
/// non-numeric field counts as out of range.
pub fn parse_command(body: &[u8]) -> Result<RemoteCommand, CommandError> {
    let doc: Value = serde_json::from_slice(body).map_err(|_| CommandError::Malformed)?;
    let axis = |name: &str| {
        doc.get(name)
            .and_then(Value::as_f64)
            .ok_or(CommandError::OutOfRange)
    };
    Ok(RemoteCommand::new(axis("Throttle")? as f32, axis("Steering")? as f32))
}

#[derive(Debug, Serialize)]
struct TelemetryBody {
    #[serde(rename = "Battery")]
    battery: f32,
    #[serde(rename = "State")]
    state: &'static str,
}

/// Render the telemetry body.  An unsampled battery is reported as `-1.0`.
pub fn render_telemetry(t: &TelemetryData) -> Result<String, serde_json::Error> {
    serde_json::to_string(&TelemetryBody {
        battery: t.battery.as_reported(),
        state: t.state.name(),
    })
}

// ───────────────────────────────────────────────────────────────
// Shared state between the loop and the server task
// ───────────────────────────────────────────────────────────────

/// Latest telemetry, written by the loop, read by the server task.
#[derive(Clone)]
pub struct TelemetrySnapshot {
    inner: Arc<Mutex<TelemetryData>>,
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySnapshot {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(TelemetryData {
                state: DeviceState::Initializing,
                battery: BatteryLevel::Unknown,
                throttle: 0.0,
                steering: 0.0,
            })),
        }
    }

    pub fn publish(&self, t: TelemetryData) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = t;
    }

    pub fn latest(&self) -> TelemetryData {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Inbox producer shared by all handler closures.
pub type SharedSender = Arc<Mutex<InboxSender<'static>>>;

// ───────────────────────────────────────────────────────────────
// Handlers
// ───────────────────────────────────────────────────────────────

/// Status and text body for a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: &'static str,
}

impl Reply {
    const OK: Self = Self { status: 200, body: "" };
}

/// `PUT /command`.
pub fn handle_command_body(body: &[u8], inbox: &mut InboxSender<'_>) -> Reply {
    if body.is_empty() {
        return Reply {
            status: 400,
            body: "No HTTP body",
        };
    }

    let cmd = match parse_command(body).and_then(|cmd| cmd.validate().map(|_| cmd)) {
        Ok(cmd) => cmd,
        Err(CommandError::Malformed) => {
            return Reply {
                status: 400,
                body: "Invalid JSON body",
            };
        }
        Err(CommandError::OutOfRange) => {
            return Reply {
                status: 400,
                body: "Value(s) out of range",
            };
        }
    };

    match inbox.post(cmd) {
        Ok(()) => Reply::OK,
        Err(InboxError::Full) => Reply {
            status: 503,
            body: "Busy",
        },
    }
}

/// `GET /<path>`: map a request path onto the mounted volume.
///
/// `/` serves `index.html`.  Query strings are ignored; parent-directory
/// segments are refused.
pub fn static_path(root: &str, uri: &str) -> Option<String> {
    let path = uri.split(['?', '#']).next().unwrap_or("/");
    if !path.starts_with('/') || path.split('/').any(|seg| seg == "..") {
        return None;
    }
    let path = if path.ends_with('/') {
        format!("{path}index.html")
    } else {
        path.to_owned()
    };
    Some(format!("{root}{path}"))
}

/// MIME type by file extension.
pub fn content_type(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

// ───────────────────────────────────────────────────────────────
// Server
// ───────────────────────────────────────────────────────────────

/// The command server.  Started once by the boot sequence.
pub struct CommandServer {
    port: u16,
    root: &'static str,
    inbox: SharedSender,
    snapshot: TelemetrySnapshot,
    #[cfg(target_os = "espidf")]
    server: Option<esp_idf_svc::http::server::EspHttpServer<'static>>,
    running: bool,
}

impl CommandServer {
    pub fn new(
        port: u16,
        root: &'static str,
        inbox: InboxSender<'static>,
        snapshot: TelemetrySnapshot,
    ) -> Self {
        Self {
            port,
            root,
            inbox: Arc::new(Mutex::new(inbox)),
            snapshot,
            #[cfg(target_os = "espidf")]
            server: None,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) -> Result<(), PlatformError> {
        if self.running {
            return Ok(());
        }
        self.platform_start()?;
        self.running = true;
        info!("http: serving on port {} (static root {})", self.port, self.root);
        Ok(())
    }

    /// Run a command body through the same path the server uses.
    pub fn submit(&self, body: &[u8]) -> Reply {
        let mut tx = self.inbox.lock().unwrap_or_else(PoisonError::into_inner);
        handle_command_body(body, &mut tx)
    }

    pub fn telemetry_body(&self) -> Result<String, serde_json::Error> {
        render_telemetry(&self.snapshot.latest())
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<(), PlatformError> {
        use esp_idf_svc::http::Method;
        use esp_idf_svc::http::server::{Configuration, EspHttpServer};
        use esp_idf_svc::io::{Read, Write};

        let status = |e: esp_idf_svc::sys::EspError| PlatformError::Status(e.code());

        let conf = Configuration {
            http_port: self.port,
            uri_match_wildcard: true,
            ..Default::default()
        };
        let mut server = EspHttpServer::new(&conf).map_err(status)?;

        {
            let inbox = self.inbox.clone();
            server
                .fn_handler::<anyhow::Error, _>("/command", Method::Put, move |mut req| {
                    let mut buf = [0u8; MAX_COMMAND_BODY];
                    let mut len = 0;
                    while len < buf.len() {
                        let n = req.read(&mut buf[len..])?;
                        if n == 0 {
                            break;
                        }
                        len += n;
                    }
                    let reply = {
                        let mut tx = inbox.lock().unwrap_or_else(PoisonError::into_inner);
                        handle_command_body(&buf[..len], &mut tx)
                    };
                    if reply.status != 200 {
                        log::warn!("http: PUT /command -> {} {}", reply.status, reply.body);
                    }
                    req.into_response(reply.status, None, &[("Content-Type", "text/plain")])?
                        .write_all(reply.body.as_bytes())?;
                    Ok(())
                })
                .map_err(status)?;
        }

        {
            let snapshot = self.snapshot.clone();
            server
                .fn_handler::<anyhow::Error, _>("/telemetry", Method::Get, move |req| {
                    match render_telemetry(&snapshot.latest()) {
                        Ok(body) => {
                            req.into_response(200, None, &[("Content-Type", "application/json")])?
                                .write_all(body.as_bytes())?;
                        }
                        Err(e) => {
                            log::warn!("http: telemetry encode failed: {e}");
                            req.into_status_response(500)?;
                        }
                    }
                    Ok(())
                })
                .map_err(status)?;
        }

        {
            let root = self.root;
            server
                .fn_handler::<anyhow::Error, _>("/*", Method::Get, move |req| {
                    let Some(path) = static_path(root, req.uri()) else {
                        req.into_status_response(400)?;
                        return Ok(());
                    };
                    match std::fs::read(&path) {
                        Ok(bytes) => {
                            req.into_response(
                                200,
                                None,
                                &[
                                    ("Content-Type", content_type(&path)),
                                    ("Cache-Control", "no-cache"),
                                ],
                            )?
                            .write_all(&bytes)?;
                        }
                        Err(_) => {
                            req.into_status_response(404)?;
                        }
                    }
                    Ok(())
                })
                .map_err(status)?;
        }

        self.server = Some(server);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<(), PlatformError> {
        info!("http(sim): listener on port {} not opened", self.port);
        Ok(())
    }
}
