use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for the WebSocket server, the HTTP surface, the broker
/// and logging.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub http: HttpSettings,
    pub broker: BrokerSettings,
    pub log: LogSettings,
}

/// Configuration settings for the WebSocket server.
///
/// Defines the host and port the relay listens on.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Configuration for the HTTP listener serving static assets, blobs and health.
#[derive(Debug, Deserialize, Clone)]
pub struct HttpSettings {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static/`; the root document is `index.html` inside it.
    pub static_dir: String,
    /// Location of the sled database holding uploaded blobs.
    pub blob_dir: String,
    pub max_blob_bytes: usize,
}

/// Configuration settings for the broker.
///
/// Controls admission, per-connection buffering and history retention.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    pub max_connections: usize,
    /// Capacity of each connection's outbound queue. A subscriber whose queue
    /// is full is treated as a failed delivery.
    pub outbound_queue: usize,
    /// `None` keeps every envelope for the lifetime of the process.
    pub max_history_per_topic: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values are filled from defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub http: Option<PartialHttpSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialHttpSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<String>,
    pub blob_dir: Option<String>,
    pub max_blob_bytes: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub max_connections: Option<usize>,
    pub outbound_queue: Option<usize>,
    pub max_history_per_topic: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl Settings {
    /// Socket address of the WebSocket listener.
    pub fn ws_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Socket address of the HTTP listener.
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            http: HttpSettings {
                host: "127.0.0.1".to_string(),
                port: 8081,
                static_dir: "static".to_string(),
                blob_dir: "blobs_db".to_string(),
                max_blob_bytes: 10 * 1024 * 1024,
            },
            broker: BrokerSettings::default(),
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            max_connections: 1000,
            outbound_queue: 1024,
            max_history_per_topic: None,
        }
    }
}

impl PartialSettings {
    /// Fill every missing value from `default`.
    pub fn merge(self, default: Settings) -> Settings {
        let server = self.server;
        let http = self.http;
        let broker = self.broker;
        let log = self.log;

        Settings {
            server: ServerSettings {
                host: server
                    .as_ref()
                    .and_then(|s| s.host.clone())
                    .unwrap_or(default.server.host),
                port: server
                    .as_ref()
                    .and_then(|s| s.port)
                    .unwrap_or(default.server.port),
            },
            http: HttpSettings {
                host: http
                    .as_ref()
                    .and_then(|h| h.host.clone())
                    .unwrap_or(default.http.host),
                port: http
                    .as_ref()
                    .and_then(|h| h.port)
                    .unwrap_or(default.http.port),
                static_dir: http
                    .as_ref()
                    .and_then(|h| h.static_dir.clone())
                    .unwrap_or(default.http.static_dir),
                blob_dir: http
                    .as_ref()
                    .and_then(|h| h.blob_dir.clone())
                    .unwrap_or(default.http.blob_dir),
                max_blob_bytes: http
                    .as_ref()
                    .and_then(|h| h.max_blob_bytes)
                    .unwrap_or(default.http.max_blob_bytes),
            },
            broker: BrokerSettings {
                max_connections: broker
                    .as_ref()
                    .and_then(|b| b.max_connections)
                    .unwrap_or(default.broker.max_connections),
                outbound_queue: broker
                    .as_ref()
                    .and_then(|b| b.outbound_queue)
                    .unwrap_or(default.broker.outbound_queue),
                max_history_per_topic: broker
                    .as_ref()
                    .and_then(|b| b.max_history_per_topic)
                    .or(default.broker.max_history_per_topic),
            },
            log: LogSettings {
                level: log
                    .and_then(|l| l.level)
                    .unwrap_or(default.log.level),
            },
        }
    }
}
