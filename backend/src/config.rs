#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Upstream feed credential.
    ///
    /// An empty value disables the upstream connection entirely: the
    /// process still starts and subscribers receive the default
    /// summaries with `connected: false`.
    pub finnhub_api_key: String,

    /// Upstream WebSocket endpoint. The credential is appended as a
    /// `token` query parameter at connect time.
    pub finnhub_ws_url: String,

    /// Address the subscriber WebSocket server binds to.
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            finnhub_api_key: std::env::var("FINNHUB_API_KEY").unwrap_or_default(),
            finnhub_ws_url: std::env::var("FINNHUB_WS_URL")
                .unwrap_or_else(|_| "wss://ws.finnhub.io".to_string()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string()),
        }
    }

    pub fn has_feed_credential(&self) -> bool {
        !self.finnhub_api_key.is_empty()
    }
}
