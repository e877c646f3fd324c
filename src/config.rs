//! Configuration for pipekv
//!
//! Centralized endpoint configuration with sensible defaults.

/// Main configuration for an endpoint
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Target Configuration
    // -------------------------------------------------------------------------
    /// Server address (host:port)
    pub addr: String,

    /// Database index selected during the handshake
    pub db: u32,

    /// AUTH credential; when absent the handshake sends PING instead
    pub password: Option<String>,

    // -------------------------------------------------------------------------
    // Socket Configuration
    // -------------------------------------------------------------------------
    /// Connect timeout (milliseconds, 0 = wait for the OS)
    pub connect_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = none)
    ///
    /// Reads never time out; a partial reply must not be abandoned.
    pub write_timeout_ms: u64,

    /// Disable Nagle's algorithm
    pub nodelay: bool,

    // -------------------------------------------------------------------------
    // Buffer Configuration
    // -------------------------------------------------------------------------
    /// Capacity of the buffered input stream (bytes)
    pub input_buffer_size: usize,

    /// Capacity of the buffered output stream (bytes)
    pub output_buffer_size: usize,

    // -------------------------------------------------------------------------
    // Reader Configuration
    // -------------------------------------------------------------------------
    /// How long the reply reader parks when no command is pending (milliseconds)
    pub idle_poll_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:6379".to_string(),
            db: 0,
            password: None,
            connect_timeout_ms: 5000,
            write_timeout_ms: 0,
            nodelay: true,
            input_buffer_size: 64 * 1024,  // 64 KB
            output_buffer_size: 64 * 1024, // 64 KB
            idle_poll_ms: 10,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server address (host:port)
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.config.addr = addr.into();
        self
    }

    /// Set the database index
    pub fn db(mut self, db: u32) -> Self {
        self.config.db = db;
        self
    }

    /// Set the AUTH password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = Some(password.into());
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.config.nodelay = nodelay;
        self
    }

    /// Set the input buffer capacity (in bytes)
    pub fn input_buffer_size(mut self, size: usize) -> Self {
        self.config.input_buffer_size = size;
        self
    }

    /// Set the output buffer capacity (in bytes)
    pub fn output_buffer_size(mut self, size: usize) -> Self {
        self.config.output_buffer_size = size;
        self
    }

    /// Set the reader idle poll interval (in milliseconds)
    pub fn idle_poll_ms(mut self, ms: u64) -> Self {
        self.config.idle_poll_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
