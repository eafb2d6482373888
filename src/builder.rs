use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::client::MiniGraphite;

const DEFAULT_GRAPHITE_HOST: &str = "127.0.0.1";
const DEFAULT_GRAPHITE_PORT: u16 = 2003;
const DEFAULT_STATSD_HOST: &str = "127.0.0.1";
const DEFAULT_STATSD_PORT: u16 = 8125;
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors that could occur while building a [`MiniGraphite`] client.
#[derive(Debug, Error)]
pub enum BuildError {
    /// No graphite host was left after configuration.
    #[error("at least one graphite host must be configured")]
    MissingGraphiteHost,

    /// No statsd host was left after configuration.
    #[error("at least one statsd host must be configured")]
    MissingStatsdHost,

    /// The send timeout was set to zero.
    #[error("send timeout must be non-zero")]
    ZeroSendTimeout,
}

/// Builder for a [`MiniGraphite`] client.
///
/// The builder starts from local defaults (`127.0.0.1:2003` for graphite,
/// `127.0.0.1:8125` for statsd, both modes off) and each `with_*` call
/// overrides one setting. Host values are normalized to an ordered host set
/// here, at the configuration boundary, so the send paths never distinguish
/// between one host and many.
pub struct MiniGraphiteBuilder {
    graphite_hosts: Vec<String>,
    graphite_port: u16,
    statsd_hosts: Vec<String>,
    statsd_port: u16,
    mock_mode: bool,
    debug_mode: bool,
    send_timeout: Duration,
}

impl MiniGraphiteBuilder {
    /// Set a single graphite host to send datapoints to.
    ///
    /// Replaces any previously configured graphite host set.
    ///
    /// Defaults to `127.0.0.1`.
    #[must_use]
    pub fn with_graphite_host<H>(mut self, host: H) -> Self
    where
        H: Into<String>,
    {
        self.graphite_hosts = vec![host.into()];
        self
    }

    /// Set the ordered set of graphite hosts to fan datapoints out to.
    ///
    /// Every datapoint is sent once per host, in the given order.
    #[must_use]
    pub fn with_graphite_hosts<I, H>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: Into<String>,
    {
        self.graphite_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Set the graphite plaintext port, shared by all graphite hosts.
    ///
    /// Defaults to 2003.
    #[must_use]
    pub fn with_graphite_port(mut self, port: u16) -> Self {
        self.graphite_port = port;
        self
    }

    /// Set a single statsd host to send counters and timers to.
    ///
    /// Replaces any previously configured statsd host set.
    ///
    /// Defaults to `127.0.0.1`.
    #[must_use]
    pub fn with_statsd_host<H>(mut self, host: H) -> Self
    where
        H: Into<String>,
    {
        self.statsd_hosts = vec![host.into()];
        self
    }

    /// Set the ordered set of statsd hosts to fan counters and timers out to.
    ///
    /// Every signal is sent once per host, in the given order.
    #[must_use]
    pub fn with_statsd_hosts<I, H>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: Into<String>,
    {
        self.statsd_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Set the statsd port, shared by all statsd hosts.
    ///
    /// Defaults to 8125.
    #[must_use]
    pub fn with_statsd_port(mut self, port: u16) -> Self {
        self.statsd_port = port;
        self
    }

    /// Suppress all network I/O while keeping formatting and logging intact.
    ///
    /// Useful in tests and development environments without reachable
    /// aggregation daemons.
    ///
    /// Defaults to `false`.
    #[must_use]
    pub fn with_mock_mode(mut self, mock_mode: bool) -> Self {
        self.mock_mode = mock_mode;
        self
    }

    /// Log every encoded signal at debug level before it is sent.
    ///
    /// Defaults to `false`.
    #[must_use]
    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    /// Set the wall-clock budget for one datapoint send, spread across its
    /// retry attempts.
    ///
    /// When the budget is exhausted by timeouts, the datapoint is dropped
    /// without surfacing an error.
    ///
    /// Defaults to 2 seconds.
    #[must_use]
    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// Builds the client.
    ///
    /// Only structural problems are reported here; a host that does not
    /// resolve or accept connections surfaces on the first send instead.
    ///
    /// # Errors
    ///
    /// Returns an error if either host set is empty or the send timeout is
    /// zero.
    pub fn build(self) -> Result<MiniGraphite, BuildError> {
        if self.graphite_hosts.is_empty() {
            return Err(BuildError::MissingGraphiteHost);
        }

        if self.statsd_hosts.is_empty() {
            return Err(BuildError::MissingStatsdHost);
        }

        if self.send_timeout.is_zero() {
            return Err(BuildError::ZeroSendTimeout);
        }

        let client = MiniGraphite {
            graphite_hosts: self.graphite_hosts,
            graphite_port: self.graphite_port,
            statsd_hosts: self.statsd_hosts,
            statsd_port: self.statsd_port,
            mock_mode: self.mock_mode,
            debug_mode: self.debug_mode,
            send_timeout: self.send_timeout,
        };

        if client.debug_mode {
            debug!(
                graphite_hosts = ?client.graphite_hosts,
                graphite_port = client.graphite_port,
                statsd_hosts = ?client.statsd_hosts,
                statsd_port = client.statsd_port,
                mock_mode = client.mock_mode,
                "Initialized client."
            );
        }

        Ok(client)
    }
}

impl Default for MiniGraphiteBuilder {
    fn default() -> Self {
        MiniGraphiteBuilder {
            graphite_hosts: vec![DEFAULT_GRAPHITE_HOST.to_string()],
            graphite_port: DEFAULT_GRAPHITE_PORT,
            statsd_hosts: vec![DEFAULT_STATSD_HOST.to_string()],
            statsd_port: DEFAULT_STATSD_PORT,
            mock_mode: false,
            debug_mode: false,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}
