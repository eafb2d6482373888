use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, error};

use crate::{
    benchmark::Benchmark,
    forwarder::{self, SendError},
    retry::{self, MAX_SEND_ATTEMPTS},
    signal::{self, MetricValue},
};

/// A client for emitting metrics to graphite and statsd daemons.
///
/// Built once via [`MiniGraphiteBuilder`](crate::MiniGraphiteBuilder) and
/// immutable afterwards; share it across threads with `Arc` when needed.
/// Every send opens a fresh socket and closes it immediately, so concurrent
/// callers never contend on shared connections.
#[derive(Debug)]
pub struct MiniGraphite {
    pub(crate) graphite_hosts: Vec<String>,
    pub(crate) graphite_port: u16,
    pub(crate) statsd_hosts: Vec<String>,
    pub(crate) statsd_port: u16,
    pub(crate) mock_mode: bool,
    pub(crate) debug_mode: bool,
    pub(crate) send_timeout: Duration,
}

impl MiniGraphite {
    /// Sends a graphite datapoint timestamped with the current time.
    ///
    /// The signal is fanned out over TCP to every configured graphite host,
    /// in order. Send timeouts are retried and ultimately discarded, so a
    /// transient network hiccup never reaches the caller.
    ///
    /// # Errors
    ///
    /// Returns the first non-timeout transport failure, after all hosts have
    /// been attempted.
    pub fn datapoint<V>(&self, key: &str, value: V) -> Result<(), SendError>
    where
        V: Into<MetricValue>,
    {
        self.datapoint_at(key, value, SystemTime::now())
    }

    /// Sends a graphite datapoint with an explicit timestamp.
    ///
    /// Timestamps before the unix epoch are clamped to zero.
    ///
    /// # Errors
    ///
    /// Returns the first non-timeout transport failure, after all hosts have
    /// been attempted.
    pub fn datapoint_at<V>(
        &self,
        key: &str,
        value: V,
        timestamp: SystemTime,
    ) -> Result<(), SendError>
    where
        V: Into<MetricValue>,
    {
        let unix_seconds = timestamp.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
        let signal = signal::datapoint(key, value.into(), unix_seconds);
        self.log_signal("datapoint", &signal);

        if self.mock_mode {
            return Ok(());
        }

        self.broadcast_tcp(&signal)
    }

    /// Sends a statsd counter with the given value.
    ///
    /// Fanned out over UDP to every configured statsd host, in order;
    /// fire-and-forget, failures are never surfaced.
    pub fn counter<V>(&self, key: &str, value: V)
    where
        V: Into<MetricValue>,
    {
        let signal = signal::counter(key, value.into());
        self.log_signal("counter", &signal);

        if self.mock_mode {
            return;
        }

        self.broadcast_udp(&signal);
    }

    /// Sends a statsd counter with the default value of 1.
    pub fn increment(&self, key: &str) {
        self.counter(key, 1);
    }

    /// Sends a statsd timer, in milliseconds.
    ///
    /// Fire-and-forget, like [`counter`](Self::counter).
    pub fn time<V>(&self, key: &str, value: V)
    where
        V: Into<MetricValue>,
    {
        let signal = signal::timer(key, value.into());
        self.log_signal("time", &signal);

        if self.mock_mode {
            return;
        }

        self.broadcast_udp(&signal);
    }

    /// Starts building a benchmark around a unit of work.
    ///
    /// See [`Benchmark`] for the emitted signals and their ordering.
    pub fn benchmark<T>(&self, key_prefix: impl Into<String>) -> Benchmark<'_, T> {
        Benchmark::new(self, key_prefix.into())
    }

    fn broadcast_tcp(&self, signal: &str) -> Result<(), SendError> {
        // Half the budget per attempt keeps the retried send within the
        // configured wall-clock timeout.
        let attempt_timeout = self.send_timeout / MAX_SEND_ATTEMPTS as u32;

        let mut first_error = None;
        for host in &self.graphite_hosts {
            let result = retry::send_with_retry(|| {
                forwarder::send_tcp_line(host, self.graphite_port, signal, attempt_timeout)
            });

            // One bad host must not starve the remaining hosts.
            if let Err(err) = result {
                error!(host = host.as_str(), error = %err, "Failed to send signal.");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    fn broadcast_udp(&self, signal: &str) {
        for host in &self.statsd_hosts {
            if let Err(err) = forwarder::send_udp_datagram(host, self.statsd_port, signal) {
                debug!(host = host.as_str(), error = %err, "Failed to send datagram.");
            }
        }
    }

    fn log_signal(&self, kind: &str, signal: &str) {
        if self.debug_mode {
            debug!(signal, "Sending {}.", kind);
        }
    }
}
