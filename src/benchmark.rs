use std::time::Instant;

use crate::{client::MiniGraphite, signal::MetricValue};

/// Measures one unit of work and emits counters around it.
///
/// Signals are emitted in a fixed order under the configured key prefix:
/// `<prefix>.ini` (optional), `<prefix>.time` with the elapsed wall-clock
/// milliseconds, `<prefix>.result` (optional, the projected return value),
/// and `<prefix>.end`. All of them ride the statsd counter path, so a
/// benchmarked unit of work never blocks on the graphite TCP path.
///
/// ```no_run
/// # use mini_graphite::MiniGraphiteBuilder;
/// # let client = MiniGraphiteBuilder::default().build().unwrap();
/// let results = client
///     .benchmark("search")
///     .with_start_signal()
///     .with_result_projection(|hits: &Vec<&str>| hits.len().into())
///     .run(|| vec!["alpha", "beta"]);
/// assert_eq!(results, vec!["alpha", "beta"]);
/// ```
pub struct Benchmark<'a, T> {
    client: &'a MiniGraphite,
    key_prefix: String,
    send_ini_signal: bool,
    result_projection: Option<Box<dyn FnOnce(&T) -> MetricValue + 'a>>,
}

impl<'a, T> Benchmark<'a, T> {
    pub(crate) fn new(client: &'a MiniGraphite, key_prefix: String) -> Self {
        Benchmark { client, key_prefix, send_ini_signal: false, result_projection: None }
    }

    /// Emit `<prefix>.ini` before the work runs.
    #[must_use]
    pub fn with_start_signal(mut self) -> Self {
        self.send_ini_signal = true;
        self
    }

    /// Emit `<prefix>.result` with a projection of the work's return value.
    ///
    /// Without a projection the result signal is skipped entirely; the
    /// return value itself is never altered either way.
    #[must_use]
    pub fn with_result_projection<P>(mut self, projection: P) -> Self
    where
        P: FnOnce(&T) -> MetricValue + 'a,
    {
        self.result_projection = Some(Box::new(projection));
        self
    }

    /// Runs the work exactly once and returns its result unchanged.
    pub fn run<F>(self, work: F) -> T
    where
        F: FnOnce() -> T,
    {
        if self.send_ini_signal {
            self.client.increment(&format!("{}.ini", self.key_prefix));
        }

        let started = Instant::now();
        let result = work();
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        // The timing signal goes out in counter form, not `|ms`.
        self.client.counter(&format!("{}.time", self.key_prefix), elapsed_ms);

        if let Some(projection) = self.result_projection {
            self.client.counter(&format!("{}.result", self.key_prefix), projection(&result));
        }

        self.client.increment(&format!("{}.end", self.key_prefix));

        result
    }
}
