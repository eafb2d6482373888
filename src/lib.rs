//! A minimal client for shipping application metrics to [Graphite][graphite]
//! and [StatsD][statsd].
//!
//! Datapoints travel over TCP in the graphite plaintext protocol; counters
//! and timers travel over UDP in the statsd plaintext protocol. Every send is
//! a fresh, unbuffered socket operation: there is no aggregation, batching,
//! or background flushing here, which keeps the client safe to call from
//! anywhere without changing the caller's control flow.
//!
//! [graphite]: https://graphite.readthedocs.io/
//! [statsd]: https://github.com/statsd/statsd
//!
//! # Usage
//!
//! ```no_run
//! use mini_graphite::MiniGraphiteBuilder;
//!
//! // First, create a builder and point it at the aggregation daemons.
//! let client = MiniGraphiteBuilder::default()
//!     .with_graphite_host("graphite.internal")
//!     .with_statsd_hosts(["statsd-1.internal", "statsd-2.internal"])
//!     .build()
//!     .expect("failed to build client");
//!
//! // Counters and timers go out over UDP, fire-and-forget.
//! client.increment("signups");
//! client.time("render", 125);
//!
//! // Datapoints go out over TCP. Send timeouts are retried and then
//! // discarded; any other transport failure surfaces here.
//! client.datapoint("users.active", 1731)?;
//!
//! // Benchmark a unit of work, emitting `search.time` and `search.end`
//! // around it while passing the result through untouched.
//! let results = client.benchmark("search").run(|| vec!["a", "b"]);
//! assert_eq!(results.len(), 2);
//! # Ok::<(), mini_graphite::SendError>(())
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![deny(missing_docs)]

mod benchmark;
pub use self::benchmark::Benchmark;

mod builder;
pub use self::builder::{BuildError, MiniGraphiteBuilder};

mod client;
pub use self::client::MiniGraphite;

mod forwarder;
pub use self::forwarder::SendError;

mod instrument;
pub use self::instrument::instrument;

mod retry;

mod signal;
pub use self::signal::MetricValue;
