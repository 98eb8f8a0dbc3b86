//! A bounded, lock-free multi-producer/single-consumer queue built as a
//! compound of striped MPSC lanes.
//!
//! A single shared ring buffer forces every producer to CAS against the
//! same cursor, so tail-latency grows with producer count even though
//! throughput does not. This crate stripes producers across `K` independent
//! [`Lane`]s instead — each one a small CAS-based bounded MPSC ring — and
//! presents them behind one [`Compound`] handle that looks like a single
//! queue from the outside.
//!
//! Producers are routed to a lane by a hash of a stable per-thread identity
//! (see [`producer_id`]), not by registration: there is no handle to
//! acquire or release, any thread may call the offer-family methods at any
//! time. The routing is a hint, not an assignment — [`Compound::offer`]
//! falls back to scanning every other lane once a producer's home lane is
//! observed full. Exactly one thread may call the poll-family methods at a
//! time; that is a caller contract, not something the type system enforces.
//!
//! # Example
//!
//! ```
//! use stripe_mpsc::Compound;
//!
//! let queue = Compound::<u64>::new(1024).unwrap();
//! assert!(queue.offer(42));
//! assert_eq!(queue.poll(), Some(42));
//! ```
//!
//! # Strict vs. relaxed operations
//!
//! Every blocking-capable operation has a `relaxed_` counterpart. The
//! strict form ([`Compound::offer`], [`Compound::poll`]) spends bounded but
//! unbounded-in-principle CAS retries to give an honest answer: `false`
//! only once every lane was observed capacity-full, never because of
//! transient contention. The relaxed form trades that guarantee for a hard
//! bound on the number of attempts — one pass through the lanes, no
//! retrying a lost CAS — at the cost of occasionally reporting `false`/
//! `None` when a retry would have succeeded.

mod backoff;
mod bulk;
mod compound;
mod config;
mod error;
mod invariants;
mod lane;
mod metrics;
mod producer_id;

pub use backoff::Backoff;
pub use compound::Compound;
pub use config::Config;
pub use error::QueueError;
pub use lane::{Lane, TryOfferResult};
pub use metrics::Metrics;
