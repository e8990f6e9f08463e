//! Environment the engine resolves battles in: randomness and time.
//!
//! Both are injected through traits so that tests and replays can pin them.

pub mod clock;
pub mod rng;

pub use clock::{Clock, LogicalClock};
pub use rng::{PcgRng, RngOracle, compute_seed};
