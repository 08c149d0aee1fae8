pub mod results;
mod stats;

pub use results::{SweepRecord, SweepResult};
pub use stats::Statistics;
