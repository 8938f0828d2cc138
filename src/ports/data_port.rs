//! Bar series access port trait.

use crate::domain::error::WalkforgeError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// Fetch the full bar series, sorted by timestamp with duplicates and
    /// malformed rows already dropped.
    fn fetch_bars(&self) -> Result<Vec<OhlcvBar>, WalkforgeError>;
}
