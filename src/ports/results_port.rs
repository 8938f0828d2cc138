//! Results persistence port trait.

use crate::domain::error::WalkforgeError;
use crate::domain::walk_forward::WindowResult;

/// Store for the per-window results table and the positionally paired
/// parameter log. Written once after a run fully completes; a stored run is
/// keyed by the configuration signature so an identical rerun can be served
/// from cache.
pub trait ResultsPort {
    /// Returns the stored results verbatim when the stored signature matches
    /// exactly and the artifacts are complete and consistent; any mismatch
    /// is a cache miss (`None`), not an error.
    fn load_cached(&self, signature: &str) -> Result<Option<Vec<WindowResult>>, WalkforgeError>;

    fn write(&self, signature: &str, results: &[WindowResult]) -> Result<(), WalkforgeError>;
}
