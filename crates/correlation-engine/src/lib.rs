//! Statistical validation of candidate relationships.
//!
//! Pure pieces (aligner, Pearson analyzer, impact estimator) plus the
//! candidate validator that combines them with fetched price history.

pub mod align;
pub mod cache;
pub mod impact;
pub mod pearson;
pub mod validator;

pub use align::{align_series, AlignedSeries};
pub use cache::CorrelationCache;
pub use impact::{estimate_impact, ImpactEstimate};
pub use pearson::{correlate, pearson, MIN_SAMPLES};
pub use validator::validate_candidate;
