//! The causal propagation engine.
//!
//! Builds a layered simulation graph from a trigger market, then offers
//! independent post-processing passes over it: probability propagation,
//! uncertainty bands, cycle detection, scenario variants, and summary
//! metadata. The graph is built once per run; every pass takes it as
//! immutable input and returns new data.

pub mod builder;
pub mod loops;
pub mod propagate;
pub mod summary;
pub mod uncertainty;
pub mod variants;

pub use builder::{layer_fan_out, CancelFlag, GraphBuilder};
pub use loops::detect_cycles;
pub use propagate::{confidence_weight, propagate};
pub use summary::{summarize, GraphSummary};
pub use uncertainty::{estimate_bounds, uncertainty_weight, UncertaintyBounds};
pub use variants::{generate_variants, ScenarioSet};
