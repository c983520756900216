//! Pattern-based permission evaluation.

pub mod evaluator;
pub mod pattern;

pub use evaluator::PermissionSet;
pub use pattern::pattern_grants;
