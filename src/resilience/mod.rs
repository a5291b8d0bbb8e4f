//! Resilience helpers.
//!
//! # Design Decisions
//! - Retry pacing uses exponential backoff with jitter so a fleet of
//!   servers does not hammer a recovering module map host in lockstep
//! - Delays are always bounded by the configured maximum

pub mod backoff;
