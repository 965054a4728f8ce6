//! Errors raised while classifying boundary walls.

use thiserror::Error;

/// Configuration errors detected by the [`BoundaryRegistry`](super::BoundaryRegistry).
///
/// These are fatal before the first step.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoundaryError {
    #[error("boundary group '{0}' is already registered")]
    DuplicateGroup(String),

    #[error("no boundary group named '{0}'")]
    UnknownGroup(String),

    #[error(
        "periodic groups '{first}' ({first_len} walls) and '{second}' ({second_len} walls) differ in size"
    )]
    MismatchedPeriodicSizes {
        first: String,
        second: String,
        first_len: usize,
        second_len: usize,
    },

    #[error("boundary group '{0}' cannot be paired with itself")]
    SelfPeriodic(String),

    #[error("boundary group '{0}' can only become periodic through pair_periodic")]
    PeriodicNeedsPartner(String),

    #[error("boundary group '{0}' is already part of a periodic pair")]
    AlreadyPaired(String),

    #[error("wall {wall} is registered in both '{first}' and '{second}'")]
    DoubleRegistration {
        wall: usize,
        first: String,
        second: String,
    },

    #[error("lost boundaries: {registered} walls registered in groups, {expected} boundary walls in the mesh")]
    Coverage { registered: usize, expected: usize },
}
