//! Crate-wide error type.

use std::fmt::Display;

/// Errors produced by the core CIPSI kernels.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// Malformed FCIDUMP header or record.
    InvalidIntegralFile { msg: String },
    /// An orbital index fell outside `0..n_orb`.
    OrbitalOutOfRange { index: u32, n_orb: u32 },
    /// `apply_excitation` was asked to remove an unoccupied hole, or to
    /// occupy a particle that is already occupied.
    DegenerateExcitation { msg: String },
    /// Davidson did not converge within `max_iter`.
    DavidsonNotConverged { max_iter: usize },
}

impl Display for Error {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::InvalidIntegralFile {
                msg,
            } => write!(f, "invalid integral file: {msg}"),
            Self::OrbitalOutOfRange {
                index,
                n_orb,
            } => write!(f, "orbital index {index} out of range 0..{n_orb}"),
            Self::DegenerateExcitation {
                msg,
            } => write!(f, "degenerate excitation: {msg}"),
            Self::DavidsonNotConverged {
                max_iter,
            } => write!(f, "Davidson solver failed to converge within {max_iter} iterations"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
