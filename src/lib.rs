//! Core kernels for selected configuration interaction (CIPSI).
//!
//! A determinant-basis variational solve (block-distributed Davidson) plus
//! a perturbative (PT2) scorer over the connected external space, built
//! around two equivalent Slater-Condon dispatchers: determinant-driven
//! (direct formula per pair) and integral-driven (iterate the compressed
//! integral list, enumerate contributing determinant pairs via an inverted
//! occupancy index). Distributed collectives are abstracted behind
//! [`comm::Communicator`] rather than bound to a specific MPI crate.

pub mod category;
pub mod comm;
pub mod config;
pub mod constraint;
pub mod davidson;
pub mod determinant;
pub mod error;
pub mod excitation;
pub mod hamiltonian;
pub mod hij;
pub mod integrals;
pub mod io;
pub mod occupancy;
pub mod pt2;
pub mod wavefunction;

pub use error::{
    Error,
    Result,
};

/// Import the types most call sites need.
pub mod prelude {
    pub use crate::{
        comm::{
            Communicator,
            SingleRank,
            ThreadWorld,
        },
        config::{
            CipsiConfig,
            DavidsonParams,
        },
        determinant::{
            Determinant,
            SpinDet,
        },
        error::{
            Error,
            Result,
        },
        hamiltonian::{
            Driver,
            HamiltonianGenerator,
        },
        integrals::IntegralStore,
        wavefunction::Wavefunction,
    };
}
