//! File-format readers for the external-interface inputs a CIPSI cycle
//! needs: integral files, wavefunction files, reference-energy files.
//! Transparent `.gz` decompression is supported throughout; `.bz2` is
//! rejected explicitly since no bzip2 crate is available.

pub mod fcidump;
pub mod refenergy;
pub mod wavefunction;

pub use fcidump::read_fcidump;
pub use refenergy::read_reference_energy;
pub use wavefunction::read_wavefunction;
