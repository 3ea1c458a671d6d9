//! Slater determinants.
//!
//! A determinant is represented as a pair of spin channels, each an
//! immutable, strictly increasing set of occupied orbital indices packed
//! into a 128-bit bitset (two `u64` words, little-endian within each word).
//! This mirrors the `Pauli { pack: (u64, u64) }` bitset representation used
//! elsewhere in this crate for fixed-width qubit-indexed data.

use std::fmt::Display;

use crate::error::{
    Error,
    Result,
};

/// A spatial-orbital index, 0-based.
pub type OrbitalIdx = u32;

/// Maximum number of orbitals representable in one spin channel.
pub const MAX_ORBITALS: u32 = 128;

/// Occupied orbitals of one spin channel, as a 128-bit bitset.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct SpinDet {
    pack: (u64, u64),
}

impl SpinDet {
    /// Empty spin-determinant.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a spin-determinant from an iterator of occupied orbitals.
    ///
    /// # Panics
    ///
    /// Panics if any orbital index is `>= MAX_ORBITALS`.
    pub fn from_orbitals<I: IntoIterator<Item = OrbitalIdx>>(orbitals: I) -> Self {
        let mut det = Self::new();
        for orb in orbitals {
            det.insert(orb);
        }
        det
    }

    fn word_bit(orb: OrbitalIdx) -> (bool, u32) {
        assert!(orb < MAX_ORBITALS, "orbital index out of bound");
        (orb < 64, orb % 64)
    }

    /// True if `orb` is occupied.
    #[must_use]
    pub fn contains(
        &self,
        orb: OrbitalIdx,
    ) -> bool {
        let (low, bit) = Self::word_bit(orb);
        let word = if low { self.pack.0 } else { self.pack.1 };
        (word >> bit) & 1 == 1
    }

    /// Occupy `orb`. No-op if already occupied.
    pub fn insert(
        &mut self,
        orb: OrbitalIdx,
    ) {
        let (low, bit) = Self::word_bit(orb);
        if low {
            self.pack.0 |= 1u64 << bit;
        } else {
            self.pack.1 |= 1u64 << bit;
        }
    }

    /// Vacate `orb`. No-op if already unoccupied.
    pub fn remove(
        &mut self,
        orb: OrbitalIdx,
    ) {
        let (low, bit) = Self::word_bit(orb);
        if low {
            self.pack.0 &= !(1u64 << bit);
        } else {
            self.pack.1 &= !(1u64 << bit);
        }
    }

    /// Number of occupied orbitals.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.pack.0.count_ones() + self.pack.1.count_ones()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pack == (0, 0)
    }

    /// Occupied orbitals in ascending order.
    pub fn occupied(&self) -> impl Iterator<Item = OrbitalIdx> + '_ {
        (0..64)
            .filter(move |b| (self.pack.0 >> b) & 1 == 1)
            .chain((0..64).filter(move |b| (self.pack.1 >> b) & 1 == 1).map(|b| b + 64))
    }

    /// Highest-indexed occupied orbital, if any.
    #[must_use]
    pub fn highest(&self) -> Option<OrbitalIdx> {
        if self.pack.1 != 0 {
            Some(63 - self.pack.1.leading_zeros() + 64)
        } else if self.pack.0 != 0 {
            Some(63 - self.pack.0.leading_zeros())
        } else {
            None
        }
    }

    /// The three highest occupied orbitals, ascending, if there are at
    /// least three.
    #[must_use]
    pub fn top_three(&self) -> Option<(OrbitalIdx, OrbitalIdx, OrbitalIdx)> {
        let mut occ: Vec<_> = self.occupied().collect();
        if occ.len() < 3 {
            return None;
        }
        let c = occ.pop().unwrap();
        let b = occ.pop().unwrap();
        let a = occ.pop().unwrap();
        Some((a, b, c))
    }

    /// Orbitals occupied in `self` but not in `other`.
    #[must_use]
    pub fn difference(
        &self,
        other: &Self,
    ) -> Self {
        Self {
            pack: (self.pack.0 & !other.pack.0, self.pack.1 & !other.pack.1),
        }
    }

    /// Size of the symmetric difference between `self` and `other`.
    #[must_use]
    pub fn symmetric_difference_len(
        &self,
        other: &Self,
    ) -> u32 {
        let lo = self.pack.0 ^ other.pack.0;
        let hi = self.pack.1 ^ other.pack.1;
        lo.count_ones() + hi.count_ones()
    }
}

impl Display for SpinDet {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{:?}", self.occupied().collect::<Vec<_>>())
    }
}

/// Excitation degree per spin channel between two determinants.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExcDegree {
    pub alpha: u32,
    pub beta: u32,
}

/// A full Slater determinant: occupied orbitals in each spin channel.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Determinant {
    pub alpha: SpinDet,
    pub beta: SpinDet,
}

impl Determinant {
    #[must_use]
    pub fn new(
        alpha: SpinDet,
        beta: SpinDet,
    ) -> Self {
        Self {
            alpha,
            beta,
        }
    }

    /// `exc_degree(D, D')`: number of orbitals that differ, per spin
    /// channel, each halved (symmetric difference of occupied sets is
    /// always even between two determinants with equal electron counts).
    #[must_use]
    pub fn exc_degree(
        &self,
        other: &Self,
    ) -> ExcDegree {
        ExcDegree {
            alpha: self.alpha.symmetric_difference_len(&other.alpha) / 2,
            beta: self.beta.symmetric_difference_len(&other.beta) / 2,
        }
    }
}

impl Display for Determinant {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "(a: {}, b: {})", self.alpha, self.beta)
    }
}

/// Returns the unique (hole, particle) pair with `hole` occupied in `from`
/// but not `to`, and `particle` occupied in `to` but not `from`.
///
/// Undefined (returns `None`) unless `|from \ to| == 1`.
#[must_use]
pub fn single_hole_particle(
    from: &SpinDet,
    to: &SpinDet,
) -> Option<(OrbitalIdx, OrbitalIdx)> {
    let holes: Vec<_> = from.difference(to).occupied().collect();
    let particles: Vec<_> = to.difference(from).occupied().collect();
    if holes.len() == 1 && particles.len() == 1 {
        Some((holes[0], particles[0]))
    } else {
        None
    }
}

/// Returns the ascending-sorted pair of holes and pair of particles between
/// `from` and `to`.
///
/// Undefined (returns `None`) unless `|from \ to| == 2`.
#[must_use]
pub fn double_holes_particles(
    from: &SpinDet,
    to: &SpinDet,
) -> Option<((OrbitalIdx, OrbitalIdx), (OrbitalIdx, OrbitalIdx))> {
    let holes: Vec<_> = from.difference(to).occupied().collect();
    let particles: Vec<_> = to.difference(from).occupied().collect();
    if holes.len() == 2 && particles.len() == 2 {
        Some(((holes[0], holes[1]), (particles[0], particles[1])))
    } else {
        None
    }
}

/// Sign produced by moving an electron from `hole` in `from` to `particle`
/// in `to`, by counting occupied orbitals strictly below the target orbital
/// in each channel and combining parities.
#[must_use]
pub fn single_phase(
    from: &SpinDet,
    to: &SpinDet,
    hole: OrbitalIdx,
    particle: OrbitalIdx,
) -> i32 {
    let count_below = |det: &SpinDet, target: OrbitalIdx| -> u32 {
        det.occupied().take_while(|&o| o < target).count() as u32
    };
    let n_from = count_below(from, hole);
    let n_to = count_below(to, particle);
    if (n_from + n_to) % 2 == 0 {
        1
    } else {
        -1
    }
}

/// Sign of a same-spin double excitation `(h1,h2) -> (p1,p2)` between
/// `from` and `to`, composed from two single-excitation phases plus the
/// ordering corrections of §4.1.
#[must_use]
pub fn double_phase(
    from: &SpinDet,
    to: &SpinDet,
    h1: OrbitalIdx,
    h2: OrbitalIdx,
    p1: OrbitalIdx,
    p2: OrbitalIdx,
) -> i32 {
    let mut phase = single_phase(from, to, h1, p1) * single_phase(to, from, p2, h2);
    if h2 < h1 {
        phase = -phase;
    }
    if p2 < p1 {
        phase = -phase;
    }
    phase
}

/// Replace the occupied set `S` of one spin channel with
/// `sorted((S \ holes) ∪ particles)`. Fails if any hole is unoccupied or
/// any particle is already occupied.
pub fn apply_excitation_channel(
    det: &SpinDet,
    holes: &[OrbitalIdx],
    particles: &[OrbitalIdx],
) -> Result<SpinDet> {
    let mut out = *det;
    for &h in holes {
        if !out.contains(h) {
            return Err(Error::DegenerateExcitation {
                msg: format!("hole {h} not occupied"),
            });
        }
        out.remove(h);
    }
    for &p in particles {
        if out.contains(p) {
            return Err(Error::DegenerateExcitation {
                msg: format!("particle {p} already occupied"),
            });
        }
        out.insert(p);
    }
    Ok(out)
}

/// Apply independent excitations to both spin channels of a determinant.
pub fn apply_excitation(
    det: &Determinant,
    alpha_holes_parts: (&[OrbitalIdx], &[OrbitalIdx]),
    beta_holes_parts: (&[OrbitalIdx], &[OrbitalIdx]),
) -> Result<Determinant> {
    let alpha = apply_excitation_channel(&det.alpha, alpha_holes_parts.0, alpha_holes_parts.1)?;
    let beta = apply_excitation_channel(&det.beta, beta_holes_parts.0, beta_holes_parts.1)?;
    Ok(Determinant::new(alpha, beta))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_det_roundtrip() {
        let det = SpinDet::from_orbitals([0, 1, 5, 70]);
        let occ: Vec<_> = det.occupied().collect();
        assert_eq!(occ, vec![0, 1, 5, 70]);
        assert_eq!(det.len(), 4);
        assert_eq!(det.highest(), Some(70));
    }

    #[test]
    fn exc_degree_identity_is_zero() {
        let det = Determinant::new(SpinDet::from_orbitals([0, 1]), SpinDet::from_orbitals([0, 1]));
        let deg = det.exc_degree(&det);
        assert_eq!(deg, ExcDegree { alpha: 0, beta: 0 });
    }

    #[test]
    fn single_excitation_hole_particle() {
        let from = SpinDet::from_orbitals([0, 1]);
        let to = SpinDet::from_orbitals([0, 2]);
        assert_eq!(single_hole_particle(&from, &to), Some((1, 2)));
    }

    #[test]
    fn apply_excitation_rejects_unoccupied_hole() {
        let det = SpinDet::from_orbitals([0, 1]);
        let err = apply_excitation_channel(&det, &[5], &[2]).unwrap_err();
        assert!(matches!(err, Error::DegenerateExcitation { .. }));
    }

    #[test]
    fn apply_excitation_rejects_occupied_particle() {
        let det = SpinDet::from_orbitals([0, 1]);
        let err = apply_excitation_channel(&det, &[0], &[1]).unwrap_err();
        assert!(matches!(err, Error::DegenerateExcitation { .. }));
    }

    #[test]
    fn top_three_none_when_fewer() {
        let det = SpinDet::from_orbitals([0, 1]);
        assert!(det.top_three().is_none());
    }
}
