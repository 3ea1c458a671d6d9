//! Inverted index from orbital occupancy to determinant indices, used to
//! pre-filter candidate determinants without an O(N^2) all-pairs scan.

use std::collections::{
    HashMap,
    HashSet,
};

use crate::determinant::{
    Determinant,
    OrbitalIdx,
};

/// Which spin channel's determinants we are asking about.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Spin {
    Alpha,
    Beta,
}

impl Spin {
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Self::Alpha => Self::Beta,
            Self::Beta => Self::Alpha,
        }
    }
}

/// Combinator for [`OccupancyIndex::dets_occ_in`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Intersection of every looked-up set.
    All,
    /// Union of every looked-up set.
    Any,
}

/// `occ_alpha`/`occ_beta`: orbital -> set of determinant indices occupying
/// that orbital in that spin channel.
#[derive(Clone, Debug, Default)]
pub struct OccupancyIndex {
    occ_alpha: HashMap<OrbitalIdx, HashSet<usize>>,
    occ_beta: HashMap<OrbitalIdx, HashSet<usize>>,
}

impl OccupancyIndex {
    /// Build the inverted index from a basis of determinants.
    #[must_use]
    pub fn build(dets: &[Determinant]) -> Self {
        let mut occ_alpha: HashMap<OrbitalIdx, HashSet<usize>> = HashMap::new();
        let mut occ_beta: HashMap<OrbitalIdx, HashSet<usize>> = HashMap::new();
        for (idx, det) in dets.iter().enumerate() {
            for orb in det.alpha.occupied() {
                occ_alpha.entry(orb).or_default().insert(idx);
            }
            for orb in det.beta.occupied() {
                occ_beta.entry(orb).or_default().insert(idx);
            }
        }
        Self {
            occ_alpha,
            occ_beta,
        }
    }

    fn map(
        &self,
        spin: Spin,
    ) -> &HashMap<OrbitalIdx, HashSet<usize>> {
        match spin {
            Spin::Alpha => &self.occ_alpha,
            Spin::Beta => &self.occ_beta,
        }
    }

    fn lookup(
        &self,
        spin: Spin,
        orb: OrbitalIdx,
    ) -> HashSet<usize> {
        self.map(spin).get(&orb).cloned().unwrap_or_default()
    }

    /// Combine the occupancy sets of `same_orbs` (looked up in `same_spin`)
    /// and `opposite_orbs` (looked up in `same_spin.flip()`) via `mode`.
    ///
    /// If both orbital lists are empty, returns the empty set: an
    /// intersection or union of nothing is not universal.
    #[must_use]
    pub fn dets_occ_in(
        &self,
        same_spin: Spin,
        same_orbs: &[OrbitalIdx],
        opposite_orbs: &[OrbitalIdx],
        mode: Mode,
    ) -> HashSet<usize> {
        let mut sets: Vec<HashSet<usize>> = Vec::with_capacity(same_orbs.len() + opposite_orbs.len());
        for &o in same_orbs {
            sets.push(self.lookup(same_spin, o));
        }
        for &o in opposite_orbs {
            sets.push(self.lookup(same_spin.flip(), o));
        }
        if sets.is_empty() {
            return HashSet::new();
        }
        let mut iter = sets.into_iter();
        let first = iter.next().unwrap();
        match mode {
            Mode::All => iter.fold(first, |acc, s| acc.intersection(&s).copied().collect()),
            Mode::Any => iter.fold(first, |mut acc, s| {
                acc.extend(s);
                acc
            }),
        }
    }

    /// `dets_occ_in(occupied, All) \ dets_occ_in(unoccupied, Any)`.
    #[must_use]
    pub fn dets_via_occupancy(
        &self,
        same_spin: Spin,
        occ_same: &[OrbitalIdx],
        occ_opposite: &[OrbitalIdx],
        unocc_same: &[OrbitalIdx],
        unocc_opposite: &[OrbitalIdx],
    ) -> HashSet<usize> {
        let occupied = self.dets_occ_in(same_spin, occ_same, occ_opposite, Mode::All);
        let unoccupied = self.dets_occ_in(same_spin, unocc_same, unocc_opposite, Mode::Any);
        occupied.difference(&unoccupied).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::determinant::SpinDet;

    fn det(alpha: &[u32], beta: &[u32]) -> Determinant {
        Determinant::new(SpinDet::from_orbitals(alpha.iter().copied()), SpinDet::from_orbitals(beta.iter().copied()))
    }

    #[test]
    fn empty_orbital_list_is_empty_not_universal() {
        let dets = vec![det(&[0, 1], &[0, 1]), det(&[0, 2], &[0, 1])];
        let idx = OccupancyIndex::build(&dets);
        let result = idx.dets_occ_in(Spin::Alpha, &[], &[], Mode::All);
        assert!(result.is_empty());
    }

    #[test]
    fn intersection_and_union() {
        let dets = vec![det(&[0, 1], &[0, 1]), det(&[0, 2], &[0, 1]), det(&[1, 2], &[0, 1])];
        let idx = OccupancyIndex::build(&dets);
        let both = idx.dets_occ_in(Spin::Alpha, &[0, 1], &[], Mode::All);
        assert_eq!(both, HashSet::from([0]));
        let either = idx.dets_occ_in(Spin::Alpha, &[0, 1], &[], Mode::Any);
        assert_eq!(either, HashSet::from([0, 1, 2]));
    }

    #[test]
    fn dets_via_occupancy_excludes_unoccupied() {
        let dets = vec![det(&[0, 1], &[]), det(&[0, 2], &[]), det(&[0, 1, 2], &[])];
        let idx = OccupancyIndex::build(&dets);
        let result = idx.dets_via_occupancy(Spin::Alpha, &[0], &[], &[2], &[]);
        assert_eq!(result, HashSet::from([0]));
    }
}
