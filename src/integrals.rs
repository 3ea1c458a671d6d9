//! Canonical indexing and storage of one- and two-electron integrals.
//!
//! Two-electron integrals in physicist notation ⟨ij|kl⟩ over real orbitals
//! enjoy an 8-fold permutation symmetry. Rather than storing all eight
//! equivalent index tuples, every integral is canonicalized to a single
//! representative and stored once.

use std::collections::HashMap;

use crate::determinant::OrbitalIdx;

/// Triangular pairing: `idx2(i,j) = max(i,j)*(max(i,j)+1)/2 + min(i,j)`.
#[must_use]
pub fn idx2(
    i: OrbitalIdx,
    j: OrbitalIdx,
) -> u64 {
    let (hi, lo) = if i >= j { (i, j) } else { (j, i) };
    let hi = u64::from(hi);
    let lo = u64::from(lo);
    hi * (hi + 1) / 2 + lo
}

/// Inverse of [`idx2`]: recovers `(max, min)` from a triangular index.
#[must_use]
pub fn idx2_reverse(v: u64) -> (u32, u32) {
    // hi is the largest integer with hi*(hi+1)/2 <= v.
    let mut hi = (((8 * v + 1) as f64).sqrt() as u64).saturating_sub(1) / 2;
    while hi * (hi + 1) / 2 > v {
        hi -= 1;
    }
    while (hi + 1) * (hi + 2) / 2 <= v {
        hi += 1;
    }
    let lo = v - hi * (hi + 1) / 2;
    (hi as u32, lo as u32)
}

/// `idx4(i,j,k,l) = idx2(idx2(i,k), idx2(j,l))`. Invariant under all eight
/// permutations of the real-orbital symmetry group.
#[must_use]
pub fn idx4(
    i: OrbitalIdx,
    j: OrbitalIdx,
    k: OrbitalIdx,
    l: OrbitalIdx,
) -> u64 {
    let a = idx2(i, k);
    let b = idx2(j, l);
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    hi * (hi + 1) / 2 + lo
}

/// Canonical representative `(i,j,k,l)` of the 8-element symmetry orbit of
/// the given indices: `i <= k`, `j <= l`, and `idx2(i,k) <= idx2(j,l)`.
#[must_use]
pub fn canonical_idx4(
    i: OrbitalIdx,
    j: OrbitalIdx,
    k: OrbitalIdx,
    l: OrbitalIdx,
) -> (OrbitalIdx, OrbitalIdx, OrbitalIdx, OrbitalIdx) {
    let (i, k) = if i <= k { (i, k) } else { (k, i) };
    let (j, l) = if j <= l { (j, l) } else { (l, j) };
    if idx2(i, k) <= idx2(j, l) {
        (i, j, k, l)
    } else {
        (j, i, l, k)
    }
}

/// Inverse of [`idx4`]: recovers the canonical `(i,j,k,l)` tuple that
/// `idx4` would have produced from whatever indices mapped to `v`.
#[must_use]
pub fn idx4_reverse(v: u64) -> (OrbitalIdx, OrbitalIdx, OrbitalIdx, OrbitalIdx) {
    let (b, a) = idx2_reverse(v);
    let (k, i) = idx2_reverse(u64::from(a));
    let (l, j) = idx2_reverse(u64::from(b));
    (i, j, k, l)
}

/// Compressed storage of one- and two-electron integrals plus the nuclear
/// repulsion / core-energy offset E0.
#[derive(Clone, Debug, Default)]
pub struct IntegralStore {
    pub e0: f64,
    one_e: HashMap<(OrbitalIdx, OrbitalIdx), f64>,
    two_e: HashMap<u64, f64>,
    pub n_orb: u32,
}

impl IntegralStore {
    #[must_use]
    pub fn new(n_orb: u32) -> Self {
        Self {
            e0: 0.0,
            one_e: HashMap::new(),
            two_e: HashMap::new(),
            n_orb,
        }
    }

    /// Store ⟨i|h|j⟩, symmetrically under (i,j) <-> (j,i).
    pub fn set_one_e(
        &mut self,
        i: OrbitalIdx,
        j: OrbitalIdx,
        value: f64,
    ) {
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        self.one_e.insert((lo, hi), value);
    }

    /// Lookup ⟨i|h|j⟩; zero if absent.
    #[must_use]
    pub fn one_e(
        &self,
        i: OrbitalIdx,
        j: OrbitalIdx,
    ) -> f64 {
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        self.one_e.get(&(lo, hi)).copied().unwrap_or(0.0)
    }

    /// Store ⟨ij|kl⟩ under its canonical key.
    pub fn set_two_e(
        &mut self,
        i: OrbitalIdx,
        j: OrbitalIdx,
        k: OrbitalIdx,
        l: OrbitalIdx,
        value: f64,
    ) {
        let key = idx4(i, j, k, l);
        self.two_e.insert(key, value);
    }

    /// Lookup ⟨ij|kl⟩; zero if absent.
    #[must_use]
    pub fn two_e(
        &self,
        i: OrbitalIdx,
        j: OrbitalIdx,
        k: OrbitalIdx,
        l: OrbitalIdx,
    ) -> f64 {
        self.two_e.get(&idx4(i, j, k, l)).copied().unwrap_or(0.0)
    }

    /// Iterate the stored one-electron integrals as `(i,j,value)` with
    /// `i <= j`.
    pub fn iter_one_e(&self) -> impl Iterator<Item = (OrbitalIdx, OrbitalIdx, f64)> + '_ {
        self.one_e.iter().map(|(&(i, j), &value)| (i, j, value))
    }

    /// Iterate the canonical two-electron integrals as `(i,j,k,l,value)`.
    pub fn iter_two_e(&self) -> impl Iterator<Item = (OrbitalIdx, OrbitalIdx, OrbitalIdx, OrbitalIdx, f64)> + '_ {
        self.two_e.iter().map(|(&key, &value)| {
            let (i, j, k, l) = idx4_reverse(key);
            (i, j, k, l, value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_perms(i: u32, j: u32, k: u32, l: u32) -> [(u32, u32, u32, u32); 8] {
        [
            (i, j, k, l),
            (j, i, l, k),
            (k, l, i, j),
            (l, k, j, i),
            (i, l, k, j),
            (l, i, j, k),
            (k, j, i, l),
            (j, k, l, i),
        ]
    }

    #[test]
    fn eight_fold_symmetry() {
        for &(i, j, k, l) in &[(0, 1, 2, 3), (4, 4, 1, 2), (0, 0, 0, 0), (7, 3, 5, 1)] {
            let expect = idx4(i, j, k, l);
            for &(pi, pj, pk, pl) in &all_perms(i, j, k, l) {
                assert_eq!(idx4(pi, pj, pk, pl), expect, "perm ({pi},{pj},{pk},{pl})");
            }
        }
    }

    #[test]
    fn canonical_roundtrip() {
        for &(i, j, k, l) in &[(0u32, 1, 2, 3), (4, 4, 1, 2), (7, 3, 5, 1), (2, 2, 2, 2)] {
            let canon = canonical_idx4(i, j, k, l);
            assert!(canon.0 <= canon.2);
            assert!(canon.1 <= canon.3);
            assert!(idx2(canon.0, canon.2) <= idx2(canon.1, canon.3));
            let v = idx4(i, j, k, l);
            assert_eq!(idx4_reverse(v), canon);
        }
    }

    #[test]
    fn idx2_reverse_matches_forward() {
        for i in 0..10u32 {
            for j in 0..10u32 {
                let v = idx2(i, j);
                let (hi, lo) = idx2_reverse(v);
                assert_eq!(hi, i.max(j));
                assert_eq!(lo, i.min(j));
            }
        }
    }

    #[test]
    fn integral_store_lookup_is_symmetric_under_canonical_perms() {
        let mut store = IntegralStore::new(8);
        store.set_two_e(0, 1, 2, 3, 0.5);
        for &(pi, pj, pk, pl) in &all_perms(0, 1, 2, 3) {
            assert_eq!(store.two_e(pi, pj, pk, pl), 0.5);
        }
    }
}
