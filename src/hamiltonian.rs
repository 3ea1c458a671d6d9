//! Hamiltonian generator: owns the block-row partition of the current
//! basis and the per-rank cached sparse matrix-element table, and exposes
//! the primitives the Davidson solver needs without ever materializing the
//! full matrix (§4.6).

use std::collections::HashMap;

use crate::{
    comm::Communicator,
    determinant::Determinant,
    hij::determinant_driven,
    hij::integral_driven,
    integrals::IntegralStore,
};

/// Which dispatcher builds the sparse matrix-element table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Driver {
    DeterminantDriven,
    IntegralDriven,
}

/// Balanced static row partition: `ceil(N/W)` rows on the first `N mod W`
/// ranks, `floor(N/W)` on the rest.
#[must_use]
pub fn block_row_partition(
    n: usize,
    size: usize,
    rank: usize,
) -> (usize, usize) {
    let base = n / size;
    let rem = n % size;
    if rank < rem {
        (rank * (base + 1), base + 1)
    } else {
        (rem * (base + 1) + (rank - rem) * base, base)
    }
}

/// One outer-iteration's Hamiltonian generator, built fresh whenever the
/// basis grows and discarded afterwards.
pub struct HamiltonianGenerator<'a> {
    store: &'a IntegralStore,
    basis: &'a [Determinant],
    driver: Driver,
    offset: usize,
    local_size: usize,
    sparse: Option<HashMap<(usize, usize), f64>>,
}

impl<'a> HamiltonianGenerator<'a> {
    #[must_use]
    pub fn new(
        store: &'a IntegralStore,
        basis: &'a [Determinant],
        comm: &dyn Communicator,
        driver: Driver,
    ) -> Self {
        let (offset, local_size) = block_row_partition(basis.len(), comm.size(), comm.rank());
        Self {
            store,
            basis,
            driver,
            offset,
            local_size,
            sparse: None,
        }
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn local_size(&self) -> usize {
        self.local_size
    }

    /// ⟨D|H|D⟩ for a global basis index.
    #[must_use]
    pub fn h_ii(
        &self,
        global_row: usize,
    ) -> f64 {
        determinant_driven::h_ii(&self.basis[global_row], self.store)
    }

    /// Diagonal entries for the local row block.
    #[must_use]
    pub fn d_i(&self) -> Vec<f64> {
        (self.offset..self.offset + self.local_size).map(|i| self.h_ii(i)).collect()
    }

    fn build_sparse(&self) -> HashMap<(usize, usize), f64> {
        let mut out = HashMap::new();
        match self.driver {
            Driver::DeterminantDriven => {
                for i in self.offset..self.offset + self.local_size {
                    for (j, det_j) in self.basis.iter().enumerate() {
                        let value = determinant_driven::h_ij(&self.basis[i], det_j, self.store);
                        if value != 0.0 {
                            out.insert((i, j), value);
                        }
                    }
                }
            }
            Driver::IntegralDriven => {
                let full = integral_driven::two_electron_map(self.basis, self.store);
                for ((i, j), value) in full {
                    if i >= self.offset && i < self.offset + self.local_size && value != 0.0 {
                        out.insert((i, j), value);
                    }
                }
            }
        }
        out
    }

    /// Lazily computed sparse table keyed by `(global_row, global_col)`.
    /// First access triggers one pass through the chosen driver; later
    /// accesses are O(1).
    pub fn matrix_elements(&mut self) -> &HashMap<(usize, usize), f64> {
        if self.sparse.is_none() {
            self.sparse = Some(self.build_sparse());
        }
        self.sparse.as_ref().unwrap()
    }

    /// Dense local block row (`local_size x N`). For debugging and tests;
    /// the solver never materializes the full matrix this way.
    pub fn h_i_dense(&mut self) -> Vec<Vec<f64>> {
        let n = self.basis.len();
        let offset = self.offset;
        let local_size = self.local_size;
        let table = self.matrix_elements();
        let mut dense = vec![vec![0.0; n]; local_size];
        for (&(i, j), &value) in table {
            dense[i - offset][j] = value;
        }
        dense
    }

    /// `W_i = H_i . M` for `M` of shape `(N, k)`, returning
    /// `(local_size, k)` without ever forming `H_i` densely.
    pub fn implicit_matvec(
        &mut self,
        m: &[Vec<f64>],
    ) -> Vec<Vec<f64>> {
        let k = m.first().map_or(0, Vec::len);
        let offset = self.offset;
        let local_size = self.local_size;
        let table = self.matrix_elements();
        let mut out = vec![vec![0.0; k]; local_size];
        for (&(i, j), &value) in table {
            let row = &mut out[i - offset];
            for c in 0..k {
                row[c] += value * m[j][c];
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        comm::SingleRank,
        determinant::SpinDet,
    };

    fn toy_store() -> IntegralStore {
        let mut store = IntegralStore::new(4);
        for i in 0..4u32 {
            for j in 0..4u32 {
                for k in 0..4u32 {
                    for l in 0..4u32 {
                        store.set_two_e(i, j, k, l, 1.0);
                    }
                }
            }
        }
        store
    }

    #[test]
    fn block_row_partition_covers_all_rows_exactly_once() {
        for n in [1usize, 2, 5, 7] {
            for size in [1usize, 2, 3] {
                let mut covered = vec![false; n];
                for rank in 0..size {
                    let (offset, local_size) = block_row_partition(n, size, rank);
                    for i in offset..offset + local_size {
                        assert!(!covered[i], "row {i} covered twice");
                        covered[i] = true;
                    }
                }
                assert!(covered.iter().all(|&c| c), "not all rows covered for n={n}, size={size}");
            }
        }
    }

    #[test]
    fn diagonal_matches_determinant_driven_h_ii() {
        let store = toy_store();
        let basis = vec![
            Determinant::new(SpinDet::from_orbitals([0, 1]), SpinDet::from_orbitals([0, 1])),
            Determinant::new(SpinDet::from_orbitals([0, 2]), SpinDet::from_orbitals([0, 1])),
        ];
        let comm = SingleRank;
        let gen = HamiltonianGenerator::new(&store, &basis, &comm, Driver::DeterminantDriven);
        let d = gen.d_i();
        assert_eq!(d.len(), 2);
        assert_eq!(d[0], determinant_driven::h_ii(&basis[0], &store));
    }
}
