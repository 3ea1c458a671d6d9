//! Distributed, matrix-free Davidson eigensolver (§4.7).
//!
//! The Hamiltonian is never materialized globally: every matvec goes
//! through [`crate::hamiltonian::HamiltonianGenerator::implicit_matvec`],
//! and every reduction that needs a cross-rank view goes through the
//! [`Communicator`] the caller supplies.

use crate::{
    comm::Communicator,
    error::{
        Error,
        Result,
    },
    hamiltonian::HamiltonianGenerator,
};

/// Davidson solver parameters.
#[derive(Clone, Debug)]
pub struct DavidsonParams {
    pub n_eig: usize,
    pub eps_conv: f64,
    pub eps_sub: f64,
    pub max_iter: usize,
    pub m_min: usize,
    pub m_max: usize,
}

impl Default for DavidsonParams {
    fn default() -> Self {
        Self {
            n_eig: 1,
            eps_conv: 1e-8,
            eps_sub: 1e-10,
            max_iter: 100,
            m_min: 1,
            m_max: 20,
        }
    }
}

/// Converged eigenpairs, eigenvectors as length-N replicated coefficient
/// vectors.
#[derive(Clone, Debug)]
pub struct DavidsonResult {
    pub eigenvalues: Vec<f64>,
    pub eigenvectors: Vec<Vec<f64>>,
}

fn local_dot(
    gen: &HamiltonianGenerator<'_>,
    a: &[f64],
    b: &[f64],
) -> f64 {
    let offset = gen.offset();
    let local_size = gen.local_size();
    (offset..offset + local_size).map(|i| a[i] * b[i]).sum()
}

fn global_dot(
    comm: &dyn Communicator,
    gen: &HamiltonianGenerator<'_>,
    a: &[f64],
    b: &[f64],
) -> f64 {
    comm.allreduce_sum(local_dot(gen, a, b))
}

fn normalize(v: &mut [f64]) {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Cyclic Jacobi eigen-decomposition of a small dense symmetric matrix.
/// Returns eigenvalues ascending and eigenvectors as columns of the same
/// shape. Adequate for the projected subspace matrix, whose dimension is
/// bounded by `m_max`.
fn jacobi_eigen(mat: &[Vec<f64>]) -> (Vec<f64>, Vec<Vec<f64>>) {
    let n = mat.len();
    let mut a: Vec<Vec<f64>> = mat.to_vec();
    let mut v: Vec<Vec<f64>> = (0..n).map(|i| (0..n).map(|j| f64::from(u8::from(i == j))).collect()).collect();

    for _sweep in 0..100 {
        let mut off_diag = 0.0;
        for p in 0..n {
            for q in p + 1..n {
                off_diag += a[p][q] * a[p][q];
            }
        }
        if off_diag.sqrt() < 1e-13 {
            break;
        }
        for p in 0..n {
            for q in p + 1..n {
                if a[p][q].abs() < 1e-300 {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let t = theta.signum() / (theta.abs() + (1.0 + theta * theta).sqrt());
                let t = if theta == 0.0 { 1.0 } else { t };
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[k][p];
                    let akq = a[k][q];
                    a[k][p] = c * akp - s * akq;
                    a[k][q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[p][k];
                    let aqk = a[q][k];
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = v[k][p];
                    let vkq = v[k][q];
                    v[k][p] = c * vkp - s * vkq;
                    v[k][q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let mut eigvals: Vec<f64> = (0..n).map(|i| a[i][i]).collect();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| eigvals[i].partial_cmp(&eigvals[j]).unwrap());
    let sorted_vals: Vec<f64> = order.iter().map(|&i| eigvals[i]).collect();
    let sorted_vecs: Vec<Vec<f64>> = (0..n).map(|row| order.iter().map(|&col| v[row][col]).collect()).collect();
    eigvals.clone_from(&sorted_vals);
    (sorted_vals, sorted_vecs)
}

/// Run the distributed matrix-free Davidson solver to convergence.
///
/// `initial` seeds the trial subspace (one column per initial guess, full
/// length-N vectors, already orthonormal); typically the current
/// wavefunction coefficients.
pub fn davidson(
    gen: &mut HamiltonianGenerator<'_>,
    comm: &dyn Communicator,
    params: &DavidsonParams,
    initial: Vec<Vec<f64>>,
) -> Result<DavidsonResult> {
    let n = initial.first().map_or(0, Vec::len);
    let d_local = gen.d_i();
    let offset = gen.offset();

    let mut v_cols: Vec<Vec<f64>> = initial;
    for col in &mut v_cols {
        normalize(col);
    }

    for _iter in 0..params.max_iter {
        let m = v_cols.len();
        let v_as_matrix: Vec<Vec<f64>> = (0..n).map(|i| v_cols.iter().map(|c| c[i]).collect()).collect();
        let local_w = gen.implicit_matvec(&v_as_matrix);

        let mut w_cols: Vec<Vec<f64>> = Vec::with_capacity(m);
        for col in 0..m {
            let local: Vec<f64> = local_w.iter().map(|row| row[col]).collect();
            w_cols.push(comm.allgatherv_f64(&local));
        }

        let mut s = vec![vec![0.0; m]; m];
        for a in 0..m {
            for b in 0..m {
                s[a][b] = global_dot(comm, gen, &v_cols[a], &w_cols[b]);
            }
        }

        let (eigvals, eigvecs) = jacobi_eigen(&s);
        let n_eig = params.n_eig.min(m);

        let ritz: Vec<Vec<f64>> = (0..n_eig)
            .map(|k| {
                let mut x = vec![0.0; n];
                for (a, v_col) in v_cols.iter().enumerate() {
                    let coeff = eigvecs[a][k];
                    for i in 0..n {
                        x[i] += coeff * v_col[i];
                    }
                }
                x
            })
            .collect();

        let residuals: Vec<Vec<f64>> = (0..n_eig)
            .map(|k| {
                let mut r = vec![0.0; n];
                for (a, w_col) in w_cols.iter().enumerate() {
                    let coeff = eigvecs[a][k];
                    for i in 0..n {
                        r[i] += coeff * w_col[i];
                    }
                }
                for i in 0..n {
                    r[i] -= eigvals[k] * ritz[k][i];
                }
                r
            })
            .collect();

        let residual_norms: Vec<f64> = residuals.iter().map(|r| global_dot(comm, gen, r, r).sqrt()).collect();

        if residual_norms.iter().all(|&r| r < params.eps_conv) {
            return Ok(DavidsonResult {
                eigenvalues: eigvals[..n_eig].to_vec(),
                eigenvectors: ritz,
            });
        }

        let mut added = false;
        for k in 0..n_eig {
            if residual_norms[k] < params.eps_conv {
                continue;
            }
            let mut t_local = vec![0.0; gen.local_size()];
            for (local_i, t) in t_local.iter_mut().enumerate() {
                let i = offset + local_i;
                let denom = d_local[local_i] - eigvals[k];
                let precond = if denom.abs() > 1e-12 { (1.0 / denom).clamp(-1e5, 1e5) } else { 0.0 };
                *t = precond * residuals[k][i];
            }
            let mut t_full = comm.allgatherv_f64(&t_local);

            for v_col in &v_cols {
                let beta = global_dot(comm, gen, &t_full, v_col);
                for i in 0..n {
                    t_full[i] -= beta * v_col[i];
                }
            }
            let norm = global_dot(comm, gen, &t_full, &t_full).sqrt();
            if norm < params.eps_sub {
                continue;
            }
            for x in &mut t_full {
                *x /= norm;
            }
            v_cols.push(t_full);
            added = true;
        }

        if v_cols.len() >= params.m_max || !added {
            let mut restart: Vec<Vec<f64>> = ritz.clone();
            if v_cols.len() > restart.len() {
                restart.push(v_cols.last().unwrap().clone());
            }
            v_cols = restart;
            for col in &mut v_cols {
                normalize(col);
            }
        }
    }

    Err(Error::DavidsonNotConverged { max_iter: params.max_iter })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        comm::SingleRank,
        determinant::{
            Determinant,
            SpinDet,
        },
        hamiltonian::Driver,
        integrals::IntegralStore,
    };

    #[test]
    fn converges_for_trivial_one_determinant_basis() {
        let mut store = IntegralStore::new(2);
        store.set_one_e(0, 0, -1.0);
        store.set_one_e(1, 1, -1.0);
        let basis = vec![Determinant::new(SpinDet::from_orbitals([0]), SpinDet::from_orbitals([0]))];
        let comm = SingleRank;
        let mut gen = HamiltonianGenerator::new(&store, &basis, &comm, Driver::DeterminantDriven);
        let params = DavidsonParams { n_eig: 1, ..Default::default() };
        let result = davidson(&mut gen, &comm, &params, vec![vec![1.0]]).unwrap();
        assert!((result.eigenvalues[0] - (-2.0)).abs() < 1e-6);
    }
}
