//! A CI wavefunction: parallel arrays of determinants and coefficients.

use crate::determinant::Determinant;

/// A variational or trial wavefunction over a basis of determinants.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Wavefunction {
    pub det: Vec<Determinant>,
    pub coef: Vec<f64>,
}

impl Wavefunction {
    #[must_use]
    pub fn new(
        det: Vec<Determinant>,
        coef: Vec<f64>,
    ) -> Self {
        assert_eq!(det.len(), coef.len(), "determinant and coefficient arrays must have equal length");
        Self {
            det,
            coef,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.det.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.det.is_empty()
    }

    #[must_use]
    pub fn norm(&self) -> f64 {
        self.coef.iter().map(|c| c * c).sum::<f64>().sqrt()
    }

    /// Rescale `coef` in place to unit L2 norm. No-op on a zero vector.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for c in &mut self.coef {
                *c /= norm;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::determinant::SpinDet;

    fn det(alpha: &[u32]) -> Determinant {
        Determinant::new(SpinDet::from_orbitals(alpha.iter().copied()), SpinDet::from_orbitals(alpha.iter().copied()))
    }

    #[test]
    fn normalize_rescales_to_unit_norm() {
        let mut wf = Wavefunction::new(vec![det(&[0]), det(&[1])], vec![3.0, 4.0]);
        wf.normalize();
        assert!((wf.norm() - 1.0).abs() < 1e-12);
        assert!((wf.coef[0] - 0.6).abs() < 1e-12);
        assert!((wf.coef[1] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn normalize_is_noop_on_zero_vector() {
        let mut wf = Wavefunction::new(vec![det(&[0])], vec![0.0]);
        wf.normalize();
        assert_eq!(wf.coef[0], 0.0);
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn new_rejects_mismatched_lengths() {
        let _ = Wavefunction::new(vec![det(&[0]), det(&[1])], vec![1.0]);
    }
}
