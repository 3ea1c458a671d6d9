//! Determinant-driven Slater-Condon evaluation: given an explicit pair of
//! determinants, compute ⟨I|H|J⟩ directly (§4.4).

use crate::{
    determinant::Determinant,
    integrals::IntegralStore,
};

use super::{
    classify_pair,
    phase_of,
    PairClass,
};

/// ⟨I|H|J⟩ for an explicit pair of determinants.
#[must_use]
pub fn h_ij(
    det_i: &Determinant,
    det_j: &Determinant,
    store: &IntegralStore,
) -> f64 {
    let class = classify_pair(det_i, det_j);
    let phase = f64::from(phase_of(det_i, det_j, &class));

    match class {
        PairClass::Diagonal => h_ii(det_i, store),
        PairClass::SingleAlpha { hole, particle } => {
            phase * single_contribution(det_i.alpha.occupied(), det_i.beta.occupied(), hole, particle, store)
        }
        PairClass::SingleBeta { hole, particle } => {
            phase * single_contribution(det_i.beta.occupied(), det_i.alpha.occupied(), hole, particle, store)
        }
        PairClass::DoubleAlpha { holes, particles } | PairClass::DoubleBeta { holes, particles } => {
            phase * (store.two_e(holes.0, holes.1, particles.0, particles.1) - store.two_e(holes.0, holes.1, particles.1, particles.0))
        }
        PairClass::DoubleMixed { hole_a, particle_a, hole_b, particle_b } => {
            phase * store.two_e(hole_a, hole_b, particle_a, particle_b)
        }
        PairClass::Zero => 0.0,
    }
}

/// The one- and two-electron diagonal, ⟨I|H|I⟩ (§4.4, degree (0,0)).
#[must_use]
pub fn h_ii(
    det: &Determinant,
    store: &IntegralStore,
) -> f64 {
    let alpha: Vec<_> = det.alpha.occupied().collect();
    let beta: Vec<_> = det.beta.occupied().collect();

    let mut value = store.e0;
    for &i in alpha.iter().chain(beta.iter()) {
        value += store.one_e(i, i);
    }

    for (idx, &i) in alpha.iter().enumerate() {
        for &j in &alpha[idx + 1..] {
            value += store.two_e(i, j, i, j) - store.two_e(i, j, j, i);
        }
    }
    for (idx, &i) in beta.iter().enumerate() {
        for &j in &beta[idx + 1..] {
            value += store.two_e(i, j, i, j) - store.two_e(i, j, j, i);
        }
    }
    for &i in &alpha {
        for &j in &beta {
            value += store.two_e(i, j, i, j);
        }
    }

    value
}

/// Contribution of a single excitation `hole -> particle` in one spin
/// channel: the one-electron term plus same-spin exchange/direct terms
/// summed over the remaining occupied orbitals of that channel, plus the
/// direct term summed over the opposite channel.
fn single_contribution(
    same_channel_occ: impl Iterator<Item = u32>,
    opposite_channel_occ: impl Iterator<Item = u32>,
    hole: u32,
    particle: u32,
    store: &IntegralStore,
) -> f64 {
    let mut value = store.one_e(hole, particle);
    for i in same_channel_occ {
        if i == hole {
            continue;
        }
        value += store.two_e(hole, i, particle, i) - store.two_e(hole, i, i, particle);
    }
    for i in opposite_channel_occ {
        value += store.two_e(hole, i, particle, i);
    }
    value
}

#[cfg(test)]
mod tests {
    use rand::{
        seq::SliceRandom,
        Rng,
    };

    use super::*;
    use crate::determinant::SpinDet;

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

    fn random_store(
        n_orb: u32,
        rng: &mut impl Rng,
    ) -> IntegralStore {
        let mut store = IntegralStore::new(n_orb);
        store.e0 = rng.gen_range(-2.0..2.0);
        for i in 0..n_orb {
            for j in 0..n_orb {
                store.set_one_e(i, j, rng.gen_range(-1.0..1.0));
                for k in 0..n_orb {
                    for l in 0..n_orb {
                        store.set_two_e(i, j, k, l, rng.gen_range(-1.0..1.0));
                    }
                }
            }
        }
        store
    }

    fn random_det(
        n_orb: u32,
        n_elec: usize,
        rng: &mut impl Rng,
    ) -> SpinDet {
        let mut orbitals: Vec<u32> = (0..n_orb).collect();
        orbitals.shuffle(rng);
        SpinDet::from_orbitals(orbitals[..n_elec].iter().copied())
    }

    #[test]
    fn hermitian_on_random_pairs() {
        let mut rng = rand::thread_rng();
        let n_orb = 6;
        for _ in 0..50 {
            let store = random_store(n_orb, &mut rng);
            let det_i = Determinant::new(random_det(n_orb, 3, &mut rng), random_det(n_orb, 3, &mut rng));
            let det_j = Determinant::new(random_det(n_orb, 3, &mut rng), random_det(n_orb, 3, &mut rng));
            assert!(
                (h_ij(&det_i, &det_j, &store) - h_ij(&det_j, &det_i, &store)).abs() < 1e-9,
                "not hermitian for {det_i:?}/{det_j:?}"
            );
        }
    }

    #[test]
    fn zero_for_triple_excitation() {
        let store = toy_store();
        let det_i = Determinant::new(SpinDet::from_orbitals([0, 1]), SpinDet::from_orbitals([0, 1]));
        let det_j = Determinant::new(SpinDet::from_orbitals([2, 3]), SpinDet::from_orbitals([0, 2]));
        assert_eq!(h_ij(&det_i, &det_j, &store), 0.0);
    }
}
