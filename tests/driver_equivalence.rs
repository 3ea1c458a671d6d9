use cipsi_core::{
    comm::SingleRank,
    determinant::{
        Determinant,
        SpinDet,
    },
    excitation::gen_all_excitations,
    hamiltonian::{
        Driver,
        HamiltonianGenerator,
    },
    integrals::IntegralStore,
};
use rand::Rng;

fn four_orbital_store() -> IntegralStore {
    let mut store = IntegralStore::new(4);
    store.e0 = 0.37;
    for p in 0..4u32 {
        for q in 0..4u32 {
            store.set_one_e(p, q, 0.1 * f64::from(p) - 0.05 * f64::from(q));
        }
    }
    for i in 0..4u32 {
        for j in 0..4u32 {
            for k in 0..4u32 {
                for l in 0..4u32 {
                    let value = 0.01 * f64::from(i + 1) * f64::from(j + 1) - 0.002 * f64::from(k * l);
                    store.set_two_e(i, j, k, l, value);
                }
            }
        }
    }
    store
}

fn full_basis(n_orb: u32) -> Vec<Determinant> {
    let hf = Determinant::new(SpinDet::from_orbitals([0, 1]), SpinDet::from_orbitals([0, 1]));
    let mut basis = vec![hf];
    let mut seen = std::collections::HashSet::from([hf]);
    gen_all_excitations(&hf, n_orb, |d| {
        if seen.insert(d) {
            basis.push(d);
        }
    });
    basis
}

fn random_store(
    n_orb: u32,
    rng: &mut impl Rng,
) -> IntegralStore {
    let mut store = IntegralStore::new(n_orb);
    store.e0 = rng.gen_range(-2.0..2.0);
    for p in 0..n_orb {
        for q in 0..n_orb {
            store.set_one_e(p, q, rng.gen_range(-1.0..1.0));
        }
    }
    for i in 0..n_orb {
        for j in 0..n_orb {
            for k in 0..n_orb {
                for l in 0..n_orb {
                    store.set_two_e(i, j, k, l, rng.gen_range(-1.0..1.0));
                }
            }
        }
    }
    store
}

#[test]
fn determinant_and_integral_driven_produce_the_same_dense_block() {
    let store = four_orbital_store();
    let basis = full_basis(4);
    let comm = SingleRank;

    let mut det_driven = HamiltonianGenerator::new(&store, &basis, &comm, Driver::DeterminantDriven);
    let mut int_driven = HamiltonianGenerator::new(&store, &basis, &comm, Driver::IntegralDriven);

    let dense_det = det_driven.h_i_dense();
    let dense_int = int_driven.h_i_dense();

    assert_eq!(dense_det.len(), dense_int.len());
    for (row_det, row_int) in dense_det.iter().zip(dense_int.iter()) {
        for (&a, &b) in row_det.iter().zip(row_int.iter()) {
            assert!((a - b).abs() < 1e-9, "mismatch: {a} vs {b}");
        }
    }
}

#[test]
fn random_integral_stores_keep_the_two_drivers_equivalent_and_hermitian() {
    let mut rng = rand::thread_rng();
    let basis = full_basis(4);
    let comm = SingleRank;

    for _ in 0..10 {
        let store = random_store(4, &mut rng);

        let mut det_driven = HamiltonianGenerator::new(&store, &basis, &comm, Driver::DeterminantDriven);
        let mut int_driven = HamiltonianGenerator::new(&store, &basis, &comm, Driver::IntegralDriven);
        let dense_det = det_driven.h_i_dense();
        let dense_int = int_driven.h_i_dense();

        let n = basis.len();
        assert_eq!(dense_det.len(), dense_int.len());
        for i in 0..n {
            for j in 0..n {
                assert!(
                    (dense_det[i][j] - dense_int[i][j]).abs() < 1e-9,
                    "driver mismatch at ({i}, {j})"
                );
                assert!((dense_det[i][j] - dense_det[j][i]).abs() < 1e-9, "H not hermitian at ({i}, {j})");
            }
        }
    }
}

#[test]
fn the_generated_block_is_symmetric() {
    let store = four_orbital_store();
    let basis = full_basis(4);
    let comm = SingleRank;

    let mut gen = HamiltonianGenerator::new(&store, &basis, &comm, Driver::DeterminantDriven);
    let dense = gen.h_i_dense();
    let n = basis.len();
    assert_eq!(dense.len(), n);
    for i in 0..n {
        for j in 0..n {
            assert!((dense[i][j] - dense[j][i]).abs() < 1e-9, "H not hermitian at ({i}, {j})");
        }
    }
}
