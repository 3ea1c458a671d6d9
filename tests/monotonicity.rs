use cipsi_core::{
    comm::SingleRank,
    davidson::{
        davidson,
        DavidsonParams,
    },
    determinant::{
        Determinant,
        SpinDet,
    },
    hamiltonian::{
        Driver,
        HamiltonianGenerator,
    },
    integrals::IntegralStore,
};

fn toy_store() -> IntegralStore {
    let mut store = IntegralStore::new(4);
    store.set_one_e(0, 0, -1.0);
    store.set_one_e(1, 1, -1.0);
    store.set_one_e(2, 2, -1.0);
    store.set_one_e(3, 3, -0.5);
    store.set_one_e(2, 3, 0.4);
    store
}

fn e_var(
    store: &IntegralStore,
    basis: &[Determinant],
) -> f64 {
    let comm = SingleRank;
    let mut gen = HamiltonianGenerator::new(store, basis, &comm, Driver::DeterminantDriven);
    let params = DavidsonParams {
        n_eig: 1,
        ..Default::default()
    };
    let guess = vec![1.0; basis.len()];
    let result = davidson(&mut gen, &comm, &params, vec![guess]).unwrap();
    result.eigenvalues[0]
}

#[test]
fn adding_a_connected_determinant_cannot_raise_e_var() {
    let store = toy_store();
    let hf = Determinant::new(SpinDet::from_orbitals([0, 1, 2]), SpinDet::from_orbitals([0, 1, 2]));
    let alpha_single = Determinant::new(SpinDet::from_orbitals([0, 1, 3]), SpinDet::from_orbitals([0, 1, 2]));
    let beta_single = Determinant::new(SpinDet::from_orbitals([0, 1, 2]), SpinDet::from_orbitals([0, 1, 3]));

    let basis_two = vec![hf, alpha_single];
    let e_two = e_var(&store, &basis_two);

    let basis_three = vec![hf, alpha_single, beta_single];
    let e_three = e_var(&store, &basis_three);

    assert!(
        e_three <= e_two + 1e-9,
        "adding a connected determinant raised E_var: {e_two} -> {e_three}"
    );
}
