//! Integral-driven Slater-Condon evaluation: walk the compressed integral
//! list once; for each integral, enumerate the determinant pairs it can
//! contribute to via the category classifier and the occupancy index
//! (§4.5), instead of scanning all determinant pairs.

use std::collections::HashMap;

use crate::{
    category::{
        classify,
        Category,
    },
    determinant::{
        apply_excitation_channel,
        double_phase,
        single_phase,
        Determinant,
        OrbitalIdx,
    },
    occupancy::{
        Mode,
        OccupancyIndex,
        Spin,
    },
};

fn channel_of(
    det: &Determinant,
    spin: Spin,
) -> crate::determinant::SpinDet {
    match spin {
        Spin::Alpha => det.alpha,
        Spin::Beta => det.beta,
    }
}

fn with_channel(
    det: &Determinant,
    spin: Spin,
    new_channel: crate::determinant::SpinDet,
) -> Determinant {
    match spin {
        Spin::Alpha => Determinant::new(new_channel, det.beta),
        Spin::Beta => Determinant::new(det.alpha, new_channel),
    }
}

/// For each candidate basis index with `h` occupied and `p` unoccupied in
/// `spin`, apply the single excitation and, if the result is present in the
/// basis, accumulate `phasemod * single_phase * value` into `out`.
fn do_single(
    basis: &[Determinant],
    det_index: &HashMap<Determinant, usize>,
    candidates: &[usize],
    spin: Spin,
    h: OrbitalIdx,
    p: OrbitalIdx,
    phasemod: f64,
    value: f64,
    out: &mut HashMap<(usize, usize), f64>,
) {
    for &i in candidates {
        let det_i = &basis[i];
        let channel = channel_of(det_i, spin);
        let Ok(new_channel) = apply_excitation_channel(&channel, &[h], &[p]) else {
            continue;
        };
        let det_j = with_channel(det_i, spin, new_channel);
        if let Some(&j) = det_index.get(&det_j) {
            let phase = single_phase(&channel, &new_channel, h, p);
            *out.entry((i, j)).or_insert(0.0) += phasemod * f64::from(phase) * value;
        }
    }
}

/// Same-spin double excitation `(h1,h2) -> (p1,p2)` within one channel.
fn do_double_samespin(
    basis: &[Determinant],
    det_index: &HashMap<Determinant, usize>,
    candidates: &[usize],
    spin: Spin,
    h1: OrbitalIdx,
    h2: OrbitalIdx,
    p1: OrbitalIdx,
    p2: OrbitalIdx,
    phasemod: f64,
    value: f64,
    out: &mut HashMap<(usize, usize), f64>,
) {
    for &i in candidates {
        let det_i = &basis[i];
        let channel = channel_of(det_i, spin);
        let Ok(new_channel) = apply_excitation_channel(&channel, &[h1, h2], &[p1, p2]) else {
            continue;
        };
        let det_j = with_channel(det_i, spin, new_channel);
        if let Some(&j) = det_index.get(&det_j) {
            let phase = double_phase(&channel, &new_channel, h1, h2, p1, p2);
            *out.entry((i, j)).or_insert(0.0) += phasemod * f64::from(phase) * value;
        }
    }
}

/// Opposite-spin double excitation: `h_a -> p_a` in alpha, `h_b -> p_b` in
/// beta (or vice versa, depending on which spin is passed as "a").
#[allow(clippy::too_many_arguments)]
fn do_double_oppspin(
    basis: &[Determinant],
    det_index: &HashMap<Determinant, usize>,
    candidates: &[usize],
    spin_a: Spin,
    h_a: OrbitalIdx,
    p_a: OrbitalIdx,
    h_b: OrbitalIdx,
    p_b: OrbitalIdx,
    phasemod: f64,
    value: f64,
    out: &mut HashMap<(usize, usize), f64>,
) {
    let spin_b = spin_a.flip();
    for &i in candidates {
        let det_i = &basis[i];
        let chan_a = channel_of(det_i, spin_a);
        let chan_b = channel_of(det_i, spin_b);
        let (Ok(new_a), Ok(new_b)) =
            (apply_excitation_channel(&chan_a, &[h_a], &[p_a]), apply_excitation_channel(&chan_b, &[h_b], &[p_b]))
        else {
            continue;
        };
        let det_j = with_channel(&with_channel(det_i, spin_a, new_a), spin_b, new_b);
        if let Some(&j) = det_index.get(&det_j) {
            let phase = single_phase(&chan_a, &new_a, h_a, p_a) * single_phase(&chan_b, &new_b, h_b, p_b);
            *out.entry((i, j)).or_insert(0.0) += phasemod * f64::from(phase) * value;
        }
    }
}

/// Enumerate both directions of a same-channel single excitation between
/// orbital `h` and orbital `p`, with an optional same-spin spectator (which
/// must be distinct from both).
fn emit_single_both_directions(
    basis: &[Determinant],
    det_index: &HashMap<Determinant, usize>,
    occ: &OccupancyIndex,
    spin: Spin,
    h: OrbitalIdx,
    p: OrbitalIdx,
    spectator_same: Option<OrbitalIdx>,
    spectator_opposite: Option<OrbitalIdx>,
    phasemod: f64,
    value: f64,
    out: &mut HashMap<(usize, usize), f64>,
) {
    for (from, to) in [(h, p), (p, h)] {
        let same: Vec<_> = std::iter::once(from).chain(spectator_same).collect();
        let opp: Vec<_> = spectator_opposite.into_iter().collect();
        let unocc: Vec<_> = std::iter::once(to).collect();
        let candidates: Vec<_> =
            occ.dets_via_occupancy(spin, &same, &opp, &unocc, &[]).into_iter().collect();
        do_single(basis, det_index, &candidates, spin, from, to, phasemod, value, out);
    }
}

/// Contribution of a category-A integral ⟨ii|ii⟩: diagonal for
/// determinants doubly occupied in `i`.
fn category_a(
    basis: &[Determinant],
    occ: &OccupancyIndex,
    i: OrbitalIdx,
    value: f64,
    out: &mut HashMap<(usize, usize), f64>,
) {
    let _ = basis;
    for idx in occ.dets_occ_in(Spin::Alpha, &[i], &[i], Mode::All) {
        *out.entry((idx, idx)).or_insert(0.0) += value;
    }
}

/// Contribution of a category-B integral ⟨ij|ij⟩ (`i=k<j=l`): diagonal for
/// determinants occupying both `i` and `j`, in any spin combination.
fn category_b(
    occ: &OccupancyIndex,
    i: OrbitalIdx,
    j: OrbitalIdx,
    value: f64,
    out: &mut HashMap<(usize, usize), f64>,
) {
    for idx in occ.dets_occ_in(Spin::Alpha, &[i, j], &[], Mode::All) {
        *out.entry((idx, idx)).or_insert(0.0) += value;
    }
    for idx in occ.dets_occ_in(Spin::Beta, &[i, j], &[], Mode::All) {
        *out.entry((idx, idx)).or_insert(0.0) += value;
    }
    for idx in occ.dets_occ_in(Spin::Alpha, &[i], &[j], Mode::All) {
        *out.entry((idx, idx)).or_insert(0.0) += value;
    }
    for idx in occ.dets_occ_in(Spin::Beta, &[i], &[j], Mode::All) {
        *out.entry((idx, idx)).or_insert(0.0) += value;
    }
}

/// Category C/D: one hole/particle pair with a spectator drawn from the
/// repeated orbital. `same_spin_spectator_allowed` distinguishes C (both
/// spin assignments of the spectator) from D (opposite spin only).
#[allow(clippy::too_many_arguments)]
fn category_c_or_d(
    basis: &[Determinant],
    det_index: &HashMap<Determinant, usize>,
    occ: &OccupancyIndex,
    spectator: OrbitalIdx,
    h: OrbitalIdx,
    p: OrbitalIdx,
    value: f64,
    same_spin_spectator_allowed: bool,
    out: &mut HashMap<(usize, usize), f64>,
) {
    for spin in [Spin::Alpha, Spin::Beta] {
        if same_spin_spectator_allowed {
            emit_single_both_directions(basis, det_index, occ, spin, h, p, Some(spectator), None, 1.0, value, out);
        }
        emit_single_both_directions(basis, det_index, occ, spin, h, p, None, Some(spectator), 1.0, value, out);
    }
}

/// Category E: same-spin singles with phase -1 plus opposite-spin doubles.
fn category_e(
    basis: &[Determinant],
    det_index: &HashMap<Determinant, usize>,
    occ: &OccupancyIndex,
    i: OrbitalIdx,
    j: OrbitalIdx,
    k: OrbitalIdx,
    l: OrbitalIdx,
    value: f64,
    out: &mut HashMap<(usize, usize), f64>,
) {
    let (spectator, h, p) = if i == j {
        (i, k, l)
    } else if j == k {
        (j, i, l)
    } else {
        (k, i, j)
    };
    for spin in [Spin::Alpha, Spin::Beta] {
        emit_single_both_directions(basis, det_index, occ, spin, h, p, Some(spectator), None, -1.0, value, out);
    }
    emit_oppspin_doubles(basis, det_index, occ, i, j, k, l, value, out);
}

/// Category F: `i=j<k=l`. Diagonal cross term for both spin orderings of
/// the distinct orbitals, plus the opposite-spin exchange double that
/// swaps occupation of the two distinct orbitals between channels.
fn category_f(
    basis: &[Determinant],
    det_index: &HashMap<Determinant, usize>,
    occ: &OccupancyIndex,
    i: OrbitalIdx,
    k: OrbitalIdx,
    value: f64,
    out: &mut HashMap<(usize, usize), f64>,
) {
    for idx in occ.dets_occ_in(Spin::Alpha, &[i], &[k], Mode::All) {
        *out.entry((idx, idx)).or_insert(0.0) -= value;
    }
    for idx in occ.dets_occ_in(Spin::Beta, &[i], &[k], Mode::All) {
        *out.entry((idx, idx)).or_insert(0.0) -= value;
    }

    for (h_a, p_a, h_b, p_b) in [(i, k, k, i), (k, i, i, k)] {
        let candidates: Vec<_> = occ
            .dets_via_occupancy(Spin::Alpha, &[h_a], &[h_b], &[p_a], &[p_b])
            .into_iter()
            .collect();
        do_double_oppspin(basis, det_index, &candidates, Spin::Alpha, h_a, p_a, h_b, p_b, 1.0, value, out);
    }
}

/// Category G: all four indices distinct. Same-spin doubles within each
/// channel plus opposite-spin doubles over every permutation of the two
/// hole/particle pairs and spin assignment.
fn category_g(
    basis: &[Determinant],
    det_index: &HashMap<Determinant, usize>,
    occ: &OccupancyIndex,
    i: OrbitalIdx,
    j: OrbitalIdx,
    k: OrbitalIdx,
    l: OrbitalIdx,
    value: f64,
    out: &mut HashMap<(usize, usize), f64>,
) {
    for spin in [Spin::Alpha, Spin::Beta] {
        for (h1, h2, p1, p2) in [(i, j, k, l), (k, l, i, j)] {
            let candidates: Vec<_> =
                occ.dets_via_occupancy(spin, &[h1, h2], &[], &[p1, p2], &[]).into_iter().collect();
            do_double_samespin(basis, det_index, &candidates, spin, h1, h2, p1, p2, 1.0, value, out);
        }
    }
    emit_oppspin_doubles(basis, det_index, occ, i, j, k, l, value, out);
}

/// Shared opposite-spin double enumeration used by categories E and G:
/// every permutation of `(i,k)` as the first hole/particle pair, every
/// permutation of `(j,l)` as the second, over both spin assignments.
fn emit_oppspin_doubles(
    basis: &[Determinant],
    det_index: &HashMap<Determinant, usize>,
    occ: &OccupancyIndex,
    i: OrbitalIdx,
    j: OrbitalIdx,
    k: OrbitalIdx,
    l: OrbitalIdx,
    value: f64,
    out: &mut HashMap<(usize, usize), f64>,
) {
    for (spin_a, spin_b) in [(Spin::Alpha, Spin::Beta), (Spin::Beta, Spin::Alpha)] {
        for (h_a, p_a) in [(i, k), (k, i)] {
            for (h_b, p_b) in [(j, l), (l, j)] {
                let candidates: Vec<_> = occ
                    .dets_via_occupancy(spin_a, &[h_a], &[h_b], &[p_a], &[p_b])
                    .into_iter()
                    .collect();
                do_double_oppspin(basis, det_index, &candidates, spin_a, h_a, p_a, h_b, p_b, 1.0, value, out);
            }
        }
    }
}

/// Contribution of a single canonical two-electron integral, dispatched by
/// category.
fn two_electron_integral(
    basis: &[Determinant],
    det_index: &HashMap<Determinant, usize>,
    occ: &OccupancyIndex,
    i: OrbitalIdx,
    j: OrbitalIdx,
    k: OrbitalIdx,
    l: OrbitalIdx,
    value: f64,
    out: &mut HashMap<(usize, usize), f64>,
) {
    let (i, j, k, l, cat) = classify(i, j, k, l);
    match cat {
        Category::A => category_a(basis, occ, i, value, out),
        Category::B => category_b(occ, i, j, value, out),
        Category::C => {
            let (spectator, h, p) = if i == k { (i, j, l) } else { (j, i, k) };
            category_c_or_d(basis, det_index, occ, spectator, h, p, value, true, out);
        }
        Category::D => {
            let (spectator, h, p) = if i == j && j == k {
                (i, k, l)
            } else {
                (l, i, k)
            };
            category_c_or_d(basis, det_index, occ, spectator, h, p, value, false, out);
        }
        Category::E => category_e(basis, det_index, occ, i, j, k, l, value, out),
        Category::F => category_f(basis, det_index, occ, i, k, value, out),
        Category::G => category_g(basis, det_index, occ, i, j, k, l, value, out),
    }
}

/// One-electron contribution: off-diagonal `h(p,q)` couples determinants
/// differing by a single excitation `p <-> q` in either spin channel, with
/// no two-electron spectator involved.
fn one_electron_contributions(
    basis: &[Determinant],
    det_index: &HashMap<Determinant, usize>,
    occ: &OccupancyIndex,
    store: &crate::integrals::IntegralStore,
    out: &mut HashMap<(usize, usize), f64>,
) {
    for (p, q, value) in store.iter_one_e() {
        if p == q {
            continue;
        }
        for spin in [Spin::Alpha, Spin::Beta] {
            emit_single_both_directions(basis, det_index, occ, spin, p, q, None, None, 1.0, value, out);
        }
    }
}

/// Build the integral-driven contribution map `(I,J) -> partial ⟨I|H|J⟩`
/// (two-electron part only) for a basis used both as bra and ket space
/// (the variational case).
#[must_use]
pub fn two_electron_map(
    basis: &[Determinant],
    store: &crate::integrals::IntegralStore,
) -> HashMap<(usize, usize), f64> {
    let det_index: HashMap<Determinant, usize> =
        basis.iter().enumerate().map(|(i, d)| (*d, i)).collect();
    let occ = OccupancyIndex::build(basis);
    let mut out = HashMap::new();
    for (i, j, k, l, value) in store.iter_two_e() {
        two_electron_integral(basis, &det_index, &occ, i, j, k, l, value, &mut out);
    }
    // Diagonal contribution from E0 and one-electron integrals is cheapest
    // computed directly rather than via occupancy enumeration.
    for (idx, det) in basis.iter().enumerate() {
        let mut diag = store.e0;
        for o in det.alpha.occupied().chain(det.beta.occupied()) {
            diag += store.one_e(o, o);
        }
        *out.entry((idx, idx)).or_insert(0.0) += diag;
    }
    one_electron_contributions(basis, &det_index, &occ, store, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::determinant::SpinDet;

    #[test]
    fn category_a_diagonal_doubly_occupied() {
        let dets = vec![
            Determinant::new(SpinDet::from_orbitals([0, 1]), SpinDet::from_orbitals([0, 1])),
            Determinant::new(SpinDet::from_orbitals([0, 2]), SpinDet::from_orbitals([1, 2])),
        ];
        let occ = OccupancyIndex::build(&dets);
        let mut out = HashMap::new();
        category_a(&dets, &occ, 0, 2.0, &mut out);
        assert_eq!(out.get(&(0, 0)), Some(&2.0));
        assert_eq!(out.get(&(1, 1)), None);
    }
}
