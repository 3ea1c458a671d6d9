//! Triplet constraints partitioning the connected space for PT2 scoring,
//! and their static load-balanced assignment to workers.

use crate::{
    comm::Communicator,
    determinant::{
        Determinant,
        OrbitalIdx,
    },
};

/// A triplet constraint: the three highest-indexed occupied alpha
/// orbitals that a connected determinant must have for it to belong to
/// this shard.
pub type Constraint = (OrbitalIdx, OrbitalIdx, OrbitalIdx);

/// All 3-subsets, in ascending order, of `{n_alpha - 3, .., n_orb - 1}`.
///
/// ```
/// # use cipsi_core::constraint::generate_all_constraints;
/// assert_eq!(
///     generate_all_constraints(3, 4),
///     vec![(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)]
/// );
/// assert_eq!(generate_all_constraints(3, 6).len(), 20);
/// ```
#[must_use]
pub fn generate_all_constraints(
    n_alpha: u32,
    n_orb: u32,
) -> Vec<Constraint> {
    let start = n_alpha.saturating_sub(3);
    let orbitals: Vec<OrbitalIdx> = (start..n_orb).collect();
    let mut out = Vec::new();
    for (ia, &a) in orbitals.iter().enumerate() {
        for (ib, &b) in orbitals[ia + 1..].iter().enumerate() {
            for &c in &orbitals[ia + 1 + ib + 1..] {
                out.push((a, b, c));
            }
        }
    }
    out
}

/// True if the three highest occupied alpha orbitals of `det` equal `c`.
#[must_use]
pub fn check_constraint(
    det: &Determinant,
    c: Constraint,
) -> bool {
    det.alpha.top_three() == Some(c)
}

/// Per-spin-combination hole/particle counts used to estimate the work a
/// determinant contributes to a constraint's connected-space shard,
/// following the cost model of §4.8: the increment for one determinant is
/// the sum, over the five spin combinations (alpha single, beta single,
/// alpha-alpha double, beta-beta double, alpha-beta double), of
/// `#particles * #holes`.
fn cost_increment(
    det: &Determinant,
    constraint: Constraint,
    n_orb: u32,
) -> f64 {
    let (c0, _, c2) = constraint;
    let alpha_occ: Vec<_> = det.alpha.occupied().collect();
    let alpha_unocc: Vec<_> = (0..n_orb).filter(|o| !det.alpha.contains(*o)).collect();
    let beta_occ: Vec<_> = det.beta.occupied().collect();
    let beta_unocc: Vec<_> = (0..n_orb).filter(|o| !det.beta.contains(*o)).collect();

    // Alpha holes/particles that could move an alpha determinant into this
    // constraint's shard: holes are occupied alpha orbitals not pinned by
    // the constraint; particles are unoccupied alpha orbitals at or below
    // the constraint's ceiling that are not already in it.
    let holes_a = alpha_occ.iter().filter(|&&o| o < c0 || (o > c0 && o != constraint.1 && o != c2)).count() as f64;
    let particles_a = alpha_unocc.iter().filter(|&&o| o <= c2).count() as f64;
    let holes_b = beta_occ.len() as f64;
    let particles_b = beta_unocc.len() as f64;

    let single_a = particles_a * holes_a;
    let single_b = particles_b * holes_b;
    let double_aa = (particles_a * (particles_a - 1.0) / 2.0) * (holes_a * (holes_a - 1.0) / 2.0);
    let double_bb = (particles_b * (particles_b - 1.0) / 2.0) * (holes_b * (holes_b - 1.0) / 2.0);
    let double_ab = particles_a * holes_b + particles_b * holes_a;

    single_a + single_b + double_aa + double_bb + double_ab
}

/// Estimate the total cost of a constraint over the whole basis.
#[must_use]
pub fn estimate_cost(
    constraint: Constraint,
    basis: &[Determinant],
    n_orb: u32,
) -> f64 {
    basis.iter().map(|det| cost_increment(det, constraint, n_orb)).sum()
}

/// Greedily assign every constraint to the currently least-loaded worker
/// (MINLOC across ranks), returning only the constraints assigned to this
/// rank.
pub fn dispatch_local_constraints(
    comm: &dyn Communicator,
    constraints: &[Constraint],
    basis: &[Determinant],
    n_orb: u32,
) -> Vec<Constraint> {
    let mut load = 0.0_f64;
    let mut local = Vec::new();
    for &constraint in constraints {
        let cost = estimate_cost(constraint, basis, n_orb);
        let (_, winner) = comm.allreduce_minloc(load);
        if winner == comm.rank() {
            local.push(constraint);
            load += cost;
        }
    }
    local
}
