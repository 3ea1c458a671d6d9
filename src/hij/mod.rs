//! Slater-Condon matrix-element dispatch.
//!
//! Two independent ways to enumerate the nonzero ⟨I|H|J⟩ contributions of a
//! basis: [`determinant_driven`] walks explicit determinant pairs;
//! [`integral_driven`] walks the compressed integral list once and
//! enumerates the determinant pairs each integral can contribute to. Both
//! must agree (tested in `tests/driver_equivalence.rs`).

pub mod determinant_driven;
pub mod integral_driven;

use crate::determinant::{
    double_phase,
    single_hole_particle,
    single_phase,
    Determinant,
    OrbitalIdx,
};

/// Tagged dispatch on the pair of excitation degrees between two
/// determinants — a fixed six-variant sum rather than runtime
/// polymorphism, per the category table of §4.4.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PairClass {
    Diagonal,
    SingleAlpha { hole: OrbitalIdx, particle: OrbitalIdx },
    SingleBeta { hole: OrbitalIdx, particle: OrbitalIdx },
    DoubleAlpha { holes: (OrbitalIdx, OrbitalIdx), particles: (OrbitalIdx, OrbitalIdx) },
    DoubleBeta { holes: (OrbitalIdx, OrbitalIdx), particles: (OrbitalIdx, OrbitalIdx) },
    DoubleMixed { hole_a: OrbitalIdx, particle_a: OrbitalIdx, hole_b: OrbitalIdx, particle_b: OrbitalIdx },
    Zero,
}

/// Classify the coupling between `det_i` and `det_j`.
#[must_use]
pub fn classify_pair(
    det_i: &Determinant,
    det_j: &Determinant,
) -> PairClass {
    let deg = det_i.exc_degree(det_j);
    match (deg.alpha, deg.beta) {
        (0, 0) => PairClass::Diagonal,
        (1, 0) => {
            let (hole, particle) = single_hole_particle(&det_i.alpha, &det_j.alpha)
                .expect("exc_degree(alpha)=1 implies a unique hole/particle pair");
            PairClass::SingleAlpha { hole, particle }
        }
        (0, 1) => {
            let (hole, particle) = single_hole_particle(&det_i.beta, &det_j.beta)
                .expect("exc_degree(beta)=1 implies a unique hole/particle pair");
            PairClass::SingleBeta { hole, particle }
        }
        (2, 0) => {
            let (holes, particles) = crate::determinant::double_holes_particles(&det_i.alpha, &det_j.alpha)
                .expect("exc_degree(alpha)=2 implies a unique hole/particle quadruple");
            PairClass::DoubleAlpha { holes, particles }
        }
        (0, 2) => {
            let (holes, particles) = crate::determinant::double_holes_particles(&det_i.beta, &det_j.beta)
                .expect("exc_degree(beta)=2 implies a unique hole/particle quadruple");
            PairClass::DoubleBeta { holes, particles }
        }
        (1, 1) => {
            let (hole_a, particle_a) = single_hole_particle(&det_i.alpha, &det_j.alpha)
                .expect("exc_degree(alpha)=1 implies a unique hole/particle pair");
            let (hole_b, particle_b) = single_hole_particle(&det_i.beta, &det_j.beta)
                .expect("exc_degree(beta)=1 implies a unique hole/particle pair");
            PairClass::DoubleMixed { hole_a, particle_a, hole_b, particle_b }
        }
        _ => PairClass::Zero,
    }
}

/// Signed phase for the excitation `det_i -> det_j` implied by `class`.
/// Always `1` for `Diagonal` and `Zero`.
#[must_use]
pub fn phase_of(
    det_i: &Determinant,
    det_j: &Determinant,
    class: &PairClass,
) -> i32 {
    match *class {
        PairClass::Diagonal | PairClass::Zero => 1,
        PairClass::SingleAlpha { hole, particle } => single_phase(&det_i.alpha, &det_j.alpha, hole, particle),
        PairClass::SingleBeta { hole, particle } => single_phase(&det_i.beta, &det_j.beta, hole, particle),
        PairClass::DoubleAlpha { holes, particles } => {
            double_phase(&det_i.alpha, &det_j.alpha, holes.0, holes.1, particles.0, particles.1)
        }
        PairClass::DoubleBeta { holes, particles } => {
            double_phase(&det_i.beta, &det_j.beta, holes.0, holes.1, particles.0, particles.1)
        }
        PairClass::DoubleMixed { hole_a, particle_a, hole_b, particle_b } => {
            single_phase(&det_i.alpha, &det_j.alpha, hole_a, particle_a)
                * single_phase(&det_i.beta, &det_j.beta, hole_b, particle_b)
        }
    }
}
