//! Classification of canonical two-electron integral indices into one of
//! seven categories, each dictating what kind of Hamiltonian contributions
//! (diagonal / single / same-spin double / opposite-spin double) the
//! integral can produce.

use crate::{
    determinant::OrbitalIdx,
    integrals::canonical_idx4,
};

/// One of the seven equality patterns a canonical `(i,j,k,l)` can fall
/// into.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Category {
    /// i=j=k=l
    A,
    /// i=k<j=l
    B,
    /// exactly one of i=k, j=l
    C,
    /// three indices equal
    D,
    /// exactly one of i=j, j=k, k=l (and not F)
    E,
    /// i=j<k=l
    F,
    /// all four distinct
    G,
}

/// Canonicalize `(i,j,k,l)` and classify it.
#[must_use]
pub fn classify(
    i: OrbitalIdx,
    j: OrbitalIdx,
    k: OrbitalIdx,
    l: OrbitalIdx,
) -> (OrbitalIdx, OrbitalIdx, OrbitalIdx, OrbitalIdx, Category) {
    let (i, j, k, l) = canonical_idx4(i, j, k, l);

    let eq_ij = i == j;
    let eq_jk = j == k;
    let eq_kl = k == l;
    let eq_ik = i == k;
    let eq_jl = j == l;

    let cat = if eq_ij && eq_jk && eq_kl {
        Category::A
    } else if (eq_ij && eq_jk && !eq_kl) || (eq_jk && eq_kl && !eq_ij) {
        Category::D
    } else if eq_ij && eq_kl && !eq_ik {
        Category::F
    } else if eq_ik && eq_jl && !eq_ij {
        Category::B
    } else if eq_ik != eq_jl {
        Category::C
    } else {
        let adjacent_count = [eq_ij, eq_jk, eq_kl].iter().filter(|&&b| b).count();
        if adjacent_count == 1 {
            Category::E
        } else {
            Category::G
        }
    };

    (i, j, k, l, cat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_a() {
        let (.., cat) = classify(3, 3, 3, 3);
        assert_eq!(cat, Category::A);
    }

    #[test]
    fn category_b() {
        let (.., cat) = classify(1, 2, 1, 2);
        assert_eq!(cat, Category::B);
    }

    #[test]
    fn category_d_three_equal() {
        let (.., cat) = classify(1, 1, 1, 5);
        assert_eq!(cat, Category::D);
    }

    #[test]
    fn category_f() {
        let (.., cat) = classify(1, 1, 4, 4);
        assert_eq!(cat, Category::F);
    }

    #[test]
    fn category_g_all_distinct() {
        let (.., cat) = classify(0, 1, 2, 3);
        assert_eq!(cat, Category::G);
    }

    #[test]
    fn category_c_one_of_ik_jl() {
        let (i, j, k, l, cat) = classify(0, 1, 0, 2);
        assert_eq!(cat, Category::C);
        assert!((i == k) != (j == l));
    }

    #[test]
    fn every_tuple_gets_exactly_one_category() {
        for i in 0..4u32 {
            for j in 0..4u32 {
                for k in 0..4u32 {
                    for l in 0..4u32 {
                        let _ = classify(i, j, k, l);
                    }
                }
            }
        }
    }
}
