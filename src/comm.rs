//! Collective-communication abstraction.
//!
//! The core treats `Allreduce`, `Allgatherv`, `Gatherv` and the `MINLOC`
//! reduction as external collaborators specified only at their interfaces.
//! No crate in this workspace's ecosystem binds to MPI, so none is
//! fabricated here: [`Communicator`] captures exactly the collective
//! semantics the Hamiltonian generator, Davidson solver and PT2 scorer
//! need, and [`SingleRank`] / [`ThreadWorld`] are the two implementations
//! that ship. A production deployment supplies an MPI-backed
//! implementation of the same trait.

use std::sync::{
    Arc,
    Barrier,
    Mutex,
};

use crate::determinant::Determinant;

/// Collective primitives consumed by the Hamiltonian generator, Davidson
/// eigensolver and PT2 scorer.
pub trait Communicator: Send + Sync {
    /// This process's rank, `0..size()`.
    fn rank(&self) -> usize;

    /// Total number of ranks in the world.
    fn size(&self) -> usize;

    /// Sum `local` across all ranks; every rank receives the same result.
    fn allreduce_sum(
        &self,
        local: f64,
    ) -> f64;

    /// Reduce `(value, rank)` pairs to the minimum value and the rank that
    /// holds it (`MPI_MINLOC`); every rank receives the same result.
    fn allreduce_minloc(
        &self,
        local_value: f64,
    ) -> (f64, usize);

    /// Concatenate `local` from every rank, in rank order; every rank
    /// receives the full concatenation.
    fn allgatherv_f64(
        &self,
        local: &[f64],
    ) -> Vec<f64>;

    /// Concatenate determinant vectors from every rank, in rank order.
    fn allgatherv_determinants(
        &self,
        local: &[Determinant],
    ) -> Vec<Determinant>;

    /// Concatenate `local` from every rank onto `root` only; other ranks
    /// receive `None`. Used for debug assembly of the full Hamiltonian.
    fn gatherv_f64(
        &self,
        local: &[f64],
        root: usize,
    ) -> Option<Vec<f64>>;

    /// Synchronize all ranks.
    fn barrier(&self);
}

/// The degenerate one-rank communicator: every collective is a local
/// no-op. Used by the CLI and by every deterministic numeric test, since a
/// single rank already exercises the full Slater-Condon, Hamiltonian and
/// Davidson/PT2 logic.
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleRank;

impl Communicator for SingleRank {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn allreduce_sum(
        &self,
        local: f64,
    ) -> f64 {
        local
    }

    fn allreduce_minloc(
        &self,
        local_value: f64,
    ) -> (f64, usize) {
        (local_value, 0)
    }

    fn allgatherv_f64(
        &self,
        local: &[f64],
    ) -> Vec<f64> {
        local.to_vec()
    }

    fn allgatherv_determinants(
        &self,
        local: &[Determinant],
    ) -> Vec<Determinant> {
        local.to_vec()
    }

    fn gatherv_f64(
        &self,
        local: &[f64],
        root: usize,
    ) -> Option<Vec<f64>> {
        (root == 0).then(|| local.to_vec())
    }

    fn barrier(&self) {}
}

/// Shared synchronization state for an in-process `W`-rank simulation.
///
/// Every collective call follows a double-barrier pattern: each rank
/// writes its contribution into a shared slot, all ranks wait, every rank
/// reads the full slot array, and all ranks wait again before the next
/// collective call is allowed to reuse the slots. The second barrier is
/// what prevents a fast rank from overwriting next call's slot before a
/// slow rank has finished reading this call's result.
struct Shared {
    size: usize,
    enter: Barrier,
    leave: Barrier,
    scratch_sum: Mutex<Vec<f64>>,
    scratch_minloc: Mutex<Vec<f64>>,
    scratch_vec_f64: Mutex<Vec<Vec<f64>>>,
    scratch_vec_det: Mutex<Vec<Vec<Determinant>>>,
}

/// An in-process simulation of `W` MPI-like ranks, built on
/// `std::thread::scope` and `std::sync::Barrier`. Each worker thread holds
/// one `ThreadWorld` handle; the lockstep collective ordering guaranteed by
/// §5 is exercised by genuinely concurrent threads rather than assumed.
pub struct ThreadWorld {
    rank: usize,
    shared: Arc<Shared>,
}

impl ThreadWorld {
    /// Build `size` handles, one per simulated rank, sharing one
    /// synchronization context. Run each handle on its own thread (e.g.
    /// via `std::thread::scope`).
    #[must_use]
    pub fn new_world(size: usize) -> Vec<Self> {
        assert!(size > 0, "a world must have at least one rank");
        let shared = Arc::new(Shared {
            size,
            enter: Barrier::new(size),
            leave: Barrier::new(size),
            scratch_sum: Mutex::new(vec![0.0; size]),
            scratch_minloc: Mutex::new(vec![0.0; size]),
            scratch_vec_f64: Mutex::new(vec![Vec::new(); size]),
            scratch_vec_det: Mutex::new(vec![Vec::new(); size]),
        });
        (0..size)
            .map(|rank| Self {
                rank,
                shared: Arc::clone(&shared),
            })
            .collect()
    }
}

impl Communicator for ThreadWorld {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn allreduce_sum(
        &self,
        local: f64,
    ) -> f64 {
        {
            let mut slots = self.shared.scratch_sum.lock().unwrap();
            slots[self.rank] = local;
        }
        self.shared.enter.wait();
        let total = self.shared.scratch_sum.lock().unwrap().iter().sum();
        self.shared.leave.wait();
        total
    }

    fn allreduce_minloc(
        &self,
        local_value: f64,
    ) -> (f64, usize) {
        {
            let mut slots = self.shared.scratch_minloc.lock().unwrap();
            slots[self.rank] = local_value;
        }
        self.shared.enter.wait();
        let (min_rank, min_value) = {
            let slots = self.shared.scratch_minloc.lock().unwrap();
            slots
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.partial_cmp(b).expect("NaN in minloc reduction"))
                .map(|(rank, &value)| (rank, value))
                .expect("world has at least one rank")
        };
        self.shared.leave.wait();
        (min_value, min_rank)
    }

    fn allgatherv_f64(
        &self,
        local: &[f64],
    ) -> Vec<f64> {
        {
            let mut slots = self.shared.scratch_vec_f64.lock().unwrap();
            slots[self.rank] = local.to_vec();
        }
        self.shared.enter.wait();
        let gathered = self.shared.scratch_vec_f64.lock().unwrap().concat();
        self.shared.leave.wait();
        gathered
    }

    fn allgatherv_determinants(
        &self,
        local: &[Determinant],
    ) -> Vec<Determinant> {
        {
            let mut slots = self.shared.scratch_vec_det.lock().unwrap();
            slots[self.rank] = local.to_vec();
        }
        self.shared.enter.wait();
        let gathered = self.shared.scratch_vec_det.lock().unwrap().concat();
        self.shared.leave.wait();
        gathered
    }

    fn gatherv_f64(
        &self,
        local: &[f64],
        root: usize,
    ) -> Option<Vec<f64>> {
        {
            let mut slots = self.shared.scratch_vec_f64.lock().unwrap();
            slots[self.rank] = local.to_vec();
        }
        self.shared.enter.wait();
        let result = if self.rank == root {
            Some(self.shared.scratch_vec_f64.lock().unwrap().concat())
        } else {
            None
        };
        self.shared.leave.wait();
        result
    }

    fn barrier(&self) {
        self.shared.enter.wait();
        self.shared.leave.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_rank_allreduce_is_identity() {
        let comm = SingleRank;
        assert_eq!(comm.allreduce_sum(3.5), 3.5);
        assert_eq!(comm.allreduce_minloc(1.0), (1.0, 0));
    }

    #[test]
    fn thread_world_allreduce_sum_matches_expected_total() {
        let handles = ThreadWorld::new_world(4);
        std::thread::scope(|scope| {
            for (rank, comm) in handles.into_iter().enumerate() {
                scope.spawn(move || {
                    let total = comm.allreduce_sum(rank as f64 + 1.0);
                    assert_eq!(total, 1.0 + 2.0 + 3.0 + 4.0);
                });
            }
        });
    }

    #[test]
    fn thread_world_minloc_agrees_across_ranks() {
        let handles = ThreadWorld::new_world(3);
        std::thread::scope(|scope| {
            for (rank, comm) in handles.into_iter().enumerate() {
                scope.spawn(move || {
                    let local_value = [5.0, 1.0, 9.0][rank];
                    assert_eq!(comm.allreduce_minloc(local_value), (1.0, 1));
                });
            }
        });
    }
}
