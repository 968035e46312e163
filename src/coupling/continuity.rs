use num_dual::DualNum;

use super::group::{gather_groups, InterfaceGroup};
use super::redirect::{redirection_plan, RowRedirectionPlan};
use super::{InterfaceBc, PartitionContext};
use crate::discretization::node_index::{EntryId, NodeId, NodeIndex};
use crate::numerics::ad;
use crate::system::{AssemblyError, InsertMode, SystemMatrix, SystemVector};

/// The coupling constraint: the dependent DOF equals the representative DOF
/// at the same geometric node. Written generically so the residual pass
/// evaluates it on `f64` and the Jacobian pass on seeded duals.
#[inline]
fn continuity_residual<T: DualNum<f64>>(value: T, rep_value: T) -> T {
    value - rep_value
}

/// Continuity coupling across a region-region interface (e.g. between two
/// insulator bodies): potential and lattice temperature are continuous, so
/// every dependent entry is constrained equal to the representative entry at
/// its node.
///
/// `unknowns` is the number of scalar DOFs per node; the device-simulator
/// instance carries two (potential, temperature).
pub struct ContinuityInterfaceBc {
    nodes: Vec<NodeId>,
    unknowns: usize,
    ghost_hops: usize,
}

impl ContinuityInterfaceBc {
    pub fn new(nodes: Vec<NodeId>, unknowns: usize) -> Self {
        Self {
            nodes,
            unknowns,
            ghost_hops: 1,
        }
    }

    /// Transitive reservation depth past the representative's direct ghost
    /// neighbors. One hop matches a nearest-neighbor flux stencil; richer
    /// coupling physics may need more.
    pub fn with_ghost_hops(mut self, hops: usize) -> Self {
        self.ghost_hops = hops;
        self
    }

    pub fn unknowns(&self) -> usize {
        self.unknowns
    }

    fn groups(
        &self,
        ctx: &PartitionContext,
        index: &NodeIndex,
    ) -> Result<Vec<InterfaceGroup>, AssemblyError> {
        gather_groups(ctx, index, &self.nodes)
    }

    /// Reserve (representative row, ghost row) slots for the representative's
    /// ghost neighbors and, hop by hop, for the ghosts' own ghost neighbors.
    /// After folding, the representative's row carries the off-process
    /// coupling terms that belonged to the dependents' neighbors, so those
    /// slots must exist before compaction.
    fn reserve_ghost_closure(
        &self,
        index: &NodeIndex,
        rep: EntryId,
        jac: &mut dyn SystemMatrix,
    ) -> Result<(), AssemblyError> {
        let rep_row = index.global_offset(rep);
        let mut frontier: Vec<EntryId> = index.ghost_neighbors(rep).to_vec();
        for _ in 0..=self.ghost_hops {
            let mut next = Vec::new();
            for &ghost in &frontier {
                let col = index.global_offset(ghost);
                for u in 0..self.unknowns {
                    jac.add(rep_row + u, col + u, 0.0)?;
                }
                next.extend_from_slice(index.ghost_neighbors(ghost));
            }
            frontier = next;
        }
        Ok(())
    }
}

impl InterfaceBc for ContinuityInterfaceBc {
    fn reserve_sparsity(
        &self,
        ctx: &PartitionContext,
        index: &NodeIndex,
        jac: &mut dyn SystemMatrix,
    ) -> Result<(), AssemblyError> {
        jac.ensure_additive();

        for group in self.groups(ctx, index)?.iter().filter(|g| g.is_coupled()) {
            self.reserve_ghost_closure(index, group.representative(), jac)?;

            let rep_row = index.global_offset(group.representative());
            for &dep in group.dependents() {
                let dep_row = index.global_offset(dep);
                for u in 0..self.unknowns {
                    jac.add(dep_row + u, rep_row + u, 0.0)?;
                }
            }
        }

        jac.set_insert_mode(InsertMode::Add);
        Ok(())
    }

    fn preprocess_residual(
        &self,
        ctx: &PartitionContext,
        index: &NodeIndex,
    ) -> Result<RowRedirectionPlan, AssemblyError> {
        Ok(redirection_plan(
            &self.groups(ctx, index)?,
            index,
            self.unknowns,
        ))
    }

    fn assemble_residual(
        &self,
        ctx: &PartitionContext,
        index: &NodeIndex,
        x: &[f64],
        f: &mut dyn SystemVector,
    ) -> Result<(), AssemblyError> {
        f.ensure_additive();

        for group in self.groups(ctx, index)?.iter().filter(|g| g.is_coupled()) {
            let rep = group.representative();
            let rep_local = index.local_offset(rep);
            for &dep in group.dependents() {
                let dep_local = index.local_offset(dep);
                let dep_row = index.global_offset(dep);
                for u in 0..self.unknowns {
                    let ff = continuity_residual(x[dep_local + u], x[rep_local + u]);
                    f.add(dep_row + u, ff)?;
                }
            }
        }

        f.set_insert_mode(InsertMode::Add);
        Ok(())
    }

    fn preprocess_jacobian(
        &self,
        ctx: &PartitionContext,
        index: &NodeIndex,
    ) -> Result<RowRedirectionPlan, AssemblyError> {
        Ok(redirection_plan(
            &self.groups(ctx, index)?,
            index,
            self.unknowns,
        ))
    }

    fn assemble_jacobian(
        &self,
        ctx: &PartitionContext,
        index: &NodeIndex,
        x: &[f64],
        jac: &mut dyn SystemMatrix,
    ) -> Result<(), AssemblyError> {
        jac.ensure_additive();

        for group in self.groups(ctx, index)?.iter().filter(|g| g.is_coupled()) {
            let rep = group.representative();
            let rep_local = index.local_offset(rep);
            let rep_row = index.global_offset(rep);
            for &dep in group.dependents() {
                let dep_local = index.local_offset(dep);
                let dep_row = index.global_offset(dep);
                for u in 0..self.unknowns {
                    // Direction 0 tracks the dependent value, direction 1
                    // the representative value.
                    let (v, v_rep) = ad::seed_pair(x[dep_local + u], x[rep_local + u]);
                    let ff = continuity_residual(v, v_rep);
                    let dff = ad::gradient(ff, 2);

                    jac.add(dep_row + u, dep_row + u, dff[0])?;
                    jac.add(dep_row + u, rep_row + u, dff[1])?;
                }
            }
        }

        jac.set_insert_mode(InsertMode::Add);
        Ok(())
    }
}
