//! Interface coupling between co-located per-region unknowns.
//!
//! At a region-region interface each region discretizes its own unknowns at
//! the shared geometric nodes. The coupling protocol folds every dependent
//! entry's accumulated row into the representative's row, replaces the
//! dependent's governing equation with a coupling constraint, and assembles
//! the constraint's exact partials via forward-mode AD.

pub mod continuity;
pub mod group;
pub mod redirect;

use crate::discretization::node_index::{NodeIndex, Rank};
use crate::system::{AssemblyError, SystemMatrix, SystemVector};
use self::redirect::RowRedirectionPlan;

/// Identity of the executing partition, threaded into every entry point.
#[derive(Clone, Copy, Debug, Default)]
pub struct PartitionContext {
    pub rank: Rank,
}

impl PartitionContext {
    pub fn new(rank: Rank) -> Self {
        Self { rank }
    }
}

/// Capability interface of one interface boundary-condition instance.
///
/// The outer nonlinear driver invokes these per solve iteration in a fixed
/// order: `reserve_sparsity` (once per sparsity change), then
/// `preprocess_residual`, `assemble_residual`, `preprocess_jacobian`,
/// `assemble_jacobian`. The plans returned by the preprocess steps are
/// consumed by the system layer (row folding) before the matching assembly
/// call writes the coupling constraints.
///
/// Concrete boundary-condition subtypes compose the shared helpers in
/// [`group`] and [`redirect`] rather than reimplementing them.
pub trait InterfaceBc {
    /// Insert explicit zeros at every matrix location a later Jacobian pass
    /// may touch, so compaction never discards a needed slot. Idempotent.
    fn reserve_sparsity(
        &self,
        ctx: &PartitionContext,
        index: &NodeIndex,
        jac: &mut dyn SystemMatrix,
    ) -> Result<(), AssemblyError>;

    fn preprocess_residual(
        &self,
        ctx: &PartitionContext,
        index: &NodeIndex,
    ) -> Result<RowRedirectionPlan, AssemblyError>;

    /// Add the coupling residuals at the dependent rows of every coupled
    /// group this partition owns.
    fn assemble_residual(
        &self,
        ctx: &PartitionContext,
        index: &NodeIndex,
        x: &[f64],
        f: &mut dyn SystemVector,
    ) -> Result<(), AssemblyError>;

    fn preprocess_jacobian(
        &self,
        ctx: &PartitionContext,
        index: &NodeIndex,
    ) -> Result<RowRedirectionPlan, AssemblyError>;

    /// Add the exact partials of the coupling residuals.
    fn assemble_jacobian(
        &self,
        ctx: &PartitionContext,
        index: &NodeIndex,
        x: &[f64],
        jac: &mut dyn SystemMatrix,
    ) -> Result<(), AssemblyError>;
}
