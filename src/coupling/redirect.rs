use super::group::InterfaceGroup;
use crate::discretization::node_index::NodeIndex;

/// Row-folding instructions for the system layer: add the value at each
/// source row into the matching destination row, then clear the source.
///
/// The three sequences are parallel and `clear_rows == src_rows`. A plan is
/// rebuilt at the start of every residual and Jacobian pass and consumed
/// immediately, never retained.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowRedirectionPlan {
    pub src_rows: Vec<usize>,
    pub dst_rows: Vec<usize>,
    pub clear_rows: Vec<usize>,
}

impl RowRedirectionPlan {
    pub fn len(&self) -> usize {
        self.src_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.src_rows.is_empty()
    }

    fn push(&mut self, src: usize, dst: usize) {
        self.src_rows.push(src);
        self.dst_rows.push(dst);
        self.clear_rows.push(src);
    }
}

/// Plan the folding of every dependent row into its representative's row.
///
/// The dependent DOF's governing equation is replaced by a coupling
/// constraint, but the flux neighboring volumes already integrated into its
/// row must still be conserved; folding moves it into the representative's
/// row instead of dropping it. One triple is emitted per dependent entry and
/// unknown slot.
pub fn redirection_plan(
    groups: &[InterfaceGroup],
    index: &NodeIndex,
    unknowns: usize,
) -> RowRedirectionPlan {
    let mut plan = RowRedirectionPlan::default();
    for group in groups {
        if !group.is_coupled() {
            continue;
        }
        let rep_row = index.global_offset(group.representative());
        for &dep in group.dependents() {
            let dep_row = index.global_offset(dep);
            for u in 0..unknowns {
                plan.push(dep_row + u, rep_row + u);
            }
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupling::group::gather_groups;
    use crate::coupling::PartitionContext;
    use crate::discretization::node_index::{FvmNode, NodeId, NodeIndex, RegionId};

    fn shared_node_index(regions: usize, unknowns: usize) -> NodeIndex {
        let mut b = NodeIndex::builder();
        for r in 0..regions {
            let off = r * unknowns;
            b.add_entry(FvmNode::new(RegionId(r), NodeId(0), off, off, 0));
        }
        b.build()
    }

    #[test]
    fn one_triple_per_dependent_and_unknown() {
        let ctx = PartitionContext::default();
        for regions in 2..=4 {
            let index = shared_node_index(regions, 2);
            let groups = gather_groups(&ctx, &index, &[NodeId(0)]).unwrap();
            let plan = redirection_plan(&groups, &index, 2);
            assert_eq!(plan.len(), 2 * (regions - 1));
            assert_eq!(plan.src_rows.len(), plan.dst_rows.len());
            assert_eq!(plan.clear_rows, plan.src_rows);
        }
    }

    #[test]
    fn rows_point_at_representative() {
        let ctx = PartitionContext::default();
        let index = shared_node_index(3, 2);
        let groups = gather_groups(&ctx, &index, &[NodeId(0)]).unwrap();
        let plan = redirection_plan(&groups, &index, 2);
        assert_eq!(plan.src_rows, vec![2, 3, 4, 5]);
        assert_eq!(plan.dst_rows, vec![0, 1, 0, 1]);
    }

    #[test]
    fn uncoupled_groups_emit_nothing() {
        let ctx = PartitionContext::default();
        let index = shared_node_index(1, 2);
        let groups = gather_groups(&ctx, &index, &[NodeId(0)]).unwrap();
        let plan = redirection_plan(&groups, &index, 2);
        assert!(plan.is_empty());
    }

    #[test]
    fn degenerate_offsets_are_emitted() {
        // Two entries aliasing the same global row (degenerate mesh): the
        // plan still records the pair; the fold is a no-op downstream.
        let mut b = NodeIndex::builder();
        b.add_entry(FvmNode::new(RegionId(0), NodeId(0), 0, 0, 0));
        b.add_entry(FvmNode::new(RegionId(1), NodeId(0), 0, 0, 0));
        let index = b.build();
        let groups = gather_groups(&PartitionContext::default(), &index, &[NodeId(0)]).unwrap();
        let plan = redirection_plan(&groups, &index, 1);
        assert_eq!(plan.src_rows, plan.dst_rows);
    }
}
