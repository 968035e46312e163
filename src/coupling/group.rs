use super::PartitionContext;
use crate::discretization::node_index::{EntryId, NodeId, NodeIndex};
use crate::system::AssemblyError;

/// The valid per-region entries co-located at one geometric boundary node.
///
/// Entry 0 is the representative; it absorbs the folded contributions of
/// every other (dependent) entry. A group always holds at least one entry.
#[derive(Clone, Debug)]
pub struct InterfaceGroup {
    pub node: NodeId,
    entries: Vec<EntryId>,
}

impl InterfaceGroup {
    pub fn representative(&self) -> EntryId {
        self.entries[0]
    }

    pub fn dependents(&self) -> &[EntryId] {
        &self.entries[1..]
    }

    pub fn entries(&self) -> &[EntryId] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// There is something to couple only when two or more regions meet here.
    pub fn is_coupled(&self) -> bool {
        self.entries.len() >= 2
    }
}

/// Collect the interface groups this partition assembles.
///
/// Entries are enumerated in region-registration order, so entry 0 is the
/// same on every process. Invalid entries are dropped; a node left with no
/// valid entry is an upstream mesh/region misclassification and aborts the
/// pass. Groups whose representative is owned by another rank are assembled
/// there and skipped here. Size-1 groups are kept; downstream passes skip
/// them.
pub fn gather_groups(
    ctx: &PartitionContext,
    index: &NodeIndex,
    nodes: &[NodeId],
) -> Result<Vec<InterfaceGroup>, AssemblyError> {
    let mut groups = Vec::with_capacity(nodes.len());
    for &node in nodes {
        let entries: Vec<EntryId> = index
            .entries_at(node)
            .iter()
            .copied()
            .filter(|&e| index.is_valid(e))
            .collect();
        let Some(&rep) = entries.first() else {
            return Err(AssemblyError::OrphanInterfaceNode(node));
        };
        if index.owner(rep) != ctx.rank {
            continue;
        }
        groups.push(InterfaceGroup { node, entries });
    }
    Ok(groups)
}
