use std::collections::HashMap;

/// Process rank within the partitioned solve.
pub type Rank = usize;

/// An independently discretized physical subdomain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub usize);

/// A geometric mesh point, shared by location across one or more regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Opaque handle to one (region, node) entry of a [`NodeIndex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

/// The unknown block one region attaches to a geometric node.
#[derive(Clone, Debug)]
pub struct FvmNode {
    pub region: RegionId,
    pub node: NodeId,
    /// Process-local offset of the first unknown of this entry.
    pub local_offset: usize,
    /// Global offset of the first unknown of this entry.
    pub global_offset: usize,
    pub owner: Rank,
    /// False when the region is not actually discretized at this point.
    pub valid: bool,
    /// Off-process entries this entry's stencil depends on, in stencil order.
    pub ghost_neighbors: Vec<EntryId>,
}

impl FvmNode {
    pub fn new(
        region: RegionId,
        node: NodeId,
        local_offset: usize,
        global_offset: usize,
        owner: Rank,
    ) -> Self {
        Self {
            region,
            node,
            local_offset,
            global_offset,
            owner,
            valid: true,
            ghost_neighbors: Vec::new(),
        }
    }
}

/// Read-only map from (region, geometric node) to unknown offsets and
/// ownership, built once during mesh/region setup.
///
/// Entries co-located at a node are kept in region-registration order. That
/// order is identical on every process, so entry 0 of a node is the same
/// everywhere and can serve as the representative for interface coupling.
pub struct NodeIndex {
    entries: Vec<FvmNode>,
    at_node: HashMap<NodeId, Vec<EntryId>>,
}

impl NodeIndex {
    pub fn builder() -> NodeIndexBuilder {
        NodeIndexBuilder::default()
    }

    pub fn entry(&self, id: EntryId) -> &FvmNode {
        &self.entries[id.0]
    }

    pub fn local_offset(&self, id: EntryId) -> usize {
        self.entries[id.0].local_offset
    }

    pub fn global_offset(&self, id: EntryId) -> usize {
        self.entries[id.0].global_offset
    }

    pub fn owner(&self, id: EntryId) -> Rank {
        self.entries[id.0].owner
    }

    pub fn is_valid(&self, id: EntryId) -> bool {
        self.entries[id.0].valid
    }

    pub fn ghost_neighbors(&self, id: EntryId) -> &[EntryId] {
        &self.entries[id.0].ghost_neighbors
    }

    /// Entries co-located at `node`, in region-registration order.
    pub fn entries_at(&self, node: NodeId) -> &[EntryId] {
        self.at_node.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Default)]
pub struct NodeIndexBuilder {
    entries: Vec<FvmNode>,
    at_node: HashMap<NodeId, Vec<EntryId>>,
}

impl NodeIndexBuilder {
    /// Register an entry. Registration order fixes the per-node entry order.
    pub fn add_entry(&mut self, entry: FvmNode) -> EntryId {
        let id = EntryId(self.entries.len());
        self.at_node.entry(entry.node).or_default().push(id);
        self.entries.push(entry);
        id
    }

    /// Record that `of` depends on the off-process entry `ghost`.
    pub fn add_ghost_neighbor(&mut self, of: EntryId, ghost: EntryId) {
        self.entries[of.0].ghost_neighbors.push(ghost);
    }

    pub fn build(self) -> NodeIndex {
        NodeIndex {
            entries: self.entries,
            at_node: self.at_node,
        }
    }
}
