use super::{Lattice, NodeId, NodeRef};

/// Walks the current path forward through `next` links.
pub struct NodeIter<'a> {
    lattice: &'a Lattice,
    current: Option<NodeId>,
}

impl<'a> NodeIter<'a> {
    pub(crate) fn new(lattice: &'a Lattice, start: Option<NodeId>) -> Self {
        Self {
            lattice,
            current: start,
        }
    }

    /// Start from an arbitrary node instead of BOS.
    pub fn from_node(node: NodeRef<'a>) -> Self {
        Self::new(node.lattice(), Some(node.id()))
    }
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = NodeRef::new(self.lattice, id);
        self.current = node.next_id();
        Some(node)
    }
}

/// Walks the current path backward through `prev` links.
pub struct NodeRevIter<'a> {
    lattice: &'a Lattice,
    current: Option<NodeId>,
}

impl<'a> NodeRevIter<'a> {
    pub(crate) fn new(lattice: &'a Lattice, start: Option<NodeId>) -> Self {
        Self {
            lattice,
            current: start,
        }
    }

    pub fn from_node(node: NodeRef<'a>) -> Self {
        Self::new(node.lattice(), Some(node.id()))
    }
}

impl<'a> Iterator for NodeRevIter<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = NodeRef::new(self.lattice, id);
        self.current = node.prev_id();
        Some(node)
    }
}
