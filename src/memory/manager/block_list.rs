/*!
 * Block List
 * Ordered sequence of blocks backing the free and allocated registries
 *
 * Nodes live in a slot arena and are linked by index in both directions, so:
 * - append and prepend are O(1) amortized
 * - removal through a `NodeId` is O(1), removal by value or position is O(n)
 * - a block's fields can be mutated in place through its handle without
 *   disturbing the order or any other handle
 *
 * Vacated slots are kept on a free stack and reused by later insertions.
 * Every slot carries a generation so a handle to a removed node never resolves
 * to whatever block later reuses its slot.
 */

use crate::memory::types::Block;
use std::fmt;
use std::iter::FusedIterator;

/// Stable handle to a node in a `BlockList`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Node {
    block: Block,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Clone)]
enum Slot {
    Occupied { generation: u32, node: Node },
    Vacant { generation: u32, next_free: Option<usize> },
}

/// Doubly linked list of blocks over a slot arena
#[derive(Debug, Clone, Default)]
pub struct BlockList {
    slots: Vec<Slot>,
    head: Option<usize>,
    tail: Option<usize>,
    free_head: Option<usize>,
    len: usize,
}

impl BlockList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // ---------------------------------------------------------------------
    // Slot arena
    // ---------------------------------------------------------------------

    fn node(&self, index: usize) -> Option<&Node> {
        match self.slots.get(index) {
            Some(Slot::Occupied { node, .. }) => Some(node),
            _ => None,
        }
    }

    fn node_mut_at(&mut self, index: usize) -> Option<&mut Node> {
        match self.slots.get_mut(index) {
            Some(Slot::Occupied { node, .. }) => Some(node),
            _ => None,
        }
    }

    fn resolve(&self, id: NodeId) -> Option<&Node> {
        match self.slots.get(id.index) {
            Some(Slot::Occupied { generation, node }) if *generation == id.generation => Some(node),
            _ => None,
        }
    }

    fn id_of(&self, index: usize) -> Option<NodeId> {
        match self.slots.get(index) {
            Some(Slot::Occupied { generation, .. }) => Some(NodeId {
                index,
                generation: *generation,
            }),
            _ => None,
        }
    }

    /// Place a detached node in a recycled or fresh slot
    fn occupy(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free_head {
            if let Some(Slot::Vacant {
                generation,
                next_free,
            }) = self.slots.get(index).cloned()
            {
                let generation = generation.wrapping_add(1);
                self.free_head = next_free;
                self.slots[index] = Slot::Occupied { generation, node };
                return NodeId { index, generation };
            }
        }

        let index = self.slots.len();
        self.slots.push(Slot::Occupied {
            generation: 0,
            node,
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Return a slot to the free stack, yielding its node
    fn vacate(&mut self, index: usize) -> Option<Node> {
        let generation = match self.slots.get(index) {
            Some(Slot::Occupied { generation, .. }) => *generation,
            _ => return None,
        };
        let vacant = Slot::Vacant {
            generation,
            next_free: self.free_head,
        };
        self.free_head = Some(index);
        match std::mem::replace(&mut self.slots[index], vacant) {
            Slot::Occupied { node, .. } => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    fn index_at(&self, position: usize) -> Option<usize> {
        if position >= self.len {
            return None;
        }
        // Walk from whichever end is closer
        if position <= self.len / 2 {
            let mut cursor = self.head;
            for _ in 0..position {
                cursor = cursor.and_then(|i| self.node(i)).and_then(|n| n.next);
            }
            cursor
        } else {
            let mut cursor = self.tail;
            for _ in 0..(self.len - 1 - position) {
                cursor = cursor.and_then(|i| self.node(i)).and_then(|n| n.prev);
            }
            cursor
        }
    }

    // ---------------------------------------------------------------------
    // Insertion
    // ---------------------------------------------------------------------

    /// Append a block to the tail
    pub fn push_back(&mut self, block: Block) -> NodeId {
        let prev = self.tail;
        let id = self.occupy(Node {
            block,
            prev,
            next: None,
        });
        match prev.and_then(|i| self.node_mut_at(i)) {
            Some(node) => node.next = Some(id.index),
            None => self.head = Some(id.index),
        }
        self.tail = Some(id.index);
        self.len += 1;
        id
    }

    /// Prepend a block at the head
    pub fn push_front(&mut self, block: Block) -> NodeId {
        let next = self.head;
        let id = self.occupy(Node {
            block,
            prev: None,
            next,
        });
        match next.and_then(|i| self.node_mut_at(i)) {
            Some(node) => node.prev = Some(id.index),
            None => self.tail = Some(id.index),
        }
        self.head = Some(id.index);
        self.len += 1;
        id
    }

    /// Insert a block before the node currently at `position`
    ///
    /// `position == len()` appends. Returns `None` when `position` is past the end.
    pub fn insert(&mut self, position: usize, block: Block) -> Option<NodeId> {
        if position > self.len {
            return None;
        }
        if position == self.len {
            return Some(self.push_back(block));
        }
        if position == 0 {
            return Some(self.push_front(block));
        }

        let next = self.index_at(position)?;
        let prev = self.node(next)?.prev;
        let id = self.occupy(Node {
            block,
            prev,
            next: Some(next),
        });
        if let Some(node) = self.node_mut_at(next) {
            node.prev = Some(id.index);
        }
        if let Some(node) = prev.and_then(|i| self.node_mut_at(i)) {
            node.next = Some(id.index);
        }
        self.len += 1;
        Some(id)
    }

    // ---------------------------------------------------------------------
    // Removal
    // ---------------------------------------------------------------------

    /// Unlink and return the block behind `id` in O(1)
    pub fn remove_node(&mut self, id: NodeId) -> Option<Block> {
        let (prev, next) = {
            let node = self.resolve(id)?;
            (node.prev, node.next)
        };

        match prev.and_then(|i| self.node_mut_at(i)) {
            Some(node) => node.next = next,
            None => self.head = next,
        }
        match next.and_then(|i| self.node_mut_at(i)) {
            Some(node) => node.prev = prev,
            None => self.tail = prev,
        }

        self.len -= 1;
        self.vacate(id.index).map(|node| node.block)
    }

    /// Remove the block at `position`
    pub fn remove_at(&mut self, position: usize) -> Option<Block> {
        let index = self.index_at(position)?;
        let id = self.id_of(index)?;
        self.remove_node(id)
    }

    /// Remove the first block equal to `block`; false if absent
    pub fn remove(&mut self, block: &Block) -> bool {
        match self.find(|candidate| candidate == block) {
            Some(id) => self.remove_node(id).is_some(),
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = None;
        self.tail = None;
        self.free_head = None;
        self.len = 0;
    }

    /// Replace the contents with `blocks`, in iteration order
    pub fn replace_all<I>(&mut self, blocks: I)
    where
        I: IntoIterator<Item = Block>,
    {
        self.clear();
        self.extend(blocks);
    }

    // ---------------------------------------------------------------------
    // Access
    // ---------------------------------------------------------------------

    pub fn head(&self) -> Option<NodeId> {
        self.head.and_then(|i| self.id_of(i))
    }

    /// Handle of the node following `id`
    pub fn next_of(&self, id: NodeId) -> Option<NodeId> {
        self.resolve(id)?.next.and_then(|i| self.id_of(i))
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Block> {
        self.resolve(id).map(|node| &node.block)
    }

    /// Mutable access to a block's fields; order and links are unaffected
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Block> {
        match self.slots.get_mut(id.index) {
            Some(Slot::Occupied { generation, node }) if *generation == id.generation => {
                Some(&mut node.block)
            }
            _ => None,
        }
    }

    pub fn get(&self, position: usize) -> Option<&Block> {
        self.index_at(position)
            .and_then(|i| self.node(i))
            .map(|node| &node.block)
    }

    pub fn first(&self) -> Option<&Block> {
        self.head.and_then(|i| self.node(i)).map(|node| &node.block)
    }

    pub fn last(&self) -> Option<&Block> {
        self.tail.and_then(|i| self.node(i)).map(|node| &node.block)
    }

    /// Position of the first block equal to `block`
    pub fn index_of(&self, block: &Block) -> Option<usize> {
        self.iter().position(|candidate| candidate == block)
    }

    /// Handle of the first block matching `predicate`, in list order
    pub fn find<P>(&self, mut predicate: P) -> Option<NodeId>
    where
        P: FnMut(&Block) -> bool,
    {
        let mut cursor = self.head();
        while let Some(id) = cursor {
            if self.get_node(id).is_some_and(&mut predicate) {
                return Some(id);
            }
            cursor = self.next_of(id);
        }
        None
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    pub fn to_vec(&self) -> Vec<Block> {
        self.iter().copied().collect()
    }
}

/// Forward iterator over a `BlockList`
pub struct Iter<'a> {
    list: &'a BlockList,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor?)?;
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.block)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}
impl FusedIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a BlockList {
    type Item = &'a Block;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<Block> for BlockList {
    fn extend<I: IntoIterator<Item = Block>>(&mut self, iter: I) {
        for block in iter {
            self.push_back(block);
        }
    }
}

impl FromIterator<Block> for BlockList {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        let mut list = BlockList::new();
        list.extend(iter);
        list
    }
}

impl PartialEq for BlockList {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for BlockList {}

/// Blocks in list order, separated by single spaces
impl fmt::Display for BlockList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, block) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", block)?;
        }
        Ok(())
    }
}
