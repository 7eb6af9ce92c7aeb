//! Eviction Order Module
//!
//! Position ordering for cache keys, stored as a doubly linked list whose nodes
//! live in a slot vector and link to each other by index.
//!
//! - Head (front) = next to evict
//! - Tail (back) = most recently used or inserted
//!
//! Every operation except iteration is O(1). Freed slots are recycled through a
//! free list, so node storage never grows past the peak number of live keys.

// == Node Id ==
/// Stable handle to a node, valid until that node is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node<K> {
    key: K,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

// == Order List ==
/// Keys in eviction order.
#[derive(Debug)]
pub struct OrderList<K> {
    slots: Vec<Option<Node<K>>>,
    free: Vec<usize>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl<K> OrderList<K> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Push Back ==
    /// Appends a key at the newest position and returns its handle.
    pub fn push_back(&mut self, key: K) -> NodeId {
        let node = Node {
            key,
            prev: self.tail,
            next: None,
        };
        let id = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        };

        match self.tail {
            Some(tail) => self.node_mut(tail).next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
        id
    }

    // == Move To Back ==
    /// Moves an existing node to the newest position.
    ///
    /// Unknown handles are ignored.
    pub fn move_to_back(&mut self, id: NodeId) {
        if self.tail == Some(id) || self.node(id).is_none() {
            return;
        }
        self.unlink(id);

        let old_tail = self.tail;
        {
            let node = self.node_mut(id);
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail {
            Some(tail) => self.node_mut(tail).next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
    }

    // == Remove ==
    /// Removes a node, returning its key. Unknown handles return None.
    pub fn remove(&mut self, id: NodeId) -> Option<K> {
        self.node(id)?;
        self.unlink(id);
        let node = self.slots[id.0].take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(node.key)
    }

    // == Pop Front ==
    /// Removes and returns the key at the head (next to evict).
    pub fn pop_front(&mut self) -> Option<K> {
        let head = self.head?;
        self.remove(head)
    }

    /// Handle of the head node.
    pub fn front_id(&self) -> Option<NodeId> {
        self.head
    }

    /// Handle of the node after `id`, towards the tail.
    pub fn next_id(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.next)
    }

    /// Key stored at `id`.
    pub fn key(&self, id: NodeId) -> Option<&K> {
        self.node(id).map(|node| &node.key)
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every node.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterates keys from head (next to evict) to tail (newest).
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            list: self,
            current: self.head,
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node<K>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    // Callers only pass handles reachable from head/tail or checked via `node`.
    fn node_mut(&mut self, id: NodeId) -> &mut Node<K> {
        match self.slots.get_mut(id.0).and_then(Option::as_mut) {
            Some(node) => node,
            None => unreachable!("order list link points at a free slot"),
        }
    }

    fn unlink(&mut self, id: NodeId) {
        let (prev, next) = {
            let node = self.node_mut(id);
            (node.prev.take(), node.next.take())
        };
        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
    }
}

impl<K> Default for OrderList<K> {
    fn default() -> Self {
        Self::new()
    }
}

// == Iterator ==
/// Head-to-tail iterator over an [`OrderList`].
pub struct Iter<'a, K> {
    list: &'a OrderList<K>,
    current: Option<NodeId>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.current?)?;
        self.current = node.next;
        Some(&node.key)
    }
}
