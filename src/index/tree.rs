use crate::common::Rid;

/// Index of a node inside the tree's arena.
pub type NodeId = usize;

/// Leaf entry: one key and the locations of every record bearing it.
#[derive(Debug, Clone)]
pub struct DataEntry {
    pub key: i32,
    pub rids: Vec<Rid>,
}

/// Routing entry of an internal node. `child` holds keys >= `key`.
#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    key: i32,
    child: NodeId,
}

#[derive(Debug)]
enum Node {
    Leaf {
        #[allow(dead_code)]
        parent: Option<NodeId>,
        entries: Vec<DataEntry>,
    },
    Internal {
        parent: Option<NodeId>,
        first_child: Option<NodeId>,
        entries: Vec<IndexEntry>,
    },
}

impl Node {
    fn set_parent(&mut self, new_parent: Option<NodeId>) {
        match self {
            Node::Leaf { parent, .. } => *parent = new_parent,
            Node::Internal { parent, .. } => *parent = new_parent,
        }
    }
}

/// Static B+tree over integer keys, built once by bulk loading and
/// queried read-only afterwards.
///
/// Nodes live in a flat arena and refer to each other by index. A
/// node of order `d` routes through at most `2 * d` entries; an
/// internal node additionally keeps a leftmost child for keys below
/// its first routing key.
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    order: usize,
}

impl Tree {
    /// Builds the tree from pre-packed leaves. Leaves must be in
    /// ascending key order with no key spanning two leaves, as
    /// produced by [`build_leaves`](crate::index::build_leaves).
    pub fn bulk_load(order: usize, leaves: Vec<Vec<DataEntry>>) -> Self {
        assert!(order > 0);
        let mut nodes = vec![Node::Internal {
            parent: None,
            first_child: None,
            entries: Vec::new(),
        }];
        let mut root: NodeId = 0;
        let mut current: NodeId = 0;

        for leaf_entries in leaves {
            let min_key = match leaf_entries.first() {
                Some(entry) => entry.key,
                None => continue,
            };
            let leaf_id = nodes.len();
            nodes.push(Node::Leaf {
                parent: Some(current),
                entries: leaf_entries,
            });
            match &mut nodes[current] {
                Node::Internal {
                    first_child,
                    entries,
                    ..
                } => {
                    if first_child.is_none() && entries.is_empty() {
                        *first_child = Some(leaf_id);
                    } else {
                        entries.push(IndexEntry {
                            key: min_key,
                            child: leaf_id,
                        });
                    }
                }
                Node::Leaf { .. } => unreachable!("current node is always internal"),
            }

            // Split upward while any node on the path overflows. The
            // first split decides which node receives the next leaf.
            let mut node = current;
            let mut next_current = None;
            loop {
                let overflow = match &nodes[node] {
                    Node::Internal { entries, .. } => entries.len() > 2 * order,
                    Node::Leaf { .. } => false,
                };
                if !overflow {
                    break;
                }
                let parent = match &nodes[node] {
                    Node::Internal { parent, .. } => *parent,
                    Node::Leaf { .. } => None,
                };
                let parent = match parent {
                    Some(p) => p,
                    None => {
                        let p = nodes.len();
                        nodes.push(Node::Internal {
                            parent: None,
                            first_child: Some(node),
                            entries: Vec::new(),
                        });
                        nodes[node].set_parent(Some(p));
                        root = p;
                        p
                    }
                };

                let (promoted, right) = match &mut nodes[node] {
                    Node::Internal { entries, .. } => {
                        let mid = entries.len() / 2;
                        let promoted = entries[mid];
                        let right = entries.split_off(mid + 1);
                        entries.truncate(mid);
                        (promoted, right)
                    }
                    Node::Leaf { .. } => unreachable!("only internal nodes split"),
                };

                let sibling = nodes.len();
                nodes.push(Node::Internal {
                    parent: Some(parent),
                    first_child: Some(promoted.child),
                    entries: right.clone(),
                });
                nodes[promoted.child].set_parent(Some(sibling));
                for entry in &right {
                    nodes[entry.child].set_parent(Some(sibling));
                }
                match &mut nodes[parent] {
                    Node::Internal { entries, .. } => entries.push(IndexEntry {
                        key: promoted.key,
                        child: sibling,
                    }),
                    Node::Leaf { .. } => unreachable!("parent node is always internal"),
                }

                if next_current.is_none() {
                    next_current = Some(sibling);
                }
                node = parent;
            }
            if let Some(next) = next_current {
                current = next;
            }
        }

        Self { nodes, root, order }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Locations of every record with `key`, or `None` when the key is
    /// absent.
    pub fn search(&self, key: i32) -> Option<&[Rid]> {
        let mut node = self.root;
        loop {
            match &self.nodes[node] {
                Node::Internal {
                    first_child,
                    entries,
                    ..
                } => {
                    if entries.is_empty() {
                        node = (*first_child)?;
                        continue;
                    }
                    let mut lo: isize = 0;
                    let mut hi: isize = entries.len() as isize - 1;
                    let mut exact = None;
                    while lo <= hi {
                        let mid = (lo + hi) / 2;
                        let k = entries[mid as usize].key;
                        if key == k {
                            exact = Some(entries[mid as usize].child);
                            break;
                        } else if key < k {
                            hi = mid - 1;
                        } else {
                            lo = mid + 1;
                        }
                    }
                    node = match exact {
                        Some(child) => child,
                        None => {
                            let mid = ((lo + hi) / 2) as usize;
                            if key < entries[mid].key {
                                if mid == 0 {
                                    (*first_child)?
                                } else {
                                    entries[mid - 1].child
                                }
                            } else {
                                entries[mid].child
                            }
                        }
                    };
                }
                Node::Leaf { entries, .. } => {
                    return entries
                        .binary_search_by_key(&key, |e| e.key)
                        .ok()
                        .map(|i| entries[i].rids.as_slice());
                }
            }
        }
    }

    /// Depth of the tree, counting internal levels and the leaf level.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = self.root;
        loop {
            match &self.nodes[node] {
                Node::Internal {
                    first_child,
                    entries,
                    ..
                } => {
                    let next = first_child.or_else(|| entries.first().map(|e| e.child));
                    match next {
                        Some(child) => {
                            height += 1;
                            node = child;
                        }
                        None => return height,
                    }
                }
                Node::Leaf { .. } => return height,
            }
        }
    }
}
