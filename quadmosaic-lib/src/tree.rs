use crate::*;
use std::collections::VecDeque;

pub type NodeId = usize;

#[derive(Clone, Debug, PartialEq)]
pub struct QuadNode {
    pub rect: Rect,
    pub depth: u32,
    pub stats: RegionStats,
    children: Option<[NodeId; 4]>,
    fresh: bool,
}

impl QuadNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn children(&self) -> Option<[NodeId; 4]> {
        self.children
    }

    /// Whether this node's stats were computed against the frame that
    /// produced the tree, as opposed to carried over from an older one.
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    pub fn block(&self) -> Block {
        Block::new(self.rect, self.stats.color())
    }
}

/// Index-based quadtree; `nodes[0]` is the root and children always sit
/// after their parent, in breadth-first order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuadTree {
    nodes: Vec<QuadNode>,
}

impl QuadTree {
    pub fn root(&self) -> Option<&QuadNode> {
        self.nodes.first()
    }

    pub fn node(&self, id: NodeId) -> &QuadNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &QuadNode)> + '_ {
        self.nodes.iter().enumerate()
    }

    /// Leaves in top-left, top-right, bottom-left, bottom-right order at
    /// every level; this is the order blocks are emitted in.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = if self.nodes.is_empty() {
            vec![]
        } else {
            vec![0]
        };

        std::iter::from_fn(move || loop {
            let id = stack.pop()?;

            match self.nodes[id].children {
                Some(children) => stack.extend(children.iter().rev()),
                None => return Some(id),
            }
        })
    }

    pub fn blocks(&self) -> BlockSet {
        self.leaves().map(|id| self.nodes[id].block()).collect()
    }

    pub fn fresh_leaves(&self) -> usize {
        self.leaves().filter(|&id| self.nodes[id].is_fresh()).count()
    }

    /// Checks the structural invariants against a frame rectangle: the
    /// root matches it, every split node has children that tile it one
    /// level deeper, and children come after their parent.
    pub fn tiles(&self, rect: Rect) -> bool {
        match self.root() {
            Some(root) if root.rect == rect => {}
            _ => return false,
        }

        self.nodes.iter().enumerate().all(|(id, node)| {
            let children = match node.children {
                Some(children) => children,
                None => return true,
            };

            children
                .iter()
                .zip(node.rect.quadrants().iter())
                .all(|(&child, quadrant)| {
                    child > id
                        && child < self.nodes.len()
                        && self.nodes[child].rect == *quadrant
                        && self.nodes[child].depth == node.depth + 1
                })
        })
    }

    fn push(&mut self, node: QuadNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}

#[derive(Copy, Clone, Debug)]
enum Origin {
    Fresh,
    Kept(NodeId),
}

/// Breadth-first quadtree decomposition of one frame.
#[derive(Copy, Clone, Debug)]
pub struct Builder<'a> {
    params: &'a Params,
    buf: &'a PixelBuffer,
}

impl<'a> Builder<'a> {
    pub fn new(params: &'a Params, buf: &'a PixelBuffer) -> Self {
        Self { params, buf }
    }

    pub fn build(&self) -> QuadTree {
        self.build_from(self.buf.rect(), 0)
    }

    /// Decomposes `rect` alone, treating it as a node at `depth`.
    pub fn build_from(&self, rect: Rect, depth: u32) -> QuadTree {
        let mut tree = QuadTree::default();
        let root = self.fresh(rect, depth);

        tree.push(root);
        self.grow(&mut tree, None, Origin::Fresh);
        tree
    }

    /// Rebuilds against `prev`, recomputing every node marked in `dirty`
    /// (indexed by `prev`'s node ids) from scratch and copying the rest.
    ///
    /// `prev` must tile this builder's frame.
    pub fn regrow(&self, prev: &QuadTree, dirty: &[bool]) -> QuadTree {
        let mut tree = QuadTree::default();

        let origin = if dirty.first().copied().unwrap_or(true) {
            tree.push(self.fresh(self.buf.rect(), 0));
            Origin::Fresh
        } else {
            tree.push(Self::kept(prev.node(0)));
            Origin::Kept(0)
        };

        self.grow(&mut tree, Some((prev, dirty)), origin);
        tree
    }

    fn grow(&self, tree: &mut QuadTree, prev: Option<(&QuadTree, &[bool])>, origin: Origin) {
        let mut queue = VecDeque::new();
        queue.push_back((0, origin));

        while let Some((id, origin)) = queue.pop_front() {
            let node = &tree.nodes[id];
            let depth = node.depth;

            let children: Vec<(QuadNode, Origin)> = match origin {
                Origin::Fresh => {
                    if !self.should_split(node) {
                        continue;
                    }

                    node.rect
                        .quadrants()
                        .iter()
                        .map(|&rect| (self.fresh(rect, depth + 1), Origin::Fresh))
                        .collect()
                }

                Origin::Kept(pid) => {
                    let (prev, dirty) = match prev {
                        Some(prev) => prev,
                        None => continue,
                    };

                    let pchildren = match prev.node(pid).children {
                        Some(pchildren) => pchildren,
                        None => continue,
                    };

                    pchildren
                        .iter()
                        .map(|&pid| {
                            let pnode = prev.node(pid);

                            if dirty[pid] {
                                (self.fresh(pnode.rect, pnode.depth), Origin::Fresh)
                            } else {
                                (Self::kept(pnode), Origin::Kept(pid))
                            }
                        })
                        .collect()
                }
            };

            let mut ids = [0; 4];

            for (slot, (child, origin)) in ids.iter_mut().zip(children) {
                *slot = tree.push(child);
                queue.push_back((*slot, origin));
            }

            tree.nodes[id].children = Some(ids);
        }
    }

    fn should_split(&self, node: &QuadNode) -> bool {
        node.stats.variance > self.params.variance_threshold
            && node.rect.width.min(node.rect.height) as u64
                > 2 * self.params.min_leaf_size as u64
            && node.depth < self.params.max_depth
    }

    fn fresh(&self, rect: Rect, depth: u32) -> QuadNode {
        QuadNode {
            rect,
            depth,
            stats: RegionStats::compute(self.buf, rect),
            children: None,
            fresh: true,
        }
    }

    fn kept(prev: &QuadNode) -> QuadNode {
        QuadNode {
            children: None,
            fresh: false,
            ..prev.clone()
        }
    }
}
