//! # Barnes–Hut Octree (3D)
//!
//! A 3D octree over the particle set used to approximate gravitational
//! acceleration in `O(N log N)` instead of the `O(N²)` all-pairs sum, and to
//! find collision candidates with range queries.
//!
//! - Space is recursively subdivided into 8 octants.
//! - Nodes live in one arena (`Vec<Node>`) and refer to their children by
//!   index, so the whole tree can be cleared and rebuilt each step while
//!   keeping its allocation.
//! - A leaf holds up to `leaf_capacity` raw points; inserting one more
//!   splits it into 8 children and pushes its points down.
//! - Every node keeps the total mass and centre of mass of everything below
//!   it, updated incrementally on the way down during insertion:
//!
//!   `com' = (com * M + m * p) / (M + m)`, then `M' = M + m`
//!
//! The tree is read-only once built, so the force pass can traverse it from
//! many threads at once.

use smallvec::SmallVec;

use crate::simulation::bounds::Aabb;
use crate::simulation::forces::{point_mass_acceleration, MIN_DISTANCE};
use crate::simulation::states::NVec3;

/// Index of the root node in the arena.
pub const ROOT: usize = 0;

/// Leaves at this depth never split. Guards against endless subdivision
/// when more than `leaf_capacity` particles share a position.
pub const MAX_DEPTH: usize = 32;

pub const DEFAULT_LEAF_CAPACITY: usize = 1;

/// A raw point stored in a leaf. `index` refers back into the particle arrays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafPoint {
    pub position: NVec3,
    pub mass: f32,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Leaf { points: SmallVec<[LeafPoint; 4]> },
    Internal { children: [usize; 8] }, // indices into Octree::nodes
}

/// A single octree node.
#[derive(Debug, Clone)]
pub struct Node {
    pub bounds: Aabb,
    pub total_mass: f32,
    pub center_of_mass: NVec3,
    pub depth: usize,
    pub kind: NodeKind,
}

impl Node {
    fn leaf(bounds: Aabb, depth: usize) -> Self {
        Self {
            bounds,
            total_mass: 0.0,
            center_of_mass: NVec3::zeros(),
            depth,
            kind: NodeKind::Leaf { points: SmallVec::new() },
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn children(&self) -> Option<&[usize; 8]> {
        match &self.kind {
            NodeKind::Internal { children } => Some(children),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Raw points of a leaf; empty for internal nodes.
    pub fn points(&self) -> &[LeafPoint] {
        match &self.kind {
            NodeKind::Leaf { points } => points.as_slice(),
            NodeKind::Internal { .. } => &[],
        }
    }

    /// Fold one point mass into this node's aggregate.
    fn absorb(&mut self, position: &NVec3, mass: f32) {
        let total = self.total_mass + mass;
        if total > 0.0 {
            self.center_of_mass = (self.center_of_mass * self.total_mass + position * mass) / total;
        }
        self.total_mass = total;
    }
}

/// Arena-backed octree.
#[derive(Debug, Clone)]
pub struct Octree {
    nodes: Vec<Node>,
    leaf_capacity: usize,
}

impl Octree {
    /// Empty tree whose root covers `bounds`. The root starts as an empty leaf.
    pub fn new(bounds: Aabb, leaf_capacity: usize) -> Self {
        let mut nodes = Vec::new();
        nodes.push(Node::leaf(bounds, 0));
        Self {
            nodes,
            leaf_capacity: leaf_capacity.max(1),
        }
    }

    /// Build a tree over `positions`/`masses` in one go.
    pub fn build(bounds: Aabb, leaf_capacity: usize, positions: &[NVec3], masses: &[f32]) -> Self {
        let mut tree = Self::new(bounds, leaf_capacity);
        tree.insert_all(positions, masses);
        tree
    }

    /// Drop every node and start over with a fresh root covering `bounds`.
    /// The arena keeps its allocation.
    pub fn clear(&mut self, bounds: Aabb) {
        self.nodes.clear();
        self.nodes.push(Node::leaf(bounds, 0));
    }

    /// Insert every particle, using its slice index as the point index.
    /// Returns how many were rejected for lying outside the root.
    pub fn insert_all(&mut self, positions: &[NVec3], masses: &[f32]) -> usize {
        let mut dropped = 0;
        for (i, (p, m)) in positions.iter().zip(masses.iter()).enumerate() {
            if !self.insert(*p, *m, i) {
                dropped += 1;
            }
        }
        dropped
    }

    /// Insert one point. Points outside the root bounds are rejected without
    /// touching the tree and `false` is returned.
    pub fn insert(&mut self, position: NVec3, mass: f32, index: usize) -> bool {
        if !self.nodes[ROOT].bounds.contains(&position) {
            return false;
        }
        self.insert_at(ROOT, LeafPoint { position, mass, index });
        true
    }

    fn insert_at(&mut self, node_idx: usize, point: LeafPoint) {
        let capacity = self.leaf_capacity;
        let node = &mut self.nodes[node_idx];
        let depth = node.depth;

        node.absorb(&point.position, point.mass);

        if let NodeKind::Leaf { points } = &mut node.kind {
            if points.len() < capacity || depth >= MAX_DEPTH {
                points.push(point);
                return;
            }
            // full leaf: split, then route the new point below
            self.subdivide(node_idx);
        }

        let node = &self.nodes[node_idx];
        let octant = node.bounds.octant_of(&point.position);
        let child = match &node.kind {
            NodeKind::Internal { children } => children[octant],
            NodeKind::Leaf { .. } => return,
        };
        self.insert_at(child, point);
    }

    /// Turn leaf `node_idx` into an internal node with 8 octant children and
    /// move its stored points into them. The node's own aggregate already
    /// covers those points and is left alone.
    fn subdivide(&mut self, node_idx: usize) {
        let bounds = self.nodes[node_idx].bounds;
        let depth = self.nodes[node_idx].depth + 1;

        let first = self.nodes.len();
        for octant in 0..8 {
            self.nodes.push(Node::leaf(bounds.child(octant), depth));
        }
        let children: [usize; 8] = std::array::from_fn(|octant| first + octant);

        let old = std::mem::replace(&mut self.nodes[node_idx].kind, NodeKind::Internal { children });
        if let NodeKind::Leaf { points } = old {
            for p in points {
                self.insert_at(children[bounds.octant_of(&p.position)], p);
            }
        }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[ROOT]
    }

    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root().total_mass == 0.0 && self.root().points().is_empty() && self.root().is_leaf()
    }

    pub fn leaf_capacity(&self) -> usize {
        self.leaf_capacity
    }

    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Net gravitational acceleration at `position` for the particle with
    /// index `index` (which is never counted against itself).
    ///
    /// A node is replaced by a single mass at its centre of mass when
    /// `side / distance < theta`, the query point lies outside it and the
    /// centre of mass is beyond `cutoff`; otherwise its children are visited. Leaves are always summed point by
    /// point. With `theta == 0` nothing is ever approximated and the result
    /// equals the direct pairwise sum.
    pub fn acceleration_on(&self, index: usize, position: &NVec3, theta: f32, g: f32, cutoff: f32) -> NVec3 {
        let mut acc = NVec3::zeros();
        self.traverse(ROOT, index, position, theta, g, cutoff, &mut acc);
        acc
    }

    #[allow(clippy::too_many_arguments)]
    fn traverse(
        &self,
        node_idx: usize,
        index: usize,
        position: &NVec3,
        theta: f32,
        g: f32,
        cutoff: f32,
        acc: &mut NVec3,
    ) {
        let node = &self.nodes[node_idx];

        // Skip empty nodes
        if node.total_mass == 0.0 {
            return;
        }

        match &node.kind {
            NodeKind::Leaf { points } => {
                for p in points.iter().filter(|p| p.index != index) {
                    *acc += point_mass_acceleration(position, &p.position, p.mass, g, cutoff);
                }
            }
            NodeKind::Internal { children } => {
                // an aggregate inside the cutoff would hide members that lie outside it
                let dist = (node.center_of_mass - position).norm();
                let far = dist > cutoff.max(MIN_DISTANCE)
                    && !node.bounds.contains(position)
                    && node.bounds.side() / dist < theta;

                if far {
                    *acc += point_mass_acceleration(position, &node.center_of_mass, node.total_mass, g, cutoff);
                } else {
                    for &child in children {
                        self.traverse(child, index, position, theta, g, cutoff, acc);
                    }
                }
            }
        }
    }

    /// Call `f` for every stored point within `radius` (inclusive) of `center`.
    pub fn for_each_within<F>(&self, center: &NVec3, radius: f32, mut f: F)
    where
        F: FnMut(&LeafPoint),
    {
        let mut stack: SmallVec<[usize; 64]> = SmallVec::new();
        stack.push(ROOT);

        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if node.bounds.distance_to(center) > radius {
                continue;
            }
            match &node.kind {
                NodeKind::Leaf { points } => {
                    for p in points.iter().filter(|p| (p.position - center).norm() <= radius) {
                        f(p);
                    }
                }
                NodeKind::Internal { children } => stack.extend(children.iter().copied()),
            }
        }
    }
}
