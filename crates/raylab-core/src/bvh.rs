use crate::bounds::Bounds3;
use crate::math::Vec3;
use crate::primitive::{Intersection, Primitive};
use crate::ray::Ray;

pub const MAX_LEAF_SIZE: usize = 4;
const BUCKET_COUNT: usize = 12;
const MAX_BUILD_DEPTH: usize = 64;
const TRAVERSAL_COST: f32 = 0.125;
const TRAVERSAL_STACK: usize = 128;

/// One node of the flattened tree. Children are referenced by index into the
/// node array, so traversal never chases pointers.
#[derive(Debug, Clone, Copy)]
pub enum Node {
    Leaf {
        bounds: Bounds3,
        /// Range `[first, first + count)` into `Bvh::prim_order`.
        first: usize,
        count: usize,
    },
    Inner {
        bounds: Bounds3,
        axis: usize,
        left: usize,
        right: usize,
    },
}

impl Node {
    pub fn bounds(&self) -> Bounds3 {
        match *self {
            Node::Leaf { bounds, .. } => bounds,
            Node::Inner { bounds, .. } => bounds,
        }
    }
}

/// Immutable bounding volume hierarchy over a primitive slice. Built once per
/// scene; reads from any number of threads need no synchronization.
pub struct Bvh {
    nodes: Vec<Node>,
    prim_order: Vec<usize>,
}

/// Cached per-primitive data used during the build; the partition passes
/// shuffle these small records instead of primitive payloads.
struct PrimInfo {
    index: usize,
    bounds: Bounds3,
    centroid: Vec3,
}

impl Bvh {
    pub fn build(prims: &[Primitive]) -> Self {
        assert!(!prims.is_empty(), "cannot build a BVH over an empty scene");

        let mut info: Vec<PrimInfo> = prims
            .iter()
            .enumerate()
            .map(|(index, prim)| {
                let bounds = prim.bounds();
                assert!(
                    bounds.is_finite(),
                    "primitive {index} has a non-finite bounding box"
                );
                PrimInfo {
                    index,
                    bounds,
                    centroid: prim.centroid(),
                }
            })
            .collect();

        let mut nodes = Vec::with_capacity(2 * prims.len());
        let count = info.len();
        build_range(&mut nodes, &mut info, 0, count, 0);

        let prim_order = info.into_iter().map(|p| p.index).collect();
        Self { nodes, prim_order }
    }

    pub fn world_bound(&self) -> Bounds3 {
        self.nodes[0].bounds()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nearest hit within `[ray.t_min, ray.t_max]`. Shrinks `ray.t_max` to
    /// each hit found so farther subtrees are pruned.
    pub fn intersect(&self, prims: &[Primitive], ray: &mut Ray) -> Option<Intersection> {
        let mut stack = [0usize; TRAVERSAL_STACK];
        let mut stack_len = 1;
        let mut closest: Option<Intersection> = None;

        while stack_len > 0 {
            stack_len -= 1;
            let node = self.nodes[stack[stack_len]];
            if !node.bounds().hit(ray, ray.t_max) {
                continue;
            }

            match node {
                Node::Leaf { first, count, .. } => {
                    for &prim_index in &self.prim_order[first..first + count] {
                        if let Some(mut hit) = prims[prim_index].intersect(ray) {
                            ray.t_max = hit.t;
                            hit.primitive = prim_index;
                            closest = Some(hit);
                        }
                    }
                }
                Node::Inner { axis, left, right, .. } => {
                    // Near child first, by direction sign on the split axis.
                    let (near, far) = if ray.direction().axis(axis) < 0.0 {
                        (right, left)
                    } else {
                        (left, right)
                    };
                    push(&mut stack, &mut stack_len, far);
                    push(&mut stack, &mut stack_len, near);
                }
            }
        }

        closest
    }

    /// Any-hit query for shadow/occlusion rays: returns on the first
    /// intersection inside `[ray.t_min, ray.t_max]`, in no particular order.
    pub fn intersect_p(&self, prims: &[Primitive], ray: &Ray) -> bool {
        let mut stack = [0usize; TRAVERSAL_STACK];
        let mut stack_len = 1;

        while stack_len > 0 {
            stack_len -= 1;
            let node = self.nodes[stack[stack_len]];
            if !node.bounds().hit(ray, ray.t_max) {
                continue;
            }

            match node {
                Node::Leaf { first, count, .. } => {
                    for &prim_index in &self.prim_order[first..first + count] {
                        if prims[prim_index].intersect_p(ray) {
                            return true;
                        }
                    }
                }
                Node::Inner { left, right, .. } => {
                    push(&mut stack, &mut stack_len, left);
                    push(&mut stack, &mut stack_len, right);
                }
            }
        }

        false
    }
}

fn push(stack: &mut [usize; TRAVERSAL_STACK], stack_len: &mut usize, node: usize) {
    // The build depth cap keeps real trees far below this; overflowing here
    // means the tree itself is malformed.
    assert!(
        *stack_len < TRAVERSAL_STACK,
        "BVH traversal stack overflow (malformed tree)"
    );
    stack[*stack_len] = node;
    *stack_len += 1;
}

fn build_range(
    nodes: &mut Vec<Node>,
    info: &mut [PrimInfo],
    start: usize,
    end: usize,
    depth: usize,
) -> usize {
    let count = end - start;
    if count <= MAX_LEAF_SIZE || depth >= MAX_BUILD_DEPTH {
        return push_leaf(nodes, info, start, end);
    }

    let range = &info[start..end];
    let bounds = range
        .iter()
        .fold(Bounds3::EMPTY, |total, p| total.union(p.bounds));
    let centroid_bounds = range
        .iter()
        .fold(Bounds3::EMPTY, |total, p| total.union_point(p.centroid));
    let axis = centroid_bounds.max_extent_axis();

    let split_bucket = choose_split_bucket(range, centroid_bounds, bounds, axis);
    let mut mid = start
        + partition_in_place(&mut info[start..end], |p| {
            bucket_index(centroid_bounds, p.centroid, axis) <= split_bucket
        });

    // Coincident centroids can sweep every primitive to one side of the
    // bucket boundary; a median split keeps the recursion shrinking.
    if mid == start || mid == end {
        mid = start + count / 2;
        info[start..end].select_nth_unstable_by(count / 2, |a, b| {
            a.centroid
                .axis(axis)
                .partial_cmp(&b.centroid.axis(axis))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    let node_index = nodes.len();
    nodes.push(Node::Leaf {
        bounds: Bounds3::EMPTY,
        first: 0,
        count: 0,
    });

    let left = build_range(nodes, info, start, mid, depth + 1);
    let right = build_range(nodes, info, mid, end, depth + 1);

    nodes[node_index] = Node::Inner {
        bounds: nodes[left].bounds().union(nodes[right].bounds()),
        axis,
        left,
        right,
    };
    node_index
}

fn push_leaf(nodes: &mut Vec<Node>, info: &[PrimInfo], start: usize, end: usize) -> usize {
    let bounds = info[start..end]
        .iter()
        .fold(Bounds3::EMPTY, |total, p| total.union(p.bounds));
    nodes.push(Node::Leaf {
        bounds,
        first: start,
        count: end - start,
    });
    nodes.len() - 1
}

fn bucket_index(centroid_bounds: Bounds3, centroid: Vec3, axis: usize) -> usize {
    let offset = centroid_bounds.offset(centroid).axis(axis);
    ((offset * BUCKET_COUNT as f32) as usize).min(BUCKET_COUNT - 1)
}

/// Binned surface-area heuristic: distribute centroids into buckets along
/// `axis`, then pick the boundary minimizing
/// `TRAVERSAL_COST + (n_l * area_l + n_r * area_r) / area_parent`.
/// Ties keep the smallest boundary index.
fn choose_split_bucket(
    range: &[PrimInfo],
    centroid_bounds: Bounds3,
    bounds: Bounds3,
    axis: usize,
) -> usize {
    let mut bucket_bounds = [Bounds3::EMPTY; BUCKET_COUNT];
    let mut bucket_counts = [0usize; BUCKET_COUNT];
    for p in range {
        let b = bucket_index(centroid_bounds, p.centroid, axis);
        bucket_counts[b] += 1;
        bucket_bounds[b] = bucket_bounds[b].union(p.bounds);
    }

    // Prefix sweep from the left, suffix sweep from the right.
    let mut costs = [0.0f32; BUCKET_COUNT - 1];
    let mut left_bounds = Bounds3::EMPTY;
    let mut left_count = 0usize;
    for i in 0..BUCKET_COUNT - 1 {
        left_bounds = left_bounds.union(bucket_bounds[i]);
        left_count += bucket_counts[i];
        costs[i] = left_count as f32 * left_bounds.surface_area();
    }
    let mut right_bounds = Bounds3::EMPTY;
    let mut right_count = 0usize;
    for i in (1..BUCKET_COUNT).rev() {
        right_bounds = right_bounds.union(bucket_bounds[i]);
        right_count += bucket_counts[i];
        costs[i - 1] += right_count as f32 * right_bounds.surface_area();
    }

    let parent_area = bounds.surface_area();
    let mut best = 0;
    let mut best_cost = f32::INFINITY;
    for (i, partial) in costs.iter().enumerate() {
        // NaN costs (degenerate parent area) lose the comparison and fall
        // through to the median-split fallback after partitioning.
        let cost = TRAVERSAL_COST + partial / parent_area;
        if cost < best_cost {
            best_cost = cost;
            best = i;
        }
    }
    best
}

/// Single unstable partition pass; returns the number of elements satisfying
/// the predicate, which all end up in the front of the slice.
fn partition_in_place(info: &mut [PrimInfo], pred: impl Fn(&PrimInfo) -> bool) -> usize {
    let mut first = 0;
    for i in 0..info.len() {
        if pred(&info[i]) {
            info.swap(first, i);
            first += 1;
        }
    }
    first
}
