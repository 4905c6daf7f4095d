use glam::Vec2;
use log::{debug, trace};

use crate::world::geometry::{EPSILON, Segment, side_value};

/// Where a segment (or point) falls relative to a splitter line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
    On,
}

impl Side {
    /// Classify a signed area with the ±[`EPSILON`] band treated as "on".
    #[inline(always)]
    pub fn of(value: f32) -> Side {
        if value >= EPSILON {
            Side::Front
        } else if value <= -EPSILON {
            Side::Back
        } else {
            Side::On
        }
    }
}

/// Result of testing one segment against a splitter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Classified {
    Whole(Side, Segment),
    Split {
        front: Segment,
        back: Segment,
    },
}

#[derive(Debug)]
pub struct BspNode {
    /// Infinite partition line through these two points.
    pub split_a: Vec2,
    pub split_b: Vec2,
    /// Segments lying on the splitter, the splitter itself first.
    pub segments: Vec<Segment>,
    pub front: Option<Box<BspNode>>,
    pub back: Option<Box<BspNode>>,
}

/// Owned BSP over a level's boundary segments (built once per level).
#[derive(Debug, Default)]
pub struct BspTree {
    pub root: Option<Box<BspNode>>,
}

// ──────────────────────────────────────────────────────────────────────────
//                       Construction
// ──────────────────────────────────────────────────────────────────────────
impl BspTree {
    pub fn build(segments: Vec<Segment>) -> BspTree {
        let tree = BspTree {
            root: build_node(segments),
        };
        debug!(
            "bsp: {} nodes, {} segments, depth {}",
            tree.node_count(),
            tree.segment_count(),
            tree.depth()
        );
        tree
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn node_count(&self) -> usize {
        fn count(n: &Option<Box<BspNode>>) -> usize {
            n.as_ref()
                .map_or(0, |n| 1 + count(&n.front) + count(&n.back))
        }
        count(&self.root)
    }

    /// Total number of segments stored across all nodes.
    pub fn segment_count(&self) -> usize {
        let mut total = 0;
        self.for_each_node(|n| total += n.segments.len());
        total
    }

    pub fn depth(&self) -> usize {
        fn depth(n: &Option<Box<BspNode>>) -> usize {
            n.as_ref()
                .map_or(0, |n| 1 + depth(&n.front).max(depth(&n.back)))
        }
        depth(&self.root)
    }

    /// Pre-order visit of every node (no viewpoint ordering).
    pub fn for_each_node(&self, mut f: impl FnMut(&BspNode)) {
        fn visit(n: &Option<Box<BspNode>>, f: &mut impl FnMut(&BspNode)) {
            if let Some(n) = n {
                f(n);
                visit(&n.front, f);
                visit(&n.back, f);
            }
        }
        visit(&self.root, &mut f);
    }

    /// Visit nodes relative to `eye`: far subtree, node, near subtree.
    pub fn walk(&self, eye: Vec2, mut f: impl FnMut(&BspNode)) {
        walk_node(self.root.as_deref(), eye, &mut f);
    }

    /// Deepest node reached by descending towards `p` (on-line counts as
    /// back).  `None` for an empty tree.
    pub fn locate(&self, p: Vec2) -> Option<&BspNode> {
        let mut cur = self.root.as_deref();
        let mut last = None;
        while let Some(node) = cur {
            last = Some(node);
            cur = match node.point_side(p) {
                Side::Front => node.front.as_deref(),
                _ => node.back.as_deref(),
            };
        }
        last
    }
}

fn build_node(mut segments: Vec<Segment>) -> Option<Box<BspNode>> {
    segments.retain(|s| !s.is_degenerate());

    let split_idx = choose_splitter(&segments)?;
    let splitter = segments.remove(split_idx);
    let (a, b) = (splitter.a, splitter.b);

    let mut on = vec![splitter];
    let mut front = Vec::new();
    let mut back = Vec::new();

    for seg in segments {
        match classify(a, b, &seg) {
            Classified::Whole(Side::Front, s) => front.push(s),
            Classified::Whole(Side::Back, s) => back.push(s),
            Classified::Whole(Side::On, s) => on.push(s),
            Classified::Split { front: f, back: k } => {
                front.push(f);
                back.push(k);
            }
        }
    }

    trace!(
        "bsp node ({a}, {b}): {} on, {} front, {} back",
        on.len(),
        front.len(),
        back.len()
    );

    Some(Box::new(BspNode {
        split_a: a,
        split_b: b,
        segments: on,
        front: build_node(front),
        back: build_node(back),
    }))
}

/// Longest segment; the first one wins ties.
fn choose_splitter(segments: &[Segment]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, seg) in segments.iter().enumerate() {
        let len = seg.length_squared();
        if best.is_none_or(|(_, b)| len > b) {
            best = Some((i, len));
        }
    }
    best.map(|(i, _)| i)
}

/// Classify `seg` against the infinite line `a → b`.  Always resolves.
pub fn classify(a: Vec2, b: Vec2, seg: &Segment) -> Classified {
    let sa = side_value(a, b, seg.a);
    let sb = side_value(a, b, seg.b);

    match (Side::of(sa), Side::of(sb)) {
        (Side::Front, Side::Front) => Classified::Whole(Side::Front, *seg),
        (Side::Back, Side::Back) => Classified::Whole(Side::Back, *seg),
        (Side::On, Side::On) => Classified::Whole(Side::On, *seg),
        // touching the line: the other endpoint decides
        (Side::On, side) | (side, Side::On) => Classified::Whole(side, *seg),
        (Side::Front, Side::Back) | (Side::Back, Side::Front) => split(a, b, seg, sa, sb),
    }
}

/// Cut a crossing segment at the line; fall back to the midpoint side if the
/// intersection parameter is unusable.
fn split(a: Vec2, b: Vec2, seg: &Segment, sa: f32, sb: f32) -> Classified {
    let t = sa / (sa - sb);
    if !t.is_finite() || t <= 0.0 || t >= 1.0 {
        return Classified::Whole(Side::of(side_value(a, b, seg.midpoint())), *seg);
    }

    let (first, second) = seg.split_at(t);
    let first_side = Side::of(side_value(a, b, first.midpoint()));
    let second_side = Side::of(side_value(a, b, second.midpoint()));
    match (first_side, second_side) {
        (Side::Front, Side::Back) => Classified::Split {
            front: first,
            back: second,
        },
        (Side::Back, Side::Front) => Classified::Split {
            front: second,
            back: first,
        },
        // pieces too thin to straddle: keep the segment whole
        _ => Classified::Whole(Side::of(side_value(a, b, seg.midpoint())), *seg),
    }
}

fn walk_node(node: Option<&BspNode>, eye: Vec2, f: &mut impl FnMut(&BspNode)) {
    let Some(node) = node else {
        return;
    };
    let (near, far) = if node.eye_in_front(eye) {
        (node.front.as_deref(), node.back.as_deref())
    } else {
        (node.back.as_deref(), node.front.as_deref())
    };
    walk_node(far, eye, f);
    f(node);
    walk_node(near, eye, f);
}

// ──────────────────────────────────────────────────────────────────────────
//                       Node geometry helpers
// ──────────────────────────────────────────────────────────────────────────
impl BspNode {
    /// Side of `p` with the ±ε band reported as [`Side::On`].
    #[inline(always)]
    pub fn point_side(&self, p: Vec2) -> Side {
        Side::of(side_value(self.split_a, self.split_b, p))
    }

    /// Viewer side test: strictly positive is front, ties go to the back.
    #[inline(always)]
    pub fn eye_in_front(&self, eye: Vec2) -> bool {
        side_value(self.split_a, self.split_b, eye) > 0.0
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }
}
