//! Tidy tree layout (Buchheim, Jünger & Leipert's linear-time take on Walker's algorithm).
//!
//! Positions follow the classic d3 tree layout: siblings are separated by one unit, cousins by
//! two, parents are centered over their first and last child, and the result is scaled so the
//! outermost nodes sit half a separation inside `[0, breadth]` while the deepest level lands on
//! `depth`.

use arbor_core::{NodeId, Point, Tree};

/// Output of one layout pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutTree {
    /// Every live node in pre-order.
    pub order: Vec<NodeId>,
    /// Parent/child pairs in pre-order of the parent.
    pub links: Vec<(NodeId, NodeId)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeLayout {
    breadth: f64,
    depth: f64,
}

const VIRTUAL_ROOT: usize = 0;

#[derive(Debug)]
struct WalkNode {
    node: Option<NodeId>,
    parent: usize,
    children: Vec<usize>,
    /// Index among siblings.
    number: usize,
    depth: usize,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
    ancestor: usize,
    /// Default ancestor carried between sibling apportion steps.
    default_ancestor: Option<usize>,
}

impl WalkNode {
    fn new(node: Option<NodeId>, parent: usize, number: usize, depth: usize, slot: usize) -> Self {
        Self {
            node,
            parent,
            children: Vec::new(),
            number,
            depth,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            ancestor: slot,
            default_ancestor: None,
        }
    }
}

impl TreeLayout {
    /// `breadth` spans sibling spread, `depth` spans root-to-deepest-leaf distance.
    pub fn new(breadth: f64, depth: f64) -> Self {
        Self { breadth, depth }
    }

    pub fn size(&self) -> [f64; 2] {
        [self.breadth, self.depth]
    }

    /// Lays out every live node, writing `position` and `depth` back into the tree.
    pub fn layout(&self, tree: &mut Tree) -> LaidOutTree {
        let mut walk = build_walk(tree);
        let root = 1;

        let mut stack = vec![root];
        let mut visit = Vec::with_capacity(walk.len());
        while let Some(v) = stack.pop() {
            visit.push(v);
            stack.extend(walk[v].children.iter().copied());
        }
        for &v in visit.iter().rev() {
            first_walk(&mut walk, v);
        }

        walk[VIRTUAL_ROOT].modifier = -walk[root].prelim;
        let mut xs = vec![0.0; walk.len()];
        for v in root..walk.len() {
            let parent_mod = walk[walk[v].parent].modifier;
            xs[v] = walk[v].prelim + parent_mod;
            walk[v].modifier += parent_mod;
        }

        let (mut left, mut right, mut bottom) = (root, root, root);
        for v in root..walk.len() {
            if xs[v] < xs[left] {
                left = v;
            }
            if xs[v] > xs[right] {
                right = v;
            }
            if walk[v].depth > walk[bottom].depth {
                bottom = v;
            }
        }
        let tx = separation(&walk, left, right) / 2.0 - xs[left];
        let kx = self.breadth / (xs[right] + separation(&walk, right, left) / 2.0 + tx);
        let bottom_depth = walk[bottom].depth;
        let ky = self.depth / if bottom_depth == 0 { 1.0 } else { bottom_depth as f64 };

        let mut out = LaidOutTree::default();
        for v in root..walk.len() {
            let Some(id) = walk[v].node else {
                continue;
            };
            let node = &mut tree[id];
            node.depth = walk[v].depth;
            node.position = Point::new((xs[v] + tx) * kx, walk[v].depth as f64 * ky);
            out.order.push(id);
        }
        out.links = tree.links();

        tracing::debug!(
            nodes = out.order.len(),
            depth = bottom_depth,
            breadth = self.breadth,
            "laid out tree"
        );
        out
    }
}

/// Mirrors the tree into walk nodes in pre-order; slot 0 is a virtual parent of the root.
fn build_walk(tree: &Tree) -> Vec<WalkNode> {
    let mut walk = vec![WalkNode::new(None, VIRTUAL_ROOT, 0, 0, VIRTUAL_ROOT)];
    let mut stack: Vec<(NodeId, usize, usize, usize)> = vec![(tree.root(), VIRTUAL_ROOT, 0, 0)];
    while let Some((id, parent, number, depth)) = stack.pop() {
        let slot = walk.len();
        walk.push(WalkNode::new(Some(id), parent, number, depth, slot));
        walk[parent].children.push(slot);
        let children = tree.children(id);
        for (i, &child) in children.iter().enumerate().rev() {
            stack.push((child, slot, i, depth + 1));
        }
    }
    walk
}

fn separation(walk: &[WalkNode], a: usize, b: usize) -> f64 {
    if walk[a].parent == walk[b].parent {
        1.0
    } else {
        2.0
    }
}

fn next_left(walk: &[WalkNode], v: usize) -> Option<usize> {
    walk[v].children.first().copied().or(walk[v].thread)
}

fn next_right(walk: &[WalkNode], v: usize) -> Option<usize> {
    walk[v].children.last().copied().or(walk[v].thread)
}

fn first_walk(walk: &mut [WalkNode], v: usize) {
    let parent = walk[v].parent;
    let left_sibling = match walk[v].number {
        0 => None,
        n => Some(walk[parent].children[n - 1]),
    };

    if let (Some(&first), Some(&last)) = (walk[v].children.first(), walk[v].children.last()) {
        execute_shifts(walk, v);
        let midpoint = (walk[first].prelim + walk[last].prelim) / 2.0;
        match left_sibling {
            Some(w) => {
                walk[v].prelim = walk[w].prelim + separation(walk, v, w);
                walk[v].modifier = walk[v].prelim - midpoint;
            }
            None => walk[v].prelim = midpoint,
        }
    } else if let Some(w) = left_sibling {
        walk[v].prelim = walk[w].prelim + separation(walk, v, w);
    }

    let default_ancestor = walk[parent]
        .default_ancestor
        .unwrap_or(walk[parent].children[0]);
    walk[parent].default_ancestor = Some(apportion(walk, v, left_sibling, default_ancestor));
}

fn apportion(
    walk: &mut [WalkNode],
    v: usize,
    left_sibling: Option<usize>,
    mut default_ancestor: usize,
) -> usize {
    let Some(w) = left_sibling else {
        return default_ancestor;
    };

    // inner/outer contours on the right (v's subtree) and left (siblings to the left).
    let mut v_ip = v;
    let mut v_op = v;
    let mut v_im = w;
    let mut v_om = walk[walk[v].parent].children[0];
    let mut s_ip = walk[v_ip].modifier;
    let mut s_op = walk[v_op].modifier;
    let mut s_im = walk[v_im].modifier;
    let mut s_om = walk[v_om].modifier;

    let (next_im, next_ip) = loop {
        let next_im = next_right(walk, v_im);
        let next_ip = next_left(walk, v_ip);
        let (Some(im), Some(ip)) = (next_im, next_ip) else {
            break (next_im, next_ip);
        };
        v_im = im;
        v_ip = ip;
        let (Some(om), Some(op)) = (next_left(walk, v_om), next_right(walk, v_op)) else {
            break (None, None);
        };
        v_om = om;
        v_op = op;
        walk[v_op].ancestor = v;

        let shift = walk[v_im].prelim + s_im - walk[v_ip].prelim - s_ip
            + separation(walk, v_im, v_ip);
        if shift > 0.0 {
            let wm = greatest_distinct_ancestor(walk, v_im, v, default_ancestor);
            move_subtree(walk, wm, v, shift);
            s_ip += shift;
            s_op += shift;
        }
        s_im += walk[v_im].modifier;
        s_ip += walk[v_ip].modifier;
        s_om += walk[v_om].modifier;
        s_op += walk[v_op].modifier;
    };

    if let Some(im) = next_im {
        if next_right(walk, v_op).is_none() {
            walk[v_op].thread = Some(im);
            walk[v_op].modifier += s_im - s_op;
        }
    }
    if let Some(ip) = next_ip {
        if next_left(walk, v_om).is_none() {
            walk[v_om].thread = Some(ip);
            walk[v_om].modifier += s_ip - s_om;
            default_ancestor = v;
        }
    }
    default_ancestor
}

fn greatest_distinct_ancestor(walk: &[WalkNode], v_im: usize, v: usize, default: usize) -> usize {
    let a = walk[v_im].ancestor;
    if walk[a].parent == walk[v].parent {
        a
    } else {
        default
    }
}

fn move_subtree(walk: &mut [WalkNode], wm: usize, wp: usize, shift: f64) {
    let subtrees = walk[wp].number as f64 - walk[wm].number as f64;
    let change = shift / subtrees;
    walk[wp].change -= change;
    walk[wp].shift += shift;
    walk[wm].change += change;
    walk[wp].prelim += shift;
    walk[wp].modifier += shift;
}

fn execute_shifts(walk: &mut [WalkNode], v: usize) {
    let mut shift = 0.0;
    let mut change = 0.0;
    for i in (0..walk[v].children.len()).rev() {
        let w = walk[v].children[i];
        walk[w].prelim += shift;
        walk[w].modifier += shift;
        change += walk[w].change;
        shift += walk[w].shift + change;
    }
}
