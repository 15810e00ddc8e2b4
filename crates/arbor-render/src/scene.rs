//! Retained scene graph: the headless counterpart of the SVG document.
//!
//! Node groups are keyed by node name, tree links by the name of their target node and ad-hoc
//! links by their [`LinkKey`]. Elements that leave the data join are marked exiting and are
//! pruned once their transitions finish. An exiting element that rejoins is reused in place.

use crate::path::Diagonal;
use crate::transition::{Interpolate, Timing, Tween};
use arbor_core::{LinkKey, Point};
use indexmap::IndexMap;

/// Label fill opacity of a fully faded exiting node.
pub const FADED_OPACITY: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Live,
    Exiting,
}

/// Box geometry relative to the node's translation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectAttrs {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectAttrs {
    pub const ZERO: RectAttrs = RectAttrs {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// A box of the given size centered on the node's origin.
    pub fn centered(width: f64, height: f64) -> Self {
        Self {
            x: -width / 2.0,
            y: -height / 2.0,
            width,
            height,
        }
    }
}

impl Interpolate for RectAttrs {
    fn interpolate(self, to: Self, t: f64) -> Self {
        Self {
            x: self.x.interpolate(to.x, t),
            y: self.y.interpolate(to.y, t),
            width: self.width.interpolate(to.width, t),
            height: self.height.interpolate(to.height, t),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeElement {
    pub label: String,
    pub parent: Option<String>,
    pub phase: Phase,
    /// Layout position from the last pass this node was live in.
    pub settled: Point,
    position: Tween<Point>,
    rect: Tween<RectAttrs>,
    label_opacity: Tween<f64>,
    label_fill_opacity: Tween<f64>,
}

impl NodeElement {
    pub fn position_at(&self, now: f64) -> Point {
        self.position.value_at(now)
    }

    pub fn rect_at(&self, now: f64) -> RectAttrs {
        self.rect.value_at(now)
    }

    pub fn label_opacity_at(&self, now: f64) -> f64 {
        self.label_opacity.value_at(now)
    }

    pub fn label_fill_opacity_at(&self, now: f64) -> f64 {
        self.label_fill_opacity.value_at(now)
    }

    fn end(&self) -> f64 {
        self.position
            .end()
            .max(self.rect.end())
            .max(self.label_opacity.end())
            .max(self.label_fill_opacity.end())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Parent/child connector derived from the tree structure.
    Link,
    /// Ad-hoc connector between two arbitrary nodes.
    LinkAlone,
}

impl PathClass {
    pub fn as_str(self) -> &'static str {
        match self {
            PathClass::Link => "link",
            PathClass::LinkAlone => "link-alone",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathKey {
    Tree(String),
    AdHoc(LinkKey),
}

impl PathKey {
    pub fn class(&self) -> PathClass {
        match self {
            PathKey::Tree(_) => PathClass::Link,
            PathKey::AdHoc(_) => PathClass::LinkAlone,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PathElement {
    pub source: String,
    pub target: String,
    pub phase: Phase,
    d: Tween<Diagonal>,
}

impl PathElement {
    pub fn diagonal_at(&self, now: f64) -> Diagonal {
        self.d.value_at(now)
    }

    pub fn target_diagonal(&self) -> Diagonal {
        self.d.target()
    }
}

/// Target state of a live node for one render pass.
#[derive(Debug, Clone)]
pub struct NodeFrame {
    pub label: String,
    pub parent: Option<String>,
    /// Where the node appears if it is entering.
    pub origin: Point,
    pub position: Point,
    pub rect: RectAttrs,
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    now: f64,
    nodes: IndexMap<String, NodeElement>,
    paths: IndexMap<PathKey, PathElement>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scene time in milliseconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn advance(&mut self, ms: f64) {
        if ms.is_finite() && ms > 0.0 {
            self.now += ms;
        }
        self.prune();
    }

    /// Jumps to the end of every running transition.
    pub fn settle(&mut self) {
        let nodes_end = self.nodes.values().map(NodeElement::end);
        let paths_end = self.paths.values().map(|p| p.d.end());
        let end = nodes_end.chain(paths_end).fold(self.now, f64::max);
        self.now = end;
        self.prune();
    }

    pub fn is_settled(&self) -> bool {
        let now = self.now;
        self.nodes.values().all(|n| now >= n.end()) && self.paths.values().all(|p| now >= p.d.end())
    }

    pub fn node(&self, key: &str) -> Option<&NodeElement> {
        self.nodes.get(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &NodeElement)> {
        self.nodes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn path(&self, key: &PathKey) -> Option<&PathElement> {
        self.paths.get(key)
    }

    pub fn paths(&self) -> impl Iterator<Item = (&PathKey, &PathElement)> {
        self.paths.iter()
    }

    pub(crate) fn node_keys(&self) -> Vec<String> {
        self.nodes.keys().cloned().collect()
    }

    pub(crate) fn path_keys(&self) -> Vec<PathKey> {
        self.paths.keys().cloned().collect()
    }

    /// Enters (if new) and transitions a live node group.
    pub(crate) fn update_node(&mut self, key: &str, frame: NodeFrame, timing: Timing) {
        let now = self.now;
        let el = self.nodes.entry(key.to_string()).or_insert_with(|| {
            tracing::trace!(key, "node enter");
            NodeElement {
                label: frame.label.clone(),
                parent: frame.parent.clone(),
                phase: Phase::Live,
                settled: frame.origin,
                position: Tween::fixed(frame.origin),
                rect: Tween::fixed(RectAttrs::ZERO),
                label_opacity: Tween::fixed(0.0),
                label_fill_opacity: Tween::fixed(1.0),
            }
        });
        el.label = frame.label;
        el.parent = frame.parent;
        el.phase = Phase::Live;
        el.settled = frame.position;
        el.position.retarget(now, frame.position, timing);
        el.rect.retarget(now, frame.rect, timing);
        el.label_opacity.retarget(now, 1.0, timing);
        el.label_fill_opacity.retarget(now, 1.0, timing);
    }

    /// Collapses a node group onto `toward` and fades its label.
    pub(crate) fn exit_node(&mut self, key: &str, toward: Point, timing: Timing) {
        let now = self.now;
        let Some(el) = self.nodes.get_mut(key) else {
            return;
        };
        tracing::trace!(key, "node exit");
        el.phase = Phase::Exiting;
        el.position.retarget(now, toward, timing);
        el.rect.retarget(now, RectAttrs::ZERO, timing);
        el.label_fill_opacity.retarget(now, FADED_OPACITY, timing);
    }

    /// Enters (if new, drawn as `origin`) and transitions a live path.
    pub(crate) fn update_path(
        &mut self,
        key: PathKey,
        source: &str,
        target: &str,
        origin: Diagonal,
        d: Diagonal,
        timing: Timing,
    ) {
        let now = self.now;
        let el = self.paths.entry(key).or_insert_with(|| PathElement {
            source: source.to_string(),
            target: target.to_string(),
            phase: Phase::Live,
            d: Tween::fixed(origin),
        });
        el.source = source.to_string();
        el.target = target.to_string();
        el.phase = Phase::Live;
        el.d.retarget(now, d, timing);
    }

    /// Collapses a path onto `toward`.
    pub(crate) fn exit_path(&mut self, key: &PathKey, toward: Point, timing: Timing) {
        let now = self.now;
        let Some(el) = self.paths.get_mut(key) else {
            return;
        };
        el.phase = Phase::Exiting;
        el.d.retarget(now, Diagonal::collapsed(toward), timing);
    }

    /// Drops exiting elements whose transitions are over.
    pub(crate) fn prune(&mut self) {
        let now = self.now;
        let before = self.nodes.len() + self.paths.len();
        self.nodes
            .retain(|_, n| !(n.phase == Phase::Exiting && now >= n.end()));
        self.paths
            .retain(|_, p| !(p.phase == Phase::Exiting && now >= p.d.end()));
        let pruned = before - self.nodes.len() - self.paths.len();
        if pruned > 0 {
            tracing::trace!(pruned, now, "pruned exited elements");
        }
    }
}
