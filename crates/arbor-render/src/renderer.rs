use crate::config::{RenderConfig, Surface};
use crate::layout::TreeLayout;
use crate::model::SceneSnapshot;
use crate::path::{Diagonal, project};
use crate::scene::{NodeFrame, PathKey, Phase, RectAttrs, Scene};
use crate::svg::{SvgRenderOptions, render_scene_svg};
use crate::text::{DeterministicTextMeasurer, TextMeasurer, TextStyle};
use crate::{Error, Result};
use arbor_core::{LinkKey, Point, Tree};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// Owns everything needed to draw one tree: the drawing surface, the layout engine, the tree
/// itself, the retained scene and the ad-hoc link registry.
#[derive(Clone)]
pub struct TreeRenderer {
    config: RenderConfig,
    surface: Surface,
    layout: TreeLayout,
    tree: Tree,
    scene: Scene,
    text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl std::fmt::Debug for TreeRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeRenderer")
            .field("config", &self.config)
            .field("surface", &self.surface)
            .field("nodes", &self.tree.len())
            .field("now", &self.scene.now())
            .finish()
    }
}

impl TreeRenderer {
    /// Initializes the drawing surface for `tree`.
    ///
    /// Nothing is drawn until the first [`update`](Self::update). The root's previous position
    /// is placed at the middle of the depth-zero edge so the first render grows out of it.
    pub fn init(config: RenderConfig, mut tree: Tree) -> Result<Self> {
        config.validate()?;
        let surface = Surface::from_config(&config);
        let layout = TreeLayout::new(surface.height, surface.width);
        tree.root_node_mut().previous = Point::new(surface.height / 2.0, 0.0);
        tracing::debug!(
            width = surface.width,
            height = surface.height,
            nodes = tree.len(),
            "initialized drawing surface"
        );
        Ok(Self {
            config,
            surface,
            layout,
            tree,
            scene: Scene::new(),
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        })
    }

    pub fn new(config: RenderConfig, root_name: impl Into<String>) -> Result<Self> {
        Self::init(config, Tree::new(root_name))
    }

    pub fn with_text_measurer(mut self, measurer: Arc<dyn TextMeasurer + Send + Sync>) -> Self {
        self.text_measurer = measurer;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn now(&self) -> f64 {
        self.scene.now()
    }

    /// Adds `name` as the last child of `parent` and re-renders.
    pub fn add_item(&mut self, name: &str, parent: Option<&str>) -> Result<()> {
        let Some(parent) = parent.filter(|p| !p.is_empty()) else {
            return Err(arbor_core::Error::ParentRequired.into());
        };
        self.tree.add_child(parent, name)?;
        self.update()
    }

    /// Removes `name` and its subtree, retracts ad-hoc links touching them, and re-renders.
    pub fn remove_item(&mut self, name: &str) -> Result<()> {
        let removed = self.tree.remove(name)?;
        let removed_names: FxHashSet<&str> = removed.iter().map(|n| n.name.as_str()).collect();

        let timing = self.config.timing();
        for key in self.scene.path_keys() {
            let PathKey::AdHoc(link) = &key else {
                continue;
            };
            let (a, b) = link.names();
            if !removed_names.contains(a) && !removed_names.contains(b) {
                continue;
            }
            let Some(el) = self.scene.path(&key) else {
                continue;
            };
            if el.phase == Phase::Exiting {
                continue;
            }
            let toward = el.target_diagonal().source;
            tracing::debug!(link = %link, "retracting ad-hoc link of removed node");
            self.scene.exit_path(&key, toward, timing);
        }

        self.update()
    }

    /// Lays the tree out again and reconciles the scene with it.
    pub fn update(&mut self) -> Result<()> {
        let laid_out = self.layout.layout(&mut self.tree);
        let timing = self.config.timing();
        let style = TextStyle {
            font_size: self.config.font_size,
            ..Default::default()
        };

        let root_previous = self.tree.root_node().previous;
        let mut live: FxHashMap<&str, Point> = FxHashMap::default();
        for &id in &laid_out.order {
            let node = &self.tree[id];
            live.insert(node.name.as_str(), node.position);
        }

        for &id in &laid_out.order {
            let node = &self.tree[id];
            let parent = node.parent.map(|p| &self.tree[p]);
            let label = node.name.to_uppercase();
            let metrics = self.text_measurer.measure(&label, &style);
            let width = metrics.width + self.config.padding * 2.0;
            let rect = RectAttrs::centered(width, self.config.node_height);
            self.scene.update_node(
                &node.name,
                NodeFrame {
                    label,
                    parent: parent.map(|p| p.name.clone()),
                    origin: parent.map_or(root_previous, |p| p.previous),
                    position: node.position,
                    rect,
                },
                timing,
            );
        }

        for key in self.scene.node_keys() {
            if live.contains_key(key.as_str()) {
                continue;
            }
            let Some(el) = self.scene.node(&key) else {
                continue;
            };
            let toward = match el.parent.as_deref() {
                Some(parent) => live
                    .get(parent)
                    .copied()
                    .or_else(|| self.scene.node(parent).map(|p| p.settled))
                    .unwrap_or(el.settled),
                None => root_previous,
            };
            self.scene.exit_node(&key, toward, timing);
        }

        let mut live_links: FxHashSet<&str> = FxHashSet::default();
        for &(s, t) in &laid_out.links {
            let source = &self.tree[s];
            let target = &self.tree[t];
            live_links.insert(target.name.as_str());
            self.scene.update_path(
                PathKey::Tree(target.name.clone()),
                &source.name,
                &target.name,
                Diagonal::collapsed(source.previous),
                Diagonal::new(source.position, target.position),
                timing,
            );
        }

        for key in self.scene.path_keys() {
            let Some(el) = self.scene.path(&key) else {
                continue;
            };
            match &key {
                PathKey::Tree(target) => {
                    if live_links.contains(target.as_str()) {
                        continue;
                    }
                    let toward = live
                        .get(el.source.as_str())
                        .copied()
                        .unwrap_or(el.target_diagonal().source);
                    self.scene.exit_path(&key, toward, timing);
                }
                PathKey::AdHoc(_) => {
                    if el.phase == Phase::Exiting {
                        continue;
                    }
                    let (Some(&s), Some(&t)) =
                        (live.get(el.source.as_str()), live.get(el.target.as_str()))
                    else {
                        continue;
                    };
                    let (source, target) = (el.source.clone(), el.target.clone());
                    self.scene.update_path(
                        key.clone(),
                        &source,
                        &target,
                        Diagonal::collapsed(s),
                        Diagonal::new(s, t),
                        timing,
                    );
                }
            }
        }

        for &id in &laid_out.order {
            let node = &mut self.tree[id];
            node.previous = node.position;
        }
        self.scene.prune();

        tracing::debug!(
            nodes = laid_out.order.len(),
            links = laid_out.links.len(),
            now = self.scene.now(),
            "rendered tree"
        );
        Ok(())
    }

    /// Draws an ad-hoc link from `source` to `target`, growing out of the source.
    pub fn add_link(&mut self, source: &str, target: &str) -> Result<()> {
        let s = self.tree[self.tree.find_node(source)?].position;
        let t = self.tree[self.tree.find_node(target)?].position;
        let key = LinkKey::new(source, target);
        let path_key = PathKey::AdHoc(key.clone());
        if self
            .scene
            .path(&path_key)
            .is_some_and(|el| el.phase == Phase::Live)
        {
            return Err(Error::DuplicateLink { key });
        }

        tracing::debug!(link = %key, source, target, "adding ad-hoc link");
        self.scene.update_path(
            path_key,
            source,
            target,
            Diagonal::collapsed(s),
            Diagonal::new(s, t),
            self.config.timing(),
        );
        Ok(())
    }

    /// Collapses the ad-hoc link between `source` and `target` onto `source`, then drops it.
    pub fn remove_link(&mut self, source: &str, target: &str) -> Result<()> {
        let key = LinkKey::new(source, target);
        let path_key = PathKey::AdHoc(key.clone());
        if !self
            .scene
            .path(&path_key)
            .is_some_and(|el| el.phase == Phase::Live)
        {
            return Err(Error::LinkNotFound { key });
        }
        let s = self.tree[self.tree.find_node(source)?].position;

        tracing::debug!(link = %key, "removing ad-hoc link");
        self.scene.exit_path(&path_key, s, self.config.timing());
        Ok(())
    }

    /// Keys of the ad-hoc links currently drawn (exiting ones excluded).
    pub fn links(&self) -> Vec<LinkKey> {
        self.scene
            .paths()
            .filter_map(|(key, el)| match key {
                PathKey::AdHoc(link) if el.phase == Phase::Live => Some(link.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn advance(&mut self, ms: f64) {
        self.scene.advance(ms);
    }

    pub fn settle(&mut self) {
        self.scene.settle();
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot::capture(&self.scene)
    }

    pub fn to_svg(&self) -> String {
        self.to_svg_with(&SvgRenderOptions::default())
    }

    pub fn to_svg_with(&self, options: &SvgRenderOptions) -> String {
        render_scene_svg(&self.scene, &self.surface, &self.config, options)
    }

    /// Screen position of a node's group at the current instant.
    pub fn node_screen_position(&self, name: &str) -> Option<Point> {
        let now = self.scene.now();
        self.scene.node(name).map(|n| project(n.position_at(now)))
    }
}
