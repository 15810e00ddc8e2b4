use crate::path::project;
use crate::scene::{PathKey, Phase, RectAttrs, Scene};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectSnapshot {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<RectAttrs> for RectSnapshot {
    fn from(r: RectAttrs) -> Self {
        Self {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
        }
    }
}

/// A node group as drawn: `x`/`y` are its screen translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub key: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub rect: RectSnapshot,
    pub label_opacity: f64,
    pub label_fill_opacity: f64,
    pub exiting: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSnapshot {
    pub class: String,
    pub key: String,
    pub source: String,
    pub target: String,
    pub d: String,
    pub exiting: bool,
}

/// Plain-data view of the scene at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub time: f64,
    pub nodes: Vec<NodeSnapshot>,
    pub paths: Vec<PathSnapshot>,
}

impl SceneSnapshot {
    pub fn capture(scene: &Scene) -> Self {
        let now = scene.now();
        let nodes = scene
            .nodes()
            .map(|(key, el)| {
                let at = project(el.position_at(now));
                NodeSnapshot {
                    key: key.to_string(),
                    label: el.label.clone(),
                    x: at.x,
                    y: at.y,
                    rect: el.rect_at(now).into(),
                    label_opacity: el.label_opacity_at(now),
                    label_fill_opacity: el.label_fill_opacity_at(now),
                    exiting: el.phase == Phase::Exiting,
                }
            })
            .collect();
        let paths = scene
            .paths()
            .map(|(key, el)| PathSnapshot {
                class: key.class().as_str().to_string(),
                key: match key {
                    PathKey::Tree(target) => target.clone(),
                    PathKey::AdHoc(link) => link.to_string(),
                },
                source: el.source.clone(),
                target: el.target.clone(),
                d: el.diagonal_at(now).to_path_d(),
                exiting: el.phase == Phase::Exiting,
            })
            .collect();
        Self {
            time: now,
            nodes,
            paths,
        }
    }

    pub fn node(&self, key: &str) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|n| n.key == key)
    }

    pub fn path(&self, class: &str, key: &str) -> Option<&PathSnapshot> {
        self.paths.iter().find(|p| p.class == class && p.key == key)
    }
}
