use crate::Result;
use serde::{Deserialize, Serialize};

/// Nested interchange form of a tree: `{"name": "...", "children": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeData>,
}

impl TreeData {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(name: impl Into<String>, children: Vec<TreeData>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Total number of nodes, this one included.
    pub fn count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(d) = stack.pop() {
            count += 1;
            stack.extend(d.children.iter());
        }
        count
    }
}
