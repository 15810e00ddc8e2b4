//! Line-oriented edit scripts.
//!
//! ```text
//! # comments and blank lines are ignored
//! add child parent
//! remove child
//! link a b
//! unlink a b
//! update
//! wait 375
//! ```

use arbor_render::TreeRenderer;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add { name: String, parent: Option<String> },
    Remove { name: String },
    Link { source: String, target: String },
    Unlink { source: String, target: String },
    Update,
    Wait { ms: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub line: usize,
    pub op: Op,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "script line {}: {}", self.line, self.message)
    }
}

pub fn parse_script(text: &str) -> Result<Vec<Step>, ScriptError> {
    let mut steps = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let words: Vec<&str> = trimmed.split_whitespace().collect();
        let err = |message: &str| ScriptError {
            line,
            message: message.to_string(),
        };
        let op = match words.as_slice() {
            ["add", name] => Op::Add {
                name: name.to_string(),
                parent: None,
            },
            ["add", name, parent] => Op::Add {
                name: name.to_string(),
                parent: Some(parent.to_string()),
            },
            ["remove", name] => Op::Remove {
                name: name.to_string(),
            },
            ["link", source, target] => Op::Link {
                source: source.to_string(),
                target: target.to_string(),
            },
            ["unlink", source, target] => Op::Unlink {
                source: source.to_string(),
                target: target.to_string(),
            },
            ["update"] => Op::Update,
            ["wait", ms] => {
                let ms = ms
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .ok_or_else(|| err("wait expects a non-negative number of milliseconds"))?;
                Op::Wait { ms }
            }
            [cmd, ..] if matches!(*cmd, "add" | "remove" | "link" | "unlink" | "update" | "wait") => {
                return Err(err(&format!("wrong number of arguments for `{cmd}`")));
            }
            [cmd, ..] => return Err(err(&format!("unknown command `{cmd}`"))),
            [] => continue,
        };
        steps.push(Step { line, op });
    }
    Ok(steps)
}

pub fn apply(renderer: &mut TreeRenderer, op: &Op) -> arbor_render::Result<()> {
    tracing::debug!(?op, "applying script step");
    match op {
        Op::Add { name, parent } => renderer.add_item(name, parent.as_deref()),
        Op::Remove { name } => renderer.remove_item(name),
        Op::Link { source, target } => renderer.add_link(source, target),
        Op::Unlink { source, target } => renderer.remove_link(source, target),
        Op::Update => renderer.update(),
        Op::Wait { ms } => {
            renderer.advance(*ms);
            Ok(())
        }
    }
}
