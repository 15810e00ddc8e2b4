mod script;

use arbor_core::{Tree, TreeData};
use arbor_render::{RenderConfig, SvgRenderOptions, TreeRenderer};
use script::{ScriptError, parse_script};
use serde::Serialize;
use std::io::Read;
use std::str::FromStr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Tree(arbor_core::Error),
    Render(arbor_render::Error),
    Json(serde_json::Error),
    Script(ScriptError),
    Step {
        line: usize,
        source: arbor_render::Error,
    },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Tree(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Script(err) => write!(f, "{err}"),
            CliError::Step { line, source } => write!(f, "script line {line}: {source}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<arbor_core::Error> for CliError {
    fn from(value: arbor_core::Error) -> Self {
        Self::Tree(value)
    }
}

impl From<arbor_render::Error> for CliError {
    fn from(value: arbor_render::Error) -> Self {
        Self::Render(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<ScriptError> for CliError {
    fn from(value: ScriptError) -> Self {
        Self::Script(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Render,
    Layout,
}

#[derive(Debug, Clone, Copy, Default)]
enum RenderFormat {
    #[default]
    Svg,
    Json,
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    config: Option<String>,
    tree: Option<String>,
    root: Option<String>,
    at: Option<f64>,
    format: RenderFormat,
    no_style: bool,
    diagram_id: Option<String>,
    pretty: bool,
    out: Option<String>,
    verbosity: u8,
}

#[derive(Serialize)]
struct LayoutNodeOut<'a> {
    name: &'a str,
    parent: Option<&'a str>,
    depth: usize,
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct LayoutOut<'a> {
    width: f64,
    height: f64,
    nodes: Vec<LayoutNodeOut<'a>>,
    links: Vec<String>,
}

fn usage() -> &'static str {
    "arbor-cli\n\
\n\
USAGE:\n\
  arbor-cli [render] [--format svg|json] [--at <ms>] [--no-style] [--id <diagram-id>] [--out <path>] [OPTIONS] [<script>|-]\n\
  arbor-cli layout [--pretty] [--out <path>] [OPTIONS] [<script>|-]\n\
\n\
OPTIONS:\n\
  --config <path>   render config JSON (viewportWidth, margin, durationMs, ...)\n\
  --tree <path>     initial tree JSON ({\"name\": ..., \"children\": [...]})\n\
  --root <name>     root name when no --tree is given (default: root)\n\
  -v, -vv, -vvv     log to stderr at info/debug/trace (default: RUST_LOG or warn)\n\
\n\
NOTES:\n\
  - If <script> is omitted or '-', the script is read from stdin.\n\
  - Script lines: add <name> <parent> | remove <name> | link <a> <b> | unlink <a> <b> | update | wait <ms>\n\
  - render settles every transition unless --at samples the scene <ms> after the last step.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" => args.command = Command::Render,
            "layout" => args.command = Command::Layout,
            "--pretty" => args.pretty = true,
            "--no-style" => args.no_style = true,
            "-v" => args.verbosity = args.verbosity.max(1),
            "-vv" => args.verbosity = args.verbosity.max(2),
            "-vvv" => args.verbosity = 3,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--tree" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.tree = Some(path.clone());
            }
            "--root" => {
                let Some(name) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                if name.trim().is_empty() {
                    return Err(CliError::Usage(usage()));
                }
                args.root = Some(name.clone());
            }
            "--at" => {
                let Some(ms) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let ms = ms.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
                if !(ms.is_finite() && ms >= 0.0) {
                    return Err(CliError::Usage(usage()));
                }
                args.at = Some(ms);
            }
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.format = fmt
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--id" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.diagram_id = Some(id.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn setup_logging(verbosity: u8) {
    // Without -v flags, RUST_LOG still applies.
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter);
    tracing_subscriber::registry().with(fmt_layer).init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn to_json(value: &impl Serialize, pretty: bool) -> Result<String, CliError> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

fn build_renderer(args: &Args) -> Result<TreeRenderer, CliError> {
    let config = match args.config.as_deref() {
        Some(path) => RenderConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => RenderConfig::default(),
    };
    let tree = match args.tree.as_deref() {
        Some(path) => Tree::from_data(&TreeData::from_json(&std::fs::read_to_string(path)?)?)?,
        None => Tree::new(args.root.as_deref().unwrap_or("root")),
    };
    tracing::info!(nodes = tree.len(), "loaded tree");
    Ok(TreeRenderer::init(config, tree)?)
}

fn run(args: Args) -> Result<(), CliError> {
    let script = read_input(args.input.as_deref())?;
    let steps = parse_script(&script)?;

    let mut renderer = build_renderer(&args)?;
    renderer.update()?;
    for step in &steps {
        script::apply(&mut renderer, &step.op).map_err(|source| CliError::Step {
            line: step.line,
            source,
        })?;
    }
    tracing::info!(steps = steps.len(), "replayed script");

    match args.command {
        Command::Layout => {
            renderer.settle();
            let tree = renderer.tree();
            let nodes = tree
                .pre_order()
                .into_iter()
                .map(|id| {
                    let node = &tree[id];
                    LayoutNodeOut {
                        name: &node.name,
                        parent: node.parent.map(|p| tree[p].name.as_str()),
                        depth: node.depth,
                        x: node.position.x,
                        y: node.position.y,
                    }
                })
                .collect();
            let out = LayoutOut {
                width: renderer.surface().width,
                height: renderer.surface().height,
                nodes,
                links: renderer.links().iter().map(ToString::to_string).collect(),
            };
            let text = to_json(&out, args.pretty)?;
            write_text(&text, args.out.as_deref())
        }
        Command::Render => {
            match args.at {
                Some(ms) => renderer.advance(ms),
                None => renderer.settle(),
            }
            let text = match args.format {
                RenderFormat::Svg => renderer.to_svg_with(&SvgRenderOptions {
                    diagram_id: args.diagram_id.clone(),
                    embed_style: !args.no_style,
                }),
                RenderFormat::Json => to_json(&renderer.snapshot(), args.pretty)?,
            };
            write_text(&text, args.out.as_deref())
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    setup_logging(args.verbosity);

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
