use crate::config::{RenderConfig, Surface};
use crate::path::{js_number, project};
use crate::scene::{Phase, Scene};

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Optional id for the root `<svg>` element.
    pub diagram_id: Option<String>,
    /// When true, embed a `<style>` block so the output is readable standalone.
    pub embed_style: bool,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            diagram_id: None,
            embed_style: true,
        }
    }
}

const DEFAULT_STYLE: &str = ".node rect{fill:#fff;stroke:steelblue;stroke-width:1.5px;}\
.node text{font-family:sans-serif;}\
.link{fill:none;stroke:#ccc;stroke-width:1.5px;}\
.link-alone{fill:none;stroke:#d62728;stroke-width:1.5px;stroke-dasharray:4,4;}";

/// Serializes the scene as it looks at the current scene time.
///
/// Paths come first so node groups paint over them; both keep their insertion order.
pub fn render_scene_svg(
    scene: &Scene,
    surface: &Surface,
    config: &RenderConfig,
    options: &SvgRenderOptions,
) -> String {
    let now = scene.now();
    let mut buf = ryu_js::Buffer::new();
    let mut out = String::with_capacity(1024);

    out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg""#);
    if let Some(id) = options.diagram_id.as_deref() {
        out.push_str(r#" id=""#);
        out.push_str(&escape_xml(id));
        out.push('"');
    }
    push_attr(&mut out, "width", surface.outer_width(), &mut buf);
    push_attr(&mut out, "height", surface.outer_height(), &mut buf);
    out.push('>');

    if options.embed_style {
        out.push_str("<style>");
        out.push_str(DEFAULT_STYLE);
        out.push_str("</style>");
    }

    out.push_str(r#"<g transform="translate("#);
    out.push_str(js_number(surface.margin.left, &mut buf));
    out.push(',');
    out.push_str(js_number(surface.margin.top, &mut buf));
    out.push_str(r#")">"#);

    for (key, el) in scene.paths() {
        out.push_str(r#"<path class=""#);
        out.push_str(key.class().as_str());
        out.push_str(r#"" d=""#);
        out.push_str(&el.diagonal_at(now).to_path_d());
        out.push_str(r#""/>"#);
    }

    let font_size = js_number(config.font_size, &mut buf).to_string();
    for (_, el) in scene.nodes() {
        let at = project(el.position_at(now));
        let rect = el.rect_at(now);

        out.push_str(r#"<g class="node" transform="translate("#);
        out.push_str(js_number(at.x, &mut buf));
        out.push(',');
        out.push_str(js_number(at.y, &mut buf));
        out.push_str(r#")">"#);

        out.push_str("<rect");
        push_attr(&mut out, "width", rect.width, &mut buf);
        push_attr(&mut out, "height", rect.height, &mut buf);
        push_attr(&mut out, "x", rect.x, &mut buf);
        push_attr(&mut out, "y", rect.y, &mut buf);
        push_attr(&mut out, "rx", config.radius, &mut buf);
        push_attr(&mut out, "ry", config.radius, &mut buf);
        out.push_str("/>");

        out.push_str(r#"<text text-anchor="middle" alignment-baseline="middle""#);
        push_attr(&mut out, "opacity", el.label_opacity_at(now), &mut buf);
        out.push_str(r#" style="font-size: "#);
        out.push_str(&font_size);
        out.push_str("px;");
        let fill_opacity = el.label_fill_opacity_at(now);
        if el.phase == Phase::Exiting || fill_opacity < 1.0 {
            out.push_str(" fill-opacity: ");
            out.push_str(js_number(fill_opacity, &mut buf));
            out.push(';');
        }
        out.push_str(r#"">"#);
        out.push_str(&escape_xml(&el.label));
        out.push_str("</text></g>");
    }

    out.push_str("</g></svg>");
    out
}

fn push_attr(out: &mut String, name: &str, value: f64, buf: &mut ryu_js::Buffer) {
    out.push(' ');
    out.push_str(name);
    out.push_str(r#"=""#);
    out.push_str(js_number(value, buf));
    out.push('"');
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_xml;

    #[test]
    fn escape_xml_covers_markup_characters() {
        assert_eq!(escape_xml("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
    }
}
