use arbor_render::{RenderConfig, SvgRenderOptions, TreeRenderer};

fn settled_renderer() -> TreeRenderer {
    let mut r = TreeRenderer::new(RenderConfig::default(), "root").unwrap();
    r.update().unwrap();
    r.add_item("alpha", Some("root")).unwrap();
    r.add_item("beta & co", Some("root")).unwrap();
    r.add_link("alpha", "beta & co").unwrap();
    r.settle();
    r
}

fn with_class<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    tag: &str,
    class: &str,
) -> Vec<roxmltree::Node<'a, 'input>> {
    doc.descendants()
        .filter(|n| n.has_tag_name(tag) && n.attribute("class") == Some(class))
        .collect()
}

#[test]
fn svg_is_well_formed_and_sized_to_the_viewport() {
    let svg = settled_renderer().to_svg();
    let doc = roxmltree::Document::parse(&svg).expect("well-formed svg");
    let root = doc.root_element();
    assert!(root.has_tag_name("svg"));
    assert_eq!(root.attribute("width"), Some("960"));
    assert_eq!(root.attribute("height"), Some("800"));

    let group = root
        .children()
        .find(|n| n.has_tag_name("g"))
        .expect("surface group");
    assert_eq!(group.attribute("transform"), Some("translate(120,20)"));
}

#[test]
fn svg_draws_one_group_per_node_and_one_path_per_link() {
    let svg = settled_renderer().to_svg();
    let doc = roxmltree::Document::parse(&svg).unwrap();

    let nodes = with_class(&doc, "g", "node");
    assert_eq!(nodes.len(), 3);
    let labels: Vec<&str> = nodes
        .iter()
        .filter_map(|g| g.children().find(|c| c.has_tag_name("text")))
        .filter_map(|t| t.text())
        .collect();
    assert_eq!(labels, vec!["ROOT", "ALPHA", "BETA & CO"]);

    assert_eq!(with_class(&doc, "path", "link").len(), 2);
    assert_eq!(with_class(&doc, "path", "link-alone").len(), 1);
}

#[test]
fn paths_are_emitted_before_node_groups() {
    let svg = settled_renderer().to_svg();
    let first_group = svg.find(r#"<g class="node""#).unwrap();
    let last_path = svg.rfind("<path").unwrap();
    assert!(last_path < first_group);
}

#[test]
fn node_rect_carries_rounded_corners() {
    let svg = settled_renderer().to_svg();
    let doc = roxmltree::Document::parse(&svg).unwrap();
    let rect = doc
        .descendants()
        .find(|n| n.has_tag_name("rect"))
        .unwrap();
    assert_eq!(rect.attribute("rx"), Some("10"));
    assert_eq!(rect.attribute("ry"), Some("10"));
    assert_eq!(rect.attribute("height"), Some("50"));
    assert_eq!(rect.attribute("y"), Some("-25"));
}

#[test]
fn exiting_labels_fade_through_fill_opacity() {
    let mut r = settled_renderer();
    r.remove_item("alpha").unwrap();
    r.advance(375.0);
    let svg = r.to_svg();
    let doc = roxmltree::Document::parse(&svg).unwrap();
    let alpha = with_class(&doc, "g", "node")
        .into_iter()
        .find(|g| {
            g.children()
                .any(|c| c.has_tag_name("text") && c.text() == Some("ALPHA"))
        })
        .expect("alpha still exiting");
    let text = alpha.children().find(|c| c.has_tag_name("text")).unwrap();
    assert!(text.attribute("style").unwrap().contains("fill-opacity"));
}

#[test]
fn style_block_and_id_are_optional() {
    let r = settled_renderer();
    let bare = r.to_svg_with(&SvgRenderOptions {
        diagram_id: Some("demo".to_string()),
        embed_style: false,
    });
    assert!(!bare.contains("<style>"));
    let doc = roxmltree::Document::parse(&bare).unwrap();
    assert_eq!(doc.root_element().attribute("id"), Some("demo"));
    assert!(r.to_svg().contains("<style>"));
}
