use arbor_core::{LinkKey, Tree, TreeData};
use arbor_render::model::SceneSnapshot;
use arbor_render::{Error, RenderConfig, TreeRenderer};

const DURATION: f64 = 750.0;

fn renderer() -> TreeRenderer {
    let mut r = TreeRenderer::new(RenderConfig::default(), "root").expect("renderer");
    r.update().expect("first render");
    r.settle();
    r
}

fn snapshot_xy(snap: &SceneSnapshot, key: &str) -> (f64, f64) {
    let n = snap.node(key).unwrap_or_else(|| panic!("missing node {key}"));
    (n.x, n.y)
}

#[test]
fn init_sizes_the_surface_from_viewport_and_margins() {
    let r = TreeRenderer::new(RenderConfig::default(), "root").unwrap();
    assert_eq!(r.surface().width, 720.0);
    assert_eq!(r.surface().height, 760.0);
    assert_eq!(r.tree().root_node().previous.x, 380.0);
    assert!(r.snapshot().nodes.is_empty(), "nothing is drawn before update");
}

#[test]
fn root_is_drawn_in_the_middle_of_the_left_edge() {
    let r = renderer();
    let snap = r.snapshot();
    assert_eq!(snapshot_xy(&snap, "root"), (0.0, 380.0));
    let root = snap.node("root").unwrap();
    assert_eq!(root.label, "ROOT");
    // 4 chars * 20px * 0.6 + 2 * 10px padding
    assert_eq!(root.rect.width, 68.0);
    assert_eq!(root.rect.height, 50.0);
    assert_eq!(root.rect.x, -34.0);
    assert_eq!(root.rect.y, -25.0);
    assert_eq!(root.label_opacity, 1.0);
}

#[test]
fn add_item_requires_a_parent() {
    let mut r = renderer();
    let err = r.add_item("orphan", None).unwrap_err();
    assert!(matches!(err, Error::Tree(arbor_core::Error::ParentRequired)));
    let err = r.add_item("orphan", Some("")).unwrap_err();
    assert!(matches!(err, Error::Tree(arbor_core::Error::ParentRequired)));
    assert_eq!(r.tree().len(), 1);
}

#[test]
fn add_item_under_missing_parent_fails() {
    let mut r = renderer();
    let err = r.add_item("child", Some("ghost")).unwrap_err();
    assert!(matches!(
        err,
        Error::Tree(arbor_core::Error::NodeNotFound { ref name }) if name == "ghost"
    ));
}

#[test]
fn entering_node_grows_from_parent_previous_position() {
    let mut r = renderer();
    r.add_item("a", Some("root")).unwrap();

    let start = r.snapshot();
    assert_eq!(snapshot_xy(&start, "a"), (0.0, 380.0));
    let a = start.node("a").unwrap();
    assert_eq!(a.rect.width, 0.0);
    assert_eq!(a.label_opacity, 0.0);
    assert_eq!(
        start.path("link", "a").unwrap().d,
        "M0,380C0,380 0,380 0,380"
    );

    r.advance(DURATION / 2.0);
    let mid = r.snapshot();
    assert_eq!(snapshot_xy(&mid, "a"), (360.0, 380.0));

    r.settle();
    let end = r.snapshot();
    assert_eq!(snapshot_xy(&end, "a"), (720.0, 380.0));
    let a = end.node("a").unwrap();
    assert_eq!(a.rect.width, 32.0);
    assert_eq!(a.label_opacity, 1.0);
    assert_eq!(
        end.path("link", "a").unwrap().d,
        "M0,380C360,380 360,380 720,380"
    );
    assert_eq!(r.tree().root_node().previous, r.tree().root_node().position);
}

#[test]
fn siblings_spread_and_existing_nodes_move() {
    let mut r = renderer();
    r.add_item("a", Some("root")).unwrap();
    r.settle();
    r.add_item("b", Some("root")).unwrap();

    let start = r.snapshot();
    assert_eq!(snapshot_xy(&start, "a"), (720.0, 380.0));
    assert_eq!(snapshot_xy(&start, "b"), (0.0, 380.0));

    r.settle();
    let end = r.snapshot();
    assert_eq!(snapshot_xy(&end, "a"), (720.0, 190.0));
    assert_eq!(snapshot_xy(&end, "b"), (720.0, 570.0));
    assert_eq!(snapshot_xy(&end, "root"), (0.0, 380.0));
}

#[test]
fn removed_node_collapses_into_parent_then_disappears() {
    let mut r = renderer();
    r.add_item("a", Some("root")).unwrap();
    r.add_item("b", Some("root")).unwrap();
    r.settle();

    r.remove_item("a").unwrap();
    assert_eq!(r.tree().len(), 2);

    let start = r.snapshot();
    let a = start.node("a").expect("still drawn while exiting");
    assert!(a.exiting);
    assert!(start.path("link", "a").unwrap().exiting);

    r.advance(DURATION - 1.0);
    assert!(r.snapshot().node("a").is_some());

    r.advance(1.0);
    let end = r.snapshot();
    assert!(end.node("a").is_none());
    assert!(end.path("link", "a").is_none());
    assert_eq!(snapshot_xy(&end, "b"), (720.0, 380.0));
}

#[test]
fn exiting_node_heads_for_the_parent_new_position() {
    let mut r = renderer();
    r.add_item("a", Some("root")).unwrap();
    r.add_item("a1", Some("a")).unwrap();
    r.add_item("b", Some("root")).unwrap();
    r.settle();

    r.remove_item("a1").unwrap();
    r.advance(DURATION - 1e-9);
    let snap = r.snapshot();
    let parent = snap.node("a").unwrap();
    let child = snap.node("a1").unwrap();
    assert!((child.x - parent.x).abs() < 1e-3);
    assert!((child.y - parent.y).abs() < 1e-3);
    assert!(child.label_fill_opacity < 1e-3);
}

#[test]
fn removing_a_subtree_removes_every_descendant() {
    let mut r = renderer();
    r.add_item("a", Some("root")).unwrap();
    r.add_item("a1", Some("a")).unwrap();
    r.add_item("a2", Some("a")).unwrap();
    r.settle();

    r.remove_item("a").unwrap();
    assert_eq!(r.tree().len(), 1);
    r.settle();
    let snap = r.snapshot();
    assert_eq!(snap.nodes.len(), 1);
    assert!(snap.paths.is_empty());
}

#[test]
fn removing_unknown_or_root_nodes_fails() {
    let mut r = renderer();
    assert!(matches!(
        r.remove_item("never-added"),
        Err(Error::Tree(arbor_core::Error::NodeNotFound { .. }))
    ));
    assert!(matches!(
        r.remove_item("root"),
        Err(Error::Tree(arbor_core::Error::CannotRemoveRoot { .. }))
    ));
}

#[test]
fn ad_hoc_links_grow_from_the_source() {
    let mut r = renderer();
    r.add_item("a", Some("root")).unwrap();
    r.add_item("b", Some("root")).unwrap();
    r.settle();

    r.add_link("a", "b").unwrap();
    let key = LinkKey::new("a", "b");
    assert_eq!(r.links(), vec![key.clone()]);

    let start = r.snapshot();
    let path = start.path("link-alone", "a~b").unwrap();
    assert_eq!(path.d, "M720,190C720,190 720,190 720,190");

    r.settle();
    let end = r.snapshot();
    let path = end.path("link-alone", "a~b").unwrap();
    assert_eq!(path.d, "M720,190C720,190 720,570 720,570");
}

#[test]
fn ad_hoc_link_keys_are_unordered() {
    let mut r = renderer();
    r.add_item("a", Some("root")).unwrap();
    r.add_item("b", Some("root")).unwrap();
    r.add_link("a", "b").unwrap();

    assert!(matches!(
        r.add_link("b", "a"),
        Err(Error::DuplicateLink { .. })
    ));

    r.remove_link("b", "a").unwrap();
    assert!(r.links().is_empty());
    r.settle();
    assert!(r.snapshot().path("link-alone", "a~b").is_none());
}

#[test]
fn removing_a_missing_link_fails() {
    let mut r = renderer();
    r.add_item("a", Some("root")).unwrap();
    let err = r.remove_link("root", "a").unwrap_err();
    assert!(matches!(err, Error::LinkNotFound { ref key } if *key == LinkKey::new("a", "root")));

    r.add_link("root", "a").unwrap();
    r.remove_link("root", "a").unwrap();
    assert!(matches!(
        r.remove_link("root", "a"),
        Err(Error::LinkNotFound { .. })
    ));
}

#[test]
fn ad_hoc_links_need_existing_endpoints() {
    let mut r = renderer();
    assert!(matches!(
        r.add_link("root", "ghost"),
        Err(Error::Tree(arbor_core::Error::NodeNotFound { .. }))
    ));
}

#[test]
fn ad_hoc_links_follow_their_endpoints_on_update() {
    let mut r = renderer();
    r.add_item("a", Some("root")).unwrap();
    r.settle();
    r.add_link("root", "a").unwrap();
    r.settle();

    r.add_item("b", Some("root")).unwrap();
    r.settle();
    let path = r.snapshot();
    let path = path.path("link-alone", "a~root").unwrap();
    assert_eq!(path.d, "M0,380C360,380 360,190 720,190");
}

#[test]
fn removing_an_endpoint_retracts_its_ad_hoc_links() {
    let mut r = renderer();
    r.add_item("a", Some("root")).unwrap();
    r.add_item("b", Some("root")).unwrap();
    r.add_link("a", "b").unwrap();
    r.settle();

    r.remove_item("b").unwrap();
    assert!(r.links().is_empty());
    assert!(matches!(
        r.remove_link("a", "b"),
        Err(Error::LinkNotFound { .. })
    ));
    r.settle();
    assert!(r.snapshot().path("link-alone", "a~b").is_none());
}

#[test]
fn re_adding_an_exiting_node_reuses_its_element() {
    let mut r = renderer();
    r.add_item("a", Some("root")).unwrap();
    r.settle();
    r.remove_item("a").unwrap();
    r.advance(DURATION / 2.0);
    r.add_item("a", Some("root")).unwrap();

    let snap = r.snapshot();
    assert!(!snap.node("a").unwrap().exiting);
    r.settle();
    let snap = r.snapshot();
    assert_eq!(snapshot_xy(&snap, "a"), (720.0, 380.0));
    assert_eq!(snap.node("a").unwrap().label_fill_opacity, 1.0);
}

#[test]
fn init_accepts_a_seeded_tree() {
    let data = TreeData::with_children(
        "top",
        vec![TreeData::leaf("left"), TreeData::leaf("right")],
    );
    let tree = Tree::from_data(&data).unwrap();
    let mut r = TreeRenderer::init(RenderConfig::default(), tree).unwrap();
    r.update().unwrap();
    r.settle();
    let snap = r.snapshot();
    assert_eq!(snap.nodes.len(), 3);
    assert_eq!(snap.paths.len(), 2);
    assert_eq!(snapshot_xy(&snap, "left"), (720.0, 190.0));
}

#[test]
fn zero_duration_applies_changes_immediately() {
    let config = RenderConfig {
        duration_ms: 0.0,
        ..Default::default()
    };
    let mut r = TreeRenderer::new(config, "root").unwrap();
    r.update().unwrap();
    r.add_item("a", Some("root")).unwrap();
    assert_eq!(snapshot_xy(&r.snapshot(), "a"), (720.0, 380.0));
    r.remove_item("a").unwrap();
    assert!(r.snapshot().node("a").is_none());
}
