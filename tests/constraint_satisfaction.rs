//! Integration tests verifying that resolved geometry satisfies the
//! declared constraints and the resolver's guarantees: caching,
//! containment, equal splits around declared relations, bounded retries and
//! lenient references.

use pretty_assertions::assert_eq;

use chocolate::layout::{
    Attribute, Constraint, Geometry, Guide, Layout, LayoutConfig, Panel, Relation, Strength, Text,
    CONTAINER,
};
use chocolate::renderer::{CanvasConfig, Compositor, Overlay, OverlaySize};

fn geometry(layout: &Layout, name: &str) -> Geometry {
    layout
        .panel(name)
        .unwrap_or_else(|| panic!("panel '{}' not found", name))
        .geometry()
}

fn assert_contained(layout: &Layout) {
    let (width, height) = layout.size();
    for panel in layout.panels().values() {
        let g = panel.geometry();
        assert!(
            g.right() <= width && g.bottom() <= height,
            "{} at {:?} escapes {}x{}",
            panel.name(),
            g,
            width,
            height
        );
    }
}

/// Contained, no collapsed panels and no two panels sharing a cell
fn assert_tiled(layout: &Layout) {
    assert_contained(layout);
    let panels: Vec<&Panel> = layout.panels().values().collect();
    for (n, a) in panels.iter().enumerate() {
        assert!(!a.geometry().is_degenerate(), "{} collapsed", a.name());
        for b in &panels[n + 1..] {
            assert!(
                a.geometry().overlap(&b.geometry()).is_none(),
                "{} at {:?} overlaps {} at {:?}",
                a.name(),
                a.geometry(),
                b.name(),
                b.geometry()
            );
        }
    }
}

#[test]
fn test_resolve_twice_is_idempotent() {
    let mut layout = Layout::default();
    layout.add_panel(Panel::new("menu", Text::new("File\nEdit")));
    layout.add_panel(Panel::new("main", Guide));
    layout
        .add_rules("main.xstart = menu.xend @strong\nmain.xend = super.xend @strong")
        .unwrap();
    layout.resize(40, 10);

    let first: Vec<Geometry> = layout.resolve().unwrap().values().map(Panel::geometry).collect();
    let solves = layout.solve_count();
    let second: Vec<Geometry> = layout.resolve().unwrap().values().map(Panel::geometry).collect();

    assert_eq!(first, second);
    assert_eq!(layout.solve_count(), solves, "cached resolve must not solve again");
}

#[test]
fn test_every_panel_stays_inside_the_container() {
    let mut layout = Layout::default();
    layout.add_panel(Panel::new("header", Text::new("Title")));
    layout.add_panel(Panel::new("body", Guide));
    layout.add_panel(Panel::new("footer", Text::new("status")));
    layout
        .add_rules(
            "header.height = 1 @strong
             body.ystart = header.yend @strong
             footer.ystart = body.yend @strong
             footer.height = 1 @strong
             footer.yend = super.yend @strong
             body.xstart = 2
             body.width = 500",
        )
        .unwrap();

    for (width, height) in [(80, 24), (10, 5), (7, 3), (200, 60)] {
        layout.resize(width, height);
        layout.resolve().unwrap();
        assert_contained(&layout);
    }
}

#[test]
fn test_unrelated_panels_split_evenly() {
    let mut layout = Layout::default();
    layout.add_panel(Panel::new("a", Guide));
    layout.add_panel(Panel::new("b", Guide));
    layout.resize(100, 10);
    layout.resolve().unwrap();

    assert_eq!(geometry(&layout, "a"), Geometry::new(0, 0, 50, 10));
    assert_eq!(geometry(&layout, "b"), Geometry::new(50, 0, 50, 10));
}

#[test]
fn test_unrelated_panels_stack_in_a_tall_container() {
    let mut layout = Layout::default();
    layout.add_panel(Panel::new("top", Guide));
    layout.add_panel(Panel::new("bottom", Guide));
    layout.add_rules("top.width = super.width\nbottom.height <= 3 @strong").unwrap();
    layout.resize(10, 40);
    layout.resolve().unwrap();

    // a wide but shallow collision splits along y
    let top = geometry(&layout, "top");
    let bottom = geometry(&layout, "bottom");
    assert!(top.overlap(&bottom).is_none(), "{:?} overlaps {:?}", top, bottom);
    assert_contained(&layout);
}

#[test]
fn test_three_way_split_has_no_gaps() {
    let mut layout = Layout::default();
    for name in ["a", "b", "c"] {
        layout.add_panel(Panel::new(name, Guide));
    }
    layout.resize(90, 5);
    layout.resolve().unwrap();

    assert_eq!(geometry(&layout, "a"), Geometry::new(0, 0, 30, 5));
    assert_eq!(geometry(&layout, "b"), Geometry::new(30, 0, 30, 5));
    assert_eq!(geometry(&layout, "c"), Geometry::new(60, 0, 30, 5));
}

#[test]
fn test_conflicting_required_constraints_are_unresolvable() {
    let mut layout = Layout::new(LayoutConfig::default());
    layout.add_panel(Panel::new("main", Guide));
    layout.add_constraints([
        Constraint::new("main", Attribute::Width, Relation::Eq)
            .with_constant(10.0)
            .with_strength(Strength::Required),
        Constraint::new("main", Attribute::Width, Relation::Eq)
            .with_constant(20.0)
            .with_strength(Strength::Required),
    ]);
    layout.resize(40, 10);

    let err = layout.resolve().unwrap_err();
    assert!(err.is_unresolvable());
    assert!(err.to_string().contains("unresolvable"));
}

#[test]
fn test_panel_pinned_to_nothing_is_unresolvable() {
    let mut layout = Layout::new(LayoutConfig::new().with_max_retries(5));
    layout.add_panel(Panel::new("main", Guide));
    layout.add_rules("main.width = 0 @required").unwrap();
    layout.resize(40, 10);

    let err = layout.resolve().unwrap_err();
    assert!(err.is_unresolvable());
    // one rebuild with a floor, then no further attempt can differ
    assert_eq!(layout.solve_count(), 2);
}

#[test]
fn test_single_relation_splits_collapsed_pair() {
    for rules in [
        "main.xstart = menu.xend",
        "main.xstart = menu.xend @strong",
        "main.xstart = menu.xend\nmain.xend = super.xend",
    ] {
        let mut layout = Layout::default();
        layout.add_panel(Panel::new("menu", Guide));
        layout.add_panel(Panel::new("main", Guide));
        layout.add_rules(rules).unwrap();
        layout.resize(90, 10);
        layout.resolve().unwrap_or_else(|e| panic!("{rules:?}: {e}"));

        assert_eq!(geometry(&layout, "menu"), Geometry::new(0, 0, 45, 10), "{rules:?}");
        assert_eq!(geometry(&layout, "main"), Geometry::new(45, 0, 45, 10), "{rules:?}");
        assert_tiled(&layout);
    }
}

#[test]
fn test_relation_plus_unrelated_sibling() {
    let mut layout = Layout::default();
    for name in ["menu", "main", "side"] {
        layout.add_panel(Panel::new(name, Guide));
    }
    layout.add_rules("main.xstart = menu.xend").unwrap();
    layout.resize(90, 10);
    layout.resolve().unwrap();

    assert_eq!(geometry(&layout, "menu"), Geometry::new(0, 0, 30, 10));
    assert_eq!(geometry(&layout, "main"), Geometry::new(30, 0, 30, 10));
    assert_eq!(geometry(&layout, "side"), Geometry::new(60, 0, 30, 10));
    assert_tiled(&layout);
}

#[test]
fn test_grid_keeps_declared_heights() {
    let mut layout = Layout::default();
    for name in ["a", "b", "c", "d"] {
        layout.add_panel(Panel::new(name, Guide));
    }
    layout
        .add_rules(
            "a.height = super.height * 0.5 @strong
             b.height = super.height * 0.5 @strong
             c.ystart = a.yend @strong
             d.ystart = b.yend @strong",
        )
        .unwrap();
    layout.resize(40, 10);
    layout.resolve().unwrap();

    assert_eq!(geometry(&layout, "a"), Geometry::new(0, 0, 20, 5));
    assert_eq!(geometry(&layout, "b"), Geometry::new(20, 0, 20, 5));
    assert_eq!(geometry(&layout, "c"), Geometry::new(0, 5, 20, 5));
    assert_eq!(geometry(&layout, "d"), Geometry::new(20, 5, 20, 5));
    assert_tiled(&layout);
}

#[test]
fn test_dangling_references_are_skipped() {
    let mut layout = Layout::default();
    layout.add_panel(Panel::new("menu", Guide));
    layout.add_panel(Panel::new("main", Guide));
    layout.add_constraints([
        Constraint::new("ghost", Attribute::Width, Relation::Eq).with_constant(5.0),
        Constraint::new("main", Attribute::XStart, Relation::Eq)
            .with_source("phantom", Attribute::XEnd),
        Constraint::new("menu", Attribute::Width, Relation::Eq)
            .with_constant(30.0)
            .with_strength(Strength::Strong),
        Constraint::new("main", Attribute::XStart, Relation::Eq)
            .with_source("menu", Attribute::XEnd)
            .with_strength(Strength::Strong),
    ]);
    layout.resize(100, 10);
    layout.resolve().unwrap();

    assert_eq!(geometry(&layout, "menu"), Geometry::new(0, 0, 30, 10));
    assert_eq!(geometry(&layout, "main"), Geometry::new(30, 0, 70, 10));
}

#[test]
fn test_container_source_scales_with_size() {
    let mut layout = Layout::default();
    layout.add_panel(Panel::new("menu", Guide));
    layout.add_panel(Panel::new("main", Guide));
    layout.add_constraints([
        Constraint::new("menu", Attribute::Width, Relation::Eq)
            .with_source(CONTAINER, Attribute::Width)
            .with_multiplier(0.25)
            .with_strength(Strength::Strong),
        Constraint::new("main", Attribute::XStart, Relation::Eq)
            .with_source("menu", Attribute::XEnd)
            .with_strength(Strength::Strong),
    ]);

    layout.resize(80, 20);
    layout.resolve().unwrap();
    assert_eq!(geometry(&layout, "menu").width, 20);
    assert_eq!(geometry(&layout, "main"), Geometry::new(20, 0, 60, 20));

    layout.resize(40, 20);
    layout.resolve().unwrap();
    assert_eq!(geometry(&layout, "menu").width, 10);
    assert_eq!(geometry(&layout, "main"), Geometry::new(10, 0, 30, 20));
}

#[test]
fn test_overlay_centered_at_half_size() {
    let overlay = Overlay::new(Layout::default())
        .with_size(OverlaySize::Percent(50.0), OverlaySize::Percent(50.0));
    assert_eq!(overlay.rect(100, 20), Geometry::new(25, 5, 50, 10));
}

#[test]
fn test_selecting_content_recomputes_geometry() {
    let mut root = Layout::default();
    root.add_panel(Panel::new("side", Text::new("ab")).with_content("wide", Text::new("abcdef")));
    root.add_panel(Panel::new("main", Text::new("m")));
    root.add_rules("side.width = 0 @strong\nmain.xstart = side.xend @strong")
        .unwrap();
    let mut compositor = Compositor::new(root, CanvasConfig::new().with_blank('.'));

    let frame = compositor.render(20, 3);
    assert_eq!(frame.lines().next(), Some("abm................."));
    assert_eq!(geometry(compositor.root(), "main").x, 2);
    let solves = compositor.root().solve_count();

    compositor
        .root_mut()
        .panel_mut("side")
        .unwrap()
        .select("wide")
        .unwrap();
    assert!(compositor.root().is_dirty());

    let frame = compositor.render(20, 3);
    assert_eq!(frame.lines().next(), Some("abcdefm............."));
    assert_eq!(geometry(compositor.root(), "main").x, 6);
    assert!(compositor.root().solve_count() > solves);
}
