use std::path::Path;

use family_tree_renderer::layout::{ConnectorKind, LevelGroup, StrokeStyle};
use family_tree_renderer::render::render_svg;
use family_tree_renderer::{
    BuiltRoster, FamilyStore, Layout, LayoutConfig, PersonAttributes, PersonId, RelationKind, Theme,
    compute_layout, parse_roster,
};

fn layout(store: &FamilyStore) -> Layout {
    compute_layout(store, &Theme::classic(), &LayoutConfig::default()).expect("layout failed")
}

fn load_fixture(name: &str) -> BuiltRoster {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    parse_roster(&input)
        .expect("parse failed")
        .build()
        .expect("build failed")
}

fn add(store: &mut FamilyStore, name: &str, anchor: PersonId, relation: RelationKind) -> PersonId {
    store.add_relative(PersonAttributes::named(name), anchor, relation, None)
}

/// Checks the structural properties every store and its layout must hold.
fn assert_tree_properties(store: &FamilyStore, layout: &Layout, label: &str) {
    let config = LayoutConfig::default();
    for person in store.people() {
        let level = layout.level_of(person.id).expect("every person is placed");
        let resolved: Vec<PersonId> = person
            .parents()
            .iter()
            .copied()
            .filter(|parent| store.contains(*parent))
            .collect();
        if resolved.is_empty() {
            assert_eq!(level, 0, "{label}: {} has no parents but sits on level {level}", person.id);
        }
        for parent in resolved {
            let parent_level = layout.level_of(parent).unwrap_or_default();
            assert!(level > parent_level, "{label}: {} is not below parent {parent}", person.id);
        }
        for spouse in person.spouses() {
            let other = store.get(*spouse).expect("spouse exists");
            assert!(other.is_spouse_of(person.id), "{label}: one-sided spouse edge");
        }
        for child in person.children() {
            assert!(store.get(*child).is_some_and(|c| c.parents().contains(&person.id)));
        }
    }

    for conn in &layout.connectors {
        let child = &layout.nodes[&conn.child];
        let end = *conn.points.last().expect("connector has points");
        assert_eq!(end, (child.center_x(), child.y), "{label}: connector misses child top");
        assert_eq!(conn.points.len(), 4, "{label}: connectors are elbows");
        let (start, bend, across) = (conn.points[0], conn.points[1], conn.points[2]);
        assert_eq!(bend.0, start.0);
        assert_eq!(bend.1, (start.1 + end.1) / 2.0);
        assert_eq!(across.1, bend.1);
        assert_eq!(conn.stroke, StrokeStyle::Solid);
    }

    for link in &layout.spouse_links {
        assert_eq!(link.stroke, StrokeStyle::Dashed);
        let (na, nb) = (&layout.nodes[&link.a], &layout.nodes[&link.b]);
        let (left, right) = if nb.center_x() < na.center_x() { (nb, na) } else { (na, nb) };
        if left.right() <= right.x {
            assert_eq!(
                (link.start.0, link.end.0),
                (left.right(), right.x),
                "{label}: spouse link misses the facing edges"
            );
        } else {
            assert_ne!(na.level, nb.level, "{label}: overlapping cards on one level");
            let (upper, lower) = if na.y <= nb.y { (na, nb) } else { (nb, na) };
            assert_eq!(link.start, (upper.center_x(), upper.bottom()), "{label}: spouse link start");
            assert_eq!(link.end, (lower.center_x(), lower.y), "{label}: spouse link end");
        }
    }

    assert!(layout.width >= config.min_width);
    assert!(layout.height >= config.min_height);
    for node in layout.nodes.values() {
        assert!(node.x >= config.padding - 0.01, "{label}: node left of padding");
        assert!(node.right() <= layout.width - config.padding + 0.01, "{label}: node past right edge");
        assert_eq!(node.y, config.padding + node.level as f32 * (config.node_height + config.level_gap_y));
    }
}

#[test]
fn scenario_lone_root() {
    let mut store = FamilyStore::new();
    let a = store.add_root(PersonAttributes::named("A"));
    let layout = layout(&store);
    assert_eq!(layout.level_of(a), Some(0));
    let node = &layout.nodes[&a];
    assert_eq!((node.x, node.y), (40.0, 40.0));
    assert_tree_properties(&store, &layout, "lone root");
}

#[test]
fn scenario_parent_and_son() {
    let mut store = FamilyStore::new();
    let a = store.add_root(PersonAttributes::named("A"));
    let b = add(&mut store, "B", a, RelationKind::SonOf);
    let layout = layout(&store);
    assert_eq!(layout.level_of(a), Some(0));
    assert_eq!(layout.level_of(b), Some(1));
    let connectors: Vec<_> = layout.connectors_to(b).collect();
    assert_eq!(connectors.len(), 1);
    assert_eq!(connectors[0].kind, ConnectorKind::Single);
    assert_eq!(connectors[0].parents, vec![a]);
    let parent = &layout.nodes[&a];
    assert_eq!(connectors[0].points[0], (parent.center_x(), parent.bottom()));
    assert_tree_properties(&store, &layout, "parent and son");
}

#[test]
fn scenario_couple_shares_trunk() {
    let mut store = FamilyStore::new();
    let a = store.add_root(PersonAttributes::named("A"));
    let b = add(&mut store, "B", a, RelationKind::SpouseOf);
    let c = add(&mut store, "C", a, RelationKind::SonOf);
    let parents: Vec<PersonId> = store.get(c).expect("c").parents().iter().copied().collect();
    assert_eq!(parents, vec![a, b], "son of one spouse belongs to the couple");

    let layout = layout(&store);
    assert_eq!(layout.level_of(a), Some(0));
    assert_eq!(layout.level_of(b), Some(0));
    assert_eq!(layout.level_of(c), Some(1));
    assert_eq!(layout.levels[0], vec![LevelGroup::Pair { left: a, right: b }]);

    let (na, nb) = (&layout.nodes[&a], &layout.nodes[&b]);
    assert_eq!(nb.x - na.right(), LayoutConfig::default().spouse_gap);

    let connectors: Vec<_> = layout.connectors_to(c).collect();
    assert_eq!(connectors.len(), 1);
    assert_eq!(connectors[0].kind, ConnectorKind::Trunk);
    let midpoint = (na.center_x() + nb.center_x()) / 2.0;
    assert_eq!(connectors[0].points[0], (midpoint, na.bottom()));
    assert_eq!(layout.spouse_links.len(), 1);
    assert_tree_properties(&store, &layout, "couple");
}

#[test]
fn scenario_brother_of_parentless_anchor() {
    let mut store = FamilyStore::new();
    let a = store.add_root(PersonAttributes::named("A"));
    let b = add(&mut store, "B", a, RelationKind::BrotherOf);
    assert!(store.get(b).expect("b").parents().is_empty());
    let layout = layout(&store);
    assert_eq!(layout.level_of(b), Some(0));
    assert_eq!(layout.levels[0].len(), 2);
    assert!(layout.connectors.is_empty());
}

#[test]
fn scenario_sole_parent_deleted() {
    let mut store = FamilyStore::new();
    let p = store.add_root(PersonAttributes::named("P"));
    let other = store.add_root(PersonAttributes::named("Q"));
    let x = add(&mut store, "X", p, RelationKind::SonOf);
    let y = add(&mut store, "Y", p, RelationKind::DaughterOf);
    store.link_parent_child(other, y).expect("link");

    store.delete(p);
    for child in [x, y] {
        assert!(!store.get(child).expect("child").parents().contains(&p));
    }
    let layout = layout(&store);
    assert_eq!(layout.level_of(x), Some(0));
    assert_eq!(layout.level_of(y), Some(1), "Y keeps its other parent");
    assert_tree_properties(&store, &layout, "after delete");
}

#[test]
fn three_parents_with_a_couple_get_one_connector_each() {
    let mut store = FamilyStore::new();
    let a = store.add_root(PersonAttributes::named("A"));
    let b = add(&mut store, "B", a, RelationKind::SpouseOf);
    let d = store.add_root(PersonAttributes::named("D"));
    let c = store.add_root(PersonAttributes::named("C"));
    for parent in [a, b, d] {
        store.link_parent_child(parent, c).expect("link");
    }

    let layout = layout(&store);
    assert_eq!(layout.level_of(c), Some(1));
    let connectors: Vec<_> = layout.connectors_to(c).collect();
    assert_eq!(connectors.len(), 3);
    assert!(connectors.iter().all(|conn| conn.kind == ConnectorKind::Single));
    let child = &layout.nodes[&c];
    for (conn, parent) in connectors.iter().zip([a, b, d]) {
        assert_eq!(conn.parents, vec![parent]);
        let node = &layout.nodes[&parent];
        assert_eq!(conn.points[0], (node.center_x(), node.bottom()));
        assert_eq!(conn.points[3], (child.center_x(), child.y));
    }
    assert_tree_properties(&store, &layout, "three parents");
}

#[test]
fn spouse_one_level_up_is_joined_vertically() {
    let mut store = FamilyStore::new();
    let a = store.add_root(PersonAttributes::named("A"));
    let c = add(&mut store, "C", a, RelationKind::SonOf);
    // D has no parents, so D sits on level 0 above spouse C.
    let d = add(&mut store, "D", c, RelationKind::SpouseOf);

    let layout = layout(&store);
    assert_eq!(layout.level_of(d), Some(0));
    assert_eq!(layout.level_of(c), Some(1));

    let (nc, nd) = (&layout.nodes[&c], &layout.nodes[&d]);
    assert!(nc.right() > nd.x && nd.right() > nc.x, "cards share a column");
    assert_eq!(layout.spouse_links.len(), 1);
    let link = &layout.spouse_links[0];
    assert_eq!(link.start, (nd.center_x(), nd.bottom()));
    assert_eq!(link.end, (nc.center_x(), nc.y));
    assert_tree_properties(&store, &layout, "spouse one level up");
}

#[test]
fn sole_parent_removed_fixture() {
    let built = load_fixture("sole_parent_removed.json5");
    assert_eq!(built.store.len(), 2);
    let layout = layout(&built.store);
    assert_eq!(layout.levels.len(), 1);
    for key in ["kim", "lee"] {
        let id = built.id(key).expect("key");
        assert!(built.store.get(id).expect("person").parents().is_empty());
        assert_eq!(layout.level_of(id), Some(0));
    }
}

#[test]
fn three_generations_fixture() {
    let built = load_fixture("three_generations.json5");
    let store = &built.store;
    let id = |key: &str| built.id(key).expect("key");
    let layout = layout(store);
    assert_tree_properties(store, &layout, "three generations");

    // Meera's Daughter-of also made her Arun's child, so Dev inherits both parents.
    let dev = store.get(id("dev")).expect("dev");
    assert_eq!(
        dev.parents().iter().copied().collect::<Vec<_>>(),
        vec![id("lila"), id("arun")]
    );

    // Tara hangs off her sibling-parent Meera, not off Dev.
    let tara = store.get(id("tara")).expect("tara");
    assert!(tara.parents().contains(&id("meera")));
    assert!(!tara.parents().contains(&id("dev")));

    assert_eq!(layout.level_of(id("jay")), Some(0));
    assert_eq!(layout.level_of(id("meera")), Some(1));
    assert_eq!(layout.level_of(id("kavi")), Some(2));
    assert_eq!(layout.levels[0][0], LevelGroup::Pair { left: id("lila"), right: id("arun") });

    // Meera and Jay are spouses on different levels: the trunk starts below the lower card.
    let trunk: Vec<_> = layout.connectors_to(id("kavi")).collect();
    assert_eq!(trunk.len(), 1);
    assert_eq!(trunk[0].kind, ConnectorKind::Trunk);
    assert_eq!(trunk[0].points[0].1, layout.nodes[&id("meera")].bottom());

    assert!(layout.nodes[&id("kavi")].selected);
    assert_eq!(layout.nodes.values().filter(|node| node.selected).count(), 1);
}

#[test]
fn blended_family_fixture() {
    let built = load_fixture("blended_family.json5");
    let store = &built.store;
    let id = |key: &str| built.id(key).expect("key");
    let layout = layout(store);
    assert_tree_properties(store, &layout, "blended family");

    assert_eq!(layout.level_of(id("max")), Some(0));
    assert_eq!(layout.level_of(id("sam")), Some(1));
    assert_eq!(layout.level_of(id("leo")), Some(2));

    let leo: Vec<_> = layout.connectors_to(id("leo")).collect();
    assert_eq!(leo.len(), 2, "Sam and Ana are not spouses");
    assert!(leo.iter().all(|conn| conn.kind == ConnectorKind::Single));

    let ivy: Vec<_> = layout.connectors_to(id("ivy")).collect();
    assert_eq!(ivy.len(), 1);
    assert_eq!(ivy[0].kind, ConnectorKind::Trunk);

    // Rosa sits directly above spouse Sam, so the link drops straight down.
    let (rosa, sam) = (&layout.nodes[&id("rosa")], &layout.nodes[&id("sam")]);
    assert_eq!(layout.spouse_links.len(), 1);
    assert_eq!(layout.spouse_links[0].start, (rosa.center_x(), rosa.bottom()));
    assert_eq!(layout.spouse_links[0].end, (sam.center_x(), sam.y));
}

#[test]
fn linking_twice_is_idempotent() {
    let mut store = FamilyStore::new();
    let a = store.add_root(PersonAttributes::named("A"));
    let b = store.add_root(PersonAttributes::named("B"));
    assert!(store.link_parent_child(a, b).expect("first link"));
    let once = store.clone();
    assert!(!store.link_parent_child(a, b).expect("second link"));
    assert_eq!(layout(&once), layout(&store));
    assert_eq!(store.get(b).expect("b").parents().len(), 1);
}

#[test]
fn delete_strips_every_reference() {
    let built = load_fixture("three_generations.json5");
    let mut store = built.store.clone();
    let meera = built.id("meera").expect("meera");
    store.delete(meera);
    assert!(!store.contains(meera));
    for person in store.people() {
        assert!(!person.parents().contains(&meera));
        assert!(!person.children().contains(&meera));
        assert!(!person.spouses().contains(&meera));
    }
    let layout = layout(&store);
    assert_tree_properties(&store, &layout, "after deleting meera");
}

#[test]
fn layouts_and_svg_are_deterministic() {
    for name in ["three_generations.json5", "blended_family.json5"] {
        let first = load_fixture(name);
        let second = load_fixture(name);
        let (l1, l2) = (layout(&first.store), layout(&second.store));
        assert_eq!(l1, l2, "{name}: layout differs between runs");

        let theme = Theme::classic();
        let config = LayoutConfig::default();
        let svg1 = render_svg(&l1, &first.store, &theme, &config);
        let svg2 = render_svg(&l2, &second.store, &theme, &config);
        assert_eq!(svg1, svg2);
        assert!(svg1.contains("</svg>"));
    }
}
