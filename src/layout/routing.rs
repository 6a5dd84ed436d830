use std::collections::BTreeMap;

use crate::ir::PersonId;
use crate::store::FamilyStore;

use super::{ConnectorKind, ConnectorLayout, NodeLayout, SpouseLinkLayout, StrokeStyle};

/// Vertical, horizontal, vertical: down to the midpoint row, across, down into the child.
pub(super) fn elbow_points(start: (f32, f32), end: (f32, f32)) -> Vec<(f32, f32)> {
    let mid_y = (start.1 + end.1) / 2.0;
    vec![start, (start.0, mid_y), (end.0, mid_y), end]
}

/// Parent-to-child connectors, in child id order.
///
/// A child whose only two placed parents are each other's spouses gets one
/// trunk connector from the couple's midpoint. Every other child gets one
/// connector per placed parent, including the three-or-more parent case.
pub(super) fn route_connectors(
    nodes: &BTreeMap<PersonId, NodeLayout>,
    store: &FamilyStore,
) -> Vec<ConnectorLayout> {
    let mut connectors = Vec::new();
    for child in store.people() {
        let Some(child_node) = nodes.get(&child.id) else {
            continue;
        };
        let parents: Vec<&NodeLayout> = child
            .parents()
            .iter()
            .filter_map(|parent| nodes.get(parent))
            .collect();
        let end = (child_node.center_x(), child_node.y);

        if let [first, second] = parents.as_slice() {
            if mutual_spouses(store, first.id, second.id) {
                let trunk = (
                    (first.center_x() + second.center_x()) / 2.0,
                    first.bottom().max(second.bottom()),
                );
                connectors.push(ConnectorLayout {
                    child: child.id,
                    parents: vec![first.id, second.id],
                    kind: ConnectorKind::Trunk,
                    points: elbow_points(trunk, end),
                    stroke: StrokeStyle::Solid,
                });
                continue;
            }
        }

        for parent in parents {
            connectors.push(ConnectorLayout {
                child: child.id,
                parents: vec![parent.id],
                kind: ConnectorKind::Single,
                points: elbow_points((parent.center_x(), parent.bottom()), end),
                stroke: StrokeStyle::Solid,
            });
        }
    }
    connectors
}

fn mutual_spouses(store: &FamilyStore, a: PersonId, b: PersonId) -> bool {
    match (store.get(a), store.get(b)) {
        (Some(pa), Some(pb)) => pa.is_spouse_of(b) && pb.is_spouse_of(a),
        _ => false,
    }
}

/// One dashed link per spouse edge.
///
/// Cards that are clear of each other horizontally are joined from the left
/// card's right edge to the right card's left edge, at their vertical centres.
/// Cards on different levels whose columns overlap are joined from the upper
/// card's bottom centre to the lower card's top centre instead.
pub(super) fn route_spouse_links(
    nodes: &BTreeMap<PersonId, NodeLayout>,
    store: &FamilyStore,
) -> Vec<SpouseLinkLayout> {
    let mut links = Vec::new();
    for person in store.people() {
        for spouse in person.spouses().range(person.id..) {
            if *spouse == person.id {
                continue;
            }
            let (Some(a), Some(b)) = (nodes.get(&person.id), nodes.get(spouse)) else {
                continue;
            };
            let (start, end) = spouse_link_ends(a, b);
            links.push(SpouseLinkLayout {
                a: person.id,
                b: *spouse,
                start,
                end,
                stroke: StrokeStyle::Dashed,
            });
        }
    }
    links
}

fn spouse_link_ends(a: &NodeLayout, b: &NodeLayout) -> ((f32, f32), (f32, f32)) {
    let (left, right) = if b.center_x() < a.center_x() { (b, a) } else { (a, b) };
    if left.right() <= right.x {
        return ((left.right(), left.center_y()), (right.x, right.center_y()));
    }
    let (upper, lower) = if b.y < a.y { (b, a) } else { (a, b) };
    ((upper.center_x(), upper.bottom()), (lower.center_x(), lower.y))
}
