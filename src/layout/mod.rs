mod error;
pub mod levels;
mod placement;
mod routing;
mod text;
pub(crate) mod types;
pub use error::LayoutError;
pub use levels::{LevelAssignment, assign_levels};
pub use types::*;
use placement::*;
use routing::*;
use text::*;

use crate::config::LayoutConfig;
use crate::store::FamilyStore;
use crate::theme::Theme;
use std::collections::BTreeMap;
use tracing::debug;

/// Runs the whole pipeline: levels, placement, card text, then connector routing.
///
/// The result depends only on the store's people and edges (and the
/// selection flag on each node), never on iteration luck.
pub fn compute_layout(
    store: &FamilyStore,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<Layout, LayoutError> {
    let assignment = assign_levels(store.people())?;
    let placement = place_levels(assignment.rows(), store, config);
    let selected = store.selected_id();

    let mut nodes = BTreeMap::new();
    for person in store.people() {
        let Some(&(x, y, level)) = placement.positions.get(&person.id) else {
            continue;
        };
        nodes.insert(
            person.id,
            NodeLayout {
                id: person.id,
                level,
                x,
                y,
                width: config.node_width,
                height: config.node_height,
                card: fit_card_text(person, theme, config),
                selected: selected == Some(person.id),
            },
        );
    }

    let connectors = route_connectors(&nodes, store);
    let spouse_links = route_spouse_links(&nodes, store);

    debug!(
        people = nodes.len(),
        levels = placement.levels.len(),
        connectors = connectors.len(),
        spouse_links = spouse_links.len(),
        width = placement.width,
        height = placement.height,
        "computed family tree layout"
    );

    Ok(Layout {
        nodes,
        levels: placement.levels,
        connectors,
        spouse_links,
        width: placement.width,
        height: placement.height,
    })
}
