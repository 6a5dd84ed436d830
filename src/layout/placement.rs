use std::collections::{BTreeMap, BTreeSet};

use crate::config::LayoutConfig;
use crate::ir::PersonId;
use crate::store::FamilyStore;

use super::LevelGroup;

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Placement {
    pub(super) levels: Vec<Vec<LevelGroup>>,
    /// Top-left corner and level of every placed person.
    pub(super) positions: BTreeMap<PersonId, (f32, f32, usize)>,
    pub(super) width: f32,
    pub(super) height: f32,
}

/// Splits one level into spouse pairs and singletons, in row order.
///
/// A person is paired with the first spouse (by id) that sits on the same
/// level and is not already claimed; nobody appears in two groups.
pub(super) fn group_level(row: &[PersonId], store: &FamilyStore) -> Vec<LevelGroup> {
    let in_level: BTreeSet<PersonId> = row.iter().copied().collect();
    let mut claimed: BTreeSet<PersonId> = BTreeSet::new();
    let mut groups = Vec::new();

    for id in row {
        if claimed.contains(id) {
            continue;
        }
        claimed.insert(*id);
        let partner = store.get(*id).and_then(|person| {
            person
                .spouses()
                .iter()
                .copied()
                .find(|spouse| in_level.contains(spouse) && !claimed.contains(spouse))
        });
        match partner {
            Some(right) => {
                claimed.insert(right);
                groups.push(LevelGroup::Pair { left: *id, right });
            }
            None => groups.push(LevelGroup::Single { id: *id }),
        }
    }

    groups
}

fn group_width(group: &LevelGroup, config: &LayoutConfig) -> f32 {
    match group {
        LevelGroup::Single { .. } => config.node_width,
        LevelGroup::Pair { .. } => config.node_width * 2.0 + config.spouse_gap,
    }
}

fn level_width(groups: &[LevelGroup], config: &LayoutConfig) -> f32 {
    if groups.is_empty() {
        return 0.0;
    }
    let nodes: f32 = groups.iter().map(|group| group_width(group, config)).sum();
    nodes + (groups.len() - 1) as f32 * config.node_gap_x
}

pub(super) fn place_levels(
    rows: &[Vec<PersonId>],
    store: &FamilyStore,
    config: &LayoutConfig,
) -> Placement {
    let levels: Vec<Vec<LevelGroup>> = rows.iter().map(|row| group_level(row, store)).collect();
    let widths: Vec<f32> = levels.iter().map(|groups| level_width(groups, config)).collect();

    let content_width = widths.iter().copied().fold(0.0, f32::max) + config.padding * 2.0;
    let level_count = levels.len();
    let content_height = level_count as f32 * config.node_height
        + level_count.saturating_sub(1) as f32 * config.level_gap_y
        + config.padding * 2.0;

    let mut positions = BTreeMap::new();
    for (level_idx, groups) in levels.iter().enumerate() {
        // Centre against the unfloored width so a lone root sits at the padding origin.
        let mut cursor = (content_width - widths[level_idx]) / 2.0;
        let y = config.padding + level_idx as f32 * (config.node_height + config.level_gap_y);
        for group in groups {
            match *group {
                LevelGroup::Single { id } => {
                    positions.insert(id, (cursor, y, level_idx));
                }
                LevelGroup::Pair { left, right } => {
                    positions.insert(left, (cursor, y, level_idx));
                    let right_x = cursor + config.node_width + config.spouse_gap;
                    positions.insert(right, (right_x, y, level_idx));
                }
            }
            cursor += group_width(group, config) + config.node_gap_x;
        }
    }

    Placement {
        levels,
        positions,
        width: content_width.max(config.min_width),
        height: content_height.max(config.min_height),
    }
}
