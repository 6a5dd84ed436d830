use crate::ir::PersonId;
use crate::layout::{ConnectorKind, Layout, LevelGroup, StrokeStyle};
use crate::store::FamilyStore;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub selected: Option<PersonId>,
    pub levels: Vec<Vec<LevelGroup>>,
    pub nodes: Vec<NodeDump>,
    pub connectors: Vec<ConnectorDump>,
    pub spouse_links: Vec<SpouseLinkDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: PersonId,
    pub name: String,
    pub level: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub name_line: String,
    pub bio_lines: Vec<String>,
    pub caption: String,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct ConnectorDump {
    pub child: PersonId,
    pub parents: Vec<PersonId>,
    pub kind: ConnectorKind,
    pub stroke: StrokeStyle,
    pub points: Vec<[f32; 2]>,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct SpouseLinkDump {
    pub a: PersonId,
    pub b: PersonId,
    pub stroke: StrokeStyle,
    pub points: [[f32; 2]; 2],
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, store: &FamilyStore) -> Self {
        let nodes = layout
            .nodes
            .values()
            .map(|node| NodeDump {
                id: node.id,
                name: store
                    .get(node.id)
                    .map(|person| person.name().to_string())
                    .unwrap_or_default(),
                level: node.level,
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                name_line: node.card.name.clone(),
                bio_lines: node.card.bio_lines.clone(),
                caption: node.card.caption.clone(),
                selected: node.selected,
            })
            .collect();

        let connectors = layout
            .connectors
            .iter()
            .map(|conn| ConnectorDump {
                child: conn.child,
                parents: conn.parents.clone(),
                kind: conn.kind,
                stroke: conn.stroke,
                points: conn.points.iter().map(|(x, y)| [*x, *y]).collect(),
                path: conn.path_data(),
            })
            .collect();

        let spouse_links = layout
            .spouse_links
            .iter()
            .map(|link| SpouseLinkDump {
                a: link.a,
                b: link.b,
                stroke: link.stroke,
                points: [[link.start.0, link.start.1], [link.end.0, link.end.1]],
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            selected: store.selected_id(),
            levels: layout.levels.clone(),
            nodes,
            connectors,
            spouse_links,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout, store: &FamilyStore) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, store);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
