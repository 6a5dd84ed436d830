use std::collections::BTreeMap;

use serde::Serialize;

use crate::ir::PersonId;

/// Text already fitted to the card's text column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardText {
    pub name: String,
    pub bio_lines: Vec<String>,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeLayout {
    pub id: PersonId,
    pub level: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub card: CardText,
    pub selected: bool,
}

impl NodeLayout {
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Members of one level that are laid out side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LevelGroup {
    Single { id: PersonId },
    Pair { left: PersonId, right: PersonId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorKind {
    /// One connector per parent edge.
    Single,
    /// Two mutual-spouse parents sharing one connector.
    Trunk,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorLayout {
    pub child: PersonId,
    pub parents: Vec<PersonId>,
    pub kind: ConnectorKind,
    pub points: Vec<(f32, f32)>,
    pub stroke: StrokeStyle,
}

impl ConnectorLayout {
    pub fn path_data(&self) -> String {
        points_to_path(&self.points)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpouseLinkLayout {
    pub a: PersonId,
    pub b: PersonId,
    pub start: (f32, f32),
    pub end: (f32, f32),
    pub stroke: StrokeStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub nodes: BTreeMap<PersonId, NodeLayout>,
    pub levels: Vec<Vec<LevelGroup>>,
    pub connectors: Vec<ConnectorLayout>,
    pub spouse_links: Vec<SpouseLinkLayout>,
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn level_of(&self, id: PersonId) -> Option<usize> {
        self.nodes.get(&id).map(|node| node.level)
    }

    pub fn connectors_to(&self, child: PersonId) -> impl Iterator<Item = &ConnectorLayout> {
        self.connectors.iter().filter(move |conn| conn.child == child)
    }
}

pub(crate) fn points_to_path(points: &[(f32, f32)]) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };
    let mut d = format!("M {:.2} {:.2}", first.0, first.1);
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}
