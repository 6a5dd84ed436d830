use crate::ir::PersonId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// Parent/child edges that never settle into levels.
    #[error("parent/child links form a cycle through {}", format_ids(.people))]
    Cycle { people: Vec<PersonId> },
}

fn format_ids(ids: &[PersonId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
