use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use crate::ir::{Person, PersonId};

use super::LayoutError;

/// Generation depth of every person, plus the people grouped by depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelAssignment {
    levels: BTreeMap<PersonId, usize>,
    rows: Vec<Vec<PersonId>>,
}

impl LevelAssignment {
    pub fn level_of(&self, id: PersonId) -> Option<usize> {
        self.levels.get(&id).copied()
    }

    /// Levels `0..=max`, each listing its people in id order.
    pub fn rows(&self) -> &[Vec<PersonId>] {
        &self.rows
    }

    pub fn depth(&self) -> usize {
        self.rows.len()
    }
}

/// Assigns levels so every child sits strictly below all of its resolved parents.
///
/// Parent ids that do not resolve inside `people` are ignored, so a person
/// whose parents are all missing lands on level 0. The ready queue is ordered
/// by id which keeps the result independent of input order.
pub fn assign_levels<'a, I>(people: I) -> Result<LevelAssignment, LayoutError>
where
    I: IntoIterator<Item = &'a Person>,
{
    let people: BTreeMap<PersonId, &Person> = people.into_iter().map(|p| (p.id, p)).collect();

    let mut children: BTreeMap<PersonId, Vec<PersonId>> = BTreeMap::new();
    let mut indeg: BTreeMap<PersonId, usize> = BTreeMap::new();
    for (id, person) in &people {
        let resolved = person
            .parents()
            .iter()
            .filter(|parent| **parent != *id && people.contains_key(*parent));
        let mut count = 0;
        for parent in resolved {
            children.entry(*parent).or_default().push(*id);
            count += 1;
        }
        indeg.insert(*id, count);
    }

    let mut ready: BinaryHeap<Reverse<PersonId>> = indeg
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(id, _)| Reverse(*id))
        .collect();

    let mut levels: BTreeMap<PersonId, usize> = BTreeMap::new();
    let mut processed = 0usize;
    while let Some(Reverse(id)) = ready.pop() {
        processed += 1;
        let level = *levels.entry(id).or_insert(0);
        let Some(nexts) = children.get(&id) else {
            continue;
        };
        for next in nexts {
            let entry = levels.entry(*next).or_insert(0);
            *entry = (*entry).max(level + 1);
            if let Some(deg) = indeg.get_mut(next) {
                *deg = deg.saturating_sub(1);
                if *deg == 0 {
                    ready.push(Reverse(*next));
                }
            }
        }
    }

    if processed < people.len() {
        let stuck: Vec<PersonId> = indeg
            .iter()
            .filter(|(_, deg)| **deg > 0)
            .map(|(id, _)| *id)
            .collect();
        return Err(LayoutError::Cycle { people: stuck });
    }

    let depth = levels.values().max().map_or(0, |max| max + 1);
    let mut rows = vec![Vec::new(); depth];
    for (id, level) in &levels {
        rows[*level].push(*id);
    }

    Ok(LevelAssignment { levels, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::PersonAttributes;

    fn person(id: u64, parents: &[u64]) -> Person {
        let mut person = Person::new(PersonId(id), PersonAttributes::named(format!("P{id}")));
        person.parents = parents.iter().map(|p| PersonId(*p)).collect();
        person
    }

    #[test]
    fn roots_start_at_zero_and_children_follow_deepest_parent() {
        let people = vec![
            person(0, &[]),
            person(1, &[0]),
            person(2, &[]),
            person(3, &[1, 2]),
        ];
        let levels = assign_levels(&people).unwrap();
        assert_eq!(levels.level_of(PersonId(0)), Some(0));
        assert_eq!(levels.level_of(PersonId(2)), Some(0));
        assert_eq!(levels.level_of(PersonId(1)), Some(1));
        assert_eq!(levels.level_of(PersonId(3)), Some(2));
        assert_eq!(levels.rows()[0], vec![PersonId(0), PersonId(2)]);
        assert_eq!(levels.depth(), 3);
    }

    #[test]
    fn declaration_order_does_not_matter() {
        let forward = vec![person(0, &[]), person(1, &[0]), person(2, &[1])];
        let backward = vec![person(2, &[1]), person(1, &[0]), person(0, &[])];
        assert_eq!(assign_levels(&forward).unwrap(), assign_levels(&backward).unwrap());
    }

    #[test]
    fn unresolved_parents_are_ignored() {
        let people = vec![person(4, &[99]), person(5, &[4, 100])];
        let levels = assign_levels(&people).unwrap();
        assert_eq!(levels.level_of(PersonId(4)), Some(0));
        assert_eq!(levels.level_of(PersonId(5)), Some(1));
    }

    #[test]
    fn cycles_fail_fast() {
        let people = vec![person(0, &[]), person(1, &[2]), person(2, &[1])];
        let err = assign_levels(&people).unwrap_err();
        assert_eq!(
            err,
            LayoutError::Cycle {
                people: vec![PersonId(1), PersonId(2)]
            }
        );
    }

    #[test]
    fn cycle_reachable_from_a_root_is_still_detected() {
        let people = vec![person(0, &[]), person(1, &[0, 2]), person(2, &[0, 1])];
        assert!(matches!(assign_levels(&people), Err(LayoutError::Cycle { .. })));
    }

    #[test]
    fn empty_input_has_no_levels() {
        let levels = assign_levels(std::iter::empty::<&Person>()).unwrap();
        assert_eq!(levels.depth(), 0);
    }
}
