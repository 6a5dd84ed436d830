//! The relationship store: person records plus parent/child and spouse edges.
//!
//! Every edge is held twice (`parents`/`children`, and `spouses` on both
//! ends). All mutations go through the methods here so the two sides never
//! drift apart, and `link_parent_child` refuses edges that would close a cycle.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::ir::{Gender, MemberForm, Person, PersonAttributes, PersonId, RelationKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("a member needs a non-empty name")]
    EmptyName,

    #[error("an anchor was given without a relation")]
    MissingRelation,

    #[error("no person with id {id}")]
    UnknownPerson { id: PersonId },

    #[error("{id} cannot be linked to itself")]
    SelfLink { id: PersonId },

    #[error("linking {parent} as a parent of {child} would make {child} their own ancestor")]
    Cycle { parent: PersonId, child: PersonId },
}

#[derive(Debug, Clone, Default)]
pub struct FamilyStore {
    people: BTreeMap<PersonId, Person>,
    next_id: u64,
    selected: Option<PersonId>,
}

impl FamilyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.people.contains_key(&id)
    }

    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.people.get(&id)
    }

    /// People in creation order.
    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.people.values()
    }

    /// First person whose trimmed name matches, in creation order.
    pub fn find_by_name(&self, name: &str) -> Option<&Person> {
        let needle = name.trim();
        self.people.values().find(|person| person.name().trim() == needle)
    }

    pub fn add_root(&mut self, attributes: PersonAttributes) -> PersonId {
        let id = PersonId(self.next_id);
        self.next_id += 1;
        debug!(%id, name = %attributes.name, "added person");
        self.people.insert(id, Person::new(id, attributes));
        id
    }

    /// Creates a person and wires them against `anchor` according to `relation`.
    ///
    /// An anchor that does not resolve degrades to root creation. A son or
    /// daughter of an anchor with exactly one spouse becomes that spouse's
    /// child as well. For the nephew/niece kinds the new person becomes a
    /// child of `sibling_parent` and stays unlinked when that id is missing
    /// or unknown.
    pub fn add_relative(
        &mut self,
        attributes: PersonAttributes,
        anchor: PersonId,
        relation: RelationKind,
        sibling_parent: Option<PersonId>,
    ) -> PersonId {
        if !self.contains(anchor) {
            warn!(%anchor, %relation, "anchor not found, adding as root");
            return self.add_root(attributes);
        }

        let id = self.add_root(attributes);
        match relation {
            RelationKind::FatherOf | RelationKind::MotherOf => self.insert_parent_edge(id, anchor),
            RelationKind::SpouseOf => self.insert_spouse_edge(id, anchor),
            RelationKind::SonOf | RelationKind::DaughterOf => {
                self.insert_parent_edge(anchor, id);
                // A child of one half of a couple is the couple's child.
                let spouses: Vec<PersonId> = self.people[&anchor].spouses.iter().copied().collect();
                match spouses.as_slice() {
                    [] => {}
                    [spouse] => self.insert_parent_edge(*spouse, id),
                    _ => debug!(%anchor, %id, "anchor has several spouses, linking the anchor only"),
                }
            }
            RelationKind::BrotherOf | RelationKind::SisterOf => {
                let parents: Vec<PersonId> = self.people[&anchor].parents.iter().copied().collect();
                for parent in parents {
                    self.insert_parent_edge(parent, id);
                }
            }
            RelationKind::NephewOf | RelationKind::NieceOf => match sibling_parent {
                Some(parent) if self.contains(parent) && parent != id => {
                    let is_sibling = self.share_a_parent(parent, anchor);
                    if !is_sibling {
                        debug!(%parent, %anchor, "sibling-parent shares no parent with the anchor");
                    }
                    self.insert_parent_edge(parent, id);
                }
                Some(parent) => warn!(%parent, %id, "sibling-parent not found, leaving unlinked"),
                None => warn!(%id, "no sibling-parent given, leaving unlinked"),
            },
        }
        debug!(%id, %anchor, %relation, "wired relative");
        id
    }

    /// Validates a form submission and dispatches to [`Self::add_root`] or
    /// [`Self::add_relative`].
    pub fn submit(&mut self, form: MemberForm) -> Result<PersonId, StoreError> {
        let MemberForm {
            mut attributes,
            anchor,
            relation,
            sibling_parent,
        } = form;

        let trimmed = attributes.name.trim();
        if trimmed.is_empty() {
            return Err(StoreError::EmptyName);
        }
        attributes.name = trimmed.to_string();

        let Some(anchor) = anchor else {
            return Ok(self.add_root(attributes));
        };
        let relation = relation.ok_or(StoreError::MissingRelation)?;
        if attributes.gender == Gender::Unspecified {
            if let Some(gender) = relation.implied_gender() {
                attributes.gender = gender;
            }
        }
        Ok(self.add_relative(attributes, anchor, relation, sibling_parent))
    }

    /// Adds `parent -> child`. Returns `Ok(false)` when the edge already exists.
    pub fn link_parent_child(&mut self, parent: PersonId, child: PersonId) -> Result<bool, StoreError> {
        self.require(parent)?;
        self.require(child)?;
        if parent == child {
            return Err(StoreError::SelfLink { id: parent });
        }
        if self.people[&parent].children.contains(&child) {
            return Ok(false);
        }
        if self.is_descendant(parent, child) {
            return Err(StoreError::Cycle { parent, child });
        }
        self.insert_parent_edge(parent, child);
        debug!(%parent, %child, "linked parent and child");
        Ok(true)
    }

    /// Adds a symmetric spouse edge. Returns `Ok(false)` when it already exists.
    pub fn link_spouse(&mut self, a: PersonId, b: PersonId) -> Result<bool, StoreError> {
        self.require(a)?;
        self.require(b)?;
        if a == b {
            return Err(StoreError::SelfLink { id: a });
        }
        if self.people[&a].spouses.contains(&b) {
            return Ok(false);
        }
        self.insert_spouse_edge(a, b);
        debug!(%a, %b, "linked spouses");
        Ok(true)
    }

    pub fn unlink_parent_child(&mut self, parent: PersonId, child: PersonId) -> bool {
        let removed = self
            .people
            .get_mut(&parent)
            .is_some_and(|person| person.children.remove(&child));
        if let Some(person) = self.people.get_mut(&child) {
            person.parents.remove(&parent);
        }
        if removed {
            debug!(%parent, %child, "unlinked parent and child");
        }
        removed
    }

    pub fn unlink_spouse(&mut self, a: PersonId, b: PersonId) -> bool {
        let removed = self
            .people
            .get_mut(&a)
            .is_some_and(|person| person.spouses.remove(&b));
        if let Some(person) = self.people.get_mut(&b) {
            person.spouses.remove(&a);
        }
        if removed {
            debug!(%a, %b, "unlinked spouses");
        }
        removed
    }

    /// Removes a person and strips their id from every other relationship set.
    /// Unknown ids are ignored.
    pub fn delete(&mut self, id: PersonId) {
        let Some(removed) = self.people.remove(&id) else {
            return;
        };
        let neighbours = removed
            .parents
            .iter()
            .chain(&removed.children)
            .chain(&removed.spouses);
        for other in neighbours {
            if let Some(person) = self.people.get_mut(other) {
                person.parents.remove(&id);
                person.children.remove(&id);
                person.spouses.remove(&id);
            }
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        debug!(%id, name = %removed.attributes.name, "deleted person");
    }

    /// Marks a person as selected. Unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: PersonId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Person> {
        self.selected.and_then(|id| self.people.get(&id))
    }

    pub fn selected_id(&self) -> Option<PersonId> {
        self.selected
    }

    fn require(&self, id: PersonId) -> Result<(), StoreError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(StoreError::UnknownPerson { id })
        }
    }

    fn insert_parent_edge(&mut self, parent: PersonId, child: PersonId) {
        if let Some(person) = self.people.get_mut(&parent) {
            person.children.insert(child);
        }
        if let Some(person) = self.people.get_mut(&child) {
            person.parents.insert(parent);
        }
    }

    fn insert_spouse_edge(&mut self, a: PersonId, b: PersonId) {
        if let Some(person) = self.people.get_mut(&a) {
            person.spouses.insert(b);
        }
        if let Some(person) = self.people.get_mut(&b) {
            person.spouses.insert(a);
        }
    }

    fn share_a_parent(&self, a: PersonId, b: PersonId) -> bool {
        match (self.people.get(&a), self.people.get(&b)) {
            (Some(a), Some(b)) => !a.parents.is_disjoint(&b.parents),
            _ => false,
        }
    }

    /// True when `target` can be reached from `root` by following child edges.
    fn is_descendant(&self, target: PersonId, root: PersonId) -> bool {
        let mut stack = vec![root];
        let mut seen = BTreeSet::new();
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(person) = self.people.get(&current) {
                stack.extend(person.children.iter().copied());
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> PersonAttributes {
        PersonAttributes::named(name)
    }

    fn assert_symmetric(store: &FamilyStore) {
        for person in store.people() {
            for child in person.children() {
                assert!(store.get(*child).unwrap().parents().contains(&person.id));
            }
            for parent in person.parents() {
                assert!(store.get(*parent).unwrap().children().contains(&person.id));
            }
            for spouse in person.spouses() {
                assert!(store.get(*spouse).unwrap().spouses().contains(&person.id));
            }
        }
    }

    #[test]
    fn relation_kinds_wire_expected_edges() {
        let mut store = FamilyStore::new();
        let anchor = store.add_root(named("Anchor"));
        let father = store.add_relative(named("Father"), anchor, RelationKind::FatherOf, None);
        let spouse = store.add_relative(named("Spouse"), anchor, RelationKind::SpouseOf, None);
        let son = store.add_relative(named("Son"), anchor, RelationKind::SonOf, None);
        let sister = store.add_relative(named("Sister"), anchor, RelationKind::SisterOf, None);
        let niece = store.add_relative(named("Niece"), anchor, RelationKind::NieceOf, Some(sister));

        let anchor_p = store.get(anchor).unwrap();
        assert!(anchor_p.parents().contains(&father));
        assert!(anchor_p.spouses().contains(&spouse));
        assert!(anchor_p.children().contains(&son));
        let son_parents: Vec<PersonId> = store.get(son).unwrap().parents().iter().copied().collect();
        assert_eq!(son_parents, vec![anchor, spouse]);
        assert_eq!(store.get(sister).unwrap().parents().iter().copied().collect::<Vec<_>>(), vec![father]);
        assert!(store.get(niece).unwrap().parents().contains(&sister));
        assert_symmetric(&store);
    }

    #[test]
    fn unknown_anchor_degrades_to_root() {
        let mut store = FamilyStore::new();
        let id = store.add_relative(named("Lost"), PersonId(99), RelationKind::SonOf, None);
        let person = store.get(id).unwrap();
        assert!(person.parents().is_empty());
        assert!(person.spouses().is_empty());
    }

    #[test]
    fn nephew_without_sibling_parent_is_orphaned() {
        let mut store = FamilyStore::new();
        let anchor = store.add_root(named("Aunt"));
        let nephew = store.add_relative(named("Nephew"), anchor, RelationKind::NephewOf, None);
        assert!(store.get(nephew).unwrap().parents().is_empty());
        let other = store.add_relative(named("Other"), anchor, RelationKind::NephewOf, Some(PersonId(42)));
        assert!(store.get(other).unwrap().parents().is_empty());
    }

    #[test]
    fn linking_is_idempotent() {
        let mut store = FamilyStore::new();
        let a = store.add_root(named("A"));
        let b = store.add_root(named("B"));
        assert_eq!(store.link_parent_child(a, b), Ok(true));
        assert_eq!(store.link_parent_child(a, b), Ok(false));
        assert_eq!(store.get(a).unwrap().children().len(), 1);
        assert_eq!(store.link_spouse(a, b), Ok(true));
        assert_eq!(store.link_spouse(b, a), Ok(false));
        assert_symmetric(&store);
    }

    #[test]
    fn rejects_self_links_and_cycles() {
        let mut store = FamilyStore::new();
        let a = store.add_root(named("A"));
        let b = store.add_root(named("B"));
        let c = store.add_root(named("C"));
        assert_eq!(store.link_parent_child(a, a), Err(StoreError::SelfLink { id: a }));
        assert_eq!(store.link_spouse(b, b), Err(StoreError::SelfLink { id: b }));
        store.link_parent_child(a, b).unwrap();
        store.link_parent_child(b, c).unwrap();
        assert_eq!(
            store.link_parent_child(c, a),
            Err(StoreError::Cycle { parent: c, child: a })
        );
        assert_eq!(
            store.link_parent_child(a, PersonId(77)),
            Err(StoreError::UnknownPerson { id: PersonId(77) })
        );
    }

    #[test]
    fn delete_cleans_every_reference_and_selection() {
        let mut store = FamilyStore::new();
        let a = store.add_root(named("A"));
        let b = store.add_relative(named("B"), a, RelationKind::SpouseOf, None);
        let c = store.add_relative(named("C"), a, RelationKind::SonOf, None);
        assert_eq!(store.link_parent_child(b, c), Ok(false));
        store.select(a);

        store.delete(a);
        store.delete(a);

        assert!(store.selected().is_none());
        for person in store.people() {
            assert!(!person.parents().contains(&a));
            assert!(!person.children().contains(&a));
            assert!(!person.spouses().contains(&a));
        }
        assert_symmetric(&store);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut store = FamilyStore::new();
        let a = store.add_root(named("A"));
        store.delete(a);
        let b = store.add_root(named("B"));
        assert_ne!(a, b);
    }

    #[test]
    fn submit_validates_and_infers_gender() {
        let mut store = FamilyStore::new();
        assert_eq!(store.submit(MemberForm::root(named("   "))), Err(StoreError::EmptyName));
        let root = store.submit(MemberForm::root(named("  Root  "))).unwrap();
        assert_eq!(store.get(root).unwrap().name(), "Root");

        let mother = store
            .submit(MemberForm::relative(named("Mum"), root, RelationKind::MotherOf))
            .unwrap();
        assert_eq!(store.get(mother).unwrap().attributes.gender, Gender::Female);

        let explicit = store
            .submit(MemberForm::relative(
                named("Kid").with_gender(Gender::Other),
                root,
                RelationKind::SonOf,
            ))
            .unwrap();
        assert_eq!(store.get(explicit).unwrap().attributes.gender, Gender::Other);

        let form = MemberForm {
            attributes: named("Floating"),
            anchor: Some(root),
            relation: None,
            sibling_parent: None,
        };
        assert_eq!(store.submit(form), Err(StoreError::MissingRelation));
    }

    #[test]
    fn unlink_removes_both_sides() {
        let mut store = FamilyStore::new();
        let a = store.add_root(named("A"));
        let b = store.add_relative(named("B"), a, RelationKind::SpouseOf, None);
        let c = store.add_relative(named("C"), a, RelationKind::SonOf, None);
        assert!(store.unlink_spouse(b, a));
        assert!(!store.unlink_spouse(a, b));
        assert!(store.unlink_parent_child(a, c));
        let parents: Vec<PersonId> = store.get(c).unwrap().parents().iter().copied().collect();
        assert_eq!(parents, vec![b]);
        assert!(store.get(a).unwrap().spouses().is_empty());
    }

    #[test]
    fn child_of_anchor_with_several_spouses_links_the_anchor_only() {
        let mut store = FamilyStore::new();
        let a = store.add_root(named("A"));
        store.add_relative(named("B"), a, RelationKind::SpouseOf, None);
        store.add_relative(named("C"), a, RelationKind::SpouseOf, None);
        let kid = store.add_relative(named("Kid"), a, RelationKind::DaughterOf, None);
        let parents: Vec<PersonId> = store.get(kid).unwrap().parents().iter().copied().collect();
        assert_eq!(parents, vec![a]);
        assert_symmetric(&store);
    }

    #[test]
    fn find_by_name_matches_trimmed_names_in_creation_order() {
        let mut store = FamilyStore::new();
        let first = store.add_root(named("Asha"));
        store.add_root(named("Asha"));
        let ravi = store.add_root(named("Ravi"));
        assert_eq!(store.find_by_name("Asha").map(|p| p.id), Some(first));
        assert_eq!(store.find_by_name("  Ravi ").map(|p| p.id), Some(ravi));
        assert!(store.find_by_name("ravi").is_none());
        assert!(store.find_by_name("Kiran").is_none());
    }

    #[test]
    fn select_ignores_unknown_ids() {
        let mut store = FamilyStore::new();
        let a = store.add_root(named("A"));
        assert!(store.select(a));
        assert!(!store.select(PersonId(5)));
        assert_eq!(store.selected_id(), Some(a));
        store.clear_selection();
        assert!(store.selected().is_none());
    }
}
