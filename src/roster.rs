//! Roster files: a scripted series of "add member" form submissions.
//!
//! A roster is JSON5. Members are replayed in order through
//! [`FamilyStore::submit`], so relations behave exactly as they do in the
//! editor form. Members are referred to by `key` (falling back to their
//! name) from later entries.
//!
//! ```json5
//! {
//!   members: [
//!     { key: "asha", name: "Asha", role: "Family Admin" },
//!     { name: "Ravi", relation: "Spouse-of", anchor: "asha" },
//!     { name: "Kiran", relation: "Son-of", anchor: "asha" },
//!     { name: "Mina" },
//!   ],
//!   links: [{ parent: "Mina", child: "Kiran" }],
//!   selected: "Kiran",
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::ir::{MemberForm, PersonAttributes, PersonId, RelationKind};
use crate::store::{FamilyStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("invalid roster: {0}")]
    Parse(#[from] json5::Error),

    #[error("member key `{key}` is used twice")]
    DuplicateKey { key: String },

    #[error("no member with key `{key}`")]
    UnknownKey { key: String },

    #[error("selected member `{key}` was removed")]
    SelectionRemoved { key: String },

    #[error("{context}: {source}")]
    Store {
        context: String,
        #[source]
        source: StoreError,
    },

    #[error("cannot read photo `{path}`: {source}")]
    Photo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Roster {
    pub members: Vec<RosterMember>,
    pub links: Vec<RosterLink>,
    pub spouses: Vec<[String; 2]>,
    pub remove: Vec<String>,
    pub selected: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterMember {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(flatten)]
    pub attributes: PersonAttributes,
    #[serde(default)]
    pub relation: Option<RelationKind>,
    #[serde(default)]
    pub anchor: Option<String>,
    #[serde(default)]
    pub sibling_parent: Option<String>,
    /// Image file to embed as a data URI, relative to the roster file.
    #[serde(default)]
    pub photo_file: Option<String>,
}

impl RosterMember {
    fn key(&self) -> String {
        self.key
            .clone()
            .unwrap_or_else(|| self.attributes.name.trim().to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterLink {
    pub parent: String,
    pub child: String,
}

/// The store a roster produced, plus the key each person was declared under.
#[derive(Debug, Clone)]
pub struct BuiltRoster {
    pub store: FamilyStore,
    pub keys: BTreeMap<String, PersonId>,
}

impl BuiltRoster {
    pub fn id(&self, key: &str) -> Option<PersonId> {
        self.keys.get(key).copied()
    }
}

pub fn parse_roster(source: &str) -> Result<Roster, RosterError> {
    Ok(json5::from_str(source)?)
}

impl Roster {
    /// Loads every `photoFile` (relative to `base_dir`) into the member's photo.
    pub fn embed_photo_files(&mut self, base_dir: &Path) -> Result<(), RosterError> {
        for member in &mut self.members {
            let Some(file) = member.photo_file.as_deref() else {
                continue;
            };
            let path = base_dir.join(file);
            let bytes = std::fs::read(&path).map_err(|source| RosterError::Photo {
                path: path.display().to_string(),
                source,
            })?;
            member.attributes.photo = Some(photo_data_uri(&bytes, &path));
        }
        Ok(())
    }

    /// Replays the roster into a fresh store.
    pub fn build(&self) -> Result<BuiltRoster, RosterError> {
        let mut store = FamilyStore::new();
        let mut keys: BTreeMap<String, PersonId> = BTreeMap::new();

        for member in &self.members {
            let key = member.key();
            if keys.contains_key(&key) {
                return Err(RosterError::DuplicateKey { key });
            }
            let anchor = member.anchor.as_deref().and_then(|anchor| {
                let found = keys.get(anchor).copied();
                if found.is_none() {
                    warn!(member = %key, anchor, "anchor key not declared yet, adding as a root");
                }
                found
            });
            let sibling_parent = member
                .sibling_parent
                .as_deref()
                .and_then(|sibling| keys.get(sibling).copied());
            let form = MemberForm {
                attributes: member.attributes.clone(),
                anchor,
                relation: member.relation,
                sibling_parent,
            };
            let id = store.submit(form).map_err(|source| RosterError::Store {
                context: format!("member `{key}`"),
                source,
            })?;
            keys.insert(key, id);
        }

        for link in &self.links {
            let parent = lookup(&keys, &link.parent)?;
            let child = lookup(&keys, &link.child)?;
            store
                .link_parent_child(parent, child)
                .map_err(|source| RosterError::Store {
                    context: format!("link `{}` -> `{}`", link.parent, link.child),
                    source,
                })?;
        }

        for [a, b] in &self.spouses {
            let (ia, ib) = (lookup(&keys, a)?, lookup(&keys, b)?);
            store.link_spouse(ia, ib).map_err(|source| RosterError::Store {
                context: format!("spouses `{a}` and `{b}`"),
                source,
            })?;
        }

        for key in &self.remove {
            let id = lookup(&keys, key)?;
            store.delete(id);
        }

        if let Some(key) = self.selected.as_deref() {
            let id = lookup(&keys, key)?;
            if !store.select(id) {
                return Err(RosterError::SelectionRemoved { key: key.to_string() });
            }
        }

        debug!(people = store.len(), "built roster");
        Ok(BuiltRoster { store, keys })
    }
}

fn lookup(keys: &BTreeMap<String, PersonId>, key: &str) -> Result<PersonId, RosterError> {
    keys.get(key).copied().ok_or_else(|| RosterError::UnknownKey {
        key: key.to_string(),
    })
}

/// Encodes image bytes the way a browser file reader produces a data URL.
pub fn photo_data_uri(bytes: &[u8], path: &Path) -> String {
    let mime = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    };
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
