use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub u64);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    Unspecified,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
            Self::Unspecified => "",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim().to_ascii_lowercase().as_str() {
            "" | "unspecified" | "select" => Ok(Self::Unspecified),
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown gender `{other}`")),
        }
    }
}

impl TryFrom<String> for Gender {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Gender> for String {
    fn from(value: Gender) -> Self {
        value.label().to_string()
    }
}

/// Decorative account role shown on a member card. Carries no permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    SuperAdmin,
    FamilyAdmin,
    SubAdmin,
    #[default]
    Member,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::FamilyAdmin => "Family Admin",
            Self::SubAdmin => "Sub Admin",
            Self::Member => "Member",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let normalized: String = token
            .chars()
            .filter(|ch| !ch.is_whitespace() && *ch != '-' && *ch != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "superadmin" => Ok(Self::SuperAdmin),
            "familyadmin" => Ok(Self::FamilyAdmin),
            "subadmin" => Ok(Self::SubAdmin),
            "" | "member" => Ok(Self::Member),
            _ => Err(format!("unknown role `{}`", token.trim())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.label().to_string()
    }
}

/// How a new person relates to the anchor they are added against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RelationKind {
    FatherOf,
    MotherOf,
    SpouseOf,
    SonOf,
    DaughterOf,
    BrotherOf,
    SisterOf,
    NephewOf,
    NieceOf,
}

impl RelationKind {
    pub const ALL: [RelationKind; 9] = [
        Self::FatherOf,
        Self::MotherOf,
        Self::SpouseOf,
        Self::SonOf,
        Self::DaughterOf,
        Self::BrotherOf,
        Self::SisterOf,
        Self::NephewOf,
        Self::NieceOf,
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        let lower = token.trim().to_ascii_lowercase();
        let stem = lower
            .strip_suffix("-of")
            .or_else(|| lower.strip_suffix(" of"))
            .or_else(|| lower.strip_suffix("_of"))
            .unwrap_or(&lower);
        match stem {
            "father" => Some(Self::FatherOf),
            "mother" => Some(Self::MotherOf),
            "spouse" | "husband" | "wife" => Some(Self::SpouseOf),
            "son" => Some(Self::SonOf),
            "daughter" => Some(Self::DaughterOf),
            "brother" => Some(Self::BrotherOf),
            "sister" => Some(Self::SisterOf),
            "nephew" => Some(Self::NephewOf),
            "niece" => Some(Self::NieceOf),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FatherOf => "Father-of",
            Self::MotherOf => "Mother-of",
            Self::SpouseOf => "Spouse-of",
            Self::SonOf => "Son-of",
            Self::DaughterOf => "Daughter-of",
            Self::BrotherOf => "Brother-of",
            Self::SisterOf => "Sister-of",
            Self::NephewOf => "Nephew-of",
            Self::NieceOf => "Niece-of",
        }
    }

    /// Convenience default for the form; an explicit gender always wins.
    pub fn implied_gender(self) -> Option<Gender> {
        match self {
            Self::FatherOf | Self::SonOf | Self::BrotherOf | Self::NephewOf => Some(Gender::Male),
            Self::MotherOf | Self::DaughterOf | Self::SisterOf | Self::NieceOf => {
                Some(Gender::Female)
            }
            Self::SpouseOf => None,
        }
    }

    pub fn needs_sibling_parent(self) -> bool {
        matches!(self, Self::NephewOf | Self::NieceOf)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for RelationKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_token(&value).ok_or_else(|| format!("unknown relation `{}`", value.trim()))
    }
}

impl From<RelationKind> for String {
    fn from(value: RelationKind) -> Self {
        value.label().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonAttributes {
    pub name: String,
    pub gender: Gender,
    pub role: Role,
    pub bio: String,
    /// Opaque encoded image, usually a `data:` URI.
    pub photo: Option<String>,
}

impl PersonAttributes {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(photo.into());
        self
    }
}

/// A person record. Relationship sets are only mutated through
/// [`crate::store::FamilyStore`], which keeps both sides of every edge in sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    pub id: PersonId,
    #[serde(flatten)]
    pub attributes: PersonAttributes,
    pub(crate) parents: BTreeSet<PersonId>,
    pub(crate) children: BTreeSet<PersonId>,
    pub(crate) spouses: BTreeSet<PersonId>,
}

impl Person {
    pub(crate) fn new(id: PersonId, attributes: PersonAttributes) -> Self {
        Self {
            id,
            attributes,
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
            spouses: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.attributes.name
    }

    pub fn parents(&self) -> &BTreeSet<PersonId> {
        &self.parents
    }

    pub fn children(&self) -> &BTreeSet<PersonId> {
        &self.children
    }

    pub fn spouses(&self) -> &BTreeSet<PersonId> {
        &self.spouses
    }

    pub fn is_spouse_of(&self, other: PersonId) -> bool {
        self.spouses.contains(&other)
    }
}

/// One submission of the "add member" form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberForm {
    pub attributes: PersonAttributes,
    pub anchor: Option<PersonId>,
    pub relation: Option<RelationKind>,
    pub sibling_parent: Option<PersonId>,
}

impl MemberForm {
    pub fn root(attributes: PersonAttributes) -> Self {
        Self {
            attributes,
            ..Default::default()
        }
    }

    pub fn relative(attributes: PersonAttributes, anchor: PersonId, relation: RelationKind) -> Self {
        Self {
            attributes,
            anchor: Some(anchor),
            relation: Some(relation),
            sibling_parent: None,
        }
    }

    pub fn with_sibling_parent(mut self, sibling_parent: PersonId) -> Self {
        self.sibling_parent = Some(sibling_parent);
        self
    }
}
