//! Domain types for the gym back office.
//!
//! Records are closed schemas: every stored shape rejects unknown fields on
//! decode. A bare record (`Plan`, `TeamMember`) is a draft; once the store
//! assigns an id it travels as [`Identified`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::booking::TimeSlot;
use crate::error::ValidationError;
use crate::validate::{check_image_url, require_text};

/// Name of the rank field shared by every ordered collection.
pub const ORDER_FIELD: &str = "order";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque document identifier assigned by the store on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The named collections kept in the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Plans,
    Team,
    Registrations,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Plans, Collection::Team, Collection::Registrations];

    pub const fn as_str(self) -> &'static str {
        match self {
            Collection::Plans => "plans",
            Collection::Team => "team",
            Collection::Registrations => "registrations",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plans" => Ok(Collection::Plans),
            "team" => Ok(Collection::Team),
            "registrations" => Ok(Collection::Registrations),
            other => Err(format!(
                "unknown collection '{other}'; expected: plans, team, registrations"
            )),
        }
    }
}

/// Sort direction of a collection query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Which neighbour a record swaps places with during a reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(format!("unknown direction '{other}'; expected: up, down")),
        }
    }
}

// ---------------------------------------------------------------------------
// Record traits
// ---------------------------------------------------------------------------

/// A typed document shape bound to one collection and its display query.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;
    /// Field the live query sorts on.
    const SORT_FIELD: &'static str;
    const SORT: SortDirection;
}

/// A record ranked by an explicit `order` field.
pub trait OrderedRecord: Record + Default {
    /// Partial-field update; `None` fields are left untouched.
    type Patch: Serialize + Default + Send + Sync;

    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);

    /// Canonicalize the draft before it is written.
    fn normalize(&mut self) {}
    fn validate(&self) -> Result<(), ValidationError>;

    fn normalize_patch(_patch: &mut Self::Patch) {}
    fn validate_patch(patch: &Self::Patch) -> Result<(), ValidationError>;

    /// A patch touching nothing but the rank.
    fn order_patch(order: u32) -> Self::Patch;
}

/// A persisted record together with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identified<R> {
    pub id: RecordId,
    #[serde(flatten)]
    pub record: R,
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

/// A membership plan shown on the public plans page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Plan {
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub features: Vec<String>,
    /// Rendered with an accent border.
    #[serde(default)]
    pub highlight: bool,
    /// Flagged as the recommended plan.
    #[serde(default)]
    pub special: bool,
    pub order: u32,
}

/// Partial update of a [`Plan`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

/// Drop blank and whitespace-only feature lines, keeping the rest in order.
pub fn strip_blank_features(features: &mut Vec<String>) {
    features.retain(|feature| !feature.trim().is_empty());
}

impl Record for Plan {
    const COLLECTION: Collection = Collection::Plans;
    const SORT_FIELD: &'static str = ORDER_FIELD;
    const SORT: SortDirection = SortDirection::Ascending;
}

impl OrderedRecord for Plan {
    type Patch = PlanPatch;

    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }

    fn normalize(&mut self) {
        strip_blank_features(&mut self.features);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("price", &self.price)
    }

    fn normalize_patch(patch: &mut PlanPatch) {
        if let Some(features) = patch.features.as_mut() {
            strip_blank_features(features);
        }
    }

    fn validate_patch(patch: &PlanPatch) -> Result<(), ValidationError> {
        if let Some(name) = &patch.name {
            require_text("name", name)?;
        }
        if let Some(price) = &patch.price {
            require_text("price", price)?;
        }
        Ok(())
    }

    fn order_patch(order: u32) -> PlanPatch {
        PlanPatch {
            order: Some(order),
            ..PlanPatch::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// A staff member shown on the about page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    /// Picture URL; may be empty.
    #[serde(default)]
    pub image: String,
    pub order: u32,
}

/// Partial update of a [`TeamMember`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl Record for TeamMember {
    const COLLECTION: Collection = Collection::Team;
    const SORT_FIELD: &'static str = ORDER_FIELD;
    const SORT: SortDirection = SortDirection::Ascending;
}

impl OrderedRecord for TeamMember {
    type Patch = TeamMemberPatch;

    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }

    fn normalize(&mut self) {
        self.image = self.image.trim().to_string();
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("role", &self.role)?;
        check_image_url(&self.image)
    }

    fn normalize_patch(patch: &mut TeamMemberPatch) {
        if let Some(image) = patch.image.as_mut() {
            *image = image.trim().to_string();
        }
    }

    fn validate_patch(patch: &TeamMemberPatch) -> Result<(), ValidationError> {
        if let Some(name) = &patch.name {
            require_text("name", name)?;
        }
        if let Some(role) = &patch.role {
            require_text("role", role)?;
        }
        if let Some(image) = &patch.image {
            check_image_url(image)?;
        }
        Ok(())
    }

    fn order_patch(order: u32) -> TeamMemberPatch {
        TeamMemberPatch {
            order: Some(order),
            ..TeamMemberPatch::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Registrations
// ---------------------------------------------------------------------------

/// What a visitor submits on the registration page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Label of the chosen plan, e.g. "Musculação | Anual".
    pub plan: String,
    pub preferred_date: Option<NaiveDate>,
    pub preferred_time: Option<TimeSlot>,
}

/// An append-only lead record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub plan: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_time: Option<TimeSlot>,
    /// Stored as epoch milliseconds so it sorts numerically.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub registration_date: DateTime<Utc>,
}

impl Registration {
    pub fn stamp(form: RegistrationForm, registration_date: DateTime<Utc>) -> Self {
        Self {
            name: form.name,
            email: form.email,
            phone: form.phone,
            plan: form.plan,
            preferred_date: form.preferred_date,
            preferred_time: form.preferred_time,
            registration_date,
        }
    }
}

impl Record for Registration {
    const COLLECTION: Collection = Collection::Registrations;
    const SORT_FIELD: &'static str = "registrationDate";
    const SORT: SortDirection = SortDirection::Descending;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
