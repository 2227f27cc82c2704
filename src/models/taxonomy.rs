//! Category / activity records and the bodies sent to mutate them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::UtcStamp;

/// A category or an activity as listed by the server.
///
/// `active` is optional on the wire: older records predate the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyItem {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<UtcStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<UtcStamp>,
}

impl TaxonomyItem {
    pub fn is_active(&self, legacy_default: bool) -> bool {
        self.active.unwrap_or(legacy_default)
    }
}

/// Partial update. Doubles as the local optimistic patch and the PATCH body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl TaxonomyPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn active(active: bool) -> Self {
        Self {
            active: Some(active),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.active.is_none()
    }

    pub fn touches_sort_key(&self) -> bool {
        self.name.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyCreate {
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusFilter {
    All,
    #[default]
    Active,
    Inactive,
}

impl StatusFilter {
    /// Query value for `?status=`; `All` means no filter at all.
    pub fn as_query(&self) -> Option<&'static str> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Active => Some("ACTIVE"),
            StatusFilter::Inactive => Some("INACTIVE"),
        }
    }

    pub fn admits(&self, active: bool) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => active,
            StatusFilter::Inactive => !active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaxonomyKind {
    Categories,
    Activities,
}

impl TaxonomyKind {
    pub fn singular(&self) -> &'static str {
        match self {
            TaxonomyKind::Categories => "Category",
            TaxonomyKind::Activities => "Activity",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            TaxonomyKind::Categories => "Categories",
            TaxonomyKind::Activities => "Activities",
        }
    }
}

impl fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural())
    }
}
