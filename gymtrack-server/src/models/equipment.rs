//! Sports-equipment inspection log

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use gymtrack_core::config::CatalogSection;
use gymtrack_core::{timestamp_string, Filter, QueryDescriptor};

use super::validation::{optional, required};
use super::ValidationError;

/// Collection holding inspections
pub const EQUIPMENT: &str = "gymEquipment";

/// Sort field of inspections
pub const REVIEW_DATE: &str = "reviewDate";

const MAX_NAME_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 2000;

/// Condition observed during an inspection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    #[default]
    Good,
    Fair,
    Poor,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_lowercase().as_str() {
            "good" => Ok(Self::Good),
            "fair" => Ok(Self::Fair),
            "poor" => Ok(Self::Poor),
            _ => Err(ValidationError::InvalidVariant {
                field: "condition",
                value: s.to_owned(),
            }),
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Good, Self::Fair, Self::Poor]
    }
}

/// Stored inspection document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    #[serde(default)]
    pub id: String,
    /// `YYYY-MM-DD`
    pub review_date: String,
    pub instructor: String,
    pub branch: String,
    pub item: String,
    pub condition: Condition,
    #[serde(default)]
    pub damage: String,
    #[serde(default)]
    pub recommended_actions: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: String,
}

/// Inspection form as submitted
#[derive(Debug, Clone, Deserialize)]
pub struct InspectionRequest {
    /// Defaults to today
    #[serde(default)]
    pub review_date: Option<String>,
    pub instructor: String,
    pub branch: String,
    pub item: String,
    /// Defaults to good
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub damage: Option<String>,
    #[serde(default)]
    pub recommended_actions: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Inspection {
    /// Validate a submitted form against the catalog.
    pub fn from_request(
        req: &InspectionRequest,
        catalog: &CatalogSection,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let review_date = match req.review_date.as_deref().map(str::trim) {
            None | Some("") => today,
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                ValidationError::InvalidFormat {
                    field: "review_date",
                    reason: "must be formatted as YYYY-MM-DD",
                }
            })?,
        };
        let instructor = required("instructor", &req.instructor, MAX_NAME_LEN)?;
        let branch = catalog_entry("branch", &req.branch, catalog.has_branch(req.branch.trim()))?;
        let item = catalog_entry("item", &req.item, catalog.has_equipment(req.item.trim()))?;
        let condition = match req.condition.as_deref() {
            None => Condition::default(),
            Some(s) => Condition::parse(s)?,
        };

        Ok(Self {
            id: String::new(),
            review_date: review_date.format("%Y-%m-%d").to_string(),
            instructor,
            branch,
            item,
            condition,
            damage: text("damage", req.damage.as_deref())?,
            recommended_actions: text("recommended_actions", req.recommended_actions.as_deref())?,
            notes: text("notes", req.notes.as_deref())?,
            created_at: timestamp_string(now),
        })
    }
}

fn catalog_entry(field: &'static str, value: &str, known: bool) -> Result<String, ValidationError> {
    let value = required(field, value, MAX_NAME_LEN)?;
    if !known {
        return Err(ValidationError::InvalidVariant { field, value });
    }
    Ok(value)
}

fn text(field: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    Ok(optional(field, value, MAX_TEXT_LEN)?.unwrap_or_default())
}

/// Condition change
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionUpdate {
    pub condition: String,
}

/// Optional equality filters of the inspection list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentFilter {
    pub branch: Option<String>,
    pub condition: Option<String>,
    pub item: Option<String>,
}

impl EquipmentFilter {
    /// Store predicates; blank values are ignored.
    pub fn to_filters(&self) -> Result<Vec<Filter>, ValidationError> {
        let mut filters = Vec::new();
        if let Some(branch) = non_blank(&self.branch) {
            filters.push(Filter::eq("branch", branch));
        }
        if let Some(condition) = non_blank(&self.condition) {
            filters.push(Filter::eq("condition", Condition::parse(condition)?.as_str()));
        }
        if let Some(item) = non_blank(&self.item) {
            filters.push(Filter::eq("item", item));
        }
        Ok(filters)
    }

    /// Dataset of matching inspections, latest review first.
    pub fn descriptor(&self, page_size: usize) -> Result<QueryDescriptor, ValidationError> {
        Ok(QueryDescriptor::new(EQUIPMENT, REVIEW_DATE)
            .filters(self.to_filters()?)
            .page_size(page_size))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Number of inspections per condition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConditionCounts {
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
}

impl ConditionCounts {
    pub fn tally<'a>(conditions: impl IntoIterator<Item = &'a Condition>) -> Self {
        conditions
            .into_iter()
            .fold(Self::default(), |mut counts, condition| {
                match condition {
                    Condition::Good => counts.good += 1,
                    Condition::Fair => counts.fair += 1,
                    Condition::Poor => counts.poor += 1,
                }
                counts
            })
    }
}
