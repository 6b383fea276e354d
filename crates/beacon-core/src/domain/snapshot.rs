//! Work-item snapshots and the before/after change event.
//!
//! The document store emits one `ChangeEvent` per write. Snapshots are
//! captured by the store and never mutated afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::NotifyError;

/// Work-item category (one watched collection per category).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Alignment queue: broadcast to the aligner/manager role group.
    Alignment,

    /// Service jobs: targeted at the assigned mechanic.
    Service,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Alignment => "alignment",
            Category::Service => "service",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A captured work-item record.
///
/// Field names follow the document store (`licensePlate`, `carModel`, ...).
/// The legacy service field names `assignedMechanic` / `serviceDescription`
/// are accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemSnapshot {
    pub category: Category,
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_model: Option<String>,

    #[serde(default, alias = "assignedMechanic", skip_serializing_if = "Option::is_none")]
    pub assigned_worker: Option<String>,

    #[serde(default, alias = "serviceDescription", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl WorkItemSnapshot {
    pub fn new(category: Category, status: impl Into<String>) -> Self {
        Self {
            category,
            status: status.into(),
            license_plate: None,
            car_model: None,
            assigned_worker: None,
            description: None,
        }
    }

    pub fn alignment(status: impl Into<String>) -> Self {
        Self::new(Category::Alignment, status)
    }

    pub fn service(status: impl Into<String>) -> Self {
        Self::new(Category::Service, status)
    }

    pub fn with_vehicle(mut self, model: impl Into<String>, plate: impl Into<String>) -> Self {
        self.car_model = Some(model.into());
        self.license_plate = Some(plate.into());
        self
    }

    pub fn with_assignee(mut self, worker: impl Into<String>) -> Self {
        self.assigned_worker = Some(worker.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Assigned worker as stored. Empty or whitespace-only means unassigned.
    pub fn assignee(&self) -> Option<&str> {
        self.assigned_worker
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }
}

/// A before/after pair for one write to a watched collection.
///
/// Invariants (checked at construction and on deserialize):
/// - at least one side is present
/// - both sides, when present, share one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawChangeEvent")]
pub struct ChangeEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    document_id: Option<String>,
    before: Option<WorkItemSnapshot>,
    after: Option<WorkItemSnapshot>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChangeEvent {
    #[serde(default)]
    document_id: Option<String>,
    #[serde(default)]
    before: Option<WorkItemSnapshot>,
    #[serde(default)]
    after: Option<WorkItemSnapshot>,
}

impl TryFrom<RawChangeEvent> for ChangeEvent {
    type Error = NotifyError;

    fn try_from(raw: RawChangeEvent) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.before, raw.after)?.with_document_id_opt(raw.document_id))
    }
}

impl ChangeEvent {
    pub fn new(
        before: Option<WorkItemSnapshot>,
        after: Option<WorkItemSnapshot>,
    ) -> Result<Self, NotifyError> {
        match (&before, &after) {
            (None, None) => {
                return Err(NotifyError::InvalidEvent(
                    "change event has neither a before nor an after snapshot".to_string(),
                ));
            }
            (Some(b), Some(a)) if b.category != a.category => {
                return Err(NotifyError::InvalidEvent(format!(
                    "change event mixes categories: before={} after={}",
                    b.category, a.category
                )));
            }
            _ => {}
        }
        Ok(Self {
            document_id: None,
            before,
            after,
        })
    }

    /// Record created.
    pub fn created(after: WorkItemSnapshot) -> Self {
        Self {
            document_id: None,
            before: None,
            after: Some(after),
        }
    }

    /// Record updated.
    pub fn updated(
        before: WorkItemSnapshot,
        after: WorkItemSnapshot,
    ) -> Result<Self, NotifyError> {
        Self::new(Some(before), Some(after))
    }

    /// Record deleted.
    pub fn deleted(before: WorkItemSnapshot) -> Self {
        Self {
            document_id: None,
            before: Some(before),
            after: None,
        }
    }

    pub fn with_document_id(self, document_id: impl Into<String>) -> Self {
        self.with_document_id_opt(Some(document_id.into()))
    }

    fn with_document_id_opt(mut self, document_id: Option<String>) -> Self {
        self.document_id = document_id;
        self
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn before(&self) -> Option<&WorkItemSnapshot> {
        self.before.as_ref()
    }

    pub fn after(&self) -> Option<&WorkItemSnapshot> {
        self.after.as_ref()
    }

    pub fn is_deletion(&self) -> bool {
        self.after.is_none()
    }

    pub fn category(&self) -> Category {
        // at least one side is present (checked at construction)
        self.after
            .as_ref()
            .or(self.before.as_ref())
            .map(|snapshot| snapshot.category)
            .unwrap_or(Category::Alignment)
    }
}
