use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata every resource document carries.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Name of the resource document. Not the broker-side name.
    pub name: String,

    /// Free form annotations, including the external name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    /// Set once deletion of the resource was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_timestamp: Option<DateTime<Utc>>,
}

impl ObjectMeta {
    /// Creates metadata with no annotations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: BTreeMap::new(),
            deletion_timestamp: None,
        }
    }

    /// Whether deletion was requested.
    #[must_use]
    pub const fn is_deleting(&self) -> bool {
        self.deletion_timestamp.is_some()
    }

    /// Adds an annotation.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }
}

/// Kind of condition.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ConditionType {
    /// Whether the broker-side object is usable.
    Ready,

    /// Whether the last reconcile of the spec succeeded.
    Synced,
}

/// Status of a condition.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ConditionStatus {
    /// Condition holds.
    True,

    /// Condition does not hold.
    False,

    /// Not known yet.
    Unknown,
}

/// Machine readable reason for a condition.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ConditionReason {
    /// The object exists and matches the spec.
    Available,

    /// The object does not exist or could not be observed.
    Unavailable,

    /// The object is being deleted.
    Deleting,

    /// The last create, update or delete succeeded.
    ReconcileSuccess,

    /// The last create, update or delete failed.
    ReconcileError,
}

/// A status condition.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Kind of condition.
    #[serde(rename = "type")]
    pub kind: ConditionType,

    /// Whether it holds.
    pub status: ConditionStatus,

    /// Why.
    pub reason: ConditionReason,

    /// Human readable detail, usually an error message.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// When this condition was recorded.
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    fn new(kind: ConditionType, status: ConditionStatus, reason: ConditionReason) -> Self {
        Self {
            kind,
            status,
            reason,
            message: String::new(),
            last_transition_time: Utc::now(),
        }
    }

    /// `Ready=True`, the object exists and is up to date.
    #[must_use]
    pub fn available() -> Self {
        Self::new(
            ConditionType::Ready,
            ConditionStatus::True,
            ConditionReason::Available,
        )
    }

    /// `Ready=False`, the object is missing or could not be observed.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(
            ConditionType::Ready,
            ConditionStatus::False,
            ConditionReason::Unavailable,
        )
    }

    /// `Ready=False`, the object is being deleted.
    #[must_use]
    pub fn deleting() -> Self {
        Self::new(
            ConditionType::Ready,
            ConditionStatus::False,
            ConditionReason::Deleting,
        )
    }

    /// `Synced=True`.
    #[must_use]
    pub fn reconcile_success() -> Self {
        Self::new(
            ConditionType::Synced,
            ConditionStatus::True,
            ConditionReason::ReconcileSuccess,
        )
    }

    /// `Synced=False` carrying the error text.
    #[must_use]
    pub fn reconcile_error(error: &impl Display) -> Self {
        Self::new(
            ConditionType::Synced,
            ConditionStatus::False,
            ConditionReason::ReconcileError,
        )
        .with_message(error)
    }

    /// Attaches a message.
    #[must_use]
    pub fn with_message(mut self, message: &impl Display) -> Self {
        self.message = message.to_string();
        self
    }
}

/// Status block of a resource: conditions plus what was last observed on
/// the broker.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status<O> {
    /// All conditions recorded so far, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Observed broker-side state.
    #[serde(default)]
    pub at_provider: O,
}

impl<O> Status<O> {
    /// Records conditions. Earlier conditions are kept.
    pub fn set_conditions(&mut self, conditions: impl IntoIterator<Item = Condition>) {
        self.conditions.extend(conditions);
    }

    /// The most recent condition of a kind.
    pub fn condition(&self, kind: ConditionType) -> Option<&Condition> {
        self.conditions.iter().rev().find(|c| c.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conditions_accumulate() {
        let mut status = Status::<()>::default();

        status.set_conditions([Condition::unavailable()]);
        status.set_conditions([Condition::reconcile_success()]);
        status.set_conditions([Condition::available()]);

        assert_eq!(status.conditions.len(), 3);
        assert_eq!(
            status.condition(ConditionType::Ready).unwrap().reason,
            ConditionReason::Available
        );
        assert_eq!(
            status.condition(ConditionType::Synced).unwrap().status,
            ConditionStatus::True
        );
    }

    #[test]
    fn test_reconcile_error_carries_message() {
        let condition = Condition::reconcile_error(&"boom");

        assert_eq!(condition.kind, ConditionType::Synced);
        assert_eq!(condition.status, ConditionStatus::False);
        assert_eq!(condition.message, "boom");
    }

    #[test]
    fn test_condition_wire_form() {
        let json = serde_json::to_value(Condition::available()).unwrap();

        assert_eq!(json["type"], "Ready");
        assert_eq!(json["status"], "True");
        assert_eq!(json["reason"], "Available");
        assert!(json.get("message").is_none());
        assert!(json.get("lastTransitionTime").is_some());
    }

    #[test]
    fn test_annotations() {
        let meta = ObjectMeta::new("orders").with_annotation("team", "payments");

        assert_eq!(meta.annotations.get("team").map(String::as_str), Some("payments"));
    }
}
