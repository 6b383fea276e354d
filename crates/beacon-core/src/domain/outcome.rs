//! Outcome model: per-token delivery results and per-event dispatch results.
//!
//! `DeliveryOutcome` is what the gateway said about one token.
//! `DispatchOutcome` is what the engine did with one change event.

use serde::{Deserialize, Serialize};

use super::token::PushToken;

/// Gateway code for a token that is no longer registered.
pub const CODE_NOT_REGISTERED: &str = "messaging/registration-token-not-registered";

/// Gateway code for a malformed token.
pub const CODE_INVALID_TOKEN: &str = "messaging/invalid-registration-token";

const TRANSIENT_CODES: &[&str] = &[
    "unavailable",
    "internal-error",
    "server-unavailable",
    "quota-exceeded",
    "message-rate-exceeded",
];

/// Classification of a failed delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureClass {
    /// Unregistered or malformed token; safe to delete.
    PermanentlyInvalid,

    /// Gateway-side hiccup; the token itself is fine.
    Transient,

    /// Missing or unrecognized error code.
    Other,
}

impl FailureClass {
    /// Classify a gateway error code. The `messaging/` prefix is optional.
    pub fn from_error_code(code: Option<&str>) -> Self {
        let Some(code) = code else {
            return FailureClass::Other;
        };
        let code = code.trim();
        let bare = code.strip_prefix("messaging/").unwrap_or(code);

        if bare == bare_code(CODE_NOT_REGISTERED) || bare == bare_code(CODE_INVALID_TOKEN) {
            FailureClass::PermanentlyInvalid
        } else if TRANSIENT_CODES.contains(&bare) {
            FailureClass::Transient
        } else {
            FailureClass::Other
        }
    }

    pub fn is_permanent(self) -> bool {
        self == FailureClass::PermanentlyInvalid
    }
}

fn bare_code(code: &'static str) -> &'static str {
    code.strip_prefix("messaging/").unwrap_or(code)
}

/// Result of delivering to one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered,
    Failed {
        class: FailureClass,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
}

impl DeliveryOutcome {
    pub fn failed(code: Option<String>) -> Self {
        DeliveryOutcome::Failed {
            class: FailureClass::from_error_code(code.as_deref()),
            code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }

    pub fn failure_class(&self) -> Option<FailureClass> {
        match self {
            DeliveryOutcome::Delivered => None,
            DeliveryOutcome::Failed { class, .. } => Some(*class),
        }
    }
}

/// Why an event produced no notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// `after` is absent.
    Deleted,

    /// The write was not an edge into the triggering state.
    NotQualifying,
}

/// Registry cleanup after a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Tokens removed from the registry.
    pub deleted: Vec<PushToken>,

    /// Tokens whose deletion failed (left for the next failed send to prune).
    pub failed: Vec<PushToken>,
}

/// Summary of one multicast send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub recipients: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub transient_failures: usize,
    pub reconcile: ReconcileReport,
}

/// What the engine did with one change event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Skipped { reason: SkipReason },
    NoRecipients,
    Delivered(DeliveryReport),
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered(_))
    }

    pub fn report(&self) -> Option<&DeliveryReport> {
        match self {
            DispatchOutcome::Delivered(report) => Some(report),
            _ => None,
        }
    }
}
