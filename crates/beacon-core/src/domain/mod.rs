//! Domain model (snapshots, tokens, messages, outcomes, ids, errors).

pub mod errors;
pub mod ids;
pub mod message;
pub mod outcome;
pub mod snapshot;
pub mod token;

pub use errors::{GatewayError, NotifyError, RegistryError};
pub use ids::DispatchId;
pub use message::NotificationMessage;
pub use outcome::{
    CODE_INVALID_TOKEN, CODE_NOT_REGISTERED, DeliveryOutcome, DeliveryReport, DispatchOutcome,
    FailureClass, ReconcileReport, SkipReason,
};
pub use snapshot::{Category, ChangeEvent, WorkItemSnapshot};
pub use token::{PushToken, RecipientQuery, RecipientToken, Role};
