//! Errors - エラー型と分類
//!
//! # 分類
//! - **RegistryError**: トークン registry の query/delete 失敗
//! - **GatewayError**: push gateway への batch 送信そのものの失敗
//! - **NotifyError**: エンジン全体のエラー（上の 2 つを包む）
//!
//! 宛先ごとの失敗（無効トークンなど）はエラーではなく `DeliveryOutcome` で表します。

use thiserror::Error;

/// Token registry failure.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry unavailable: {0}")]
    Unavailable(String),

    #[error("registry rejected the request: {0}")]
    Rejected(String),
}

/// Whole-batch push gateway failure.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Request(String),

    #[error("gateway returned {actual} responses for {expected} tokens")]
    MisalignedResponse { expected: usize, actual: usize },
}

/// Engine-level error, surfaced to the hosting runtime.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid change event: {0}")]
    InvalidEvent(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
