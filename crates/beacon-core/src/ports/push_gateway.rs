//! PushGateway port - multicast push 送信
//!
//! Gateway はブラックボックスとして扱います。
//!
//! # 契約
//! - 1 回の呼び出しで全トークンへ送る
//! - `responses` は `tokens` と同じ長さ・同じ順序（index 対応が前提）

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{GatewayError, NotificationMessage, PushToken};

/// Notification は全プラットフォーム共通の title / body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// WebpushOptions は web push 固有のオプション（icon, クリック時のリンク）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebpushOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// MulticastMessage は 1 回の multicast 送信のリクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulticastMessage {
    pub tokens: Vec<PushToken>,
    pub notification: Notification,
    pub webpush: WebpushOptions,
}

impl MulticastMessage {
    pub fn new(tokens: Vec<PushToken>, message: &NotificationMessage) -> Self {
        Self {
            tokens,
            notification: Notification {
                title: message.title.clone(),
                body: message.body.clone(),
            },
            webpush: WebpushOptions {
                icon: message.icon.clone(),
                link: message.link.clone(),
            },
        }
    }
}

/// SendResponse はトークン 1 件分の結果（`MulticastMessage::tokens` と同じ index）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    pub success: bool,
    /// gateway のエラーコード（例: `messaging/registration-token-not-registered`）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn err(code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(code.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulticastResponse {
    pub success_count: usize,
    pub failure_count: usize,
    pub responses: Vec<SendResponse>,
}

impl MulticastResponse {
    /// 件数は `responses` から数える
    pub fn from_responses(responses: Vec<SendResponse>) -> Self {
        let success_count = responses.iter().filter(|r| r.success).count();
        Self {
            success_count,
            failure_count: responses.len() - success_count,
            responses,
        }
    }
}

#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send_multicast(
        &self,
        message: &MulticastMessage,
    ) -> Result<MulticastResponse, GatewayError>;
}
