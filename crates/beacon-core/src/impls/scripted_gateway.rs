//! ScriptedPushGateway - テスト用の push gateway
//!
//! トークンごとのエラーコードをあらかじめ仕込んでおき、その通りに応答します。
//! 受け取った batch はすべて記録します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{GatewayError, PushToken};
use crate::ports::{MulticastMessage, MulticastResponse, PushGateway, SendResponse};

#[derive(Default)]
struct Script {
    failures: HashMap<PushToken, String>,
    batch_error: Option<String>,
    drop_last_response: bool,
}

#[derive(Default)]
pub struct ScriptedPushGateway {
    script: Mutex<Script>,
    sent: Mutex<Vec<MulticastMessage>>,
}

impl ScriptedPushGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// `token` への送信を `code` 付きで失敗させる
    pub async fn fail_token(&self, token: impl Into<PushToken>, code: impl Into<String>) {
        self.script
            .lock()
            .await
            .failures
            .insert(token.into(), code.into());
    }

    /// 以後の batch 送信をまるごと失敗させる
    pub async fn fail_batch(&self, reason: impl Into<String>) {
        self.script.lock().await.batch_error = Some(reason.into());
    }

    /// 送ったトークンより 1 件少ない response を返す
    pub async fn drop_last_response(&self) {
        self.script.lock().await.drop_last_response = true;
    }

    pub async fn sent(&self) -> Vec<MulticastMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl PushGateway for ScriptedPushGateway {
    async fn send_multicast(
        &self,
        message: &MulticastMessage,
    ) -> Result<MulticastResponse, GatewayError> {
        self.sent.lock().await.push(message.clone());

        let script = self.script.lock().await;
        if let Some(reason) = &script.batch_error {
            return Err(GatewayError::Request(reason.clone()));
        }

        let mut responses: Vec<SendResponse> = message
            .tokens
            .iter()
            .map(|token| match script.failures.get(token) {
                Some(code) => SendResponse::err(code.clone()),
                None => SendResponse::ok(),
            })
            .collect();
        if script.drop_last_response {
            responses.pop();
        }

        Ok(MulticastResponse::from_responses(responses))
    }
}
