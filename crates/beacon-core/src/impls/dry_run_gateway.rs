//! DryRunPushGateway - 実際には送らない gateway
//!
//! メッセージをログに出して、全トークンを成功として返します。
//! CLI のデフォルト。

use async_trait::async_trait;
use tracing::info;

use crate::domain::GatewayError;
use crate::ports::{MulticastMessage, MulticastResponse, PushGateway, SendResponse};

#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunPushGateway;

impl DryRunPushGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PushGateway for DryRunPushGateway {
    async fn send_multicast(
        &self,
        message: &MulticastMessage,
    ) -> Result<MulticastResponse, GatewayError> {
        info!(
            tokens = message.tokens.len(),
            title = %message.notification.title,
            body = %message.notification.body,
            "dry-run multicast"
        );
        Ok(MulticastResponse::from_responses(
            message.tokens.iter().map(|_| SendResponse::ok()).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NotificationMessage, PushToken};

    #[tokio::test]
    async fn reports_success_for_every_token() {
        let message = MulticastMessage::new(
            vec![PushToken::from("a"), PushToken::from("b")],
            &NotificationMessage::new("t", "b"),
        );

        let response = DryRunPushGateway::new().send_multicast(&message).await.unwrap();

        assert_eq!(response.success_count, 2);
        assert_eq!(response.failure_count, 0);
        assert_eq!(response.responses.len(), 2);
    }
}
