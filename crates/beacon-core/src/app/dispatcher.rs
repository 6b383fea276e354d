//! Dispatcher - 1 回の multicast 送信
//!
//! # 契約
//! - 全トークンを 1 回の gateway 呼び出しで送る
//! - 戻り値の outcome は入力トークンと同じ長さ・同じ順序
//! - トークンが空なら gateway を呼ばない（no-op）

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{DeliveryOutcome, GatewayError, NotificationMessage, PushToken};
use crate::ports::{MulticastMessage, PushGateway};

/// Delivery は 1 batch の結果（outcomes はトークンと同じ index）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    pub outcomes: Vec<DeliveryOutcome>,
    pub success_count: usize,
    pub failure_count: usize,
}

impl Delivery {
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

pub struct Dispatcher {
    gateway: Arc<dyn PushGateway>,
}

impl Dispatcher {
    pub fn new(gateway: Arc<dyn PushGateway>) -> Self {
        Self { gateway }
    }

    pub async fn dispatch(
        &self,
        tokens: &[PushToken],
        message: &NotificationMessage,
    ) -> Result<Delivery, GatewayError> {
        if tokens.is_empty() {
            debug!("no tokens, skipping gateway call");
            return Ok(Delivery::default());
        }

        let request = MulticastMessage::new(tokens.to_vec(), message);
        let response = self.gateway.send_multicast(&request).await?;

        // index 対応が崩れていたら失敗をトークンに戻せない
        if response.responses.len() != tokens.len() {
            return Err(GatewayError::MisalignedResponse {
                expected: tokens.len(),
                actual: response.responses.len(),
            });
        }

        let outcomes: Vec<DeliveryOutcome> = response
            .responses
            .into_iter()
            .map(|r| {
                if r.success {
                    DeliveryOutcome::Delivered
                } else {
                    DeliveryOutcome::failed(r.error)
                }
            })
            .collect();

        let success_count = outcomes.iter().filter(|o| o.is_success()).count();
        let failure_count = outcomes.len() - success_count;
        if success_count != response.success_count || failure_count != response.failure_count {
            warn!(
                reported_success = response.success_count,
                reported_failure = response.failure_count,
                success_count,
                failure_count,
                "gateway counts disagree with per-token responses"
            );
        }

        Ok(Delivery {
            outcomes,
            success_count,
            failure_count,
        })
    }
}
