//! Reconciler - 恒久的に無効なトークンを registry から消す
//!
//! # フロー
//! 1. outcome を index でトークンに対応付ける
//! 2. `PermanentlyInvalid` に分類されたものだけを削除対象にする
//! 3. 削除はトークンごとに task を spawn して並行実行し、全部を join する
//!
//! 1 件の削除失敗は他の削除を止めず、巻き戻しもしない。
//! transient / other の失敗は触らない（リトライもしない）。

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::{self, JoinSet};
use tracing::{debug, info, warn};

use crate::domain::{DeliveryOutcome, FailureClass, PushToken, ReconcileReport};
use crate::ports::TokenRegistry;

/// FailedDelivery は失敗した outcome とトークンの対応
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDelivery<'a> {
    pub index: usize,
    pub token: &'a PushToken,
    pub class: FailureClass,
}

/// 失敗した位置をすべて返す（分類は問わない）
pub fn failed_deliveries<'a>(
    tokens: &'a [PushToken],
    outcomes: &[DeliveryOutcome],
) -> Vec<FailedDelivery<'a>> {
    tokens
        .iter()
        .zip(outcomes)
        .enumerate()
        .filter_map(|(index, (token, outcome))| {
            outcome.failure_class().map(|class| FailedDelivery {
                index,
                token,
                class,
            })
        })
        .collect()
}

/// 削除してよいトークン（`PermanentlyInvalid` のみ）
pub fn invalid_tokens(tokens: &[PushToken], outcomes: &[DeliveryOutcome]) -> Vec<PushToken> {
    failed_deliveries(tokens, outcomes)
        .into_iter()
        .filter(|failed| failed.class.is_permanent())
        .map(|failed| failed.token.clone())
        .collect()
}

pub struct Reconciler {
    registry: Arc<dyn TokenRegistry>,
}

impl Reconciler {
    pub fn new(registry: Arc<dyn TokenRegistry>) -> Self {
        Self { registry }
    }

    pub async fn reconcile(
        &self,
        tokens: &[PushToken],
        outcomes: &[DeliveryOutcome],
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for failed in failed_deliveries(tokens, outcomes)
            .into_iter()
            .filter(|failed| !failed.class.is_permanent())
        {
            debug!(
                index = failed.index,
                token = %failed.token,
                class = ?failed.class,
                "leaving token after non-permanent failure"
            );
        }

        let to_delete = invalid_tokens(tokens, outcomes);
        if to_delete.is_empty() {
            return report;
        }

        // panic した task のトークンも failed に入れるため id で引けるようにしておく
        let mut deletions = JoinSet::new();
        let mut in_flight: HashMap<task::Id, PushToken> = HashMap::with_capacity(to_delete.len());
        for token in to_delete {
            let registry = Arc::clone(&self.registry);
            let target = token.clone();
            let handle = deletions.spawn(async move { registry.delete(&target).await });
            in_flight.insert(handle.id(), token);
        }

        while let Some(joined) = deletions.join_next_with_id().await {
            let (id, result) = match joined {
                Ok((id, result)) => (id, result.map_err(|e| e.to_string())),
                Err(e) => (e.id(), Err(format!("deletion task did not complete: {e}"))),
            };
            let Some(token) = in_flight.remove(&id) else {
                continue;
            };
            match result {
                Ok(()) => {
                    debug!(token = %token, "deleted invalid token");
                    report.deleted.push(token);
                }
                Err(error) => {
                    warn!(token = %token, %error, "failed to delete invalid token");
                    report.failed.push(token);
                }
            }
        }

        // join 順は不定なので並べ直す
        report.deleted.sort();
        report.failed.sort();

        info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "pruned invalid tokens"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Barrier;

    use crate::domain::{
        CODE_INVALID_TOKEN, CODE_NOT_REGISTERED, RecipientQuery, RecipientToken, RegistryError,
        Role,
    };
    use crate::impls::InMemoryTokenRegistry;

    /// delete が全員そろうまで待つ registry（直列に削除すると永遠に待つ）
    struct RendezvousRegistry {
        barrier: Barrier,
        panic_on: Option<PushToken>,
    }

    impl RendezvousRegistry {
        fn new(parties: usize) -> Self {
            Self {
                barrier: Barrier::new(parties),
                panic_on: None,
            }
        }

        fn panicking_on(mut self, token: PushToken) -> Self {
            self.panic_on = Some(token);
            self
        }
    }

    #[async_trait]
    impl TokenRegistry for RendezvousRegistry {
        async fn query(
            &self,
            _query: &RecipientQuery,
        ) -> Result<Vec<RecipientToken>, RegistryError> {
            Ok(Vec::new())
        }

        async fn delete(&self, token: &PushToken) -> Result<(), RegistryError> {
            self.barrier.wait().await;
            if self.panic_on.as_ref() == Some(token) {
                panic!("registry connection dropped");
            }
            Ok(())
        }
    }

    fn not_registered(n: usize) -> Vec<DeliveryOutcome> {
        (0..n)
            .map(|_| DeliveryOutcome::failed(Some(CODE_NOT_REGISTERED.to_string())))
            .collect()
    }

    fn tokens(n: usize) -> Vec<PushToken> {
        (0..n).map(|i| PushToken::new(format!("tok-{i}"))).collect()
    }

    async fn registry_with(tokens: &[PushToken]) -> Arc<InMemoryTokenRegistry> {
        let registry = Arc::new(InMemoryTokenRegistry::new());
        for token in tokens {
            registry
                .upsert(RecipientToken::new(token.clone(), Role::Aligner))
                .await;
        }
        registry
    }

    #[test]
    fn failures_map_back_by_index() {
        let tokens = tokens(5);
        let outcomes = vec![
            DeliveryOutcome::Delivered,
            DeliveryOutcome::failed(Some(CODE_NOT_REGISTERED.to_string())),
            DeliveryOutcome::Delivered,
            DeliveryOutcome::failed(Some("messaging/unavailable".to_string())),
            DeliveryOutcome::Delivered,
        ];

        let failed = failed_deliveries(&tokens, &outcomes);
        let indices: Vec<usize> = failed.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![1, 3]);
        assert_eq!(failed[0].token, &tokens[1]);
        assert_eq!(failed[1].token, &tokens[3]);

        assert_eq!(invalid_tokens(&tokens, &outcomes), vec![tokens[1].clone()]);
    }

    #[tokio::test]
    async fn deletes_only_permanently_invalid_tokens() {
        let tokens = tokens(4);
        let registry = registry_with(&tokens).await;
        let reconciler = Reconciler::new(registry.clone());

        let outcomes = vec![
            DeliveryOutcome::failed(Some(CODE_NOT_REGISTERED.to_string())),
            DeliveryOutcome::failed(Some("messaging/unavailable".to_string())),
            DeliveryOutcome::failed(Some(CODE_INVALID_TOKEN.to_string())),
            DeliveryOutcome::failed(None),
        ];
        let report = reconciler.reconcile(&tokens, &outcomes).await;

        assert_eq!(report.deleted, vec![tokens[0].clone(), tokens[2].clone()]);
        assert!(report.failed.is_empty());
        assert!(!registry.contains(&tokens[0]).await);
        assert!(registry.contains(&tokens[1]).await);
        assert!(!registry.contains(&tokens[2]).await);
        assert!(registry.contains(&tokens[3]).await);
    }

    #[tokio::test]
    async fn one_failed_deletion_does_not_block_the_rest() {
        let tokens = tokens(3);
        let registry = registry_with(&tokens).await;
        registry.reject_deletes_for(tokens[1].clone()).await;
        let reconciler = Reconciler::new(registry.clone());

        let outcomes = vec![
            DeliveryOutcome::failed(Some(CODE_NOT_REGISTERED.to_string())),
            DeliveryOutcome::failed(Some(CODE_NOT_REGISTERED.to_string())),
            DeliveryOutcome::failed(Some(CODE_NOT_REGISTERED.to_string())),
        ];
        let report = reconciler.reconcile(&tokens, &outcomes).await;

        assert_eq!(report.deleted, vec![tokens[0].clone(), tokens[2].clone()]);
        assert_eq!(report.failed, vec![tokens[1].clone()]);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn deleting_twice_matches_deleting_once() {
        let tokens = tokens(2);
        let registry = registry_with(&tokens).await;
        let reconciler = Reconciler::new(registry.clone());
        let outcomes = vec![
            DeliveryOutcome::failed(Some(CODE_NOT_REGISTERED.to_string())),
            DeliveryOutcome::Delivered,
        ];

        let first = reconciler.reconcile(&tokens, &outcomes).await;
        let after_first = registry.tokens().await;
        let second = reconciler.reconcile(&tokens, &outcomes).await;

        assert_eq!(first.deleted, second.deleted);
        assert!(second.failed.is_empty());
        assert_eq!(registry.tokens().await, after_first);
        assert_eq!(after_first, vec![tokens[1].clone()]);
    }

    #[tokio::test]
    async fn all_delivered_touches_nothing() {
        let tokens = tokens(2);
        let registry = registry_with(&tokens).await;
        let reconciler = Reconciler::new(registry.clone());

        let report = reconciler
            .reconcile(&tokens, &[DeliveryOutcome::Delivered, DeliveryOutcome::Delivered])
            .await;

        assert_eq!(report, ReconcileReport::default());
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn deletions_run_concurrently() {
        let tokens = tokens(4);
        let reconciler = Reconciler::new(Arc::new(RendezvousRegistry::new(tokens.len())));

        let report = tokio::time::timeout(
            Duration::from_secs(5),
            reconciler.reconcile(&tokens, &not_registered(tokens.len())),
        )
        .await
        .expect("deletions waited on each other");

        assert_eq!(report.deleted, tokens);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn panicked_deletion_is_reported_as_failed() {
        let tokens = tokens(3);
        let registry = RendezvousRegistry::new(tokens.len()).panicking_on(tokens[1].clone());
        let reconciler = Reconciler::new(Arc::new(registry));

        let report = reconciler
            .reconcile(&tokens, &not_registered(tokens.len()))
            .await;

        assert_eq!(report.deleted, vec![tokens[0].clone(), tokens[2].clone()]);
        assert_eq!(report.failed, vec![tokens[1].clone()]);
    }
}
