//! NotificationEngine - 1 イベントの処理パイプライン
//!
//! # フロー
//! 1. Trigger: qualifying transition か判定（削除・非該当は no-op）
//! 2. Resolver: registry から宛先トークンを引く（空なら no-op）
//! 3. Composer: メッセージを組み立てる
//! 4. Dispatcher: 1 回の multicast で送る
//! 5. Reconciler: 恒久的に無効なトークンを消す
//!
//! 各ステップは直列。並行するのは 5 の削除だけです。
//! エンジンはイベントをまたぐ状態を持たないので、`Arc` で共有して
//! 別々のイベントを並行に処理できます。

use std::sync::Arc;

use tracing::{Instrument, debug, info, info_span};

use super::composer::compose;
use super::dispatcher::Dispatcher;
use super::reconciler::Reconciler;
use super::resolver::{Resolver, recipient_query};
use super::trigger;
use crate::config::NotifierConfig;
use crate::domain::{
    ChangeEvent, DeliveryReport, DispatchOutcome, NotifyError, PushToken, ReconcileReport,
    SkipReason,
};
use crate::ports::IdGenerator;

pub struct NotificationEngine {
    config: NotifierConfig,
    resolver: Resolver,
    dispatcher: Dispatcher,
    reconciler: Reconciler,
    ids: Arc<dyn IdGenerator>,
}

impl NotificationEngine {
    pub(crate) fn new(
        config: NotifierConfig,
        resolver: Resolver,
        dispatcher: Dispatcher,
        reconciler: Reconciler,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            config,
            resolver,
            dispatcher,
            reconciler,
            ids,
        }
    }

    /// 1 イベントを処理する
    ///
    /// # エラー
    /// - `NotifyError::Registry`: 宛先の query が失敗した
    /// - `NotifyError::Gateway`: batch 送信そのものが失敗した
    ///
    /// トークン単位の失敗はエラーにしない
    pub async fn handle(&self, event: &ChangeEvent) -> Result<DispatchOutcome, NotifyError> {
        let dispatch_id = self.ids.generate_dispatch_id();
        let span = info_span!(
            "dispatch",
            %dispatch_id,
            category = %event.category(),
            document_id = event.document_id().unwrap_or("-")
        );
        self.run(event).instrument(span).await
    }

    async fn run(&self, event: &ChangeEvent) -> Result<DispatchOutcome, NotifyError> {
        if event.is_deletion() {
            debug!("record deleted, ignoring");
            return Ok(DispatchOutcome::Skipped {
                reason: SkipReason::Deleted,
            });
        }

        let category = event.category();
        let Some(after) = trigger::evaluate(event, &self.config.trigger) else {
            debug!("not a qualifying transition");
            return Ok(DispatchOutcome::Skipped {
                reason: SkipReason::NotQualifying,
            });
        };
        let Some(query) = recipient_query(category, after, &self.config.recipients) else {
            return Ok(DispatchOutcome::Skipped {
                reason: SkipReason::NotQualifying,
            });
        };

        info!(
            plate = after.license_plate.as_deref().unwrap_or("-"),
            assignee = after.assignee().unwrap_or("-"),
            "qualifying transition"
        );

        let recipients = self.resolver.resolve(&query).await?;
        if recipients.is_empty() {
            info!(
                username = query.username.as_deref().unwrap_or("-"),
                "no registered recipients"
            );
            return Ok(DispatchOutcome::NoRecipients);
        }

        let tokens: Vec<PushToken> = recipients.into_iter().map(|r| r.token).collect();
        let message = compose(category, after, &self.config);
        let delivery = self.dispatcher.dispatch(&tokens, &message).await?;

        let reconcile = if delivery.failure_count > 0 {
            self.reconciler.reconcile(&tokens, &delivery.outcomes).await
        } else {
            ReconcileReport::default()
        };

        let transient_failures = delivery
            .outcomes
            .iter()
            .filter(|o| o.failure_class().is_some_and(|class| !class.is_permanent()))
            .count();
        info!(
            recipients = tokens.len(),
            success_count = delivery.success_count,
            failure_count = delivery.failure_count,
            pruned = reconcile.deleted.len(),
            "notification sent"
        );

        Ok(DispatchOutcome::Delivered(DeliveryReport {
            recipients: tokens.len(),
            success_count: delivery.success_count,
            failure_count: delivery.failure_count,
            transient_failures,
            reconcile,
        }))
    }
}
