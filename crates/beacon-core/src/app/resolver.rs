//! Resolver - qualifying snapshot から宛先トークンを引く
//!
//! - alignment: role グループへの broadcast（identity で絞らない）
//! - service: 担当 mechanic 1 人への targeted query
//!
//! Registry には読み取りしかしません。

use std::sync::Arc;

use tracing::debug;

use crate::config::RecipientConfig;
use crate::domain::{Category, RecipientQuery, RecipientToken, RegistryError, WorkItemSnapshot};
use crate::ports::TokenRegistry;

/// qualifying snapshot から registry への query を組み立てる
///
/// 担当者のいない service snapshot は `None`
pub fn recipient_query(
    category: Category,
    after: &WorkItemSnapshot,
    scoping: &RecipientConfig,
) -> Option<RecipientQuery> {
    match category {
        Category::Alignment => Some(RecipientQuery::broadcast(
            scoping.alignment_roles.iter().cloned(),
        )),
        Category::Service => after
            .assignee()
            .map(|worker| RecipientQuery::targeted(worker, scoping.service_role.clone())),
    }
}

pub struct Resolver {
    registry: Arc<dyn TokenRegistry>,
}

impl Resolver {
    pub fn new(registry: Arc<dyn TokenRegistry>) -> Self {
        Self { registry }
    }

    /// query を実行する。空の結果も正常
    pub async fn resolve(
        &self,
        query: &RecipientQuery,
    ) -> Result<Vec<RecipientToken>, RegistryError> {
        let recipients = self.registry.query(query).await?;
        debug!(
            roles = ?query.roles,
            username = query.username.as_deref().unwrap_or("-"),
            found = recipients.len(),
            "resolved recipients"
        );
        Ok(recipients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::impls::InMemoryTokenRegistry;

    #[test]
    fn alignment_query_is_a_role_broadcast() {
        let after = WorkItemSnapshot::alignment("Awaiting");
        let query = recipient_query(Category::Alignment, &after, &RecipientConfig::default()).unwrap();

        assert_eq!(query.roles, vec![Role::Aligner, Role::Manager]);
        assert!(!query.is_targeted());
    }

    #[test]
    fn service_query_targets_the_assignee() {
        let after = WorkItemSnapshot::service("Pending").with_assignee("maria");
        let query = recipient_query(Category::Service, &after, &RecipientConfig::default()).unwrap();

        assert_eq!(query, RecipientQuery::targeted("maria", Role::Mechanic));
    }

    #[test]
    fn service_query_uses_the_stored_name_verbatim() {
        let after = WorkItemSnapshot::service("Pending").with_assignee("maria ");
        let query = recipient_query(Category::Service, &after, &RecipientConfig::default()).unwrap();

        assert_eq!(query.username.as_deref(), Some("maria "));
    }

    #[test]
    fn unassigned_service_has_no_query() {
        let after = WorkItemSnapshot::service("Pending");
        assert!(recipient_query(Category::Service, &after, &RecipientConfig::default()).is_none());
    }

    #[tokio::test]
    async fn resolve_is_read_only() {
        let registry = Arc::new(InMemoryTokenRegistry::new());
        registry
            .upsert(RecipientToken::new("tok-a", Role::Aligner))
            .await;
        registry
            .upsert(RecipientToken::new("tok-m", Role::Mechanic).with_username("joao"))
            .await;

        let resolver = Resolver::new(registry.clone());
        let found = resolver
            .resolve(&RecipientQuery::broadcast([Role::Aligner, Role::Manager]))
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].token.as_str(), "tok-a");
        assert_eq!(registry.len().await, 2);
    }
}
