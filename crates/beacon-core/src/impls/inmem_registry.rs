//! InMemoryTokenRegistry - 開発・テスト用の token registry
//!
//! # 実装詳細
//! - `RwLock<HashMap<PushToken, RecipientToken>>`（キーはトークン文字列）
//! - query の結果はトークン順に並べて返す（決定的にするため）
//! - 受け付けた query を記録する（「query していない」をテストで確かめるため）
//! - upsert はクライアント登録の代わり。`updated_at` を clock で刻む

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{PushToken, RecipientQuery, RecipientToken, RegistryError};
use crate::ports::{Clock, SystemClock, TokenRegistry};

pub struct InMemoryTokenRegistry {
    entries: RwLock<HashMap<PushToken, RecipientToken>>,
    queries: Mutex<Vec<RecipientQuery>>,
    rejected_deletes: Mutex<HashSet<PushToken>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryTokenRegistry {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            queries: Mutex::new(Vec::new()),
            rejected_deletes: Mutex::new(HashSet::new()),
            clock,
        }
    }

    /// `entry.token` をキーに追加または置き換え
    pub async fn upsert(&self, mut entry: RecipientToken) {
        entry.updated_at = Some(self.clock.now());
        self.entries.write().await.insert(entry.token.clone(), entry);
    }

    /// JSON 配列を読み込んで upsert し、件数を返す
    pub async fn seed_from_json(&self, input: &str) -> Result<usize, RegistryError> {
        let entries: Vec<RecipientToken> = serde_json::from_str(input)
            .map_err(|e| RegistryError::Rejected(format!("token seed: {e}")))?;
        let count = entries.len();
        for entry in entries {
            self.upsert(entry).await;
        }
        Ok(count)
    }

    /// 以後 `token` の delete を失敗させる（registry の書き込みエラーの代わり）
    pub async fn reject_deletes_for(&self, token: PushToken) {
        self.rejected_deletes.lock().await.insert(token);
    }

    pub async fn contains(&self, token: &PushToken) -> bool {
        self.entries.read().await.contains_key(token)
    }

    pub async fn get(&self, token: &PushToken) -> Option<RecipientToken> {
        self.entries.read().await.get(token).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// 登録済みトークン（ソート済み）
    pub async fn tokens(&self) -> Vec<PushToken> {
        let mut tokens: Vec<PushToken> = self.entries.read().await.keys().cloned().collect();
        tokens.sort();
        tokens
    }

    /// これまでに受けた query（到着順）
    pub async fn queries(&self) -> Vec<RecipientQuery> {
        self.queries.lock().await.clone()
    }
}

impl Default for InMemoryTokenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRegistry for InMemoryTokenRegistry {
    async fn query(&self, query: &RecipientQuery) -> Result<Vec<RecipientToken>, RegistryError> {
        self.queries.lock().await.push(query.clone());

        let mut found: Vec<RecipientToken> = self
            .entries
            .read()
            .await
            .values()
            .filter(|entry| query.matches(entry))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.token.cmp(&b.token));
        Ok(found)
    }

    async fn delete(&self, token: &PushToken) -> Result<(), RegistryError> {
        if self.rejected_deletes.lock().await.contains(token) {
            return Err(RegistryError::Rejected(format!("delete of {token} refused")));
        }
        self.entries.write().await.remove(token);
        Ok(())
    }
}
