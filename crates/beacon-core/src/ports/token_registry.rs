//! TokenRegistry port - 受信者トークンの保管庫
//!
//! 外部の key-value store（device_tokens コレクション）への窓口です。
//!
//! # 設計原則
//! - エンジンが使うのは query と delete だけ（upsert はクライアント登録側の責務）
//! - delete は冪等（存在しないキーの削除は no-op）
//! - query は registry を変更しない

use async_trait::async_trait;

use crate::domain::{PushToken, RecipientQuery, RecipientToken, RegistryError};

#[async_trait]
pub trait TokenRegistry: Send + Sync {
    /// role に含まれ、username 指定があれば一致するエントリを返す
    async fn query(&self, query: &RecipientQuery) -> Result<Vec<RecipientToken>, RegistryError>;

    /// 1 件削除。存在しないキーはエラーにしない
    async fn delete(&self, token: &PushToken) -> Result<(), RegistryError>;
}
