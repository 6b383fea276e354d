//! EngineBuilder - エンジンの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターン
//! - 起動時検証（Fail-fast 設計）
//! - 依存は trait object として注入（グローバルな singleton を持たない）

use std::sync::Arc;

use super::dispatcher::Dispatcher;
use super::engine::NotificationEngine;
use super::reconciler::Reconciler;
use super::resolver::Resolver;
use crate::config::{ConfigError, NotifierConfig};
use crate::ports::{IdGenerator, PushGateway, SystemClock, TokenRegistry, UlidGenerator};

/// EngineBuilder は NotificationEngine を構築
///
/// # 使用例
/// ```ignore
/// let engine = EngineBuilder::new(config)
///     .registry(registry)
///     .gateway(gateway)
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - registry / gateway が未設定なら build() が BuildError を返す
/// - config も build() 時に検証する
pub struct EngineBuilder {
    config: NotifierConfig,
    registry: Option<Arc<dyn TokenRegistry>>,
    gateway: Option<Arc<dyn PushGateway>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

/// BuildError はエンジン構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing dependency: {0}")]
    MissingDependency(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineBuilder {
    pub fn new(config: NotifierConfig) -> Self {
        Self {
            config,
            registry: None,
            gateway: None,
            ids: None,
        }
    }

    pub fn registry(mut self, registry: Arc<dyn TokenRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn gateway(mut self, gateway: Arc<dyn PushGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// 未指定なら `UlidGenerator<SystemClock>`
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn build(self) -> Result<NotificationEngine, BuildError> {
        self.config.validate()?;
        let registry = self
            .registry
            .ok_or(BuildError::MissingDependency("token registry"))?;
        let gateway = self
            .gateway
            .ok_or(BuildError::MissingDependency("push gateway"))?;
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(SystemClock)));

        Ok(NotificationEngine::new(
            self.config,
            Resolver::new(Arc::clone(&registry)),
            Dispatcher::new(gateway),
            Reconciler::new(registry),
            ids,
        ))
    }
}
