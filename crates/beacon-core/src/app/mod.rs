//! App - アプリケーション層
//!
//! ports を組み合わせて通知パイプラインを実装します。
//!
//! # 主要コンポーネント
//! - **trigger**: qualifying transition の判定（純粋関数）
//! - **resolver**: 宛先トークンの解決
//! - **composer**: メッセージの組み立て（純粋関数）
//! - **dispatcher**: multicast 送信
//! - **reconciler**: 無効トークンの削除
//! - **NotificationEngine**: 上記を 1 イベント分つなぐ
//! - **EngineBuilder**: 依存の注入と起動時検証

pub mod builder;
pub mod composer;
pub mod dispatcher;
pub mod engine;
pub mod reconciler;
pub mod resolver;
pub mod trigger;

pub use self::builder::{BuildError, EngineBuilder};
pub use self::dispatcher::{Delivery, Dispatcher};
pub use self::engine::NotificationEngine;
pub use self::reconciler::Reconciler;
pub use self::resolver::Resolver;
