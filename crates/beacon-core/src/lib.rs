//! beacon-core
//!
//! Change-triggered push notification engine.
//!
//! 作業項目（アライメント待ち・整備ジョブ）のドキュメントが書き換わるたびに
//! before/after のペアを受け取り、通知すべき遷移なら宛先を解決して multicast で送り、
//! 送信結果から無効になったトークンを registry から掃除します。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（snapshot, token, message, outcome, ids, errors）
//! - **ports**: 抽象化レイヤー（TokenRegistry, PushGateway, Clock, IdGenerator）
//! - **app**: パイプライン（trigger → resolver → composer → dispatcher → reconciler）
//! - **impls**: 実装（InMemoryTokenRegistry など開発・テスト用）
//! - **config**: NotifierConfig（TOML）

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{BuildError, EngineBuilder, NotificationEngine};
pub use config::{ConfigError, NotifierConfig};
