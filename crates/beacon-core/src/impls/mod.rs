//! Impls - ports の実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryTokenRegistry**: プロセス内の token registry
//! - **ScriptedPushGateway**: 応答を仕込めるテスト用 gateway
//! - **DryRunPushGateway**: ログに出すだけの gateway
//!
//! 本番用の registry / gateway は利用側のクレートが ports を実装して差し込みます。

pub mod dry_run_gateway;
pub mod inmem_registry;
pub mod scripted_gateway;

pub use self::dry_run_gateway::DryRunPushGateway;
pub use self::inmem_registry::InMemoryTokenRegistry;
pub use self::scripted_gateway::ScriptedPushGateway;
