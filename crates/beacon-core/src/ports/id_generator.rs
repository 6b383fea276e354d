//! IdGenerator port - ID 生成の抽象化
//!
//! テスト容易性のために trait として抽象化しています。
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（Clock から timestamp を取る）

use crate::domain::DispatchId;
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は dispatch ごとの ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（並行するイベント処理から共有される）
pub trait IdGenerator: Send + Sync {
    fn generate_dispatch_id(&self) -> DispatchId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// FixedClock を渡せば timestamp 部分が決定的になります。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_dispatch_id(&self) -> DispatchId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        DispatchId::from(ulid)
    }
}
