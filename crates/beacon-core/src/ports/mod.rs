//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」を定義します。
//! 外部システム（token registry, push gateway）はここの trait 越しにだけ触ります。
//! 実装は `impls` か、利用側のクレートが差し込みます。

pub mod clock;
pub mod id_generator;
pub mod push_gateway;
pub mod token_registry;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::push_gateway::{
    MulticastMessage, MulticastResponse, Notification, PushGateway, SendResponse, WebpushOptions,
};
pub use self::token_registry::TokenRegistry;
