//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。

pub mod account;
pub mod broadcaster;
pub mod error;
pub mod room_resolver;
pub mod send_message;
pub mod session_manager;

pub use account::{LoginUseCase, RegisterAccountUseCase};
pub use broadcaster::{EventBroadcaster, EventSender, OUTBOUND_QUEUE_CAPACITY};
pub use error::{AccountError, SessionError};
pub use room_resolver::RoomResolver;
pub use send_message::SendMessageUseCase;
pub use session_manager::{DEFAULT_HISTORY_LIMIT, SessionManager};
