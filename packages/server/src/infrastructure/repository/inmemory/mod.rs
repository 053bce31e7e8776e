//! HashMap をインメモリ DB として使用する Repository 実装

mod account;
#[cfg(test)]
mod gated;
mod message;

pub use account::InMemoryAccountRepository;
pub use message::InMemoryMessageRepository;
#[cfg(test)]
pub use gated::GatedMessageRepository;
