//! Outbound ports - Interfaces that the application requires from external systems

mod chat_port;
mod repository_port;

pub use chat_port::{ChatError, ChatPort};
pub use repository_port::{
    CreatureRepositoryPort, EventRepositoryPort, MaterialCount, StatsRepositoryPort, StoreError,
    StoreStats,
};
