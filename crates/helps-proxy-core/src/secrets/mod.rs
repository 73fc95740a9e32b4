//! Provider API-key lookup
//!
//! An explicit `llm.apiKey` in the configuration always wins; the store is
//! consulted only when it is absent.

mod env_store;
mod memory_store;
mod traits;

pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
pub use traits::SecretStore;
