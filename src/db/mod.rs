pub mod models;
mod repository;
#[cfg(test)]
pub mod testing;

pub use repository::{
    KnowledgeStats, KnowledgeStore, NewAssistant, NewBooking, NewChunk, Repository,
};
