//! Database entities.
//!
//! SeaORM entities, one module per table. The pgvector `embedding` column on
//! `knowledge_chunks` has no native SeaORM mapping, so every vector
//! operation goes through raw SQL in the repository; the entity keeps the
//! column as nullable text for projection purposes only.

pub mod assistant;
pub mod booking;
pub mod knowledge;
pub mod user;

pub use assistant::Model as Assistant;
pub use booking::{BookingStatus, Model as Booking};
pub use knowledge::Model as KnowledgeChunk;
pub use user::Model as User;
