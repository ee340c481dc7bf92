pub mod directory;
pub mod infer;

pub use directory::{EntityDirectory, EntityLabel, InMemoryDirectory};
pub use infer::{infer_entity, EntityInfo};
