pub mod entity;
pub mod models;
pub mod queries;
pub mod sqlite;
pub mod table;

pub use entity::{ensure_persisted, exists, load, load_or_new, Entity};
pub use models::{Computer, Mapping, Server, Setting, Share, User};
pub use queries::{MappingView, ShareView};
pub use sqlite::Database;
pub use table::Row;
