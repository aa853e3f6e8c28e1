pub mod postgrest;

pub use postgrest::{DatabaseClient, DatabaseError};
