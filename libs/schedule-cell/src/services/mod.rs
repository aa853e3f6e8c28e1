pub mod availability;

pub use availability::{default_template, AvailabilityStore};
