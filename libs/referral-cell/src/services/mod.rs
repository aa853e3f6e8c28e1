pub mod lifecycle;
pub mod store;

pub use lifecycle::ReferralLifecycle;
pub use store::ReferralStore;
