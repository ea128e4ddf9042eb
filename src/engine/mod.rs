pub mod matcher;
pub mod review;
pub mod scoring;

pub use review::{ReviewItem, ReviewQueue};
pub use scoring::SessionStats;
