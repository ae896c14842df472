pub mod config;
pub mod generator;
pub mod observability;
pub mod pipeline;
pub mod seeding;
pub mod sinks;
pub mod transform;

pub use pipeline::{EnergySink, SeedError};
pub use seeding::{seed, SeedSummary};
