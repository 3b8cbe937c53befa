mod client;
mod types;

pub use client::{SystmClient, DEFAULT_GRAPHQL_URL};
