mod client;

pub use client::{IntervalsClient, DEFAULT_BASE_URL};
