pub mod intervals;
pub mod systm;

pub use intervals::IntervalsClient;
pub use systm::SystmClient;
