pub mod allocation;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod location;
pub mod oracle;
pub mod policy;
pub mod risk;
pub mod unit;
pub mod urgency;
pub mod zones;

pub use allocation::*;
pub use config::*;
pub use error::StrategyError;
pub use geometry::*;
pub use grid::*;
pub use location::*;
pub use oracle::*;
pub use policy::*;
pub use risk::*;
pub use unit::*;
pub use urgency::*;
pub use zones::*;
