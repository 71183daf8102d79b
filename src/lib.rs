pub mod aggregate;
pub mod cleaning;
pub mod config;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod schema;
pub mod sink;
pub mod stats;

pub use aggregate::aggregate;
pub use cleaning::clean;
