//! Safe SQL builder: identifiers from the schema only, values as parameters.

mod builder;
pub mod filter;
pub mod operators;
pub mod params;
pub use builder::*;
pub use filter::{EntityFilter, OrderDirection};
pub use operators::FilterOperator;
pub use params::*;
