pub mod types;
pub mod loader;
pub mod validator;
pub mod resolved;

pub use types::*;
pub use loader::*;
pub use validator::{is_identifier, validate, ID_FIELD};
pub use resolved::*;
