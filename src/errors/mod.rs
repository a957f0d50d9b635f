pub mod classification;
pub mod types;

pub use classification::ErrorClass;
pub use types::RestockError;
