pub mod types;
pub mod kdf;
pub mod gcm;
pub mod wrap;
pub mod rng;

pub use types::*;
pub use kdf::*;
pub use gcm::*;
pub use wrap::*;
pub use rng::*;
