pub mod ed25519;
pub mod vault;

pub use ed25519::*;
pub use vault::*;
