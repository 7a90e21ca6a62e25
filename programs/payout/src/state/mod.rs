pub mod payout_config;
pub mod tea_entry;

pub use payout_config::*;
pub use tea_entry::*;
