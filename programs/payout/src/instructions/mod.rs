pub mod initialize;
pub mod fund;
pub mod withdraw;
pub mod withdraw_with_signature;
pub mod set_tea;
pub mod set_teas;
pub mod register_beneficiaries;
pub mod batch_payout;
pub mod set_owner;
pub mod get_owner;
pub mod get_tea;

pub use initialize::*;
pub use fund::*;
pub use withdraw::*;
pub use withdraw_with_signature::*;
pub use set_tea::*;
pub use set_teas::*;
pub use register_beneficiaries::*;
pub use batch_payout::*;
pub use set_owner::*;
pub use get_owner::*;
pub use get_tea::*;
