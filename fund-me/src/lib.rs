pub mod contract;
mod error;
pub mod msg;
pub mod price;
pub mod state;

pub use crate::error::ContractError;
