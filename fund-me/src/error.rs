use cosmwasm_std::{OverflowError, StdError, Uint256};
use cw_utils::PaymentError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Payment(#[from] PaymentError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("Didn't send enough: contribution worth {usd} is below the minimum of {minimum} (18 decimals)")]
    InsufficientContribution { usd: Uint256, minimum: Uint256 },

    #[error("Denom decimals {decimals} exceed the maximum of {max}")]
    InvalidDenomDecimals { decimals: u32, max: u32 },

    #[error("Caller is not the owner")]
    NotOwner {},

    #[error("Funder index {index} is out of range")]
    IndexOutOfRange { index: u32 },

    #[error("Price feed unavailable: {reason}")]
    OracleUnavailable { reason: String },

    #[error("Withdrawal transfer failed: {reason}")]
    TransferFailed { reason: String },
}
