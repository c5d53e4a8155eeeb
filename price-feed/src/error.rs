use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("No data present for round {round_id}")]
    RoundNotFound { round_id: u64 },

    #[error("Round id must be non-zero")]
    InvalidRoundId {},
}
