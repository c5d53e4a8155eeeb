use cosmwasm_std::Int128;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct InstantiateMsg {
    pub decimals: u8,
    pub initial_answer: Int128,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    /// Publishes a new round stamped with the current block time.
    UpdateAnswer { answer: Int128 },
    /// Writes an explicit round and makes it the latest one.
    UpdateRoundData {
        round_id: u64,
        answer: Int128,
        timestamp: u64,
        started_at: u64,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    LatestRoundData {},
    GetRoundData { round_id: u64 },
    Decimals {},
    Description {},
    Version {},
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct RoundDataResp {
    pub round_id: u64,
    pub answer: Int128,
    pub started_at: u64,
    pub updated_at: u64,
    pub answered_in_round: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct DecimalsResp {
    pub decimals: u8,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct DescriptionResp {
    pub description: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct VersionResp {
    pub version: u64,
}
