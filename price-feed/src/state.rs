use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cosmwasm_std::Int128;
use cw_storage_plus::{Item, Map};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct RoundData {
    pub answer: Int128,
    pub started_at: u64, // seconds
    pub updated_at: u64, // seconds
}

// Number of fractional digits carried by every answer
pub const DECIMALS: Item<u8> = Item::new("decimals");

pub const LATEST_ROUND: Item<u64> = Item::new("latest_round");

// round id -> round data
pub const ROUNDS: Map<u64, RoundData> = Map::new("rounds");
