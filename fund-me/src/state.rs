use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cosmwasm_std::{Addr, Uint128};
use cw_storage_plus::{Item, Map};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    pub denom: String,
    pub denom_decimals: u32,
}

pub const OWNER: Item<Addr> = Item::new("owner");
pub const PRICE_FEED: Item<Addr> = Item::new("price_feed");
pub const CONFIG: Item<Config> = Item::new("config");

// funder -> cumulative amount in the native denom
pub const ADDRESS_TO_AMOUNT_FUNDED: Map<&Addr, Uint128> = Map::new("address_to_amount_funded");

// Distinct funders in insertion order, addressed by index. Only cleared by a withdrawal,
// so it grows with every new funder in between.
pub const FUNDERS: Map<u32, Addr> = Map::new("funders");
pub const FUNDER_COUNT: Item<u32> = Item::new("funder_count");
