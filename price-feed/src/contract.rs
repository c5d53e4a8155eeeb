#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{to_json_binary, Binary, Deps, DepsMut, Env, Int128, MessageInfo, Response, StdResult};
use cw2::set_contract_version;

use crate::error::ContractError;
use crate::msg::{DecimalsResp, DescriptionResp, ExecuteMsg, InstantiateMsg, QueryMsg, RoundDataResp, VersionResp};
use crate::state::{RoundData, DECIMALS, LATEST_ROUND, ROUNDS};

const CONTRACT_NAME: &str = "crates.io:price-feed";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DESCRIPTION: &str = "stand-in price feed";
pub const VERSION: u64 = 0;

// ////////////////////////////////////////INSTANTIATE///////////////////////////////////////////////
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    DECIMALS.save(deps.storage, &msg.decimals)?;
    let round_id = publish(deps, &env, msg.initial_answer)?;

    Ok(Response::new()
        .add_attribute("action", "feed-instantiated")
        .add_attribute("decimals", msg.decimals.to_string())
        .add_attribute("round_id", round_id.to_string())
        .add_attribute("answer", msg.initial_answer.to_string()))
}

// ////////////////////////////////////////EXECUTE//////////////////////////////////////////////////
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::UpdateAnswer { answer } => update_answer(deps, env, answer),
        ExecuteMsg::UpdateRoundData { round_id, answer, timestamp, started_at } => {
            update_round_data(deps, round_id, answer, timestamp, started_at)
        }
    }
}

fn update_answer(deps: DepsMut, env: Env, answer: Int128) -> Result<Response, ContractError> {
    let round_id = publish(deps, &env, answer)?;

    Ok(Response::new()
        .add_attribute("action", "update_answer")
        .add_attribute("round_id", round_id.to_string())
        .add_attribute("answer", answer.to_string()))
}

fn update_round_data(
    deps: DepsMut,
    round_id: u64,
    answer: Int128,
    timestamp: u64,
    started_at: u64,
) -> Result<Response, ContractError> {
    if round_id == 0 {
        return Err(ContractError::InvalidRoundId {});
    }

    let round = RoundData { answer, started_at, updated_at: timestamp };
    ROUNDS.save(deps.storage, round_id, &round)?;
    LATEST_ROUND.save(deps.storage, &round_id)?;

    Ok(Response::new()
        .add_attribute("action", "update_round_data")
        .add_attribute("round_id", round_id.to_string())
        .add_attribute("answer", answer.to_string()))
}

// Appends a round stamped with the block time and returns its id.
fn publish(deps: DepsMut, env: &Env, answer: Int128) -> StdResult<u64> {
    let round_id = LATEST_ROUND.may_load(deps.storage)?.unwrap_or_default() + 1;
    let now = env.block.time.seconds();

    ROUNDS.save(deps.storage, round_id, &RoundData { answer, started_at: now, updated_at: now })?;
    LATEST_ROUND.save(deps.storage, &round_id)?;
    Ok(round_id)
}

// ////////////////////////////////////////QUERY////////////////////////////////////////////////////
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    match msg {
        QueryMsg::LatestRoundData {} => {
            let round_id = LATEST_ROUND.load(deps.storage)?;
            Ok(to_json_binary(&query_round(deps, round_id)?)?)
        }
        QueryMsg::GetRoundData { round_id } => Ok(to_json_binary(&query_round(deps, round_id)?)?),
        QueryMsg::Decimals {} => {
            let decimals = DECIMALS.load(deps.storage)?;
            Ok(to_json_binary(&DecimalsResp { decimals })?)
        }
        QueryMsg::Description {} => Ok(to_json_binary(&DescriptionResp {
            description: DESCRIPTION.to_string(),
        })?),
        QueryMsg::Version {} => Ok(to_json_binary(&VersionResp { version: VERSION })?),
    }
}

fn query_round(deps: Deps, round_id: u64) -> Result<RoundDataResp, ContractError> {
    let round = ROUNDS
        .may_load(deps.storage, round_id)?
        .ok_or(ContractError::RoundNotFound { round_id })?;

    Ok(RoundDataResp {
        round_id,
        answer: round.answer,
        started_at: round.started_at,
        updated_at: round.updated_at,
        answered_in_round: round_id,
    })
}
