#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    to_json_binary, Addr, BankMsg, Binary, Coin, Deps, DepsMut, Env, MessageInfo, Order, Reply, Response, StdError,
    StdResult, Storage, SubMsg, SubMsgResult, Uint256,
};
use cw2::set_contract_version;
use cw_utils::{may_pay, nonpayable};

use crate::error::ContractError;
use crate::msg::{
    AmountFundedResp, ConfigResp, ExecuteMsg, FunderCountResp, FunderResp, InstantiateMsg, MinimumUsdResp, OwnerResp,
    PriceFeedResp, QueryMsg,
};
use crate::price::{conversion_rate, latest_price, USD_DECIMALS};
use crate::state::{Config, ADDRESS_TO_AMOUNT_FUNDED, CONFIG, FUNDERS, FUNDER_COUNT, OWNER, PRICE_FEED};

const CONTRACT_NAME: &str = "crates.io:fund-me";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

// Smallest accepted contribution: $50 with USD_DECIMALS digits
pub const MINIMUM_USD: Uint256 = Uint256::from_u128(50 * 10u128.pow(USD_DECIMALS));

// Largest supported number of fractional digits of the native denom
pub const MAX_DENOM_DECIMALS: u32 = 18;

// Used to identify the withdrawal transfer submessage
pub const WITHDRAW_TRANSFER_ID: u64 = 1;

// ////////////////////////////////////////INSTANTIATE///////////////////////////////////////////////
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;
    if msg.denom.is_empty() {
        return Err(StdError::generic_err("denom must not be empty").into());
    }
    if msg.denom_decimals > MAX_DENOM_DECIMALS {
        return Err(ContractError::InvalidDenomDecimals {
            decimals: msg.denom_decimals,
            max: MAX_DENOM_DECIMALS,
        });
    }
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let price_feed = deps.api.addr_validate(&msg.price_feed)?;

    // The deployer owns the ledger for its whole lifetime
    OWNER.save(deps.storage, &info.sender)?;
    PRICE_FEED.save(deps.storage, &price_feed)?;
    CONFIG.save(
        deps.storage,
        &Config {
            denom: msg.denom,
            denom_decimals: msg.denom_decimals,
        },
    )?;
    FUNDER_COUNT.save(deps.storage, &0)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("owner", info.sender)
        .add_attribute("price_feed", price_feed))
}

// ////////////////////////////////////////EXECUTE//////////////////////////////////////////////////
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Fund {} => fund(deps, info),
        ExecuteMsg::Withdraw {} => withdraw(deps, env, info),
        ExecuteMsg::CheaperWithdraw {} => cheaper_withdraw(deps, env, info),
    }
}

fn fund(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    // No attached coins means a zero contribution, which the threshold below rejects
    let amount = may_pay(&info, &config.denom)?;

    let feed = PRICE_FEED.load(deps.storage)?;
    let price = latest_price(&deps.querier, &feed)?;
    let usd = conversion_rate(amount, &price, config.denom_decimals)?;
    if usd < MINIMUM_USD {
        return Err(ContractError::InsufficientContribution {
            usd,
            minimum: MINIMUM_USD,
        });
    }

    let previous = ADDRESS_TO_AMOUNT_FUNDED
        .may_load(deps.storage, &info.sender)?
        .unwrap_or_default();
    let total = previous.checked_add(amount)?;
    ADDRESS_TO_AMOUNT_FUNDED.save(deps.storage, &info.sender, &total)?;
    if previous.is_zero() {
        push_funder(deps.storage, &info.sender)?;
    }

    Ok(Response::new()
        .add_attribute("action", "fund")
        .add_attribute("funder", info.sender)
        .add_attribute("amount", amount)
        .add_attribute("amount_usd", usd.to_string())
        .add_attribute("total_funded", total))
}

fn push_funder(storage: &mut dyn Storage, funder: &Addr) -> StdResult<()> {
    let index = FUNDER_COUNT.load(storage)?;
    FUNDERS.save(storage, index, funder)?;
    FUNDER_COUNT.save(storage, &(index + 1))
}

// Reads the funder count from storage on every iteration and each funder on its own.
fn withdraw(deps: DepsMut, env: Env, info: MessageInfo) -> Result<Response, ContractError> {
    ensure_owner(deps.storage, &info.sender)?;
    nonpayable(&info)?;
    let balance = custody_balance(deps.as_ref(), &env)?;

    let mut index = 0;
    while index < FUNDER_COUNT.load(deps.storage)? {
        let funder = FUNDERS.load(deps.storage, index)?;
        ADDRESS_TO_AMOUNT_FUNDED.remove(deps.storage, &funder);
        FUNDERS.remove(deps.storage, index);
        index += 1;
    }
    FUNDER_COUNT.save(deps.storage, &0)?;

    Ok(sweep("withdraw", info.sender, balance, index))
}

// Same effect as `withdraw`, but reads the count once and all funders in a single range scan.
fn cheaper_withdraw(deps: DepsMut, env: Env, info: MessageInfo) -> Result<Response, ContractError> {
    ensure_owner(deps.storage, &info.sender)?;
    nonpayable(&info)?;
    let balance = custody_balance(deps.as_ref(), &env)?;

    let count = FUNDER_COUNT.load(deps.storage)?;
    let funders = FUNDERS
        .range(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;
    for (index, funder) in &funders {
        ADDRESS_TO_AMOUNT_FUNDED.remove(deps.storage, funder);
        FUNDERS.remove(deps.storage, *index);
    }
    FUNDER_COUNT.save(deps.storage, &0)?;

    Ok(sweep("cheaper_withdraw", info.sender, balance, count))
}

fn ensure_owner(storage: &dyn Storage, sender: &Addr) -> Result<(), ContractError> {
    if OWNER.load(storage)? != *sender {
        return Err(ContractError::NotOwner {});
    }
    Ok(())
}

fn custody_balance(deps: Deps, env: &Env) -> StdResult<Coin> {
    let config = CONFIG.load(deps.storage)?;
    deps.querier
        .query_balance(env.contract.address.as_str(), config.denom.as_str())
}

// The transfer reports failures back through `reply`, which fails the whole transaction
// so the ledger reset above is reverted together with it.
fn sweep(action: &str, owner: Addr, balance: Coin, funders_cleared: u32) -> Response {
    let resp = Response::new()
        .add_attribute("action", action)
        .add_attribute("owner", owner.as_str())
        .add_attribute("amount", balance.to_string())
        .add_attribute("funders_cleared", funders_cleared.to_string());

    if balance.amount.is_zero() {
        return resp;
    }
    let transfer = BankMsg::Send {
        to_address: owner.into_string(),
        amount: vec![balance],
    };
    resp.add_submessage(SubMsg::reply_on_error(transfer, WITHDRAW_TRANSFER_ID))
}

// ////////////////////////////////////////REPLY////////////////////////////////////////////////////
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(_deps: DepsMut, _env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        WITHDRAW_TRANSFER_ID => withdraw_transfer_reply(msg.result),
        id => Err(StdError::generic_err(format!("unknown reply id {id}")).into()),
    }
}

fn withdraw_transfer_reply(result: SubMsgResult) -> Result<Response, ContractError> {
    match result {
        SubMsgResult::Ok(_) => Ok(Response::new()),
        SubMsgResult::Err(reason) => Err(ContractError::TransferFailed { reason }),
    }
}

// ////////////////////////////////////////QUERY////////////////////////////////////////////////////
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    let resp = match msg {
        QueryMsg::Owner {} => to_json_binary(&OwnerResp {
            owner: OWNER.load(deps.storage)?,
        })?,
        QueryMsg::PriceFeed {} => to_json_binary(&PriceFeedResp {
            price_feed: PRICE_FEED.load(deps.storage)?,
        })?,
        QueryMsg::Funder { index } => to_json_binary(&query_funder(deps, index)?)?,
        QueryMsg::FunderCount {} => to_json_binary(&FunderCountResp {
            count: FUNDER_COUNT.load(deps.storage)?,
        })?,
        QueryMsg::AddressToAmountFunded { address } => {
            to_json_binary(&query_amount_funded(deps, &address)?)?
        }
        QueryMsg::MinimumUsd {} => to_json_binary(&MinimumUsdResp {
            minimum_usd: MINIMUM_USD,
        })?,
        QueryMsg::Config {} => {
            let config = CONFIG.load(deps.storage)?;
            to_json_binary(&ConfigResp {
                denom: config.denom,
                denom_decimals: config.denom_decimals,
            })?
        }
    };
    Ok(resp)
}

fn query_funder(deps: Deps, index: u32) -> Result<FunderResp, ContractError> {
    if index >= FUNDER_COUNT.load(deps.storage)? {
        return Err(ContractError::IndexOutOfRange { index });
    }
    let funder = FUNDERS.load(deps.storage, index)?;
    Ok(FunderResp { funder })
}

// Addresses that never funded (or were cleared by a withdrawal) read as zero
fn query_amount_funded(deps: Deps, address: &str) -> StdResult<AmountFundedResp> {
    let address = deps.api.addr_validate(address)?;
    let amount = ADDRESS_TO_AMOUNT_FUNDED
        .may_load(deps.storage, &address)?
        .unwrap_or_default();
    Ok(AmountFundedResp { amount })
}
