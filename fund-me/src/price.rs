use cosmwasm_std::{Addr, OverflowError, OverflowOperation, QuerierWrapper, StdError, Uint128, Uint256};
use price_feed::msg::{DecimalsResp, QueryMsg as FeedQueryMsg, RoundDataResp};

use crate::error::ContractError;

// Fractional digits of every USD amount
pub const USD_DECIMALS: u32 = 18;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Price {
    pub answer: Uint128,
    pub decimals: u8,
}

// Queried fresh on every call, never cached
pub fn latest_price(querier: &QuerierWrapper, feed: &Addr) -> Result<Price, ContractError> {
    let round: RoundDataResp = querier
        .query_wasm_smart(feed.as_str(), &FeedQueryMsg::LatestRoundData {})
        .map_err(unavailable)?;
    let decimals = querier
        .query_wasm_smart::<DecimalsResp>(feed.as_str(), &FeedQueryMsg::Decimals {})
        .map_err(unavailable)?
        .decimals;

    let answer = u128::try_from(round.answer.i128())
        .ok()
        .filter(|answer| *answer > 0)
        .ok_or_else(|| ContractError::OracleUnavailable {
            reason: format!("round {} has non-positive answer {}", round.round_id, round.answer),
        })?;

    Ok(Price { answer: Uint128::new(answer), decimals })
}

// amount * answer * 10^18 / 10^(feed decimals + denom decimals), truncated once at the end
pub fn conversion_rate(
    amount: Uint128,
    price: &Price,
    denom_decimals: u32,
) -> Result<Uint256, ContractError> {
    let ten = Uint256::from(10u128);
    let numerator = Uint256::from(amount)
        .checked_mul(Uint256::from(price.answer))?
        .checked_mul(ten.checked_pow(USD_DECIMALS)?)?;
    let exponent = u32::from(price.decimals)
        .checked_add(denom_decimals)
        .ok_or_else(|| OverflowError::new(OverflowOperation::Add, price.decimals, denom_decimals))?;
    let denominator = ten.checked_pow(exponent)?;

    Ok(numerator / denominator)
}

fn unavailable(err: StdError) -> ContractError {
    ContractError::OracleUnavailable { reason: err.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    use cosmwasm_std::testing::{mock_dependencies, MockApi, MockQuerier, MockStorage};
    use cosmwasm_std::{from_json, to_json_binary, ContractResult, Int128, OwnedDeps, SystemError, SystemResult, WasmQuery};

    const FEED: &str = "feed";

    fn feed_answering(answer: i128, decimals: u8) -> OwnedDeps<MockStorage, MockApi, MockQuerier> {
        let mut deps = mock_dependencies();
        deps.querier.update_wasm(move |query| match query {
            WasmQuery::Smart { contract_addr, msg } if contract_addr == FEED => {
                let query: FeedQueryMsg = from_json(msg).unwrap();
                let resp = match query {
                    FeedQueryMsg::LatestRoundData {} => to_json_binary(&RoundDataResp {
                        round_id: 3,
                        answer: Int128::new(answer),
                        started_at: 10,
                        updated_at: 10,
                        answered_in_round: 3,
                    }),
                    FeedQueryMsg::Decimals {} => to_json_binary(&DecimalsResp { decimals }),
                    _ => panic!("unexpected feed query"),
                };
                SystemResult::Ok(ContractResult::Ok(resp.unwrap()))
            }
            _ => SystemResult::Err(SystemError::UnsupportedRequest { kind: "wasm".to_string() }),
        });
        deps
    }

    #[test]
    fn reads_answer_and_decimals() {
        let deps = feed_answering(2_000_00000000, 8);
        let price = latest_price(&deps.as_ref().querier, &Addr::unchecked(FEED)).unwrap();
        assert_eq!(price, Price { answer: Uint128::new(2_000_00000000), decimals: 8 });
    }

    #[test]
    fn missing_feed_is_unavailable() {
        let deps = mock_dependencies();
        let err = latest_price(&deps.as_ref().querier, &Addr::unchecked(FEED)).unwrap_err();
        assert!(matches!(err, ContractError::OracleUnavailable { .. }));
    }

    #[test]
    fn non_positive_answer_is_unavailable() {
        for answer in [0, -5] {
            let deps = feed_answering(answer, 8);
            let err = latest_price(&deps.as_ref().querier, &Addr::unchecked(FEED)).unwrap_err();
            match err {
                ContractError::OracleUnavailable { reason } => assert!(reason.contains("non-positive")),
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn converts_to_usd_with_eighteen_decimals() {
        let price = Price { answer: Uint128::new(2_000_00000000), decimals: 8 };

        // 1 whole unit of an 18-decimal denom at $2000
        let usd = conversion_rate(Uint128::new(1_000_000_000_000_000_000), &price, 18).unwrap();
        assert_eq!(usd, Uint256::from(2_000u128 * 10u128.pow(18)));

        // 0.025 units of a 6-decimal denom is exactly $50
        let usd = conversion_rate(Uint128::new(25_000), &price, 6).unwrap();
        assert_eq!(usd, Uint256::from(50u128 * 10u128.pow(18)));
    }

    #[test]
    fn conversion_truncates() {
        // 1 smallest unit at $2000.00000001 with 20 denom decimals:
        // 200000000001 * 10^18 / 10^28 = 20.0000000001 -> 20
        let price = Price { answer: Uint128::new(2_000_00000001), decimals: 8 };
        let usd = conversion_rate(Uint128::new(1), &price, 20).unwrap();
        assert_eq!(usd, Uint256::from(20u128));

        let usd = conversion_rate(Uint128::zero(), &price, 6).unwrap();
        assert_eq!(usd, Uint256::zero());
    }

    #[test]
    fn conversion_overflow_is_reported() {
        let price = Price { answer: Uint128::MAX, decimals: 0 };
        let err = conversion_rate(Uint128::MAX, &price, 0).unwrap_err();
        assert!(matches!(err, ContractError::Overflow(_)));
    }

    #[test]
    fn oversized_decimals_overflow_instead_of_panicking() {
        let price = Price { answer: Uint128::new(2_000_00000000), decimals: 8 };
        let err = conversion_rate(Uint128::new(25_000), &price, u32::MAX).unwrap_err();
        assert_eq!(
            err,
            ContractError::Overflow(OverflowError::new(OverflowOperation::Add, 8u8, u32::MAX))
        );

        // fits in u32 but not as a power of ten in Uint256
        let err = conversion_rate(Uint128::new(25_000), &price, 100).unwrap_err();
        assert!(matches!(err, ContractError::Overflow(_)));
    }
}
