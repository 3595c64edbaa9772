//! # Trigger Conditions
//!
//! Declarative predicates an automation backend evaluates against a pool.
//! The JSON shape is an internally tagged union keyed by `"type"`:
//!
//! ```json
//! { "type": "Price", "gte": "1850.25", "durationSec": 600 }
//! ```
//!
//! Recurring variants are expressed relative to the pool state at creation
//! time and are turned into concrete [`PriceCondition`]s by
//! [`translate_recurring`](crate::recurring::translate_recurring).

use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_traits::Signed;
use serde::{Deserialize, Serialize};

use crate::errors::{AutomationError, CoreResult};
use crate::math::decimal::to_plain_string;

/// Absolute price thresholds on the raw token1/token0 price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<String>,
    /// Minimum time the threshold must hold before triggering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<u64>,
}

impl PriceCondition {
    /// Build a condition from decimal thresholds
    pub fn new(gte: Option<&BigDecimal>, lte: Option<&BigDecimal>, duration_sec: Option<u64>) -> CoreResult<Self> {
        if gte.is_none() && lte.is_none() {
            return Err(AutomationError::MissingThreshold);
        }
        Ok(Self {
            gte: gte.map(to_plain_string),
            lte: lte.map(to_plain_string),
            duration_sec,
        })
    }

    /// Lower threshold as a decimal
    pub fn gte_decimal(&self) -> CoreResult<Option<BigDecimal>> {
        self.gte.as_deref().map(parse_threshold).transpose()
    }

    /// Upper threshold as a decimal
    pub fn lte_decimal(&self) -> CoreResult<Option<BigDecimal>> {
        self.lte.as_deref().map(parse_threshold).transpose()
    }

    /// Check that at least one threshold is set and both parse
    pub fn validate(&self) -> CoreResult<()> {
        if self.gte.is_none() && self.lte.is_none() {
            return Err(AutomationError::MissingThreshold);
        }
        self.gte_decimal()?;
        self.lte_decimal()?;
        Ok(())
    }
}

fn parse_threshold(value: &str) -> CoreResult<BigDecimal> {
    BigDecimal::from_str(value).map_err(|_| AutomationError::invalid_price(value))
}

/// Trigger predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Condition {
    /// Fires once the block time passes a unix timestamp
    #[serde(rename_all = "camelCase")]
    Time { time_after_epoch_sec: u64 },

    /// Fires on the position's amount of token0 (`zero_or_one = 0`) or token1
    #[serde(rename_all = "camelCase")]
    TokenAmount {
        zero_or_one: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gte: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lte: Option<String>,
    },

    Price(PriceCondition),

    /// Fires once collected fees reach a share of principal
    #[serde(rename_all = "camelCase")]
    AccruedFees { fee_to_principal_ratio_threshold: BigDecimal },

    /// Thresholds as tick offsets from the current tick
    #[serde(rename_all = "camelCase")]
    RecurringPercentage {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gte_tick_offset: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lte_tick_offset: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_sec: Option<u64>,
    },

    /// Thresholds as human price offsets from the current price of `base_token`
    #[serde(rename_all = "camelCase")]
    RecurringPrice {
        /// 0 prices token0 in token1, 1 prices token1 in token0
        base_token: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gte_price_offset: Option<BigDecimal>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lte_price_offset: Option<BigDecimal>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_sec: Option<u64>,
    },

    /// Thresholds as token0 value proportions of a tick range
    #[serde(rename_all = "camelCase")]
    RecurringRatio {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gte_token0_value_proportion: Option<BigDecimal>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lte_token0_value_proportion: Option<BigDecimal>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_sec: Option<u64>,
    },
}

impl Condition {
    /// Whether the condition is relative to the pool state at creation time
    pub fn is_recurring(&self) -> bool {
        matches!(
            self,
            Condition::RecurringPercentage { .. }
                | Condition::RecurringPrice { .. }
                | Condition::RecurringRatio { .. }
        )
    }

    /// Check the cross-field rules of each variant
    pub fn validate(&self) -> CoreResult<()> {
        match self {
            Condition::Time { .. } => Ok(()),
            Condition::TokenAmount { zero_or_one, gte, lte } => {
                check_token_index(*zero_or_one)?;
                if gte.is_none() && lte.is_none() {
                    return Err(AutomationError::MissingThreshold);
                }
                for amount in gte.iter().chain(lte.iter()) {
                    parse_threshold(amount)?;
                }
                Ok(())
            }
            Condition::Price(price) => price.validate(),
            Condition::AccruedFees {
                fee_to_principal_ratio_threshold,
            } => {
                if fee_to_principal_ratio_threshold.is_negative() {
                    return Err(AutomationError::InconsistentThreshold(
                        "feeToPrincipalRatioThreshold must not be negative",
                    ));
                }
                Ok(())
            }
            Condition::RecurringPercentage {
                gte_tick_offset,
                lte_tick_offset,
                ..
            } => {
                if gte_tick_offset.is_none() && lte_tick_offset.is_none() {
                    return Err(AutomationError::InvalidOffsetSpecification(
                        "one of gteTickOffset and lteTickOffset is required",
                    ));
                }
                Ok(())
            }
            Condition::RecurringPrice {
                base_token,
                gte_price_offset,
                lte_price_offset,
                ..
            } => {
                check_token_index(*base_token)?;
                if gte_price_offset.is_none() && lte_price_offset.is_none() {
                    return Err(AutomationError::InvalidOffsetSpecification(
                        "one of gtePriceOffset and ltePriceOffset is required",
                    ));
                }
                let gte_ok = gte_price_offset.as_ref().map_or(true, |offset| offset.is_positive());
                let lte_ok = lte_price_offset.as_ref().map_or(true, |offset| offset.is_negative());
                if !gte_ok || !lte_ok {
                    return Err(AutomationError::InvalidPriceOffsetSign);
                }
                Ok(())
            }
            Condition::RecurringRatio {
                gte_token0_value_proportion,
                lte_token0_value_proportion,
                ..
            } => {
                if gte_token0_value_proportion.is_none() && lte_token0_value_proportion.is_none() {
                    return Err(AutomationError::InvalidOffsetSpecification(
                        "one of gteToken0ValueProportion and lteToken0ValueProportion is required",
                    ));
                }
                let one = BigDecimal::from(1);
                for proportion in gte_token0_value_proportion
                    .iter()
                    .chain(lte_token0_value_proportion.iter())
                {
                    if proportion.is_negative() || *proportion > one {
                        return Err(AutomationError::InvalidProportion);
                    }
                }
                Ok(())
            }
        }
    }
}

fn check_token_index(index: u8) -> CoreResult<()> {
    if index > 1 {
        return Err(AutomationError::InvalidOffsetSpecification("token index must be 0 or 1"));
    }
    Ok(())
}
