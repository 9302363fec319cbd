use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatementType {
    Deposit,
    Withdraw,
}

/// Operation named by a row of the batch input.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Register,
    Deposit,
    Withdraw,
}

/// One row of the batch input. Which optional fields are required depends
/// on the operation: `register` needs a name and password, `deposit` and
/// `withdraw` need an amount.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LedgerRow {
    #[serde(rename = "type")]
    pub op: Operation,
    pub email: String,
    pub name: Option<String>,
    pub password: Option<String>,
    #[serde(deserialize_with = "deserialize_decimal_4dp")]
    pub amount: Option<Decimal>,
    pub description: Option<String>,
}

/// Parsed from the field text, so no amount passes through `f64` or `u128`.
fn deserialize_decimal_4dp<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| {
            Decimal::from_str(raw.trim())
                .map(|dec| dec.round_dp_with_strategy(4, RoundingStrategy::ToZero))
                .map_err(|e| <D::Error as de::Error>::custom(format!("invalid amount {raw:?}: {e}")))
        })
        .transpose()
}

/// One row of the batch output.
#[derive(Debug, Serialize, PartialEq)]
pub struct BalanceRow {
    pub email: String,
    pub name: String,
    pub balance: Decimal,
}
