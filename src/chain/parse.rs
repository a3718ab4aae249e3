use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use super::types::{NativeTransfer, TokenTransfer, Transaction};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    #[serde(default)]
    signature: Option<String>,
    #[serde(default)]
    timestamp: Option<f64>,
    #[serde(default)]
    fee: Option<f64>,
    #[serde(default)]
    native_transfers: Option<Vec<Value>>,
    #[serde(default)]
    token_transfers: Option<Vec<Value>>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNativeTransfer {
    from_user_account: Option<String>,
    to_user_account: Option<String>,
    amount: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTokenTransfer {
    from_user_account: Option<String>,
    to_user_account: Option<String>,
    token_amount: Option<f64>,
    mint: Option<String>,
}

impl RawNativeTransfer {
    fn into_transfer(self) -> Option<NativeTransfer> {
        let amount = self.amount.filter(|amount| amount.is_finite())?;
        Some(NativeTransfer {
            from: self.from_user_account?,
            to: self.to_user_account?,
            amount,
        })
    }
}

impl RawTokenTransfer {
    fn into_transfer(self) -> Option<TokenTransfer> {
        let token_amount = self.token_amount.filter(|amount| amount.is_finite())?;
        Some(TokenTransfer {
            from: self.from_user_account?,
            to: self.to_user_account?,
            token_amount,
            mint: self.mint.filter(|mint| !mint.is_empty())?,
        })
    }
}

impl RawTransaction {
    fn into_transaction(self) -> Transaction {
        let native_transfers = self
            .native_transfers
            .unwrap_or_default()
            .into_iter()
            .filter_map(|value| RawNativeTransfer::deserialize(value).ok())
            .filter_map(RawNativeTransfer::into_transfer)
            .collect();
        let token_transfers = self
            .token_transfers
            .unwrap_or_default()
            .into_iter()
            .filter_map(|value| RawTokenTransfer::deserialize(value).ok())
            .filter_map(RawTokenTransfer::into_transfer)
            .collect();

        Transaction {
            signature: self.signature.unwrap_or_default(),
            timestamp: self
                .timestamp
                .filter(|value| value.is_finite())
                .map(|value| value as i64),
            fee: self.fee.filter(|value| value.is_finite()),
            native_transfers,
            token_transfers,
        }
    }
}

fn unwrap_envelope(parsed: Value) -> Result<Vec<Value>> {
    match parsed {
        Value::Array(entries) => Ok(entries),
        Value::Object(mut object) => {
            for key in ["transactions", "data"] {
                if let Some(Value::Array(entries)) = object.remove(key) {
                    return Ok(entries);
                }
            }
            Err(anyhow!(
                "transaction envelope has neither `transactions` nor `data` array"
            ))
        }
        _ => Err(anyhow!("unexpected JSON type for transaction history")),
    }
}

pub(super) fn parse_transactions(raw: &str) -> Result<Vec<Transaction>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid transaction history JSON")?;
    let entries = unwrap_envelope(parsed)?;

    Ok(entries
        .into_iter()
        .filter_map(|entry| RawTransaction::deserialize(entry).ok())
        .map(RawTransaction::into_transaction)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: &str = r#"{
        "signature": "sig1",
        "timestamp": 1700000000,
        "fee": 5000,
        "nativeTransfers": [
            {"fromUserAccount": "B", "toUserAccount": "Addr1", "amount": 5000000000}
        ],
        "tokenTransfers": [
            {"fromUserAccount": "Addr1", "toUserAccount": "C", "tokenAmount": 2500.5, "mint": "MintX"}
        ]
    }"#;

    #[test]
    fn accepts_bare_array() {
        let parsed = parse_transactions(&format!("[{ENTRY}]")).unwrap();
        assert_eq!(parsed.len(), 1);
        let transaction = &parsed[0];
        assert_eq!(transaction.signature, "sig1");
        assert_eq!(transaction.timestamp, Some(1_700_000_000));
        assert_eq!(transaction.fee, Some(5000.0));
        assert_eq!(
            transaction.native_transfers,
            vec![NativeTransfer {
                from: "B".into(),
                to: "Addr1".into(),
                amount: 5_000_000_000.0,
            }]
        );
        assert_eq!(transaction.token_transfers[0].mint, "MintX");
        assert_eq!(transaction.token_transfers[0].token_amount, 2500.5);
    }

    #[test]
    fn accepts_transactions_and_data_envelopes() {
        let wrapped = parse_transactions(&format!(r#"{{"transactions": [{ENTRY}]}}"#)).unwrap();
        assert_eq!(wrapped.len(), 1);

        let data = parse_transactions(&format!(r#"{{"data": [{ENTRY}, {ENTRY}]}}"#)).unwrap();
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn rejects_unknown_envelope() {
        assert!(parse_transactions(r#"{"items": []}"#).is_err());
        assert!(parse_transactions("42").is_err());
        assert!(parse_transactions("not json").is_err());
    }

    #[test]
    fn skips_malformed_transfers_without_dropping_the_transaction() {
        let raw = r#"[{
            "signature": "sig2",
            "nativeTransfers": [
                {"fromUserAccount": "B", "amount": 10},
                {"fromUserAccount": "B", "toUserAccount": "Addr1", "amount": "lots"},
                {"fromUserAccount": "B", "toUserAccount": "Addr1", "amount": 7}
            ],
            "tokenTransfers": [
                {"fromUserAccount": "B", "toUserAccount": "Addr1", "tokenAmount": 5000}
            ]
        }]"#;

        let parsed = parse_transactions(raw).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].native_transfers.len(), 1);
        assert_eq!(parsed[0].native_transfers[0].amount, 7.0);
        assert!(parsed[0].token_transfers.is_empty());
        assert_eq!(parsed[0].timestamp, None);
    }

    #[test]
    fn skips_entries_that_are_not_objects() {
        let parsed = parse_transactions(&format!(r#"[1, "x", {ENTRY}]"#)).unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
