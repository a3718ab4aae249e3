use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::parse::parse_transactions;
use super::sse::read_risk_score;
use super::types::Transaction;

/// Where transaction histories and captured risk streams are read from.
///
/// Either path may be a single file (used for every address) or a directory
/// holding `<address>.json` / `<address>.sse` files.
#[derive(Clone, Debug)]
pub struct DataSource {
    transactions: PathBuf,
    risk: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadedAddress {
    pub address: String,
    pub transactions: Vec<Transaction>,
    pub risk_score: Option<f64>,
}

impl DataSource {
    pub fn new(transactions: PathBuf, risk: Option<PathBuf>) -> Self {
        Self { transactions, risk }
    }

    fn transactions_path(&self, address: &str) -> PathBuf {
        per_address_path(&self.transactions, address, "json")
    }

    fn risk_path(&self, address: &str) -> Option<PathBuf> {
        self.risk
            .as_deref()
            .map(|path| per_address_path(path, address, "sse"))
    }
}

fn per_address_path(base: &Path, address: &str, extension: &str) -> PathBuf {
    if base.is_dir() {
        base.join(format!("{address}.{extension}"))
    } else {
        base.to_path_buf()
    }
}

fn read_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read transaction history {}", path.display()))?;
    parse_transactions(&raw)
        .with_context(|| format!("failed to parse transaction history {}", path.display()))
}

/// Loads a transaction history, degrading to an empty list on any failure.
pub fn load_transactions(path: &Path) -> Vec<Transaction> {
    match read_transactions(path) {
        Ok(transactions) => {
            info!(
                path = %path.display(),
                count = transactions.len(),
                "loaded transaction history"
            );
            transactions
        }
        Err(error) => {
            warn!(error = %format!("{error:#}"), "transaction history unavailable");
            Vec::new()
        }
    }
}

pub fn load_risk_score(path: &Path) -> Option<f64> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) => {
            warn!(path = %path.display(), %error, "risk stream unavailable");
            return None;
        }
    };

    let risk_score = read_risk_score(BufReader::new(file));
    info!(path = %path.display(), ?risk_score, "risk stream finished");
    risk_score
}

pub fn load_address(source: &DataSource, address: &str) -> LoadedAddress {
    let transactions = load_transactions(&source.transactions_path(address));
    let risk_score = source
        .risk_path(address)
        .and_then(|path| load_risk_score(&path));

    LoadedAddress {
        address: address.to_string(),
        transactions,
        risk_score,
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        let dir = std::env::temp_dir().join(format!("txflow-{name}-{}-{nanos}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_history_degrades_to_empty_list() {
        let dir = scratch_dir("missing");
        assert!(load_transactions(&dir.join("nope.json")).is_empty());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn malformed_history_degrades_to_empty_list() {
        let dir = scratch_dir("malformed");
        let path = dir.join("bad.json");
        fs::write(&path, r#"{"unexpected": true}"#).unwrap();
        assert!(load_transactions(&path).is_empty());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn directory_sources_resolve_per_address_files() {
        let dir = scratch_dir("per-address");
        fs::write(
            dir.join("Addr1.json"),
            r#"{"data": [{"signature": "s", "nativeTransfers": [
                {"fromUserAccount": "B", "toUserAccount": "Addr1", "amount": 10}
            ]}]}"#,
        )
        .unwrap();
        fs::write(
            dir.join("Addr1.sse"),
            "data: {\"analysis_result\": {\"threat_analysis\": {\"risk_score\": 12}}}\n",
        )
        .unwrap();

        let source = DataSource::new(dir.clone(), Some(dir.clone()));
        let loaded = load_address(&source, "Addr1");
        assert_eq!(loaded.address, "Addr1");
        assert_eq!(loaded.transactions.len(), 1);
        assert_eq!(loaded.risk_score, Some(12.0));

        let other = load_address(&source, "Addr2");
        assert!(other.transactions.is_empty());
        assert_eq!(other.risk_score, None);

        fs::remove_dir_all(dir).unwrap();
    }
}
