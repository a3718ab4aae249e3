#[derive(Clone, Debug, PartialEq)]
pub struct NativeTransfer {
    pub from: String,
    pub to: String,
    /// Base units (lamports).
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TokenTransfer {
    pub from: String,
    pub to: String,
    pub token_amount: f64,
    pub mint: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transaction {
    pub signature: String,
    /// Unix seconds.
    pub timestamp: Option<i64>,
    /// Base units (lamports).
    pub fee: Option<f64>,
    pub native_transfers: Vec<NativeTransfer>,
    pub token_transfers: Vec<TokenTransfer>,
}
