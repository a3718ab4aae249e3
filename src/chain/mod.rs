mod collect;
mod parse;
mod sse;
mod types;

pub use collect::{DataSource, LoadedAddress, load_address};
pub use types::{NativeTransfer, TokenTransfer, Transaction};
