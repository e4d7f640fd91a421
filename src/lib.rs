// Console Bank - Core Library
// Account model, directory and the text menu, shared by the binary and tests

pub mod config;
pub mod entities;
pub mod error;
pub mod shell;

// Re-export commonly used types
pub use config::Config;
pub use entities::{
    parse_amount, Account, AccountDirectory, Counterparty, NumberPolicy, Receipt,
};
pub use error::{BankError, BankResult, Operation, Party};
pub use shell::{MenuChoice, Shell};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
