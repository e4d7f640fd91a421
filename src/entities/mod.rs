// Entity Models
//
// - Account: one holder's balance and the rules that move it
// - AccountDirectory: every account of the session, looked up by number

pub mod account;
pub mod directory;

pub use account::{parse_amount, Account, Counterparty, Receipt};
pub use directory::{AccountDirectory, NumberPolicy};
