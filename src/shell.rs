// Numbered text menu over an AccountDirectory
//
// Reads one value per line from any BufRead and writes prompts and results to
// any Write, so a session can be scripted in tests. Bad input is rejected with
// a message and the menu comes back; end of input ends the session.

use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::debug;

use crate::entities::{parse_amount, AccountDirectory, Receipt};
use crate::error::{BankResult, Party};

const INVALID_AMOUNT: &str = "Invalid amount.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    CreateAccount,
    Deposit,
    Withdraw,
    Transfer,
    ViewDetails,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 6] = [
        MenuChoice::CreateAccount,
        MenuChoice::Deposit,
        MenuChoice::Withdraw,
        MenuChoice::Transfer,
        MenuChoice::ViewDetails,
        MenuChoice::Exit,
    ];

    /// "1".."6" → choice, anything else → None
    pub fn parse(input: &str) -> Option<Self> {
        let n: usize = input.trim().parse().ok()?;
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuChoice::CreateAccount => "Create Account",
            MenuChoice::Deposit => "Deposit Money",
            MenuChoice::Withdraw => "Withdraw Money",
            MenuChoice::Transfer => "Transfer Money",
            MenuChoice::ViewDetails => "View Account Details",
            MenuChoice::Exit => "Exit",
        }
    }
}

enum Flow {
    Continue,
    Stop,
}

pub struct Shell<R, W> {
    input: R,
    output: W,
    directory: AccountDirectory,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W, directory: AccountDirectory) -> Self {
        Shell {
            input,
            output,
            directory,
        }
    }

    pub fn into_directory(self) -> AccountDirectory {
        self.directory
    }

    /// Menu loop; returns when the user picks Exit or input runs out
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.display_menu()?;
            let Some(line) = self.prompt("Choose an option: ")? else {
                break;
            };

            let flow = match MenuChoice::parse(&line) {
                Some(MenuChoice::Exit) => Flow::Stop,
                Some(choice) => {
                    debug!(choice = choice.label(), "menu choice");
                    self.dispatch(choice)?
                }
                None => {
                    self.say("Invalid option. Try again.")?;
                    Flow::Continue
                }
            };

            if let Flow::Stop = flow {
                break;
            }
        }

        self.say("Exiting the system.")?;
        self.output.flush()?;
        Ok(())
    }

    fn dispatch(&mut self, choice: MenuChoice) -> Result<Flow> {
        match choice {
            MenuChoice::CreateAccount => self.create_account(),
            MenuChoice::Deposit => self.deposit_money(),
            MenuChoice::Withdraw => self.withdraw_money(),
            MenuChoice::Transfer => self.transfer_money(),
            MenuChoice::ViewDetails => self.view_account_details(),
            MenuChoice::Exit => Ok(Flow::Stop),
        }
    }

    fn display_menu(&mut self) -> Result<()> {
        self.say("Welcome to the Banking System")?;
        for (i, choice) in MenuChoice::ALL.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, choice.label())?;
        }
        Ok(())
    }

    fn create_account(&mut self) -> Result<Flow> {
        let Some(name) = self.prompt("Enter account holder's name: ")? else {
            return Ok(Flow::Stop);
        };
        let Some(number) = self.prompt("Enter account number: ")? else {
            return Ok(Flow::Stop);
        };
        let Some(raw) = self.prompt("Enter initial deposit amount: ")? else {
            return Ok(Flow::Stop);
        };
        let Some(initial) = parse_amount(&raw) else {
            self.say(INVALID_AMOUNT)?;
            return Ok(Flow::Continue);
        };

        let created = self.directory.create(name, number, initial).map(|_| ());
        match created {
            Ok(()) => self.say("Account created successfully.")?,
            Err(err) => self.say(&err.to_string())?,
        }
        Ok(Flow::Continue)
    }

    fn deposit_money(&mut self) -> Result<Flow> {
        let Some(number) = self.prompt("Enter account number: ")? else {
            return Ok(Flow::Stop);
        };
        if let Some(message) = self.missing(&number, Party::Holder) {
            self.say(&message)?;
            return Ok(Flow::Continue);
        }

        let Some(raw) = self.prompt("Enter deposit amount: ")? else {
            return Ok(Flow::Stop);
        };
        let Some(amount) = parse_amount(&raw) else {
            self.say(INVALID_AMOUNT)?;
            return Ok(Flow::Continue);
        };

        let outcome = self.directory.deposit(&number, amount);
        self.report(outcome)?;
        Ok(Flow::Continue)
    }

    fn withdraw_money(&mut self) -> Result<Flow> {
        let Some(number) = self.prompt("Enter account number: ")? else {
            return Ok(Flow::Stop);
        };
        if let Some(message) = self.missing(&number, Party::Holder) {
            self.say(&message)?;
            return Ok(Flow::Continue);
        }

        let Some(raw) = self.prompt("Enter withdrawal amount: ")? else {
            return Ok(Flow::Stop);
        };
        let Some(amount) = parse_amount(&raw) else {
            self.say(INVALID_AMOUNT)?;
            return Ok(Flow::Continue);
        };

        let outcome = self.directory.withdraw(&number, amount);
        self.report(outcome)?;
        Ok(Flow::Continue)
    }

    fn transfer_money(&mut self) -> Result<Flow> {
        let Some(from) = self.prompt("Enter your account number: ")? else {
            return Ok(Flow::Stop);
        };
        if let Some(message) = self.missing(&from, Party::Source) {
            self.say(&message)?;
            return Ok(Flow::Continue);
        }

        let Some(to) = self.prompt("Enter recipient account number: ")? else {
            return Ok(Flow::Stop);
        };
        if let Some(message) = self.missing(&to, Party::Recipient) {
            self.say(&message)?;
            return Ok(Flow::Continue);
        }

        let Some(raw) = self.prompt("Enter transfer amount: ")? else {
            return Ok(Flow::Stop);
        };
        let Some(amount) = parse_amount(&raw) else {
            self.say(INVALID_AMOUNT)?;
            return Ok(Flow::Continue);
        };

        let outcome = self.directory.transfer(&from, &to, amount);
        self.report(outcome)?;
        Ok(Flow::Continue)
    }

    fn view_account_details(&mut self) -> Result<Flow> {
        let Some(number) = self.prompt("Enter account number: ")? else {
            return Ok(Flow::Stop);
        };

        let lines = match self.directory.require(&number, Party::Holder) {
            Ok(account) => vec![
                format!("Account holder: {}", account.holder_name()),
                format!("Account number: {}", account.account_number()),
                format!("Balance: {}", account.balance()),
            ],
            Err(err) => vec![err.to_string()],
        };

        for line in lines {
            self.say(&line)?;
        }
        Ok(Flow::Continue)
    }

    fn missing(&self, number: &str, party: Party) -> Option<String> {
        self.directory
            .require(number, party)
            .err()
            .map(|err| err.to_string())
    }

    fn report(&mut self, outcome: BankResult<Receipt>) -> Result<()> {
        match outcome {
            Ok(receipt) => self.say(&receipt.to_string()),
            Err(err) => self.say(&err.to_string()),
        }
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }

    /// Print a prompt and read one trimmed line; None once input is exhausted
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        self.say(message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Cursor;

    fn run_session(script: &str, directory: AccountDirectory) -> (String, AccountDirectory) {
        let mut output = Vec::new();
        let mut shell = Shell::new(Cursor::new(script.to_string()), &mut output, directory);
        shell.run().unwrap();
        let directory = shell.into_directory();
        (String::from_utf8(output).unwrap(), directory)
    }

    fn amount(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_menu_choice_parse() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::CreateAccount));
        assert_eq!(MenuChoice::parse(" 4 "), Some(MenuChoice::Transfer));
        assert_eq!(MenuChoice::parse("6"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("0"), None);
        assert_eq!(MenuChoice::parse("7"), None);
        assert_eq!(MenuChoice::parse("abc"), None);
    }

    #[test]
    fn test_menu_is_printed() {
        let (out, _) = run_session("6\n", AccountDirectory::new());

        assert!(out.contains("Welcome to the Banking System"));
        assert!(out.contains("1. Create Account"));
        assert!(out.contains("5. View Account Details"));
        assert!(out.contains("6. Exit"));
        assert!(out.ends_with("Exiting the system.\n"));
    }

    #[test]
    fn test_create_and_view() {
        let script = "1\nAda Lovelace\nACC-1\n100\n5\nACC-1\n6\n";
        let (out, directory) = run_session(script, AccountDirectory::new());

        assert!(out.contains("Account created successfully."));
        assert!(out.contains("Account holder: Ada Lovelace"));
        assert!(out.contains("Account number: ACC-1"));
        assert!(out.contains("Balance: 100"));
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_deposit_and_withdraw() {
        let script = "1\nAda\nA\n100\n2\nA\n25\n3\nA\n1000\n3\nA\n40\n6\n";
        let (out, directory) = run_session(script, AccountDirectory::new());

        assert!(out.contains("Deposited 25. New balance: 125"));
        assert!(out.contains("Invalid withdrawal amount or insufficient funds."));
        assert!(out.contains("Withdrew 40. New balance: 85"));
        assert_eq!(directory.find_by_number("A").unwrap().balance(), amount("85"));
    }

    #[test]
    fn test_invalid_deposit_amount() {
        let script = "1\nAda\nA\n100\n2\nA\n-5\n2\nA\nlots\n6\n";
        let (out, directory) = run_session(script, AccountDirectory::new());

        assert!(out.contains("Invalid deposit amount."));
        assert!(out.contains("Invalid amount."));
        assert_eq!(directory.find_by_number("A").unwrap().balance(), amount("100"));
    }

    #[test]
    fn test_transfer_session() {
        let script = "1\nAlice\nA\n100\n1\nBob\nB\n0\n4\nA\nB\n50\n6\n";
        let (out, directory) = run_session(script, AccountDirectory::new());

        assert!(out.contains(
            "Withdrew 50. New balance: 50\n\
             Deposited 50. New balance: 50\n\
             Transferred 50 to account B\n"
        ));
        assert_eq!(directory.find_by_number("A").unwrap().balance(), amount("50"));
        assert_eq!(directory.find_by_number("B").unwrap().balance(), amount("50"));
    }

    #[test]
    fn test_transfer_unknown_accounts() {
        let mut directory = AccountDirectory::new();
        directory.create("Alice", "A", amount("100")).unwrap();

        let (out, _) = run_session("4\nX\n4\nA\nY\n6\n", directory);

        assert!(out.contains("Your account not found."));
        assert!(out.contains("Recipient account not found."));
        assert!(!out.contains("Enter transfer amount: "));
    }

    #[test]
    fn test_unknown_account_skips_amount_prompt() {
        let (out, _) = run_session("2\nnonexistent\n5\nnonexistent\n6\n", AccountDirectory::new());

        assert_eq!(out.matches("Account not found.").count(), 2);
        assert!(!out.contains("Enter deposit amount: "));
    }

    #[test]
    fn test_oversized_deposit_is_rejected() {
        let script = "1\nBig\nA\n79228162514264337593543950335\n2\nA\n1\n6\n";
        let (out, directory) = run_session(script, AccountDirectory::new());

        assert!(out.contains("Invalid deposit amount."));
        assert!(out.ends_with("Exiting the system.\n"));
        assert_eq!(directory.find_by_number("A").unwrap().balance(), Decimal::MAX);
    }

    #[test]
    fn test_invalid_option() {
        let (out, _) = run_session("9\nhello\n6\n", AccountDirectory::new());
        assert_eq!(out.matches("Invalid option. Try again.").count(), 2);
    }

    #[test]
    fn test_end_of_input_ends_session() {
        let (out, directory) = run_session("1\nAda\n", AccountDirectory::new());

        assert!(out.ends_with("Exiting the system.\n"));
        assert!(directory.is_empty());
    }

    #[test]
    fn test_duplicate_number_under_unique_policy() {
        let directory = AccountDirectory::with_policy(crate::entities::NumberPolicy::Unique);
        let script = "1\nAda\nA\n10\n1\nBob\nA\n20\n6\n";
        let (out, directory) = run_session(script, directory);

        assert_eq!(out.matches("Account created successfully.").count(), 1);
        assert!(out.contains("Account number A is already in use."));
        assert_eq!(directory.len(), 1);
    }
}
