//! The runner is responsible for setting up a file stream for reading from CSV,
//! replaying the ledger operations, and writing the resulting balances to a writer.
//!
//! This module provides both a synchronous and an asynchronous runner implementations.
//!
mod async_runner;
mod sync_runner;

pub use async_runner::run as run_async;
pub use sync_runner::run;

use crate::{
    dto::{BalanceRow, LedgerRow, Operation},
    stores::{StatementsRepository, UsersRepository},
    Error, Ledger, StatementType,
};

/// Applies one input row to the ledger.
fn apply_row<U, S>(ledger: &mut Ledger<U, S>, row: LedgerRow) -> Result<(), Error>
where
    U: UsersRepository,
    S: StatementsRepository,
{
    let statement_type = match row.op {
        Operation::Register => {
            let name = row.name.ok_or(Error::MissingField("name"))?;
            let password = row.password.ok_or(Error::MissingField("password"))?;
            ledger.create_user(&name, &row.email, &password)?;
            return Ok(());
        }
        Operation::Deposit => StatementType::Deposit,
        Operation::Withdraw => StatementType::Withdraw,
    };
    let amount = row.amount.ok_or(Error::MissingField("amount"))?;
    let user = ledger.find_user_by_email(&row.email)?;
    ledger.create_statement(
        user.id,
        statement_type,
        amount,
        row.description.as_deref().unwrap_or_default(),
    )?;
    Ok(())
}

/// Applies a row, logging and skipping it if the ledger rejects it.
/// A rejected row never stops the run.
fn process_row<U, S>(ledger: &mut Ledger<U, S>, line: u64, row: LedgerRow)
where
    U: UsersRepository,
    S: StatementsRepository,
{
    if let Err(err) = apply_row(ledger, row) {
        tracing::warn!(line, error = %err, "row skipped");
    }
}

/// Current balance of every registered user, ordered by email.
fn balance_rows<U, S>(ledger: &Ledger<U, S>) -> Result<Vec<BalanceRow>, Error>
where
    U: UsersRepository,
    S: StatementsRepository,
{
    let mut rows = ledger
        .profiles()
        .map(|profile| {
            let balance = ledger.get_balance(profile.id)?.balance;
            Ok(BalanceRow {
                email: profile.email,
                name: profile.name,
                balance: balance.normalize(),
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;
    rows.sort_by(|a, b| a.email.cmp(&b.email));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tests::test_config;
    use rust_decimal_macros::dec;

    fn row(op: Operation, email: &str) -> LedgerRow {
        LedgerRow {
            op,
            email: email.to_string(),
            name: None,
            password: None,
            amount: None,
            description: None,
        }
    }

    fn register(email: &str) -> LedgerRow {
        LedgerRow {
            name: Some("John Doe".to_string()),
            password: Some("123".to_string()),
            ..row(Operation::Register, email)
        }
    }

    #[test]
    fn test_apply_rows() {
        let mut ledger = Ledger::new(&test_config());
        apply_row(&mut ledger, register("johndoe@example.com")).unwrap();
        apply_row(
            &mut ledger,
            LedgerRow {
                amount: Some(dec!(200.5)),
                ..row(Operation::Deposit, "johndoe@example.com")
            },
        )
        .unwrap();
        apply_row(
            &mut ledger,
            LedgerRow {
                amount: Some(dec!(100)),
                description: Some("Rent".to_string()),
                ..row(Operation::Withdraw, "johndoe@example.com")
            },
        )
        .unwrap();

        let rows = balance_rows(&ledger).unwrap();
        assert_eq!(
            rows,
            vec![BalanceRow {
                email: "johndoe@example.com".to_string(),
                name: "John Doe".to_string(),
                balance: dec!(100.5),
            }]
        );
    }

    #[test]
    fn test_missing_fields() {
        let mut ledger = Ledger::new(&test_config());
        assert!(matches!(
            apply_row(&mut ledger, row(Operation::Register, "johndoe@example.com")),
            Err(Error::MissingField("name"))
        ));
        apply_row(&mut ledger, register("johndoe@example.com")).unwrap();
        assert!(matches!(
            apply_row(&mut ledger, row(Operation::Deposit, "johndoe@example.com")),
            Err(Error::MissingField("amount"))
        ));
    }

    #[test]
    fn test_statement_for_unregistered_email() {
        let mut ledger = Ledger::new(&test_config());
        let result = apply_row(
            &mut ledger,
            LedgerRow {
                amount: Some(dec!(1)),
                ..row(Operation::Deposit, "ghost@example.com")
            },
        );
        assert!(matches!(result, Err(Error::UserNotFound)));
    }
}
