//! Statement history storage.
//!
//! Statements are append-only. The store keeps them in insertion order and
//! maintains:
//! - An id index for single statement lookups
//! - A per-user index so balances don't scan other users' history
//! - Ownership validation on lookup

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{Error, StatementType};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub statement_type: StatementType,
    pub amount: Decimal,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStatement {
    pub user_id: Uuid,
    pub statement_type: StatementType,
    pub amount: Decimal,
    pub description: String,
}

pub trait StatementsRepository {
    /// Appends a statement and returns it with its assigned id.
    fn create(&mut self, statement: NewStatement) -> Statement;

    /// Gets a statement if it exists and belongs to the user.
    fn find_by_id(&self, user_id: Uuid, statement_id: Uuid) -> Result<&Statement, Error>;

    /// All statements of a user, oldest first.
    fn list_by_user(&self, user_id: Uuid) -> Vec<&Statement>;
}

#[derive(Default)]
pub struct InMemoryStatementsRepository {
    statements: Vec<Statement>,
    /// Statement id -> position in `statements`
    by_id: HashMap<Uuid, usize>,
    /// User id -> positions of that user's statements, in insertion order
    by_user: HashMap<Uuid, Vec<usize>>,
}

impl InMemoryStatementsRepository {
    pub fn new() -> Self {
        Self {
            statements: Vec::new(),
            by_id: HashMap::new(),
            by_user: HashMap::new(),
        }
    }
}

impl StatementsRepository for InMemoryStatementsRepository {
    fn create(&mut self, statement: NewStatement) -> Statement {
        let statement = Statement {
            id: Uuid::new_v4(),
            user_id: statement.user_id,
            statement_type: statement.statement_type,
            amount: statement.amount,
            description: statement.description,
            created_at: Utc::now(),
        };
        let position = self.statements.len();
        self.by_id.insert(statement.id, position);
        self.by_user
            .entry(statement.user_id)
            .or_default()
            .push(position);
        self.statements.push(statement.clone());
        statement
    }

    fn find_by_id(&self, user_id: Uuid, statement_id: Uuid) -> Result<&Statement, Error> {
        let statement = self
            .by_id
            .get(&statement_id)
            .map(|&position| &self.statements[position])
            .ok_or(Error::StatementNotFound)?;
        // Someone else's statement looks the same as a missing one
        if statement.user_id != user_id {
            return Err(Error::StatementNotFound);
        }
        Ok(statement)
    }

    fn list_by_user(&self, user_id: Uuid) -> Vec<&Statement> {
        self.by_user
            .get(&user_id)
            .map(|positions| positions.iter().map(|&p| &self.statements[p]).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn deposit(user_id: Uuid, amount: Decimal) -> NewStatement {
        NewStatement {
            user_id,
            statement_type: StatementType::Deposit,
            amount,
            description: "Deposit Test".to_string(),
        }
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = InMemoryStatementsRepository::new();
        let user_id = Uuid::new_v4();
        assert!(store.list_by_user(user_id).is_empty());
        assert!(store.find_by_id(user_id, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_store_and_get_statement() {
        let mut store = InMemoryStatementsRepository::new();
        let user_id = Uuid::new_v4();

        let created = store.create(deposit(user_id, dec!(100.50)));

        let statement = store.find_by_id(user_id, created.id).unwrap();
        assert_eq!(statement, &created);
        assert_eq!(statement.amount, dec!(100.50));
        assert_eq!(statement.statement_type, StatementType::Deposit);
    }

    #[test]
    fn test_get_nonexistent_statement() {
        let store = InMemoryStatementsRepository::new();
        assert!(matches!(
            store.find_by_id(Uuid::new_v4(), Uuid::new_v4()),
            Err(Error::StatementNotFound)
        ));
    }

    #[test]
    fn test_get_statement_wrong_user() {
        let mut store = InMemoryStatementsRepository::new();
        let owner = Uuid::new_v4();
        let created = store.create(deposit(owner, dec!(100)));

        assert!(matches!(
            store.find_by_id(Uuid::new_v4(), created.id),
            Err(Error::StatementNotFound)
        ));
    }

    #[test]
    fn test_list_keeps_insertion_order_per_user() {
        let mut store = InMemoryStatementsRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let first = store.create(deposit(alice, dec!(100)));
        store.create(deposit(bob, dec!(5)));
        let second = store.create(NewStatement {
            statement_type: StatementType::Withdraw,
            ..deposit(alice, dec!(30))
        });

        let ids: Vec<_> = store.list_by_user(alice).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(store.list_by_user(bob).len(), 1);
    }

    #[test]
    fn test_statement_ids_are_unique() {
        let mut store = InMemoryStatementsRepository::new();
        let user_id = Uuid::new_v4();
        let first = store.create(deposit(user_id, dec!(1)));
        let second = store.create(deposit(user_id, dec!(1)));
        assert_ne!(first.id, second.id);
    }
}
