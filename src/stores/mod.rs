//! Storage layer for the ledger. Provides storage for:
//! - Registered users, indexed by id and email ([`UsersRepository`])
//! - The append-only statement history ([`StatementsRepository`])
//!
//! The ledger only talks to the traits. The in-memory implementations
//! back the tests and the batch runner.

mod statements;
mod users;

pub use statements::{InMemoryStatementsRepository, NewStatement, Statement, StatementsRepository};
pub use users::{InMemoryUsersRepository, NewUser, User, UsersRepository};
