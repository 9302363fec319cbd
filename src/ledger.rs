use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{PasswordHasher, TokenIssuer};
use crate::config::AuthConfig;
use crate::stores::{
    InMemoryStatementsRepository, InMemoryUsersRepository, NewStatement, NewUser, Statement,
    StatementsRepository, User, UsersRepository,
};
use crate::{Error, StatementType};

/// Public view of a user, without the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for Profile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Session {
    pub user: Profile,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct Balance {
    pub balance: Decimal,
    /// Oldest first
    pub statements: Vec<Statement>,
}

/// Deposits minus withdrawals. Fails rather than wrapping if a running sum
/// leaves the `Decimal` range.
pub fn balance_of<'a>(
    statements: impl IntoIterator<Item = &'a Statement>,
) -> Result<Decimal, Error> {
    statements
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, statement| {
            match statement.statement_type {
                StatementType::Deposit => acc.checked_add(statement.amount),
                StatementType::Withdraw => acc.checked_sub(statement.amount),
            }
            .ok_or(Error::AmountTooLarge)
        })
}

/// User and statement use cases over a pair of repositories.
///
/// Balances are never stored: every withdrawal and every balance query sums
/// the user's full statement history. Mutating operations take `&mut self`,
/// so a single ledger can't interleave two balance-check-then-append
/// sequences. Nothing here guards a repository that is shared with another
/// writer.
pub struct Ledger<U = InMemoryUsersRepository, S = InMemoryStatementsRepository> {
    users: U,
    statements: S,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl Ledger {
    /// In-memory ledger.
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_repositories(
            InMemoryUsersRepository::new(),
            InMemoryStatementsRepository::new(),
            config,
        )
    }
}

impl<U, S> Ledger<U, S>
where
    U: UsersRepository,
    S: StatementsRepository,
{
    pub fn with_repositories(users: U, statements: S, config: &AuthConfig) -> Self {
        Self {
            users,
            statements,
            hasher: PasswordHasher::new(config),
            tokens: TokenIssuer::new(config),
        }
    }

    pub fn create_user(&mut self, name: &str, email: &str, password: &str) -> Result<Profile, Error> {
        // Checked up front so a duplicate doesn't pay for hashing
        if self.users.find_by_email(email).is_some() {
            return Err(Error::EmailAlreadyExists);
        }
        let password_hash = self.hasher.hash(password)?;
        let user = self.users.create(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
        })?;
        tracing::info!(user_id = %user.id, "user created");
        Ok(Profile::from(&user))
    }

    /// Unknown email and wrong password fail the same way.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Session, Error> {
        let user = self
            .users
            .find_by_email(email)
            .ok_or(Error::IncorrectEmailOrPassword)?;
        if !self.hasher.verify(&user.password_hash, password)? {
            tracing::debug!(user_id = %user.id, "password mismatch");
            return Err(Error::IncorrectEmailOrPassword);
        }
        let token = self.tokens.issue(user.id)?;
        Ok(Session {
            user: Profile::from(user),
            token,
        })
    }

    /// Resolves a bearer token to the id of an existing user.
    pub fn verify_token(&self, token: &str) -> Result<Uuid, Error> {
        let user_id = self.tokens.verify(token)?;
        self.find_user(user_id)?;
        Ok(user_id)
    }

    pub fn show_profile(&self, user_id: Uuid) -> Result<Profile, Error> {
        self.find_user(user_id).map(Profile::from)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Profile, Error> {
        self.users
            .find_by_email(email)
            .map(Profile::from)
            .ok_or(Error::UserNotFound)
    }

    pub fn profiles(&self) -> impl Iterator<Item = Profile> + '_ {
        self.users.list().into_iter().map(Profile::from)
    }

    pub fn create_statement(
        &mut self,
        user_id: Uuid,
        statement_type: StatementType,
        amount: Decimal,
        description: &str,
    ) -> Result<Statement, Error> {
        self.find_user(user_id)?;
        if amount <= Decimal::ZERO {
            return Err(Error::AmountMustBePositive);
        }
        let balance = balance_of(self.statements.list_by_user(user_id))?;
        match statement_type {
            StatementType::Withdraw if amount > balance => {
                tracing::debug!(%user_id, %amount, %balance, "withdrawal rejected");
                return Err(Error::InsufficientFunds);
            }
            // Every later balance sums this deposit, so it must fit now
            StatementType::Deposit if balance.checked_add(amount).is_none() => {
                tracing::debug!(%user_id, %amount, %balance, "deposit rejected");
                return Err(Error::AmountTooLarge);
            }
            _ => {}
        }
        let statement = self.statements.create(NewStatement {
            user_id,
            statement_type,
            amount,
            description: description.to_string(),
        });
        tracing::info!(
            %user_id,
            statement_id = %statement.id,
            kind = ?statement.statement_type,
            %amount,
            "statement created"
        );
        Ok(statement)
    }

    pub fn get_balance(&self, user_id: Uuid) -> Result<Balance, Error> {
        self.find_user(user_id)?;
        let statements = self.statements.list_by_user(user_id);
        Ok(Balance {
            balance: balance_of(statements.iter().copied())?,
            statements: statements.into_iter().cloned().collect(),
        })
    }

    pub fn get_statement_operation(
        &self,
        user_id: Uuid,
        statement_id: Uuid,
    ) -> Result<Statement, Error> {
        self.find_user(user_id)?;
        self.statements
            .find_by_id(user_id, statement_id)
            .cloned()
    }

    fn find_user(&self, user_id: Uuid) -> Result<&User, Error> {
        self.users.find_by_id(user_id).ok_or(Error::UserNotFound)
    }
}
