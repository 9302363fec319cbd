use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Argon2 encoded hash, never the plain password.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

pub trait UsersRepository {
    /// Stores a new user and returns it with its assigned id.
    /// Returns an error if a user with the same email already exists.
    fn create(&mut self, user: NewUser) -> Result<User, Error>;

    fn find_by_email(&self, email: &str) -> Option<&User>;

    fn find_by_id(&self, id: Uuid) -> Option<&User>;

    /// All users, in no particular order.
    fn list(&self) -> Vec<&User>;
}

#[derive(Default)]
pub struct InMemoryUsersRepository {
    users: HashMap<Uuid, User>,
    /// Email -> user id, keeps emails unique
    by_email: HashMap<String, Uuid>,
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            by_email: HashMap::new(),
        }
    }
}

impl UsersRepository for InMemoryUsersRepository {
    fn create(&mut self, user: NewUser) -> Result<User, Error> {
        if self.by_email.contains_key(&user.email) {
            return Err(Error::EmailAlreadyExists);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        self.by_email.insert(user.email.clone(), user.id);
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn find_by_email(&self, email: &str) -> Option<&User> {
        self.by_email.get(email).and_then(|id| self.users.get(id))
    }

    fn find_by_id(&self, id: Uuid) -> Option<&User> {
        self.users.get(&id)
    }

    fn list(&self) -> Vec<&User> {
        self.users.values().collect()
    }
}
