//! Password hashing and bearer tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::Error;

const SALT_LEN: usize = 16;
const GENERATED_SECRET_LEN: usize = 32;

/// Hashes and verifies passwords as argon2 encoded strings.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    mem_cost: u32,
    time_cost: u32,
}

impl PasswordHasher {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            mem_cost: config.hash_mem_cost_kib,
            time_cost: config.hash_time_cost,
        }
    }

    pub fn hash(&self, password: &str) -> Result<String, Error> {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let config = argon2::Config {
            mem_cost: self.mem_cost,
            time_cost: self.time_cost,
            ..argon2::Config::default()
        };
        Ok(argon2::hash_encoded(password.as_bytes(), &salt, &config)?)
    }

    /// Parameters are read back from the encoded hash, not from `self`.
    pub fn verify(&self, hash: &str, password: &str) -> Result<bool, Error> {
        Ok(argon2::verify_encoded(hash, password.as_bytes())?)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates HS256 tokens whose subject is a user id.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// `None` when the configured hours don't fit a `Duration`
    ttl: Option<Duration>,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = match &config.jwt_secret {
            Some(secret) => secret.as_bytes().to_vec(),
            None => {
                tracing::warn!("no jwt_secret configured, tokens will not outlive this process");
                let mut secret = vec![0u8; GENERATED_SECRET_LEN];
                rand::thread_rng().fill_bytes(&mut secret);
                secret
            }
        };
        Self {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
            ttl: Duration::try_hours(config.token_ttl_hours),
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, Error> {
        let now = Utc::now();
        let expires_at = self
            .ttl
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(Error::TokenLifetimeOutOfRange)?;
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Returns the subject of a valid, unexpired token.
    pub fn verify(&self, token: &str) -> Result<Uuid, Error> {
        decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims.sub)
            .map_err(|_| Error::InvalidToken)
    }
}
