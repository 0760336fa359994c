use std::sync::Arc;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

use crate::application::repos::{CreateUserParams, RepoError, UsersRepo};
use crate::domain::entities::{ActingUser, UserRecord};

const TOKEN_TAG: &str = "qt";
const PREFIX_LEN: usize = 12;
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid access token")]
    Invalid,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// A freshly registered user with the only copy of their plaintext token.
#[derive(Debug, Clone)]
pub struct IssuedUser {
    pub user: UserRecord,
    pub token: String,
}

/// Issues and verifies bearer tokens of the form `qt_<prefix>_<secret>`.
///
/// Only the prefix and a SHA-256 digest of the secret are stored.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UsersRepo>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UsersRepo>) -> Self {
        Self { users }
    }

    pub async fn register(&self, command: RegisterUserCommand) -> Result<IssuedUser, AuthError> {
        let prefix = generate_prefix();
        let secret = generate_secret();
        let token = format!("{TOKEN_TAG}_{prefix}_{secret}");

        let user = self
            .users
            .create_user(CreateUserParams {
                email: command.email,
                first_name: command.first_name,
                last_name: command.last_name,
                token_prefix: prefix,
                credential_hash: hash_secret(&secret),
            })
            .await?;

        Ok(IssuedUser { user, token })
    }

    pub async fn authenticate(&self, token: &str) -> Result<ActingUser, AuthError> {
        let parsed = parse_token(token).ok_or(AuthError::Invalid)?;
        let user = self
            .users
            .find_by_token_prefix(parsed.prefix)
            .await
            .map_err(|_| AuthError::Invalid)?
            .ok_or(AuthError::Invalid)?;

        let hashed_input = hash_secret(parsed.secret);
        if user.credential_hash.ct_eq(&hashed_input).unwrap_u8() == 0 {
            return Err(AuthError::Invalid);
        }

        Ok(ActingUser::from(&user))
    }
}

struct ParsedToken<'a> {
    prefix: &'a str,
    secret: &'a str,
}

fn parse_token(token: &str) -> Option<ParsedToken<'_>> {
    let mut parts = token.splitn(3, '_');
    if parts.next()? != TOKEN_TAG {
        return None;
    }
    let prefix = parts.next()?;
    let secret = parts.next()?;
    if prefix.is_empty() || secret.len() < MIN_SECRET_LEN {
        return None;
    }
    Some(ParsedToken { prefix, secret })
}

fn hash_secret(secret: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.finalize().to_vec()
}

fn generate_prefix() -> String {
    Uuid::new_v4().simple().to_string()[..PREFIX_LEN].to_string()
}

fn generate_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}
