//! Credential verification against stored one-way hashes.

use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};
use password_hash::{PasswordHash, SaltString};
use thiserror::Error;

use crate::{Identity, IdentityLookup, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("either a username or an email must be provided")]
    MissingIdentifier,

    #[error("identity not found")]
    UnknownIdentity,

    /// Deliberately does not say which half (identifier vs secret) was wrong.
    #[error("bad credentials")]
    BadCredentials,

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// One-way hash seam. The stored hash is opaque to everything above it.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError>;
    fn matches(&self, plaintext: &str, hash: &str) -> bool;
}

/// Argon2id hashing with per-password random salts (PHC string format).
#[derive(Debug, Default, Clone, Copy)]
pub struct ArgonHasher;

impl CredentialHasher for ArgonHasher {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes).map_err(|e| CredentialError::Hash(e.to_string()))?;
        let salt =
            SaltString::encode_b64(&salt_bytes).map_err(|e| CredentialError::Hash(e.to_string()))?;

        let argon2 = Argon2::default();
        let phc = argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hash(e.to_string()))?
            .to_string();
        Ok(phc)
    }

    fn matches(&self, plaintext: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// Resolve an identity by exactly one discriminator and check its secret.
///
/// Lookup order: username when non-empty, else email. Guest identities
/// short-circuit successfully without consulting the secret at all — guest
/// accounts carry no password and exist for frictionless browsing.
///
/// Read-only; never mutates anything.
pub fn verify_credentials<L>(
    directory: &L,
    hasher: &dyn CredentialHasher,
    username: &str,
    email: &str,
    secret: &str,
) -> Result<Identity, CredentialError>
where
    L: IdentityLookup + ?Sized,
{
    let username = username.trim();
    let email = email.trim();

    let identity = if !username.is_empty() {
        directory.identity_by_username(username)
    } else if !email.is_empty() {
        directory.identity_by_email(email)
    } else {
        return Err(CredentialError::MissingIdentifier);
    }
    .ok_or(CredentialError::UnknownIdentity)?;

    if identity.role == Role::Guest {
        return Ok(identity);
    }

    let stored = identity
        .password_hash
        .as_deref()
        .ok_or(CredentialError::BadCredentials)?;

    if hasher.matches(secret, stored) {
        Ok(identity)
    } else {
        Err(CredentialError::BadCredentials)
    }
}
