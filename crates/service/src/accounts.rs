//! Account lifecycle: signup, login, and administrative identity CRUD.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use bookshelf_auth::{
    may_create_identity, may_delete_identity, may_update_identity, verify_credentials,
    CredentialHasher, Identity, NewIdentity, Role, TokenService,
};
use bookshelf_core::{ExpectedVersion, UserId};
use bookshelf_store::{CatalogStore, StoreDirectory};

use crate::error::user_store_err;
use crate::{Actor, ServiceError};

/// Public self-signup request.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub cover_image: Option<String>,
}

/// Administrative create request (role constrained by the caller's rank).
#[derive(Debug, Clone)]
pub struct IdentityDraft {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub cover_image: Option<String>,
}

/// Partial identity update. `username` is deliberately absent: it is the
/// token subject, and renaming it would orphan live sessions.
#[derive(Debug, Clone, Default)]
pub struct IdentityPatch {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub identity: Identity,
}

pub struct AccountService<S> {
    store: Arc<S>,
    tokens: Arc<TokenService>,
    hasher: Arc<dyn CredentialHasher>,
}

impl<S: CatalogStore> AccountService<S> {
    pub fn new(store: Arc<S>, tokens: Arc<TokenService>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            store,
            tokens,
            hasher,
        }
    }

    /// Unauthenticated self-signup. The requested role must be READER;
    /// nothing is persisted otherwise.
    pub fn signup(&self, req: SignupRequest) -> Result<Identity, ServiceError> {
        if req.role != Role::Reader {
            return Err(ServiceError::RoleNotAllowed(format!(
                "self-signup is limited to READER accounts, got {}",
                req.role
            )));
        }
        validate_account_fields(&req.username, &req.email, &req.password)?;

        let password_hash = self.hasher.hash(&req.password)?;
        let identity = self
            .store
            .insert_user(NewIdentity {
                username: req.username.trim().to_string(),
                email: req.email.trim().to_string(),
                password_hash,
                role: Role::Reader,
                cover_image: req.cover_image,
            })
            .map_err(user_store_err)?;

        tracing::info!(user = %identity.username, id = %identity.id, "self-signup completed");
        Ok(identity)
    }

    /// Verify credentials (one of username/email) and mint a bearer token.
    pub fn login(
        &self,
        username: &str,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, ServiceError> {
        let directory = StoreDirectory(self.store.as_ref());
        let identity = verify_credentials(&directory, self.hasher.as_ref(), username, email, password)?;
        let token = self.tokens.issue(&directory, Some(&identity), now)?;

        tracing::debug!(user = %identity.username, "login succeeded");
        Ok(LoginOutcome { token, identity })
    }

    /// Start an anonymous guest session: a token for the synthetic guest,
    /// minted without any credential exchange.
    pub fn guest_session(&self, now: DateTime<Utc>) -> Result<LoginOutcome, ServiceError> {
        let directory = StoreDirectory(self.store.as_ref());
        let token = self.tokens.issue(&directory, None, now)?;
        let identity = Identity::guest(self.tokens.guest_username());

        tracing::debug!("guest session started");
        Ok(LoginOutcome { token, identity })
    }

    pub fn create_identity(
        &self,
        actor: &Actor,
        draft: IdentityDraft,
    ) -> Result<Identity, ServiceError> {
        let caller = actor.require()?;
        let is_same = caller.username == draft.username.trim();
        if !may_create_identity(caller.role, draft.role, is_same) {
            return Err(ServiceError::Forbidden);
        }
        validate_account_fields(&draft.username, &draft.email, &draft.password)?;

        let password_hash = self.hasher.hash(&draft.password)?;
        let identity = self
            .store
            .insert_user(NewIdentity {
                username: draft.username.trim().to_string(),
                email: draft.email.trim().to_string(),
                password_hash,
                role: draft.role,
                cover_image: draft.cover_image,
            })
            .map_err(user_store_err)?;

        tracing::info!(
            actor = %caller.username,
            user = %identity.username,
            role = %identity.role,
            "identity created"
        );
        Ok(identity)
    }

    pub fn update_identity(
        &self,
        actor: &Actor,
        target: UserId,
        patch: IdentityPatch,
    ) -> Result<Identity, ServiceError> {
        let caller = actor.require()?;
        let current = self
            .store
            .find_user_by_id(target)
            .ok_or(ServiceError::IdentityNotFound)?;

        let is_same = caller.username == current.username;
        if !may_update_identity(caller.role, current.role, is_same) {
            return Err(ServiceError::Forbidden);
        }

        let mut updated = current.clone();
        if let Some(email) = patch.email {
            let email = email.trim().to_string();
            if email.is_empty() || !email.contains('@') {
                return Err(ServiceError::validation("invalid email"));
            }
            updated.email = email;
        }
        if let Some(password) = patch.password {
            if password.is_empty() {
                return Err(ServiceError::validation("password cannot be empty"));
            }
            updated.password_hash = Some(self.hasher.hash(&password)?);
        }
        if let Some(role) = patch.role {
            // Changing a role is rank-gated like creating one: SUPER may set
            // any role, ADMIN only READER. Blocks self-escalation.
            if role != current.role && !may_create_identity(caller.role, role, false) {
                return Err(ServiceError::Forbidden);
            }
            updated.role = role;
        }
        if let Some(cover) = patch.cover_image {
            updated.cover_image = Some(cover);
        }

        let saved = self
            .store
            .update_user(updated, ExpectedVersion::Exact(current.version))
            .map_err(user_store_err)?;

        tracing::info!(actor = %caller.username, user = %saved.username, "identity updated");
        Ok(saved)
    }

    pub fn delete_identity(&self, actor: &Actor, target: UserId) -> Result<(), ServiceError> {
        let caller = actor.require()?;
        let current = self
            .store
            .find_user_by_id(target)
            .ok_or(ServiceError::IdentityNotFound)?;

        let is_same = caller.username == current.username;
        if !may_delete_identity(caller.role, current.role, is_same) {
            return Err(ServiceError::Forbidden);
        }

        self.store.delete_user(target).map_err(user_store_err)?;
        tracing::info!(actor = %caller.username, user = %current.username, "identity deleted");
        Ok(())
    }

    pub fn get_identity(&self, actor: &Actor, target: UserId) -> Result<Identity, ServiceError> {
        let caller = actor.require()?;
        let current = self
            .store
            .find_user_by_id(target)
            .ok_or(ServiceError::IdentityNotFound)?;

        if caller.username != current.username
            && !matches!(caller.role, Role::Super | Role::Admin)
        {
            return Err(ServiceError::Forbidden);
        }
        Ok(current)
    }

    pub fn list_identities(&self, actor: &Actor) -> Result<Vec<Identity>, ServiceError> {
        let caller = actor.require()?;
        if !matches!(caller.role, Role::Super | Role::Admin) {
            return Err(ServiceError::Forbidden);
        }
        Ok(self.store.list_users())
    }
}

fn validate_account_fields(username: &str, email: &str, password: &str) -> Result<(), ServiceError> {
    if username.trim().is_empty() {
        return Err(ServiceError::validation("username cannot be empty"));
    }
    if email.trim().is_empty() || !email.contains('@') {
        return Err(ServiceError::validation("invalid email"));
    }
    if password.is_empty() {
        return Err(ServiceError::validation("password cannot be empty"));
    }
    Ok(())
}
