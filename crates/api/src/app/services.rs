//! Service wiring: store, token service, hasher, seed bootstrap.

use std::sync::Arc;

use bookshelf_auth::{ArgonHasher, CredentialHasher, NewIdentity, Role, TokenService};
use bookshelf_service::{AccountService, BookService, SessionAuthenticator, ShelfService};
use bookshelf_store::{CatalogStore, InMemoryStore};

use crate::config::ApiConfig;

/// The wired application services, all sharing one store.
pub struct AppServices {
    pub accounts: AccountService<InMemoryStore>,
    pub books: BookService<InMemoryStore>,
    pub shelf: ShelfService<InMemoryStore>,
    pub sessions: Arc<SessionAuthenticator<InMemoryStore>>,
}

pub fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let store = Arc::new(InMemoryStore::new());
    let tokens = Arc::new(TokenService::new(
        &config.token_secret,
        config.token_ttl,
        config.guest_username.clone(),
    )?);
    let hasher: Arc<dyn CredentialHasher> = Arc::new(ArgonHasher);

    seed_root_account(store.as_ref(), hasher.as_ref(), config)?;

    Ok(AppServices {
        accounts: AccountService::new(store.clone(), tokens.clone(), hasher.clone()),
        books: BookService::new(store.clone()),
        shelf: ShelfService::new(store.clone()),
        sessions: Arc::new(SessionAuthenticator::new(store, tokens)),
    })
}

/// Seed a SUPER account into an empty store so the system is administrable
/// from the first request.
fn seed_root_account(
    store: &InMemoryStore,
    hasher: &dyn CredentialHasher,
    config: &ApiConfig,
) -> anyhow::Result<()> {
    if !store.list_users().is_empty() {
        return Ok(());
    }

    let password_hash = hasher.hash(&config.root_password)?;
    let root = store.insert_user(NewIdentity {
        username: config.root_username.clone(),
        email: config.root_email.clone(),
        password_hash,
        role: Role::Super,
        cover_image: None,
    })?;

    tracing::info!(user = %root.username, "seeded SUPER account");
    Ok(())
}
