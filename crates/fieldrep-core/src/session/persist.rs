//! Saving and restoring a [`Session`] through the key-value store, so a later
//! process can reuse an earlier login.

use fieldrep_store::{KeyValueStore, StoreError};

use super::Session;

/// Store key holding the bearer token.
pub const TOKEN_KEY: &str = "auth:token";

/// Store key holding the company (tenant) id.
pub const COMPANY_KEY: &str = "auth:company_id";

/// Write `session` to the store. Absent fields remove their key.
pub async fn save_session(store: &dyn KeyValueStore, session: &Session) -> Result<(), StoreError> {
    match &session.token {
        Some(token) => store.set(TOKEN_KEY, token).await?,
        None => store.remove(TOKEN_KEY).await?,
    }
    match &session.company_id {
        Some(company_id) => store.set(COMPANY_KEY, company_id).await?,
        None => store.remove(COMPANY_KEY).await?,
    }
    Ok(())
}

/// Read the saved session. Missing keys yield `None` fields.
pub async fn load_session(store: &dyn KeyValueStore) -> Result<Session, StoreError> {
    Ok(Session {
        token: store.get(TOKEN_KEY).await?,
        company_id: store.get(COMPANY_KEY).await?,
    })
}

/// Remove the saved session.
pub async fn clear_session(store: &dyn KeyValueStore) -> Result<(), StoreError> {
    store.remove_many(&[TOKEN_KEY, COMPANY_KEY]).await
}
