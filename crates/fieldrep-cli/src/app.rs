//! Runtime wiring shared by the command handlers: the persistent store, the
//! saved session and an API client pointed at the configured backend.

use std::sync::Arc;

use anyhow::{Context, Result, bail};

use fieldrep_core::cache::DEFAULT_NAMESPACE;
use fieldrep_core::pipeline::HttpTransport;
use fieldrep_core::session::persist;
use fieldrep_core::{FieldRepApi, ReferenceDataCache, RequestPipeline, SessionContext};
use fieldrep_store::FileStore;

use crate::config::FieldRepConfig;

pub struct App {
    pub config: FieldRepConfig,
    pub store: Arc<FileStore>,
    pub session: Arc<SessionContext>,
    pub api: Arc<FieldRepApi>,
}

impl App {
    /// Open the store, restore the saved session and build the client.
    pub async fn open(config: FieldRepConfig) -> Result<Self> {
        let store = FileStore::open(&config.store)
            .await
            .with_context(|| format!("failed to open store at {}", config.store.path.display()))?;
        let store = Arc::new(store);

        let saved = persist::load_session(store.as_ref())
            .await
            .context("failed to read saved session")?;
        let session = Arc::new(SessionContext::with_session(saved));
        session.on_session_invalid(|| {
            tracing::warn!("session has no company selected; run `fieldrep login` again");
        });

        let transport = HttpTransport::new(config.endpoint.clone(), config.timeout)
            .context("failed to build HTTP client")?;
        let pipeline = RequestPipeline::new(Arc::new(transport), session.clone());
        let api = Arc::new(FieldRepApi::new(pipeline));

        tracing::debug!(
            endpoint = %config.endpoint,
            store = %config.store.path.display(),
            authenticated = session.is_authenticated(),
            "client ready"
        );

        Ok(Self {
            config,
            store,
            session,
            api,
        })
    }

    /// Reference-data cache over the persistent store.
    pub fn cache(&self) -> ReferenceDataCache {
        ReferenceDataCache::new(self.store.clone(), DEFAULT_NAMESPACE, self.config.cache_ttl)
    }

    /// Fail early with a hint when no login has been saved.
    pub fn require_login(&self) -> Result<()> {
        if !self.session.is_authenticated() {
            bail!("not signed in; run `fieldrep login --email <email> --password <password>` first");
        }
        Ok(())
    }
}
