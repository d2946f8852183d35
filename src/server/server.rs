use crate::domain::{
    Hs256TokenCodec, RealSessionService, RevocationStore, SessionService, TokenCodec, TokenConfig,
};
use crate::infra::InMemoryRevocationStore;
use crate::logger::*;
use crate::server::spawn_sweeper;
use crate::settings::Settings;
use nanoid::nanoid;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const SIGNING_KEY_ENV: &str = "TOKEN_SIGNING_KEY";

pub struct Server {
    pub session_service: Arc<dyn SessionService>,
    pub revocation_store: Arc<dyn RevocationStore>,
    sweeper_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let alphabet: [char; 16] = [
            '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'b', 'c', 'd', 'e', 'f',
        ];
        let run_id = nanoid!(10, &alphabet);
        info!(%run_id, "assembling server");

        let key = std::env::var(SIGNING_KEY_ENV)
            .unwrap_or_else(|_| "portcullis-dev-secret-key".to_string())
            .into_bytes();
        let token_codec: Arc<dyn TokenCodec> = Arc::new(Hs256TokenCodec::new(TokenConfig {
            issuer: settings.auth.issuer.clone(),
            audience: settings.auth.audience.clone(),
            signing_key: key,
        }));

        let revocation_store: Arc<dyn RevocationStore> = Arc::new(InMemoryRevocationStore::new(
            Duration::from_secs(settings.auth.retention_secs),
        ));

        let session_service: Arc<dyn SessionService> = Arc::new(RealSessionService::new(
            token_codec,
            revocation_store.clone(),
            Duration::from_secs(settings.auth.token_ttl_secs),
        ));

        let cancel = CancellationToken::new();
        let sweeper_handle = spawn_sweeper(
            revocation_store.clone(),
            Duration::from_secs(settings.auth.sweep_interval_secs),
            cancel.clone(),
        );

        Ok(Self {
            session_service,
            revocation_store,
            sweeper_handle: Mutex::new(Some(sweeper_handle)),
            cancel,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down, stopping revocation sweeper");
        self.cancel.cancel();

        let handle = match self.sweeper_handle.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        info!("revocation sweeper stopped");
    }
}
