use portcullis::domain::*;
use portcullis::infra::InMemoryRevocationStore;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let codec: Arc<dyn TokenCodec> = Arc::new(Hs256TokenCodec::new(TokenConfig {
        issuer: "portcullis.auth".to_string(),
        audience: "portcullis-clients".to_string(),
        signing_key: b"demo-signing-key".to_vec(),
    }));
    let store: Arc<dyn RevocationStore> =
        Arc::new(InMemoryRevocationStore::new(Duration::from_secs(86400)));
    let sessions = RealSessionService::new(codec, store.clone(), Duration::from_secs(3600));

    let roles: HashSet<String> = ["ADMIN".to_string()].into_iter().collect();
    let issued = sessions.login("demo-user", roles).await?;
    println!("Issued token: {}", issued.token.0);
    println!("Expires at:   {}", issued.expires_at);

    let principal = sessions.authenticate(&issued.token.0).await?;
    println!("Authenticated as: {} {:?}", principal.subject, principal.roles);

    sessions.logout(&issued.token.0).await?;
    let after_logout = sessions.authenticate(&issued.token.0).await;
    println!("After logout: {:?}", after_logout);
    println!("Store stats: {:?}", store.stats());

    Ok(())
}
