use std::sync::Arc;

use crewdesk_api::app::{self, services::AppServices};
use crewdesk_api::middleware::AuthState;
use crewdesk_auth::{
    ActorDisplay, CredentialStore, PolicyEvaluator, Role, TokenAuthenticator, TokenHasher,
};
use crewdesk_core::ActorId;
use crewdesk_infra::{InMemoryCredentialStore, PgCredentialStore, load_policy};

#[tokio::main]
async fn main() {
    crewdesk_observability::init();

    let policy_path =
        std::env::var("CREWDESK_POLICY").unwrap_or_else(|_| "config/policy.json".to_string());
    // A malformed table aborts startup; the server never runs with a
    // partially valid policy set.
    let table = load_policy(&policy_path).expect("policy table failed to load");

    let pepper = std::env::var("CREWDESK_TOKEN_PEPPER").unwrap_or_else(|_| {
        tracing::warn!("CREWDESK_TOKEN_PEPPER not set; using insecure dev default");
        "dev-pepper".to_string()
    });
    let hasher = TokenHasher::new(pepper.into_bytes());

    let store: Arc<dyn CredentialStore> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(8)
                .connect(&url)
                .await
                .expect("failed to connect to postgres");
            Arc::new(PgCredentialStore::new(pool))
        }
        Err(_) => {
            let store = InMemoryCredentialStore::new(hasher.clone());
            seed_dev_admin(&store);
            Arc::new(store)
        }
    };

    let authenticator = Arc::new(TokenAuthenticator::new(store, hasher));
    let services = Arc::new(AppServices::new(PolicyEvaluator::new(Arc::new(table))));
    let app = app::build_app(services, AuthState { authenticator });

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}

/// Dev-only bootstrap: without a database there is no way to mint a first
/// credential, so issue one for an admin and print it once.
fn seed_dev_admin(store: &InMemoryCredentialStore) {
    let issued = store
        .issue(
            ActorId::new(),
            vec![Role::ADMIN],
            ActorDisplay {
                name: "Dev Admin".to_string(),
                email: None,
            },
        )
        .expect("in-memory issuance cannot fail");

    tracing::warn!(
        "DATABASE_URL not set; using in-memory store with dev admin token '{}' (shown once)",
        issued.raw
    );
}
