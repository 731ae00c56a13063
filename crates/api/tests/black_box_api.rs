//! Black-box tests against the real router: authenticate with issued
//! tokens, exercise row-filter pushdown and per-record decisions over HTTP.

use std::sync::Arc;

use chrono::Utc;
use reqwest::StatusCode;

use crewdesk_api::app::{
    build_app,
    services::{AppServices, Board, Invoice, Message},
};
use crewdesk_api::middleware::AuthState;
use crewdesk_auth::{
    ActorDisplay, CredentialStore, PolicyConfig, PolicyEvaluator, PolicyTable, Role,
    TokenAuthenticator, TokenHasher,
};
use crewdesk_core::{ActorId, RecordId};
use crewdesk_infra::InMemoryCredentialStore;

// The shipped portal table, so the tests cover the table that deploys.
const POLICY: &str = include_str!("../../../config/policy.json");

struct Persona {
    id: ActorId,
    token: String,
}

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
    admin: Persona,
    client_a: Persona,
    client_b: Persona,
    client_dev: Persona,
    invoice_a: RecordId,
    invoice_b: RecordId,
    message_ab: RecordId,
}

impl TestServer {
    async fn spawn() -> Self {
        let table =
            PolicyTable::from_config(PolicyConfig::from_json_str(POLICY).unwrap()).unwrap();
        let hasher = TokenHasher::new(b"black-box-pepper".to_vec());
        let store = Arc::new(InMemoryCredentialStore::new(hasher.clone()));

        let admin = issue(&store, vec![Role::ADMIN], "Ada Admin");
        let client_a = issue(&store, vec![Role::CLIENT], "Cleo Client");
        let client_b = issue(&store, vec![Role::CLIENT], "Casey Client");
        let client_dev = issue(&store, vec![Role::CLIENT, Role::DEVELOPER], "Devin Dual");

        let services = Arc::new(AppServices::new(PolicyEvaluator::new(Arc::new(table))));

        services.boards.push(Board {
            id: RecordId::new(),
            name: "Roadmap".to_string(),
            created_at: Utc::now(),
        });

        let invoice_a = RecordId::new();
        services.invoices.push(Invoice {
            id: invoice_a,
            number: "INV-1001".to_string(),
            billed_to: client_a.id,
            amount_cents: 12_500,
            issued_at: Utc::now(),
        });
        let invoice_b = RecordId::new();
        services.invoices.push(Invoice {
            id: invoice_b,
            number: "INV-1002".to_string(),
            billed_to: client_b.id,
            amount_cents: 48_000,
            issued_at: Utc::now(),
        });

        let message_ab = RecordId::new();
        services.messages.push(Message {
            id: message_ab,
            sender: client_a.id,
            receiver: admin.id,
            body: "invoice question".to_string(),
            sent_at: Utc::now(),
        });

        let store_dyn: Arc<dyn CredentialStore> = store;
        let authenticator = Arc::new(TokenAuthenticator::new(store_dyn, hasher));
        let app = build_app(services, AuthState { authenticator });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            handle,
            admin,
            client_a,
            client_b,
            client_dev,
            invoice_a,
            invoice_b,
            message_ab,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn issue(store: &InMemoryCredentialStore, roles: Vec<Role>, name: &str) -> Persona {
    let issued = store
        .issue(
            ActorId::new(),
            roles,
            ActorDisplay {
                name: name.to_string(),
                email: None,
            },
        )
        .expect("in-memory issuance cannot fail");
    Persona {
        id: issued.actor_id,
        token: issued.raw,
    }
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn unauthenticated_requests_never_reach_policy() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // No header at all.
    let res = client
        .get(format!("{}/boards", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let missing_body: serde_json::Value = res.json().await.unwrap();

    // A credential that hashes to no stored record.
    let res = client
        .get(format!("{}/boards", srv.base_url))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let invalid_body: serde_json::Value = res.json().await.unwrap();

    // The response body must not reveal which of the two cases occurred.
    assert_eq!(missing_body, invalid_body);
}

#[tokio::test]
async fn whoami_reports_the_authenticated_actor() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&srv.client_dev.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["actor_id"], srv.client_dev.id.to_string());
    let roles: Vec<&str> = body["roles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r.as_str().unwrap())
        .collect();
    assert!(roles.contains(&"client") && roles.contains(&"developer"));
}

#[tokio::test]
async fn invoice_listing_is_filtered_by_ownership() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/invoices", srv.base_url))
        .bearer_auth(&srv.admin.token)
        .send()
        .await
        .unwrap();
    let all: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(all.len(), 2);

    let res = client
        .get(format!("{}/invoices", srv.base_url))
        .bearer_auth(&srv.client_a.token)
        .send()
        .await
        .unwrap();
    let own: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0]["number"], "INV-1001");
}

#[tokio::test]
async fn client_cannot_read_someone_elses_invoice() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/invoices/{}", srv.base_url, srv.invoice_b))
        .bearer_auth(&srv.client_a.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(format!("{}/invoices/{}", srv.base_url, srv.invoice_a))
        .bearer_auth(&srv.client_a.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn developer_role_dominates_client_restriction() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // client_dev owns neither invoice, but the developer role reads any.
    let res = client
        .get(format!("{}/invoices/{}", srv.base_url, srv.invoice_b))
        .bearer_auth(&srv.client_dev.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn only_participants_and_staff_read_messages() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let url = format!("{}/messages/{}", srv.base_url, srv.message_ab);

    // Sender.
    let res = client
        .get(&url)
        .bearer_auth(&srv.client_a.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Receiver (admin reads unrestricted anyway).
    let res = client
        .get(&url)
        .bearer_auth(&srv.admin.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // A client who is not a participant.
    let res = client
        .get(&url)
        .bearer_auth(&srv.client_b.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn board_creation_requires_a_privileged_role() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/boards", srv.base_url))
        .bearer_auth(&srv.client_a.token)
        .json(&serde_json::json!({ "name": "Sneaky board" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(format!("{}/boards", srv.base_url))
        .bearer_auth(&srv.admin.token)
        .json(&serde_json::json!({ "name": "Q3 planning" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn clients_see_an_empty_board_list_not_an_error() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Clients have no board list rule at all: deny-all filter, zero rows.
    let res = client
        .get(format!("{}/boards", srv.base_url))
        .bearer_auth(&srv.client_b.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let rows: Vec<serde_json::Value> = res.json().await.unwrap();
    assert!(rows.is_empty());
}
