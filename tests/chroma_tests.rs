//! Chroma REST client tests against a mocked Chroma server.

use docqa::db::{ChromaStore, VectorStore};
use docqa::types::{AppError, Document, DocumentMetadata};
use docqa::utils::toml_config::ChromaConfig;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COLLECTIONS: &str = "/api/v2/tenants/default_tenant/databases/default_database/collections";

fn store(server: &MockServer) -> ChromaStore {
    ChromaStore::new(&server.uri()).unwrap()
}

fn chunk(id: &str, content: &str, page: Option<u32>) -> Document {
    Document {
        id: id.to_string(),
        content: content.to_string(),
        metadata: DocumentMetadata {
            source: "guide.pdf".to_string(),
            page,
            chunk_index: 0,
        },
        embedding: Some(vec![0.1, 0.2]),
    }
}

async fn mount_collection_lookup(server: &MockServer, name: &str, id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("{}/{}", COLLECTIONS, name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "name": name,
            "metadata": {"hnsw:space": "cosine"}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_heartbeat() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/heartbeat"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"nanosecond heartbeat": 1})),
        )
        .mount(&server)
        .await;

    assert!(store(&server).heartbeat().await.is_ok());
}

#[tokio::test]
async fn test_create_collection_uses_cosine_space() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COLLECTIONS))
        .and(body_partial_json(json!({
            "name": "documents",
            "get_or_create": true,
            "metadata": {"hnsw:space": "cosine"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "c1", "name": "documents"})))
        .expect(1)
        .mount(&server)
        .await;

    store(&server).create_collection("documents").await.unwrap();
}

#[tokio::test]
async fn test_missing_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/documents", COLLECTIONS)))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"error": "NotFoundError", "message": "Collection [documents] does not exist"})),
        )
        .mount(&server)
        .await;

    let store = store(&server);

    assert!(!store.collection_exists("documents").await.unwrap());
    assert!(matches!(
        store.delete_collection("documents").await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        store.search("documents", &[0.1, 0.2], 4).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_legacy_missing_collection_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/documents", COLLECTIONS)))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string("ValueError: Collection documents does not exist."),
        )
        .mount(&server)
        .await;

    assert!(!store(&server).collection_exists("documents").await.unwrap());
}

#[tokio::test]
async fn test_delete_existing_collection() {
    let server = MockServer::start().await;
    mount_collection_lookup(&server, "documents", "c1").await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/documents", COLLECTIONS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    store(&server).delete_collection("documents").await.unwrap();
}

#[tokio::test]
async fn test_upsert_in_batches() {
    let server = MockServer::start().await;
    mount_collection_lookup(&server, "documents", "c1").await;
    Mock::given(method("POST"))
        .and(path(format!("{}/c1/upsert", COLLECTIONS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&server)
        .await;

    let store = ChromaStore::from_config(&ChromaConfig {
        url: server.uri(),
        upsert_batch_size: 2,
        ..ChromaConfig::default()
    })
    .unwrap();
    let docs = vec![
        chunk("a", "first", Some(1)),
        chunk("b", "second", Some(2)),
        chunk("c", "third", None),
    ];

    assert_eq!(store.upsert("documents", &docs).await.unwrap(), 3);
}

#[tokio::test]
async fn test_upsert_payload_shape() {
    let server = MockServer::start().await;
    mount_collection_lookup(&server, "documents", "c1").await;
    Mock::given(method("POST"))
        .and(path(format!("{}/c1/upsert", COLLECTIONS)))
        .and(body_partial_json(json!({
            "ids": ["a"],
            "documents": ["first"],
            "metadatas": [{"source": "guide.pdf", "page": 1, "chunk_index": 0}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    store(&server)
        .upsert("documents", &[chunk("a", "first", Some(1))])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_upsert_requires_embeddings() {
    let server = MockServer::start().await;
    let mut doc = chunk("a", "first", None);
    doc.embedding = None;

    let result = store(&server).upsert("documents", &[doc]).await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn test_search_maps_distances_to_scores() {
    let server = MockServer::start().await;
    mount_collection_lookup(&server, "documents", "c1").await;
    Mock::given(method("POST"))
        .and(path(format!("{}/c1/query", COLLECTIONS)))
        .and(body_partial_json(json!({
            "n_results": 2,
            "include": ["documents", "metadatas", "distances"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ids": [["a", "b"]],
            "documents": [["first chunk", "second chunk"]],
            "metadatas": [[
                {"source": "guide.pdf", "page": 3, "chunk_index": 1},
                {"source": "notes.pdf", "chunk_index": 0}
            ]],
            "distances": [[0.25, 0.5]]
        })))
        .mount(&server)
        .await;

    let results = store(&server)
        .search("documents", &[0.1, 0.2], 2)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].document.id, "a");
    assert_eq!(results[0].document.content, "first chunk");
    assert_eq!(results[0].document.metadata.page, Some(3));
    assert_eq!(results[0].document.metadata.chunk_index, 1);
    assert!((results[0].score - 0.75).abs() < 1e-6);
    assert_eq!(results[1].document.metadata.source, "notes.pdf");
    assert_eq!(results[1].document.metadata.page, None);
}

#[tokio::test]
async fn test_count() {
    let server = MockServer::start().await;
    mount_collection_lookup(&server, "documents", "c1").await;
    Mock::given(method("GET"))
        .and(path(format!("{}/c1/count", COLLECTIONS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(42)))
        .mount(&server)
        .await;

    assert_eq!(store(&server).count("documents").await.unwrap(), 42);
}

#[tokio::test]
async fn test_server_error_is_vector_store_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COLLECTIONS))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    assert!(matches!(
        store(&server).create_collection("documents").await,
        Err(AppError::VectorStore(_))
    ));
}
