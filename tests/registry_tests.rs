use mockito::Matcher;
use serde_json::json;
use toolhub::db;
use toolhub::github::{GitHubClient, GitHubConfig};
use toolhub::registry::{self, Registrar, RegistrationOutcome};
use toolhub::toolparser::{ToolIndexOutcome, ToolParserClient};
use toolhub::Error;

async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::SqlitePool::connect(":memory:").await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

fn github_client(server: &mockito::ServerGuard) -> GitHubClient {
    GitHubClient::new(GitHubConfig {
        api_base_url: server.url(),
        user_agent: "Toolhub-Test/0.1".to_string(),
    })
    .unwrap()
}

fn parser_client(server: &mockito::ServerGuard) -> ToolParserClient {
    ToolParserClient::new(format!("{}/parse", server.url())).unwrap()
}

fn repo_response(archived: bool) -> serde_json::Value {
    json!({
        "name": "file-ops",
        "full_name": "acme/file-ops",
        "owner": {"login": "acme"},
        "clone_url": "https://github.com/acme/file-ops.git",
        "default_branch": "main",
        "description": "Tools for the local file system",
        "archived": archived,
        "pushed_at": "2025-03-08T15:36:35Z",
        "created_at": "2025-03-08T06:29:09Z"
    })
}

fn parse_success() -> serde_json::Value {
    json!({
        "tools_metadata": [
            {
                "name": "create_file",
                "doc": "Create a file at filepath",
                "inputs": [{"name": "filepath", "type": "str"}],
                "output": "None"
            },
            {
                "name": "read_file",
                "doc": "Read a file at filepath",
                "inputs": [{"name": "filepath", "type": "str"}],
                "output": "str"
            }
        ],
        "readme": "# file-ops"
    })
}

async fn mock_github(server: &mut mockito::ServerGuard, branch: &str, sha: &str) {
    server
        .mock("GET", "/repos/acme/file-ops")
        .with_header("content-type", "application/json")
        .with_body(repo_response(false).to_string())
        .create_async()
        .await;

    server
        .mock(
            "GET",
            format!("/repos/acme/file-ops/branches/{branch}").as_str(),
        )
        .with_header("content-type", "application/json")
        .with_body(json!({"name": branch, "commit": {"sha": sha}}).to_string())
        .create_async()
        .await;
}

#[tokio::test]
async fn test_register_persists_index_and_tools() {
    let mut server = mockito::Server::new_async().await;
    mock_github(&mut server, "main", "54124a6").await;

    server
        .mock("POST", "/parse")
        .match_body(Matcher::PartialJson(json!({
            "clone_url": "https://github.com/acme/file-ops.git"
        })))
        .with_header("content-type", "application/json")
        .with_body(parse_success().to_string())
        .create_async()
        .await;

    let pool = test_pool().await;
    let registrar = Registrar::new(github_client(&server), parser_client(&server), pool.clone());

    let outcome = registrar
        .register_repository("acme/file-ops", None, "gho_test")
        .await
        .unwrap();

    let RegistrationOutcome::Registered(index) = outcome else {
        panic!("expected a registered outcome");
    };
    assert_eq!(index.full_name, "acme/file-ops");
    assert_eq!(index.owner, "acme");
    assert_eq!(index.branch, "main");
    assert_eq!(index.commit_sha, "54124a6");
    assert_eq!(index.version, 1);
    assert_eq!(index.readme.as_deref(), Some("# file-ops"));

    let tools = db::tools::get_tools_for_index(&pool, index.id).await.unwrap();
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0].name, "create_file");
    assert_eq!(tools[1].name, "read_file");

    let inputs = tools[0].parsed_inputs().unwrap();
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].name, "filepath");
    assert_eq!(inputs[0].kind, "str");
}

#[tokio::test]
async fn test_reregistration_records_a_new_version() {
    let mut server = mockito::Server::new_async().await;
    mock_github(&mut server, "main", "54124a6").await;

    server
        .mock("POST", "/parse")
        .with_header("content-type", "application/json")
        .with_body(parse_success().to_string())
        .create_async()
        .await;

    let pool = test_pool().await;
    let registrar = Registrar::new(github_client(&server), parser_client(&server), pool.clone());

    registrar
        .register_repository("acme/file-ops", None, "gho_test")
        .await
        .unwrap();
    let outcome = registrar
        .register_repository("acme/file-ops", None, "gho_test")
        .await
        .unwrap();

    let RegistrationOutcome::Registered(index) = outcome else {
        panic!("expected a registered outcome");
    };
    assert_eq!(index.version, 2);

    // Both versions are kept, but listings collapse to the newest
    assert_eq!(db::indexes::count_tool_indexes(&pool).await.unwrap(), 2);
    let latest = registry::list_latest_indexes(&pool).await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].version, 2);
}

#[tokio::test]
async fn test_parse_rejection_stores_nothing() {
    let mut server = mockito::Server::new_async().await;
    mock_github(&mut server, "main", "54124a6").await;

    // The parsing service signals failure with a bare JSON string
    server
        .mock("POST", "/parse")
        .with_header("content-type", "application/json")
        .with_body(r#""no tool definitions found""#)
        .create_async()
        .await;

    let pool = test_pool().await;
    let registrar = Registrar::new(github_client(&server), parser_client(&server), pool.clone());

    let outcome = registrar
        .register_repository("acme/file-ops", None, "gho_test")
        .await
        .unwrap();

    let RegistrationOutcome::Rejected { message } = outcome else {
        panic!("expected a rejected outcome");
    };
    assert_eq!(message, "no tool definitions found");
    assert_eq!(db::indexes::count_tool_indexes(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_registering_a_named_branch() {
    let mut server = mockito::Server::new_async().await;
    mock_github(&mut server, "dev", "bbb222").await;

    server
        .mock("POST", "/parse")
        .with_header("content-type", "application/json")
        .with_body(parse_success().to_string())
        .create_async()
        .await;

    let pool = test_pool().await;
    let registrar = Registrar::new(github_client(&server), parser_client(&server), pool.clone());

    let outcome = registrar
        .register_repository("acme/file-ops", Some("dev"), "gho_test")
        .await
        .unwrap();

    let RegistrationOutcome::Registered(index) = outcome else {
        panic!("expected a registered outcome");
    };
    assert_eq!(index.branch, "dev");
    assert_eq!(index.commit_sha, "bbb222");
}

#[tokio::test]
async fn test_archived_repository_is_refused() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/repos/acme/file-ops")
        .with_header("content-type", "application/json")
        .with_body(repo_response(true).to_string())
        .create_async()
        .await;

    let pool = test_pool().await;
    let registrar = Registrar::new(github_client(&server), parser_client(&server), pool.clone());

    let err = registrar
        .register_repository("acme/file-ops", None, "gho_test")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)), "got {err:?}");
    assert_eq!(db::indexes::count_tool_indexes(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_parser_client_decides_shape_at_the_boundary() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", "/parse")
        .with_header("content-type", "application/json")
        .with_body(parse_success().to_string())
        .create_async()
        .await;

    let client = parser_client(&server);
    let outcome = client
        .request_tool_index("https://github.com/acme/file-ops.git")
        .await
        .unwrap();

    let ToolIndexOutcome::Parsed { tools, readme } = outcome else {
        panic!("expected a parsed outcome");
    };
    assert_eq!(tools.len(), 2);
    assert_eq!(readme, "# file-ops");
}

#[tokio::test]
async fn test_parser_client_surfaces_upstream_failure_as_data() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", "/parse")
        .with_header("content-type", "application/json")
        .with_body(r#""clone failed: repository is empty""#)
        .create_async()
        .await;

    let client = parser_client(&server);
    let outcome = client
        .request_tool_index("https://github.com/acme/empty.git")
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ToolIndexOutcome::Rejected {
            message: "clone failed: repository is empty".to_string()
        }
    );
}

#[tokio::test]
async fn test_parser_client_error_status_is_an_error() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", "/parse")
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let client = parser_client(&server);
    let err = client
        .request_tool_index("https://github.com/acme/file-ops.git")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Internal(_)), "got {err:?}");
}
