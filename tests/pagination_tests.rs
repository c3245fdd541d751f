use mockito::Matcher;
use serde_json::json;
use toolhub::github::{GitHubClient, GitHubConfig, RepoSort, SortDirection};
use toolhub::Error;

fn test_client(server: &mockito::ServerGuard) -> GitHubClient {
    GitHubClient::new(GitHubConfig {
        api_base_url: server.url(),
        user_agent: "Toolhub-Test/0.1".to_string(),
    })
    .unwrap()
}

fn repo_json(owner: &str, name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "full_name": format!("{owner}/{name}"),
        "owner": {"login": owner},
        "clone_url": format!("https://github.com/{owner}/{name}.git"),
        "default_branch": "main",
        "description": "A set of tools",
        "archived": false,
        "pushed_at": "2025-03-08T15:36:35Z",
        "created_at": "2025-03-08T06:29:09Z"
    })
}

#[tokio::test]
async fn test_repositories_accumulate_across_pages() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    let page1 = server
        .mock("GET", "/user/repos")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_header("content-type", "application/json")
        .with_header(
            "link",
            &format!(
                r#"<{base}/user/repos?page=2>; rel="next", <{base}/user/repos?page=3>; rel="last""#
            ),
        )
        .with_body(json!([repo_json("acme", "one"), repo_json("acme", "two")]).to_string())
        .create_async()
        .await;

    let page2 = server
        .mock("GET", "/user/repos")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_header("content-type", "application/json")
        .with_header(
            "link",
            &format!(
                r#"<{base}/user/repos?page=3>; rel="next", <{base}/user/repos?page=3>; rel="last""#
            ),
        )
        .with_body(json!([repo_json("acme", "three")]).to_string())
        .create_async()
        .await;

    // Final page advertises no next link
    let page3 = server
        .mock("GET", "/user/repos")
        .match_query(Matcher::UrlEncoded("page".into(), "3".into()))
        .with_header("content-type", "application/json")
        .with_header(
            "link",
            &format!(r#"<{base}/user/repos?page=3>; rel="last""#),
        )
        .with_body(json!([repo_json("jane", "four")]).to_string())
        .create_async()
        .await;

    let client = test_client(&server);
    let repos = client
        .list_repositories("gho_test", RepoSort::FullName, SortDirection::Asc)
        .await
        .unwrap();

    // Sum of per-page counts, in page order, flattened
    assert_eq!(repos.len(), 4);
    assert_eq!(repos[0].full_name, "acme/one");
    assert_eq!(repos[2].full_name, "acme/three");
    assert_eq!(repos[3].owner, "jane");
    assert_eq!(repos[3].clone_url, "https://github.com/jane/four.git");

    page1.assert_async().await;
    page2.assert_async().await;
    page3.assert_async().await;
}

#[tokio::test]
async fn test_pagination_halts_on_self_referential_last() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    // Page 1 points at page 2, which claims to be the last page while
    // still advertising a next link. Enumeration must stop at page 2.
    let page1 = server
        .mock("GET", "/user/repos")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_header("content-type", "application/json")
        .with_header(
            "link",
            &format!(
                r#"<{base}/user/repos?page=2>; rel="next", <{base}/user/repos?page=2>; rel="last""#
            ),
        )
        .with_body(json!([repo_json("acme", "one")]).to_string())
        .create_async()
        .await;

    let page2 = server
        .mock("GET", "/user/repos")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_header("content-type", "application/json")
        .with_header(
            "link",
            &format!(
                r#"<{base}/user/repos?page=3>; rel="next", <{base}/user/repos?page=2>; rel="last""#
            ),
        )
        .with_body(json!([repo_json("acme", "two")]).to_string())
        .create_async()
        .await;

    let page3 = server
        .mock("GET", "/user/repos")
        .match_query(Matcher::UrlEncoded("page".into(), "3".into()))
        .with_body("[]")
        .expect(0)
        .create_async()
        .await;

    let client = test_client(&server);
    let repos = client
        .list_repositories("gho_test", RepoSort::FullName, SortDirection::Asc)
        .await
        .unwrap();

    assert_eq!(repos.len(), 2);
    page1.assert_async().await;
    page2.assert_async().await;
    page3.assert_async().await;
}

#[tokio::test]
async fn test_malformed_link_header_stops_pagination() {
    let mut server = mockito::Server::new_async().await;

    let page1 = server
        .mock("GET", "/user/repos")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_header("content-type", "application/json")
        .with_header("link", "this is not a link header")
        .with_body(json!([repo_json("acme", "one")]).to_string())
        .create_async()
        .await;

    let client = test_client(&server);
    let repos = client
        .list_repositories("gho_test", RepoSort::FullName, SortDirection::Asc)
        .await
        .unwrap();

    assert_eq!(repos.len(), 1);
    page1.assert_async().await;
}

#[tokio::test]
async fn test_missing_link_header_stops_pagination() {
    let mut server = mockito::Server::new_async().await;

    let page1 = server
        .mock("GET", "/user/repos")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_header("content-type", "application/json")
        .with_body(json!([repo_json("acme", "one")]).to_string())
        .create_async()
        .await;

    let client = test_client(&server);
    let repos = client
        .list_repositories("gho_test", RepoSort::FullName, SortDirection::Asc)
        .await
        .unwrap();

    assert_eq!(repos.len(), 1);
    page1.assert_async().await;
}

#[tokio::test]
async fn test_branches_follow_pagination() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    let page1 = server
        .mock("GET", "/repos/acme/file-ops/branches")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_header("content-type", "application/json")
        .with_header(
            "link",
            &format!(
                r#"<{base}/repos/acme/file-ops/branches?page=2>; rel="next", <{base}/repos/acme/file-ops/branches?page=2>; rel="last""#
            ),
        )
        .with_body(
            json!([
                {"name": "main", "commit": {"sha": "aaa111"}},
                {"name": "dev", "commit": {"sha": "bbb222"}}
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let page2 = server
        .mock("GET", "/repos/acme/file-ops/branches")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_header("content-type", "application/json")
        .with_body(json!([{"name": "feature/x", "commit": {"sha": "ccc333"}}]).to_string())
        .create_async()
        .await;

    let client = test_client(&server);
    let branches = client.list_branches("acme/file-ops", "gho_test").await.unwrap();

    assert_eq!(branches.len(), 3);
    assert_eq!(branches[0].name, "main");
    assert_eq!(branches[0].commit_sha, "aaa111");
    assert_eq!(branches[2].name, "feature/x");

    page1.assert_async().await;
    page2.assert_async().await;
}

#[tokio::test]
async fn test_latest_commit_resolves_sha() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/repos/acme/file-ops/branches/main")
        .with_header("content-type", "application/json")
        .with_body(json!({"name": "main", "commit": {"sha": "54124a6"}}).to_string())
        .create_async()
        .await;

    let client = test_client(&server);
    let sha = client
        .latest_commit("acme/file-ops", "main", "gho_test")
        .await
        .unwrap();

    assert_eq!(sha, "54124a6");
}

#[tokio::test]
async fn test_latest_commit_missing_sha_is_decode_error() {
    let mut server = mockito::Server::new_async().await;

    // Response decodes as JSON but lacks the expected commit.sha field;
    // this must surface as an error, never a defaulted value
    server
        .mock("GET", "/repos/acme/file-ops/branches/main")
        .with_header("content-type", "application/json")
        .with_body(json!({"name": "main"}).to_string())
        .create_async()
        .await;

    let client = test_client(&server);
    let err = client
        .latest_commit("acme/file-ops", "main", "gho_test")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_missing_branch_is_not_found() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/repos/acme/file-ops/branches/gone")
        .with_status(404)
        .with_body(r#"{"message": "Branch not found"}"#)
        .create_async()
        .await;

    let client = test_client(&server);
    let err = client
        .latest_commit("acme/file-ops", "gone", "gho_test")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn test_empty_token_fails_before_any_request() {
    let mut server = mockito::Server::new_async().await;

    let never_hit = server
        .mock("GET", "/user/repos")
        .match_query(Matcher::Any)
        .with_body("[]")
        .expect(0)
        .create_async()
        .await;

    let client = test_client(&server);
    let err = client
        .list_repositories("", RepoSort::FullName, SortDirection::Asc)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)), "got {err:?}");
    never_hit.assert_async().await;
}
