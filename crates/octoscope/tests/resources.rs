//! End-to-end walk across users, repositories and pull requests.

#![allow(clippy::unwrap_used)]

use octoscope::{
    AccountType, Connection, ConnectionOptions, Error, Octoscope, PullRequest, Repository,
    Resource,
};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FULL: &str = "application/vnd.github.full+json";

fn client(server: &MockServer, options: ConnectionOptions) -> Octoscope {
    Octoscope::with_connection(Connection::with_base_url(options, server.uri()).unwrap())
}

fn pull_overview(base_url: &str, number: u64) -> Value {
    json!({
        "number": number,
        "title": format!("Change {number}"),
        "url": format!("{base_url}/repos/octocat/Hello-World/pulls/{number}"),
        "patch_url": format!("{base_url}/octocat/Hello-World/pull/{number}.patch"),
        "diff_url": format!("{base_url}/octocat/Hello-World/pull/{number}.diff"),
        "user": { "login": "bob", "id": 7 }
    })
}

async fn mount_user(server: &MockServer, login: &str, kind: &str, expected: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/users/{login}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "login": login,
                "id": 1,
                "type": kind
            })),
        )
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_user_to_pull_request_head() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_user(&server, "octocat", "User", 2).await;

    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .and(query_param("type", "all"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1296269,
            "name": "Hello-World",
            "owner": { "login": "octocat", "id": 1 }
        }])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/pulls"))
        .and(query_param("state", "open"))
        .and(header("accept", FULL))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([pull_overview(&uri, 1347)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut detail = pull_overview(&uri, 1347);
    detail["merged_by"] = Value::Null;
    detail["merged_at"] = Value::Null;
    detail["created_at"] = json!("2011-01-26T19:01:12Z");
    detail["head"] = json!({
        "label": "bob:new-topic",
        "ref": "new-topic",
        "sha": "6dcb09b5b57875f334f61aebed695e2e4193db5e",
        "user": { "login": "bob", "id": 7 },
        "repo": { "id": 1296270, "name": "Hello-World", "owner": { "login": "bob", "id": 7 } }
    });
    detail["base"] = json!({
        "label": "octocat:master",
        "ref": "master",
        "sha": "6dcb09b5b57875f334f61aebed695e2e4193db5f",
        "user": { "login": "octocat", "id": 1 },
        "repo": Value::Null
    });

    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/pulls/1347"))
        .and(header("accept", FULL))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail))
        .expect(1)
        .mount(&server)
        .await;

    let github = client(&server, ConnectionOptions::anonymous());
    let user = github.user("octocat").await.unwrap();
    assert_eq!(user.account_type().unwrap(), AccountType::User);

    let repositories = user.repositories().await.unwrap();
    assert_eq!(repositories.len(), 1);
    let repository = &repositories[0];
    assert_eq!(repository.name().unwrap(), "Hello-World");
    assert_eq!(repository.owner().await.unwrap().login().unwrap(), "octocat");

    let pulls = repository.open_pull_requests().await.unwrap();
    assert_eq!(pulls.len(), 1);
    let pull = &pulls[0];

    assert_eq!(pull.number().await.unwrap(), 1347);
    assert_eq!(pull.user_login().unwrap(), "bob");
    assert!(!pull.has_detail());

    assert_eq!(pull.merged_by_login().await.unwrap(), None);
    assert!(pull.created_at().await.unwrap().is_some());

    let head = pull.head().await.unwrap();
    assert_eq!(head.ref_name().unwrap(), "new-topic");
    let head_repo = head.repo().unwrap();
    assert_eq!(head_repo.owner_login().unwrap(), "bob");
    assert_eq!(head_repo.id().unwrap(), 1_296_270);

    let base = pull.base().await.unwrap();
    assert!(base.repo().is_none());

    assert!(pull.available_attributes().contains(&"merged_by".to_string()));
}

#[tokio::test]
async fn test_pull_requests_paginate() {
    let server = MockServer::start().await;
    let uri = server.uri();

    let page_one: Vec<Value> = (1..=100).map(|n| pull_overview(&uri, n)).collect();
    let page_two: Vec<Value> = (101..=130).map(|n| pull_overview(&uri, n)).collect();

    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/pulls"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_two))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/pulls"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_one)
                .insert_header(
                    "link",
                    format!(
                        "<{uri}/repos/octocat/Hello-World/pulls?state=closed&page=2>; rel=\"next\", \
                         <{uri}/repos/octocat/Hello-World/pulls?state=closed&page=2>; rel=\"last\""
                    )
                    .as_str(),
                ),
        )
        .with_priority(10)
        .expect(1)
        .mount(&server)
        .await;

    let github = client(&server, ConnectionOptions::anonymous());
    let pulls = PullRequest::find_closed_for_repository("octocat", "Hello-World", github.connection())
        .await
        .unwrap();

    assert_eq!(pulls.len(), 130);
    assert_eq!(pulls[0].number().await.unwrap(), 1);
    assert_eq!(pulls[129].number().await.unwrap(), 130);
}

#[tokio::test]
async fn test_private_listing_with_basic_auth() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/github/repos"))
        .and(query_param("type", "private"))
        .and(header("authorization", "Basic Ym9iOnMzY3JldA=="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "secret-sauce", "owner": { "login": "github" } }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let github = client(&server, ConnectionOptions::basic("bob", "s3cret"));
    let repositories =
        Repository::list_private("github", AccountType::Organization, github.connection())
            .await
            .unwrap();
    assert_eq!(repositories[0].name().unwrap(), "secret-sauce");

    let anonymous = client(&server, ConnectionOptions::anonymous());
    assert!(matches!(
        Repository::list_private("github", AccountType::Organization, anonymous.connection()).await,
        Err(Error::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_missing_user_is_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    let github = client(&server, ConnectionOptions::anonymous());
    assert!(matches!(
        github.user("ghost").await,
        Err(Error::ApiError { status: 404, .. })
    ));
}
