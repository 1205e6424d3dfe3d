//! API integration tests
//!
//! Need a running server with a migrated database:
//! `cargo test --test api_tests -- --ignored`

use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8000/api/v1";

/// Suffix that keeps emails and ISBNs unique between runs
fn unique() -> String {
    Utc::now().timestamp_nanos_opt().unwrap_or_default().to_string()
}

async fn create_library(client: &Client, name: &str) -> i64 {
    let response = client
        .post(format!("{}/libraries", BASE_URL))
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No library ID")
}

/// Create a user and log in, returning (user id, token)
async fn user_with_token(client: &Client, role: &str, lib_id: i64) -> (i64, String) {
    let email = format!("{}-{}@example.org", role, unique());

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "name": format!("Test {}", role),
            "email": email,
            "contact_number": "0102030405",
            "role": role,
            "lib_id": lib_id
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let user: Value = response.json().await.expect("Failed to parse response");

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["role"], role);

    (
        user["id"].as_i64().expect("No user ID"),
        body["token"].as_str().expect("No token in response").to_string(),
    )
}

async fn add_book(client: &Client, token: &str, isbn: &str) -> reqwest::Response {
    client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "isbn": isbn,
            "title": "X",
            "authors": "A. Author",
            "publisher": "Pub",
            "version": 1
        }))
        .send()
        .await
        .expect("Failed to send request")
}

async fn raise_request(client: &Client, token: &str, isbn: &str) -> i64 {
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "isbn": isbn }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["request_type"], "Requested");
    body["req_id"].as_i64().expect("No request ID")
}

async fn book_in_list(client: &Client, token: &str, isbn: &str) -> Value {
    let response = client
        .get(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    body["books"]
        .as_array()
        .expect("books array")
        .iter()
        .find(|b| b["isbn"] == isbn)
        .cloned()
        .expect("Book not listed")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_login_unknown_email() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": format!("nobody-{}@example.org", unique()) }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.get("token").is_none());
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email() {
    let client = Client::new();
    let lib = create_library(&client, "Dup").await;
    let email = format!("dup-{}@example.org", unique());
    let payload = json!({ "name": "A", "email": email, "role": "reader", "lib_id": lib });

    let first = client.post(format!("{}/users", BASE_URL)).json(&payload).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client.post(format!("{}/users", BASE_URL)).json(&payload).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_add_book_twice_restocks() {
    let client = Client::new();
    let lib = create_library(&client, "Restock").await;
    let (_, admin) = user_with_token(&client, "admin", lib).await;
    let isbn = format!("111-{}", unique());

    let response = add_book(&client, &admin, &isbn).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = add_book(&client, &admin, &isbn).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["book"]["total_copies"], 2);
    assert_eq!(body["book"]["available_copies"], 2);
}

#[tokio::test]
#[ignore]
async fn test_isbn_is_owned_by_one_library() {
    let client = Client::new();
    let lib1 = create_library(&client, "One").await;
    let lib2 = create_library(&client, "Two").await;
    let (_, admin1) = user_with_token(&client, "admin", lib1).await;
    let (_, admin2) = user_with_token(&client, "admin", lib2).await;
    let isbn = format!("222-{}", unique());

    assert_eq!(add_book(&client, &admin1, &isbn).await.status(), StatusCode::CREATED);

    let response = add_book(&client, &admin2, &isbn).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Library 1 copy untouched, library 2 sees nothing
    let book = book_in_list(&client, &admin1, &isbn).await;
    assert_eq!(book["total_copies"], 1);

    let response = client
        .get(format!("{}/books", BASE_URL))
        .bearer_auth(&admin2)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert!(body["books"].as_array().unwrap().iter().all(|b| b["isbn"] != isbn.as_str()));
}

#[tokio::test]
#[ignore]
async fn test_remove_book_without_available_copies() {
    let client = Client::new();
    let lib = create_library(&client, "Remove").await;
    let (_, admin) = user_with_token(&client, "admin", lib).await;
    let isbn = format!("333-{}", unique());
    add_book(&client, &admin, &isbn).await;

    let remove = || {
        client
            .delete(format!("{}/books/{}", BASE_URL, isbn))
            .bearer_auth(&admin)
            .send()
    };

    let response = remove().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["book"]["total_copies"], 0);
    assert_eq!(body["book"]["available_copies"], 0);

    let response = remove().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "No available copies to remove");

    // Row is kept at zero copies
    let book = book_in_list(&client, &admin, &isbn).await;
    assert_eq!(book["total_copies"], 0);
}

#[tokio::test]
#[ignore]
async fn test_update_book_keeps_counts() {
    let client = Client::new();
    let lib = create_library(&client, "Update").await;
    let (_, admin) = user_with_token(&client, "admin", lib).await;
    let isbn = format!("444-{}", unique());
    add_book(&client, &admin, &isbn).await;
    add_book(&client, &admin, &isbn).await;

    let response = client
        .put(format!("{}/books/{}", BASE_URL, isbn))
        .bearer_auth(&admin)
        .json(&json!({ "title": "Second Edition", "authors": "B", "publisher": "P", "version": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "Second Edition");
    assert_eq!(body["version"], 2);
    assert_eq!(body["total_copies"], 2);
}

#[tokio::test]
#[ignore]
async fn test_approve_issues_book_once() {
    let client = Client::new();
    let lib = create_library(&client, "Approve").await;
    let (_, admin) = user_with_token(&client, "admin", lib).await;
    let (reader_id, reader) = user_with_token(&client, "reader", lib).await;
    let isbn = format!("555-{}", unique());
    for _ in 0..3 {
        add_book(&client, &admin, &isbn).await;
    }

    let req_id = raise_request(&client, &reader, &isbn).await;

    let response = client
        .get(format!("{}/requests", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert!(body["requests"].as_array().unwrap().iter().any(|r| r["req_id"] == req_id));

    let before = Utc::now();
    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, req_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["request"]["request_type"], "Issued");
    assert_eq!(body["issue"]["issue_status"], "Issued");
    assert_eq!(body["issue"]["reader_id"], reader_id);
    let due: DateTime<Utc> = body["issue"]["expected_return_date"].as_str().unwrap().parse().unwrap();
    assert!(due >= before + Duration::days(14) - Duration::minutes(1));
    assert!(due <= Utc::now() + Duration::days(14) + Duration::minutes(1));

    let book = book_in_list(&client, &admin, &isbn).await;
    assert_eq!(book["available_copies"], 2);
    assert_eq!(book["total_copies"], 3);

    // Second approval changes nothing
    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, req_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let book = book_in_list(&client, &admin, &isbn).await;
    assert_eq!(book["available_copies"], 2);

    let response = client
        .get(format!("{}/readers/{}/issues", BASE_URL, reader_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["info"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_approve_without_copies_changes_nothing() {
    let client = Client::new();
    let lib = create_library(&client, "Empty").await;
    let (_, admin) = user_with_token(&client, "admin", lib).await;
    let (reader_id, reader) = user_with_token(&client, "reader", lib).await;
    let isbn = format!("666-{}", unique());
    add_book(&client, &admin, &isbn).await;

    let req_id = raise_request(&client, &reader, &isbn).await;

    // Withdraw the only copy so nothing can be issued
    client
        .delete(format!("{}/books/{}", BASE_URL, isbn))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, req_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "No copies available");

    // Still pending, no issue registry entry
    let response = client
        .get(format!("{}/requests", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert!(body["requests"].as_array().unwrap().iter().any(|r| r["req_id"] == req_id));

    let response = client
        .get(format!("{}/readers/{}/issues", BASE_URL, reader_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert!(body["info"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn test_reject_is_terminal() {
    let client = Client::new();
    let lib = create_library(&client, "Reject").await;
    let (_, admin) = user_with_token(&client, "admin", lib).await;
    let (_, reader) = user_with_token(&client, "reader", lib).await;
    let isbn = format!("777-{}", unique());
    add_book(&client, &admin, &isbn).await;

    let req_id = raise_request(&client, &reader, &isbn).await;

    let response = client
        .post(format!("{}/requests/{}/reject", BASE_URL, req_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["request"]["request_type"], "Rejected");
    assert!(body["request"]["approval_date"].is_string());

    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, req_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let book = book_in_list(&client, &admin, &isbn).await;
    assert_eq!(book["available_copies"], 1);
}

#[tokio::test]
#[ignore]
async fn test_return_restores_copy() {
    let client = Client::new();
    let lib = create_library(&client, "Return").await;
    let (_, admin) = user_with_token(&client, "admin", lib).await;
    let (_, reader) = user_with_token(&client, "reader", lib).await;
    let isbn = format!("888-{}", unique());
    add_book(&client, &admin, &isbn).await;

    let req_id = raise_request(&client, &reader, &isbn).await;
    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, req_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let issue_id = body["issue"]["issue_id"].as_i64().unwrap();
    assert_eq!(book_in_list(&client, &admin, &isbn).await["available_copies"], 0);

    let give_back = || {
        client
            .post(format!("{}/issues/{}/return", BASE_URL, issue_id))
            .bearer_auth(&admin)
            .send()
    };

    let response = give_back().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["issue"]["issue_status"], "Returned");
    assert_eq!(book_in_list(&client, &admin, &isbn).await["available_copies"], 1);

    assert_eq!(give_back().await.unwrap().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_library_scoping() {
    let client = Client::new();
    let lib1 = create_library(&client, "Scope One").await;
    let lib2 = create_library(&client, "Scope Two").await;
    let (_, admin1) = user_with_token(&client, "admin", lib1).await;
    let (_, admin2) = user_with_token(&client, "admin", lib2).await;
    let (reader_id, reader) = user_with_token(&client, "reader", lib1).await;
    let isbn = format!("999-{}", unique());
    add_book(&client, &admin1, &isbn).await;
    let req_id = raise_request(&client, &reader, &isbn).await;

    let response = client
        .get(format!("{}/readers/{}/issues", BASE_URL, reader_id))
        .bearer_auth(&admin2)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, req_id))
        .bearer_auth(&admin2)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, isbn))
        .bearer_auth(&admin2)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin 2 does not see library 1's pending request
    let response = client
        .get(format!("{}/requests", BASE_URL))
        .bearer_auth(&admin2)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert!(body["requests"].as_array().unwrap().iter().all(|r| r["req_id"] != req_id));
}

#[tokio::test]
#[ignore]
async fn test_blank_user_name_is_rejected() {
    let client = Client::new();
    let lib = create_library(&client, "Blank").await;

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "name": "   ",
            "email": format!("blank-{}@example.org", unique()),
            "role": "reader",
            "lib_id": lib
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
#[ignore]
async fn test_concurrent_approvals_of_last_copy() {
    let client = Client::new();
    let lib = create_library(&client, "Race").await;
    let (_, admin) = user_with_token(&client, "admin", lib).await;
    let isbn = format!("888-{}", unique());
    assert_eq!(add_book(&client, &admin, &isbn).await.status(), StatusCode::CREATED);

    let mut req_ids = Vec::new();
    for _ in 0..6 {
        let (_, reader) = user_with_token(&client, "reader", lib).await;
        req_ids.push(raise_request(&client, &reader, &isbn).await);
    }

    let mut approvals = tokio::task::JoinSet::new();
    for req_id in req_ids {
        let client = client.clone();
        let admin = admin.clone();
        approvals.spawn(async move {
            client
                .post(format!("{}/requests/{}/approve", BASE_URL, req_id))
                .bearer_auth(&admin)
                .send()
                .await
                .unwrap()
                .status()
        });
    }

    let mut statuses = Vec::new();
    while let Some(status) = approvals.join_next().await {
        statuses.push(status.unwrap());
    }
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1, "{:?}", statuses);
    assert!(statuses
        .iter()
        .all(|s| *s == StatusCode::OK || *s == StatusCode::BAD_REQUEST));

    let book = book_in_list(&client, &admin, &isbn).await;
    assert_eq!(book["available_copies"], 0);
    assert_eq!(book["total_copies"], 1);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_first_adds_in_one_library_restock() {
    let client = Client::new();
    let lib = create_library(&client, "Parallel").await;
    let (_, admin) = user_with_token(&client, "admin", lib).await;
    let isbn = format!("999-{}", unique());

    let mut adds = tokio::task::JoinSet::new();
    for _ in 0..6 {
        let client = client.clone();
        let admin = admin.clone();
        let isbn = isbn.clone();
        adds.spawn(async move { add_book(&client, &admin, &isbn).await.status() });
    }

    let mut statuses = Vec::new();
    while let Some(status) = adds.join_next().await {
        statuses.push(status.unwrap());
    }
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1, "{:?}", statuses);
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 5, "{:?}", statuses);

    let book = book_in_list(&client, &admin, &isbn).await;
    assert_eq!(book["total_copies"], 6);
    assert_eq!(book["available_copies"], 6);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_first_adds_across_libraries() {
    let client = Client::new();
    let lib_a = create_library(&client, "Left").await;
    let lib_b = create_library(&client, "Right").await;
    let (_, admin_a) = user_with_token(&client, "admin", lib_a).await;
    let (_, admin_b) = user_with_token(&client, "admin", lib_b).await;
    let isbn = format!("777-{}", unique());

    let (a, b) = tokio::join!(
        add_book(&client, &admin_a, &isbn),
        add_book(&client, &admin_b, &isbn)
    );
    let mut statuses = vec![a.status(), b.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
#[ignore]
async fn test_non_numeric_request_id() {
    let client = Client::new();
    let lib = create_library(&client, "Paths").await;
    let (_, admin) = user_with_token(&client, "admin", lib).await;

    let response = client
        .post(format!("{}/requests/abc/approve", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "BadValue");
}
