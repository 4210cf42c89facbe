//! End-to-end scenarios against a mock HTTP server.

use restkit_core::prelude::*;
use restkit_core::error::NetworkError;
use restkit_core::header::{CONTENT_TYPE, HeaderValue};
use wiremock::matchers::{body_json, header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn open(server: &MockServer, path: &str) -> Resource {
    let endpoint = Endpoint::parse(&format!("{}{path}", server.uri())).unwrap();
    Resource::open_with(endpoint, HttpConfig::default()).unwrap()
}

#[tokio::test]
async fn test_get_items_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("id", "42"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "widget"})))
        .expect(1)
        .mount(&server)
        .await;

    let resource = open(&server, "/items");
    let item = resource.get::<Json>([("id", 42)]).await.unwrap();

    assert!(item.has_value());
    assert_eq!(item.value().await.unwrap(), &json!({"name": "widget"}));
    assert_eq!(item.value().await.unwrap()["name"], "widget");
    assert_eq!(
        item.metadata()[CONTENT_TYPE],
        HeaderValue::from_static("application/json")
    );

    resource.close();
}

#[tokio::test]
async fn test_forced_fetch_failure_carries_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("x-trace", "t-1")
                .set_body_string("no such item"),
        )
        .mount(&server)
        .await;

    let resource = open(&server, "/items");
    let err = resource.get::<Json>([("id", 1)]).await.unwrap_err();

    let response = err.as_response().unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()["x-trace"], "t-1");
    assert_eq!(response.text(), "no such item");
}

#[tokio::test]
async fn test_post_round_trip_returns_server_value() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "widget"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": 1, "name": "widget"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resource = open(&server, "/items");
    let created: Representation =
        Representation::post(&resource, Some(&json!({"name": "widget"})))
            .await
            .unwrap();

    assert_eq!(created.value().await.unwrap()["id"], 1);
}

#[tokio::test]
async fn test_mutable_assign_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/documents/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/documents/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "saved"})))
        .expect(1)
        .mount(&server)
        .await;

    let resource = open(&server, "/documents/1");
    let mut document: Representation<Writable<Json>> = Representation::new(resource.clone());

    document.assign(None).await.unwrap();
    assert_eq!(document.state(), ValueState::Empty);

    document.assign(Some(json!({"title": "draft"}))).await.unwrap();
    assert_eq!(document.value().await.unwrap()["title"], "saved");
}

#[tokio::test]
async fn test_form_submission() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header_regex("content-type", "^multipart/form-data; boundary=.+$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("status=ok&files[]=a", "application/x-www-form-urlencoded"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resource = open(&server, "/upload");
    let result: Representation<Form> =
        Representation::post(&resource, Some(&json!({"name": "a", "size": 3})))
            .await
            .unwrap();

    assert_eq!(
        result.value().await.unwrap(),
        &json!({"status": "ok", "files": ["a"]})
    );
}

#[tokio::test]
async fn test_url_encoded_put() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/settings"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "theme=dark&notify[email]=yes",
            "application/x-www-form-urlencoded",
        ))
        .mount(&server)
        .await;

    let resource = open(&server, "/settings");
    let settings: Representation<UrlEncoded> = Representation::put(
        &resource,
        Some(&json!({"theme": "dark", "notify": {"email": true}})),
    )
    .await
    .unwrap();

    assert_eq!(
        settings.value().await.unwrap(),
        &json!({"theme": "dark", "notify": {"email": "yes"}})
    );
    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].body, b"notify%5Bemail%5D=true&theme=dark");
}

#[tokio::test]
async fn test_scoped_resource_is_closed_afterwards() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .mount(&server)
        .await;

    let mut leaked = None;
    let endpoint = Endpoint::parse(&format!("{}/list", server.uri())).unwrap();
    let total = Resource::scoped_with(endpoint, HttpConfig::default(), |resource| {
        leaked = Some(resource.clone());
        async move {
            let list: Representation = Representation::new(resource);
            let values: Vec<i64> = list.value_as().await?;
            Ok::<_, Error>(values.iter().sum::<i64>())
        }
    })
    .await
    .unwrap();

    assert_eq!(total, 6);

    let after: Representation = Representation::new(leaked.unwrap());
    let err = after.value().await.unwrap_err();
    assert!(matches!(err.as_network(), Some(NetworkError::Closed)));
}

#[tokio::test]
async fn test_scoped_resource_is_closed_when_cancelled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"slow": true}))
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut leaked = None;
    let endpoint = Endpoint::parse(&format!("{}/slow", server.uri())).unwrap();
    let scoped = Resource::scoped_with(endpoint, HttpConfig::default(), |resource| {
        leaked = Some(resource.clone());
        async move {
            let slow: Representation = Representation::new(resource);
            slow.value().await?;
            Ok::<_, Error>(())
        }
    });

    let outcome = tokio::time::timeout(std::time::Duration::from_millis(200), scoped).await;
    assert!(outcome.is_err());

    let after: Representation = Representation::new(leaked.unwrap());
    let err = after.value().await.unwrap_err();
    assert!(matches!(err.as_network(), Some(NetworkError::Closed)));
}

#[tokio::test]
async fn test_closing_twice_is_harmless() {
    let server = MockServer::start().await;
    let resource = open(&server, "/");
    let representation: Representation = Representation::new(resource.with_path("x"));

    representation.close();
    representation.close();
    resource.close();
    resource.close();
}
