use super::*;
use crate::reference::Reference;
use crate::transport::{Request, Transport};
use crate::wrapper::{APPLICATION_JSON, UrlEncoded};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Answers requests from a queue of canned responses and records them.
#[derive(Debug, Default)]
struct Scripted {
    calls: AtomicUsize,
    requests: Mutex<Vec<Request>>,
    responses: Mutex<VecDeque<(StatusCode, &'static str)>>,
    delay: Option<Duration>,
}

impl Scripted {
    fn new(responses: impl IntoIterator<Item = (StatusCode, &'static str)>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Default::default()
        })
    }

    fn slow(responses: impl IntoIterator<Item = (StatusCode, &'static str)>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn request(&self, index: usize) -> Request {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl Transport for Scripted {
    async fn call(&self, request: Request) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((StatusCode::NOT_FOUND, ""));
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        headers.insert("x-request", HeaderValue::from_static("1"));
        Ok(Response::new(status, headers, body))
    }
}

fn resource(transport: &Arc<Scripted>, path: &str) -> Resource {
    Resource::new(transport.clone(), Reference::parse(path), HeaderMap::new())
}

type Document = Representation<Writable<Json>>;

#[tokio::test]
async fn test_value_is_fetched_once() {
    let transport = Scripted::new([(StatusCode::OK, r#"{"name":"widget"}"#)]);
    let representation: Representation = Representation::new(resource(&transport, "/items"));

    assert!(!representation.has_value());
    assert_eq!(representation.state(), ValueState::Unfetched);
    assert!(representation.metadata().is_empty());

    let first = representation.value().await.unwrap();
    let second = representation.value().await.unwrap();

    assert_eq!(first, &json!({"name": "widget"}));
    assert!(std::ptr::eq(first, second));
    assert!(representation.has_value());
    assert_eq!(transport.calls(), 1);
    assert_eq!(representation.metadata()["x-request"], "1");

    let request = transport.request(0);
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.headers[ACCEPT], APPLICATION_JSON);
    assert!(request.body.is_none());
}

#[tokio::test]
async fn test_concurrent_first_access_is_single_flight() {
    let transport = Scripted::slow([(StatusCode::OK, "[1]"), (StatusCode::OK, "[2]")]);
    let representation: Representation = Representation::new(resource(&transport, "/items"));

    let (first, second) = tokio::join!(representation.value(), representation.value());
    assert_eq!(first.unwrap(), &json!([1]));
    assert_eq!(second.unwrap(), &json!([1]));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_non_success_is_raised_and_not_cached() {
    let transport = Scripted::new([
        (StatusCode::INTERNAL_SERVER_ERROR, "oops"),
        (StatusCode::OK, "true"),
    ]);
    let representation: Representation = Representation::new(resource(&transport, "/flaky"));

    let err = representation.value().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(err.as_response().unwrap().text(), "oops");
    assert!(!representation.has_value());

    assert_eq!(representation.value().await.unwrap(), &json!(true));
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_empty_body_is_cached_as_empty() {
    let transport = Scripted::new([(StatusCode::NO_CONTENT, "")]);
    let representation: Representation = Representation::new(resource(&transport, "/empty"));

    assert_eq!(representation.value().await.unwrap(), &Value::Null);
    assert_eq!(representation.state(), ValueState::Empty);
    assert!(representation.has_value());

    representation.value().await.unwrap();
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_literal_null_is_a_value() {
    let transport = Scripted::new([(StatusCode::OK, "null")]);
    let representation: Representation = Representation::new(resource(&transport, "/null"));

    representation.value().await.unwrap();
    assert_eq!(representation.state(), ValueState::Value(&Value::Null));
}

#[tokio::test]
async fn test_from_parts_never_fetches() {
    let transport = Scripted::new([]);
    let representation: Representation = Representation::from_parts(
        resource(&transport, "/known"),
        Some(json!({"cached": true})),
        HeaderMap::new(),
    );

    assert!(representation.has_value());
    assert_eq!(representation.value().await.unwrap()["cached"], true);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_derivation_preserves_kind_and_merges_scope() {
    let transport = Scripted::new([]);
    let mut headers = HeaderMap::new();
    headers.insert("x-token", HeaderValue::from_static("abc"));
    let base = Resource::new(transport.clone(), Reference::parse("/items"), headers);
    let representation: Representation<UrlEncoded> = Representation::new(base);

    let derived: Representation<UrlEncoded> = representation
        .with(Scope::new().parameter("a", 1))
        .with_parameters([("b", 2)]);

    let reference = derived.resource().reference();
    assert_eq!(reference.parameters().get("a"), Some("1"));
    assert_eq!(reference.parameters().get("b"), Some("2"));
    assert_eq!(reference.path(), "/items");
    assert_eq!(derived.resource().headers(), representation.resource().headers());
    assert!(!derived.has_value());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_with_kind_switches_wrapper() {
    let transport = Scripted::new([(StatusCode::OK, r#"{"id":1}"#)]);
    let representation: Representation = Representation::new(resource(&transport, "/items"));

    let form: Representation<UrlEncoded> = representation.with_kind(Scope::new().path("items/1"));
    assert_eq!(form.resource().path(), "/items/1");

    form.value().await.unwrap();
    assert_eq!(
        transport.request(0).headers[ACCEPT],
        "application/x-www-form-urlencoded"
    );
}

#[tokio::test]
async fn test_post_reads_server_canonical_value() {
    let transport = Scripted::new([(StatusCode::CREATED, r#"{"id":7,"name":"widget"}"#)]);
    let payload = json!({"name": "widget"});

    let created: Representation =
        Representation::post(&resource(&transport, "/items"), Some(&payload))
            .await
            .unwrap();

    assert_eq!(
        created.value().await.unwrap(),
        &json!({"id": 7, "name": "widget"})
    );
    assert_eq!(transport.calls(), 1);

    let request = transport.request(0);
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.headers[CONTENT_TYPE], APPLICATION_JSON);
    assert_eq!(request.body.as_deref(), Some(&br#"{"name":"widget"}"#[..]));
}

#[tokio::test]
async fn test_verb_constructors_use_their_method() {
    let transport = Scripted::new([
        (StatusCode::OK, "1"),
        (StatusCode::OK, "2"),
        (StatusCode::OK, "3"),
        (StatusCode::OK, ""),
        (StatusCode::OK, ""),
    ]);
    let target = resource(&transport, "/verbs");

    Representation::<Json>::put(&target, Some(&json!(1))).await.unwrap();
    Representation::<Json>::patch(&target, Some(&json!(2))).await.unwrap();
    Representation::<Json>::delete(&target, None).await.unwrap();
    Representation::<Json>::head(&target, None).await.unwrap();
    Representation::<Json>::options(&target, None).await.unwrap();

    let methods: Vec<Method> = (0..5).map(|i| transport.request(i).method).collect();
    assert_eq!(
        methods,
        [
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS
        ]
    );
}

#[tokio::test]
async fn test_call_with_custom_decoding() {
    #[derive(Debug, Deserialize)]
    struct Item {
        name: String,
    }

    let transport = Scripted::new([(StatusCode::OK, r#"{"name":"widget"}"#)]);
    let item = Representation::<Json>::call_with(
        &resource(&transport, "/items/1"),
        Method::GET,
        None,
        |resource, response| async move {
            let representation = Representation::<Json>::from_response(resource, response).await?;
            representation.value_as::<Item>().await
        },
    )
    .await
    .unwrap();

    assert_eq!(item.name, "widget");
}

#[tokio::test]
async fn test_value_as_reports_shape_mismatch() {
    let transport = Scripted::new([(StatusCode::OK, "[1,2]")]);
    let representation: Representation = Representation::new(resource(&transport, "/items"));
    let err = representation
        .value_as::<std::collections::HashMap<String, i32>>()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[tokio::test]
async fn test_accept_header_from_resource_wins() {
    let transport = Scripted::new([(StatusCode::OK, "{}")]);
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.items+json"));
    let target = Resource::new(transport.clone(), Reference::parse("/items"), headers);

    Representation::<Json>::new(target).value().await.unwrap();
    assert_eq!(
        transport.request(0).headers[ACCEPT],
        "application/vnd.items+json"
    );
}

#[tokio::test]
async fn test_mutable_post_replaces_value() {
    let transport = Scripted::new([(StatusCode::OK, r#"{"v":1}"#), (StatusCode::OK, r#"{"v":2}"#)]);
    let mut document: Document = Representation::new(resource(&transport, "/doc"));

    assert_eq!(document.value().await.unwrap(), &json!({"v": 1}));
    document.post(json!({"v": 2})).await.unwrap();

    assert_eq!(document.value().await.unwrap(), &json!({"v": 2}));
    assert_eq!(transport.calls(), 2);
    assert_eq!(transport.request(1).method, Method::POST);
}

#[tokio::test]
async fn test_mutable_post_failure_keeps_value() {
    let transport = Scripted::new([(StatusCode::CONFLICT, "stale")]);
    let mut document: Document =
        Representation::from_parts(resource(&transport, "/doc"), Some(json!(1)), HeaderMap::new());

    let err = document.post(json!(2)).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    assert_eq!(document.value().await.unwrap(), &json!(1));
}

#[tokio::test]
async fn test_assign_none_issues_delete() {
    let transport = Scripted::new([(StatusCode::NO_CONTENT, "")]);
    let mut document: Document =
        Representation::from_parts(resource(&transport, "/doc"), Some(json!(1)), HeaderMap::new());

    document.assign(None).await.unwrap();

    assert_eq!(transport.calls(), 1);
    let request = transport.request(0);
    assert_eq!(request.method, Method::DELETE);
    assert!(request.body.is_none());
    assert_eq!(document.state(), ValueState::Empty);
}

#[tokio::test]
async fn test_assign_null_issues_delete_and_value_posts() {
    let transport = Scripted::new([(StatusCode::OK, ""), (StatusCode::OK, r#"{"v":3}"#)]);
    let mut document: Document = Representation::new(resource(&transport, "/doc"));

    document.assign(Some(Value::Null)).await.unwrap();
    document.assign(Some(json!({"v": 3}))).await.unwrap();

    assert_eq!(transport.request(0).method, Method::DELETE);
    assert_eq!(transport.request(1).method, Method::POST);
    assert_eq!(document.value().await.unwrap(), &json!({"v": 3}));
}

#[tokio::test]
async fn test_assign_false_deletes_and_other_scalars_post() {
    let transport = Scripted::new([
        (StatusCode::NO_CONTENT, ""),
        (StatusCode::OK, "0"),
        (StatusCode::OK, "true"),
    ]);
    let mut document: Document = Representation::new(resource(&transport, "/flag"));

    document.assign(Some(json!(false))).await.unwrap();
    assert_eq!(document.state(), ValueState::Empty);

    document.assign(Some(json!(0))).await.unwrap();
    document.assign(Some(json!(true))).await.unwrap();

    assert_eq!(transport.request(0).method, Method::DELETE);
    assert_eq!(transport.request(1).method, Method::POST);
    assert_eq!(transport.request(2).method, Method::POST);
    assert_eq!(document.value().await.unwrap(), &json!(true));
}

#[tokio::test]
async fn test_assign_none_reports_failed_delete() {
    let transport = Scripted::new([(StatusCode::FORBIDDEN, "")]);
    let mut document: Document = Representation::new(resource(&transport, "/doc"));

    let err = document.assign(None).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert!(!document.has_value());
}

#[tokio::test]
async fn test_delete_returns_raw_response() {
    let transport = Scripted::new([(StatusCode::ACCEPTED, r#"{"queued":true}"#)]);
    let mut document: Document = Representation::new(resource(&transport, "/doc"));

    let response = document.delete().await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(response.text().await.unwrap(), r#"{"queued":true}"#);
}

#[test]
fn test_close_twice() {
    let transport = Scripted::new([]);
    let representation: Representation = Representation::new(resource(&transport, "/items"));
    representation.close();
    representation.close();
}

#[test]
fn test_debug_shows_reference_and_state() {
    let transport = Scripted::new([]);
    let representation: Representation = Representation::new(resource(&transport, "/items?id=1"));
    let debug = format!("{representation:?}");
    assert!(debug.contains("/items?id=1"));
    assert!(debug.contains("Unfetched"));
}
