use std::collections::HashMap;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::json;
use tower::util::ServiceExt;
use uuid::Uuid;

use crate::{
    domain::{
        models::{PropertyDefinition, PropertyType},
        ports::{MockPropertyDefinitionRepo, MockPropertyTagRepo},
        query::Predicate,
        service::PropertyDefinitionServiceImpl,
    },
    inbound::axum_router::{PropertyDefinitionsRouterState, property_definitions_router},
};

fn revenue() -> PropertyDefinition {
    PropertyDefinition {
        id: Uuid::from_u128(4),
        team_id: 7,
        name: "revenue".to_string(),
        is_numerical: true,
        query_usage_30_day: Some(20),
        property_type: Some(PropertyType::Numeric),
        is_event_property: Some(true),
    }
}

fn router(repo: MockPropertyDefinitionRepo, tags: MockPropertyTagRepo) -> Router {
    property_definitions_router(PropertyDefinitionsRouterState::new(
        PropertyDefinitionServiceImpl::new(repo, tags),
    ))
}

fn untouched_router() -> Router {
    let mut repo = MockPropertyDefinitionRepo::new();
    repo.expect_list_property_definitions().never();
    repo.expect_get_property_definition().never();
    let mut tags = MockPropertyTagRepo::new();
    tags.expect_get_tags_for_definitions().never();
    router(repo, tags)
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = router.oneshot(request).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(bytes.as_ref()).unwrap())
}

#[tokio::test]
async fn it_should_list_definitions_with_tags() {
    let mut repo = MockPropertyDefinitionRepo::new();
    repo.expect_list_property_definitions()
        .times(1)
        .withf(|query| {
            assert_eq!(query.event_names, Some(vec!["purchase".to_string()]));
            assert!(query.predicates.contains(&Predicate::Team(7)));
            assert!(query.predicates.contains(&Predicate::NumericalOnly));
            assert_eq!(query.page.limit, Some(10));
            true
        })
        .returning(|_| Box::pin(async { Ok(vec![revenue()]) }));

    let mut tags = MockPropertyTagRepo::new();
    tags.expect_get_tags_for_definitions()
        .times(1)
        .returning(|_, _| {
            Box::pin(async { Ok(HashMap::from([(Uuid::from_u128(4), vec!["money".to_string()])])) })
        });

    let request = Request::builder()
        .uri("/api/projects/7/property_definitions?is_numerical=true&event_names=%5B%22purchase%22%5D&limit=10")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(router(repo, tags), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "id": "00000000-0000-0000-0000-000000000004",
            "name": "revenue",
            "is_numerical": true,
            "query_usage_30_day": 20,
            "property_type": "Numeric",
            "tags": ["money"],
            "is_event_property": true
        }])
    );
}

#[tokio::test]
async fn it_should_reject_malformed_event_names() {
    let request = Request::builder()
        .uri("/api/projects/7/property_definitions?event_names=login")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(untouched_router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "parse_error");
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("event_names must be a JSON list of strings")
    );
}

#[tokio::test]
async fn it_should_return_not_found_for_other_teams_definition() {
    let mut repo = MockPropertyDefinitionRepo::new();
    repo.expect_get_property_definition()
        .times(1)
        .withf(|team_id, id| *team_id == 2 && *id == Uuid::from_u128(4))
        .returning(|_, _| Box::pin(async { Ok(None) }));
    let mut tags = MockPropertyTagRepo::new();
    tags.expect_get_tags_for_definitions().never();

    let request = Request::builder()
        .uri("/api/projects/2/property_definitions/00000000-0000-0000-0000-000000000004")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(router(repo, tags), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn it_should_retrieve_a_definition() {
    let mut repo = MockPropertyDefinitionRepo::new();
    repo.expect_get_property_definition()
        .times(1)
        .returning(|_, _| {
            Box::pin(async {
                Ok(Some(PropertyDefinition {
                    is_event_property: None,
                    ..revenue()
                }))
            })
        });
    let mut tags = MockPropertyTagRepo::new();
    tags.expect_get_tags_for_definitions()
        .times(1)
        .returning(|_, _| Box::pin(async { Ok(HashMap::new()) }));

    let request = Request::builder()
        .uri("/api/projects/7/property_definitions/00000000-0000-0000-0000-000000000004")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(router(repo, tags), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "revenue");
    assert_eq!(body["tags"], json!([]));
    assert_eq!(body["is_event_property"], serde_json::Value::Null);
}

#[tokio::test]
async fn it_should_gate_updates_regardless_of_body() {
    for (method, body) in [
        ("PATCH", Body::from(r#"{"description":"hello"}"#)),
        ("PUT", Body::from("not json")),
        ("PATCH", Body::empty()),
    ] {
        let request = Request::builder()
            .method(method)
            .uri("/api/projects/7/property_definitions/00000000-0000-0000-0000-000000000099")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();

        let (status, body) = send(untouched_router(), request).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body["code"], "payment_required");
    }
}

#[tokio::test]
async fn it_should_not_allow_creation() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/projects/7/property_definitions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"new_property"}"#))
        .unwrap();

    let (status, body) = send(untouched_router(), request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["code"], "method_not_allowed");
}

#[tokio::test]
async fn it_should_hide_storage_errors() {
    let mut repo = MockPropertyDefinitionRepo::new();
    repo.expect_list_property_definitions()
        .times(1)
        .returning(|_| Box::pin(async { Err(anyhow::anyhow!("connection refused")) }));
    let mut tags = MockPropertyTagRepo::new();
    tags.expect_get_tags_for_definitions().never();

    let request = Request::builder()
        .uri("/api/projects/7/property_definitions")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(router(repo, tags), request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "code": "internal_error",
            "message": "An internal server error has occurred"
        })
    );
}
