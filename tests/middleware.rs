use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::Value;

use tenant_crm::domain::organization::NewOrganization;
use tenant_crm::domain::role::default_role_templates;
use tenant_crm::domain::types::OrganizationName;
use tenant_crm::repository::{OrganizationWriter, UserReader};

#[macro_use]
mod common;

#[actix_web::test]
async fn health_needs_no_token() {
    let test_db = common::TestDb::new("health_needs_no_token.db");
    let repo = test_db.repo();
    let app = test_app!(repo);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn missing_or_invalid_token_is_unauthorized() {
    let test_db = common::TestDb::new("missing_or_invalid_token_is_unauthorized.db");
    let repo = test_db.repo();
    let app = test_app!(repo);

    let req = test::TestRequest::get().uri("/api/v1/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "authentication required");

    let req = test::TestRequest::get()
        .uri("/api/v1/me")
        .insert_header(common::bearer("not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn first_seen_user_is_provisioned_without_organization() {
    let test_db = common::TestDb::new("first_seen_user_is_provisioned.db");
    let repo = test_db.repo();
    let app = test_app!(repo);

    let token = common::token("New.User@Example.com", "New User");
    let req = test::TestRequest::get()
        .uri("/api/v1/me")
        .insert_header(common::bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], "new.user@example.com");
    assert!(body["organization"].is_null());
    assert_eq!(body["permissions"], serde_json::json!([]));

    let email = tenant_crm::domain::types::UserEmail::new("new.user@example.com").unwrap();
    assert!(repo.get_user_by_email(&email).unwrap().is_some());
}

#[actix_web::test]
async fn organization_header_is_validated() {
    let test_db = common::TestDb::new("organization_header_is_validated.db");
    let repo = test_db.repo();
    let owner = common::create_user(&repo, "owner@example.com", "Owner");
    let (org, _) = repo
        .create_organization(
            &NewOrganization::new(OrganizationName::new("Acme").unwrap(), owner.id),
            &default_role_templates().unwrap(),
        )
        .unwrap();
    let app = test_app!(repo);

    let stranger = common::token("stranger@example.com", "Stranger");
    let cases = [
        ("abc".to_string(), StatusCode::BAD_REQUEST),
        ("999".to_string(), StatusCode::NOT_FOUND),
        (org.id.to_string(), StatusCode::FORBIDDEN),
    ];
    for (header, status) in cases {
        let req = test::TestRequest::get()
            .uri("/api/v1/me")
            .insert_header(common::bearer(&stranger))
            .insert_header(("X-Organization-Id", header.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), status, "header `{header}`");
    }

    let owner_token = common::token("owner@example.com", "Owner");
    let req = test::TestRequest::get()
        .uri("/api/v1/me")
        .insert_header(common::bearer(&owner_token))
        .insert_header(("X-Organization-Id", org.id.to_string()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["organization"]["id"], org.id.get());
    assert_eq!(body["implicit_grant"], "owner");
}

#[actix_web::test]
async fn active_profile_selects_default_organization() {
    let test_db = common::TestDb::new("active_profile_selects_default_organization.db");
    let repo = test_db.repo();
    let owner = common::create_user(&repo, "owner@example.com", "Owner");
    let (first, _) = repo
        .create_organization(
            &NewOrganization::new(OrganizationName::new("First").unwrap(), owner.id),
            &[],
        )
        .unwrap();
    let (second, _) = repo
        .create_organization(
            &NewOrganization::new(OrganizationName::new("Second").unwrap(), owner.id),
            &[],
        )
        .unwrap();
    let app = test_app!(repo);
    let token = common::token("owner@example.com", "Owner");

    // The most recently created organization's vendor profile is active.
    let req = test::TestRequest::get()
        .uri("/api/v1/me")
        .insert_header(common::bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["organization"]["id"], second.id.get());
    assert_eq!(body["implicit_grant"], "owner");

    let first_profile = body["profiles"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["organization_id"] == first.id.get())
        .unwrap()["id"]
        .clone();

    let req = test::TestRequest::post()
        .uri("/api/v1/me/active-profile")
        .insert_header(common::bearer(&token))
        .set_json(serde_json::json!({ "profile_id": first_profile }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri("/api/v1/me")
        .insert_header(common::bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["organization"]["id"], first.id.get());
}
