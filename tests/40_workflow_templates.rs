mod common;

use axum::http::StatusCode;
use uuid::Uuid;

use common::{mint_token, new_principal, TestApp};

fn uri(workspace: &str, template: &str) -> String {
    format!("/api/workspaces/{}/workflows/templates/{}", workspace, template)
}

#[tokio::test]
async fn member_gets_template_with_required_variables() {
    let app = TestApp::new();
    let who = new_principal();
    let workspace = Uuid::new_v4();
    app.store.add_member(workspace, who.id, "viewer").await;

    let res = app
        .get(&uri(&workspace.to_string(), "webinar-registration"), Some(&mint_token(&who)))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let template = &res.body["data"]["template"];
    assert_eq!(template["id"], "webinar-registration");
    assert!(template["workflowDefinition"].is_object());
    let required: Vec<&str> = template["requiredVariables"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert!(required.contains(&"webinarUrl"));
    assert!(required.contains(&"startsAt"));
}

#[tokio::test]
async fn unknown_template_is_404_for_members() {
    let app = TestApp::new();
    let who = new_principal();
    let workspace = Uuid::new_v4();
    app.store.add_member(workspace, who.id, "editor").await;

    let res = app.get(&uri(&workspace.to_string(), "nope"), Some(&mint_token(&who))).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn non_member_is_403_even_for_unknown_template() {
    let app = TestApp::new();
    let token = mint_token(&new_principal());
    let workspace = Uuid::new_v4().to_string();

    for template in ["lead-capture-nurture", "nope"] {
        let res = app.get(&uri(&workspace, template), Some(&token)).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);
        assert!(res.body["actualRole"].is_null());
        assert_eq!(res.body["requiredRoles"].as_array().unwrap().len(), 4);
    }
}

#[tokio::test]
async fn unrecognised_role_is_403_and_reported() {
    let app = TestApp::new();
    let who = new_principal();
    let workspace = Uuid::new_v4();
    app.store.add_member(workspace, who.id, "guest").await;

    let res = app
        .get(&uri(&workspace.to_string(), "lead-capture-nurture"), Some(&mint_token(&who)))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["actualRole"], "guest");
}

#[tokio::test]
async fn membership_in_other_workspace_does_not_count() {
    let app = TestApp::new();
    let who = new_principal();
    app.store.add_member(Uuid::new_v4(), who.id, "owner").await;

    let res = app
        .get(&uri(&Uuid::new_v4().to_string(), "lead-capture-nurture"), Some(&mint_token(&who)))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_workspace_id_is_400() {
    let app = TestApp::new();
    let res = app
        .get(&uri("not-a-uuid", "lead-capture-nurture"), Some(&mint_token(&new_principal())))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn permission_lookup_failure_is_500() {
    let app = TestApp::new();
    app.store.fail_reads(true);

    let res = app
        .get(&uri(&Uuid::new_v4().to_string(), "lead-capture-nurture"), Some(&mint_token(&new_principal())))
        .await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn requires_authentication() {
    let app = TestApp::new();
    let res = app.get(&uri(&Uuid::new_v4().to_string(), "lead-capture-nurture"), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}
