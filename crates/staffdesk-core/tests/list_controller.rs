//! List page orchestration: pagination, delete, form, and view flows.

mod common;

use common::{company, company_page, context};
use serde_json::json;
use staffdesk_core::entities::{Company, CompanyDraft};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn company_item(id: i64) -> Company {
    serde_json::from_value(company(id)).unwrap()
}

#[tokio::test]
async fn test_deleting_last_row_steps_back_a_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/companies/"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(company_page(21, 21, 21)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/companies/21/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/companies/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(company_page(11, 20, 20)))
        .expect(1)
        .mount(&server)
        .await;

    let app = context(&server, Some(("a", "r")));
    let list = app.company_list();
    list.set_page(3).await;

    let view = list.snapshot();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.total_pages, 3);

    assert!(list.open_delete(view.items[0].clone()));
    let outcome = list.confirm_delete().await.unwrap();
    assert!(outcome.is_success());

    let view = list.snapshot();
    assert_eq!(view.page, 2);
    assert_eq!(view.items.len(), 10);
    assert_eq!(view.count, 20);
    assert_eq!(view.total_pages, 2);
    assert!(!view.delete.is_open());
}

#[tokio::test]
async fn test_deleting_on_first_page_refetches_same_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/companies/"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(company_page(1, 1, 1)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/companies/"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0, "results": []})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/companies/1/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let app = context(&server, Some(("a", "r")));
    let list = app.company_list();
    list.mount().await;

    assert!(list.open_delete(company_item(1)));
    list.confirm_delete().await.unwrap();

    let view = list.snapshot();
    assert_eq!(view.page, 1);
    assert!(view.items.is_empty());
    assert_eq!(view.total_pages, 0);
}

#[tokio::test]
async fn test_failed_delete_keeps_modal_open_with_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/companies/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(company_page(1, 3, 3)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/companies/2/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Company still has departments."
        })))
        .mount(&server)
        .await;

    let app = context(&server, Some(("a", "r")));
    let list = app.company_list();
    list.mount().await;

    list.open_delete(company_item(2));
    assert!(!list.open_delete(company_item(3)));
    let outcome = list.confirm_delete().await.unwrap();
    assert!(!outcome.is_success());

    let view = list.snapshot();
    assert!(view.delete.is_open());
    assert!(!view.delete.is_submitting());
    let pending = view.delete.state().unwrap();
    assert_eq!(pending.item.id, 2);
    assert_eq!(
        pending.error.as_deref(),
        Some("Company still has departments.")
    );
    assert_eq!(view.items.len(), 3);
}

#[tokio::test]
async fn test_confirm_without_selection_is_noop() {
    let server = MockServer::start().await;
    let app = context(&server, Some(("a", "r")));
    let list = app.company_list();
    assert!(list.confirm_delete().await.is_none());
    assert!(list.submit_form(CompanyDraft::default()).await.is_none());
}

#[tokio::test]
async fn test_add_success_closes_and_refetches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/companies/"))
        .and(body_json(json!({"name": "Initech"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 5, "name": "Initech"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/companies/"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1, "results": [{"id": 5, "name": "Initech"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = context(&server, Some(("a", "r")));
    let list = app.company_list();

    assert!(list.open_add());
    assert!(!list.open_add());
    let form = list.snapshot().form;
    assert_eq!(form.state().map(|f| f.draft.clone()), Some(CompanyDraft::default()));

    let outcome = list
        .submit_form(CompanyDraft {
            name: "Initech".into(),
        })
        .await
        .unwrap();
    assert!(outcome.is_success());

    let view = list.snapshot();
    assert!(!view.form.is_open());
    assert_eq!(view.items[0].name, "Initech");
    assert_eq!(app.toasts.active()[0].message, "Company added successfully!");
}

#[tokio::test]
async fn test_edit_routes_to_update_and_surfaces_field_errors() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/companies/4/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "name": ["company with this name already exists."]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = context(&server, Some(("a", "r")));
    let list = app.company_list();

    assert!(list.open_edit(company_item(4)));
    let view = list.snapshot();
    let form = view.form.state().unwrap();
    assert!(form.is_edit());
    assert_eq!(form.draft.name, "Company 4");

    let outcome = list
        .submit_form(CompanyDraft {
            name: "Company 1".into(),
        })
        .await
        .unwrap();
    assert!(!outcome.is_success());

    let view = list.snapshot();
    assert!(view.form.is_open());
    let form = view.form.state().unwrap();
    assert_eq!(form.draft.name, "Company 1");
    let error = form.error.as_ref().unwrap();
    assert_eq!(error.message, "company with this name already exists.");
    assert_eq!(
        error.fields.as_ref().unwrap()["name"],
        "company with this name already exists."
    );
}

#[tokio::test]
async fn test_view_modal_loads_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/companies/8/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(company(8)))
        .expect(1)
        .mount(&server)
        .await;

    let app = context(&server, Some(("a", "r")));
    let list = app.company_list();

    assert!(list.open_view(8).await);
    assert!(!list.open_view(9).await);

    let view = list.snapshot();
    assert_eq!(view.view.state().map(|v| v.id), Some(8));
    assert_eq!(view.view_item.map(|c| c.id), Some(8));

    list.close_view();
    assert!(!list.snapshot().view.is_open());
}

#[tokio::test]
async fn test_set_page_same_page_does_not_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/companies/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(company_page(11, 15, 15)))
        .expect(1)
        .mount(&server)
        .await;

    let app = context(&server, Some(("a", "r")));
    let list = app.company_list();
    list.set_page(2).await;
    list.set_page(2).await;
    assert_eq!(list.page(), 2);
    assert_eq!(list.total_pages(), 2);
}
