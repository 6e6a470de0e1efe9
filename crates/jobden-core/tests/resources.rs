//! Resource wrappers: paths, query strings and the 404-as-false checks.

use std::sync::Arc;

use jobden_core::auth::{MemorySessionStore, Session};
use jobden_core::models::{ApplicationStatus, EmployerJobFilters, NotificationFilters, UserSummary};
use jobden_core::{ApiClient, ApiError};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn signed_in(server: &MockServer, is_employer: bool) -> ApiClient {
    let user = UserSummary {
        id: 7,
        email: "sam@acme.io".to_string(),
        is_employer,
        is_active: true,
    };
    let store = Arc::new(MemorySessionStore::with_session(Session::authenticated(
        user,
        "acc-1".to_string(),
        "ref-1".to_string(),
    )));
    ApiClient::new(format!("{}/api/v1/", server.uri()), store).expect("Failed to build client")
}

fn job_json(id: i64, is_active: bool) -> Value {
    json!({
        "id": id, "title": "Platform Engineer", "description": "<p>Run the platform</p>",
        "location": "Remote", "salary": 95000.0, "job_type": "full_time", "requirements": null,
        "is_active": is_active, "created_at": "2024-03-01T09:00:00", "employer_id": 7
    })
}

fn application_json(id: i64, status: &str) -> Value {
    json!({
        "id": id, "user_id": 7, "job_id": 3, "cover_letter": null, "status": status,
        "applied_at": "2024-03-02T10:00:00", "updated_at": "2024-03-03T10:00:00"
    })
}

fn notification_json(id: i64, is_read: bool) -> Value {
    json!({
        "id": id, "user_id": 7, "title": "New applicant", "message": "Someone applied",
        "type": "application", "is_read": is_read,
        "created_at": "2024-03-02T10:00:00", "updated_at": "2024-03-02T10:00:00"
    })
}

#[tokio::test]
async fn check_endpoints_treat_404_as_false() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/bookmarks/check/3"))
        .and(header("authorization", "Bearer acc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"is_bookmarked": true})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/bookmarks/check/4"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Bookmark not found"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/applications/check/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"is_applied": true})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/applications/check/4"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found"})))
        .mount(&server)
        .await;

    let client = signed_in(&server, false);

    assert!(client.is_bookmarked(3).await.expect("bookmark check"));
    assert!(!client.is_bookmarked(4).await.expect("missing bookmark"));
    assert!(client.has_applied(3).await.expect("application check"));
    assert!(!client.has_applied(4).await.expect("missing application"));
}

#[tokio::test]
async fn check_endpoints_still_surface_other_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/bookmarks/check/5"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = signed_in(&server, false);
    let result = client.is_bookmarked(5).await;
    assert!(result.is_err(), "a server error is not a 'no': {:?}", result);
}

#[tokio::test]
async fn withdrawn_status_is_rejected_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/employer/applications/11/status"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = signed_in(&server, true);
    let result = client.set_application_status(11, ApplicationStatus::Withdrawn).await;
    assert!(matches!(result, Err(ApiError::InvalidRequest(_))), "got {:?}", result);
}

#[tokio::test]
async fn status_update_goes_in_the_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/employer/applications/11/status"))
        .and(query_param("status", "accepted"))
        .and(header("authorization", "Bearer acc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Status updated", "application_id": 11, "new_status": "accepted"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in(&server, true);
    let update = client
        .set_application_status(11, ApplicationStatus::Accepted)
        .await
        .expect("status update");
    assert_eq!(update.application_id, 11);
    assert_eq!(update.new_status, "accepted");
}

#[tokio::test]
async fn employer_jobs_and_applicants_pass_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/employer/jobs"))
        .and(query_param("active_only", "true"))
        .and(query_param_is_missing("skip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([job_json(1, true)])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/employer/jobs/1/applicants"))
        .and(query_param("skip", "20"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_id": 1, "total_applicants": 21,
            "applicants": [{
                "application_id": 9, "applied_at": "2024-03-02T10:00:00", "cover_letter": null,
                "status": "pending",
                "applicant": {"user_id": 5, "email": "ada@example.com", "full_name": "Ada"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in(&server, true);

    let filters = EmployerJobFilters {
        active_only: Some(true),
        ..Default::default()
    };
    let jobs = client.list_my_jobs(&filters).await.expect("employer jobs");
    assert_eq!(jobs.len(), 1);
    assert!(jobs[0].is_active);

    let page = client.list_applicants(1, 20, 10).await.expect("applicants");
    assert_eq!(page.total_applicants, 21);
    assert_eq!(page.applicants[0].applicant.email, "ada@example.com");
}

#[tokio::test]
async fn notifications_use_trailing_slash_and_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/notifications/"))
        .and(query_param("unread_only", "true"))
        .and(query_param("limit", "5"))
        .and(query_param_is_missing("skip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([notification_json(1, false)])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/notifications/unread-count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unread_count": 3})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/notifications/1/read"))
        .respond_with(ResponseTemplate::new(200).set_body_json(notification_json(1, true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/notifications/mark-all-read"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Marked 2 notifications as read", "count": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in(&server, false);

    let filters = NotificationFilters {
        skip: Some(0),
        limit: Some(5),
        unread_only: true,
    };
    let unread = client.list_notifications(&filters).await.expect("notifications");
    assert_eq!(unread.len(), 1);
    assert!(!unread[0].is_read);

    assert_eq!(client.unread_count().await.expect("unread count"), 3);
    assert!(client.mark_notification_read(1).await.expect("mark read").is_read);
    assert_eq!(client.mark_all_notifications_read().await.expect("mark all").count, 2);
}

#[tokio::test]
async fn bookmarks_and_applications_round_trip_paths() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/bookmarks"))
        .and(body_json(json!({"job_id": 3})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1, "user_id": 7, "job_id": 3, "created_at": "2024-03-02T10:00:00", "job": job_json(3, true)
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/bookmarks/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/applications"))
        .and(query_param("status", "pending"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([application_json(12, "pending")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/applications/12/withdraw"))
        .respond_with(ResponseTemplate::new(200).set_body_json(application_json(12, "withdrawn")))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in(&server, false);

    let bookmark = client.add_bookmark(3).await.expect("add bookmark");
    assert_eq!(bookmark.job.id, 3);
    client.remove_bookmark(3).await.expect("remove bookmark");

    let apps = client
        .list_applications(Some(ApplicationStatus::Pending), 0, 20)
        .await
        .expect("applications");
    assert_eq!(apps[0].status, ApplicationStatus::Pending);

    let withdrawn = client.withdraw_application(12).await.expect("withdraw");
    assert_eq!(withdrawn.status, ApplicationStatus::Withdrawn);
}
