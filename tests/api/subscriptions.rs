use wiremock::{
    Mock, ResponseTemplate,
    matchers::{any, body_partial_json, method, path},
};

use crate::helpers::{IPHONE_UA, OPERATOR_EMAIL, spawn_app, spawn_app_with};

fn for_template(template_id: &str) -> wiremock::MockBuilder {
    Mock::given(path("/api/v1.0/email/send"))
        .and(method("POST"))
        .and(body_partial_json(
            serde_json::json!({ "template_id": template_id }),
        ))
}

#[tokio::test]
async fn subscribe_returns_200_for_a_valid_email() {
    let app = spawn_app().await;

    Mock::given(path("/api/v1.0/email/send"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(2)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_subscription("email=person%40example.com".into())
        .await;

    assert_eq!(200, response.status().as_u16());
    let state: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        state,
        serde_json::json!({ "is_loading": false, "error": null, "success": true })
    );
}

#[tokio::test]
async fn subscribe_notifies_the_operator_then_the_subscriber() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    app.post_subscription_from("email=person%40example.com".into(), IPHONE_UA)
        .await;

    let requests = app.relay_requests().await;
    assert_eq!(requests.len(), 2);

    let notification = &requests[0];
    assert_eq!(notification["user_id"], "pk_test");
    assert_eq!(notification["service_id"], "service_test");
    assert_eq!(notification["template_id"], "template_notify");
    let params = &notification["template_params"];
    assert_eq!(params["user_email"], "person@example.com");
    assert_eq!(params["user_name"], "Person");
    assert_eq!(params["user_device"], "Mobile");
    assert_eq!(params["user_agent"], IPHONE_UA);
    assert_eq!(params["to_email"], OPERATOR_EMAIL);

    let auto_response = &requests[1];
    assert_eq!(auto_response["template_id"], "template_reply");
    let params = &auto_response["template_params"];
    assert_eq!(params["user_name"], "Person");
    assert_eq!(params["to_email"], "person@example.com");
    assert_eq!(params["recipient_email"], "person@example.com");
    assert_eq!(params["user_email"], "person@example.com");
}

#[tokio::test]
async fn subscribe_without_a_user_agent_reports_an_unknown_desktop() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    app.post_subscription("email=person%40example.com".into())
        .await;

    let requests = app.relay_requests().await;
    let params = &requests[0]["template_params"];
    assert_eq!(params["user_agent"], "Unknown");
    assert_eq!(params["user_device"], "Desktop");
}

#[tokio::test]
async fn subscribe_trims_the_submitted_email() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_subscription("email=%20%20person%40example.com%20".into())
        .await;

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn subscribe_returns_400_for_invalid_emails_without_calling_the_relay() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let test_cases = vec![
        ("email=", "empty email"),
        ("email=person.example.com", "missing the @"),
        ("email=person%40example", "missing a dot in the domain"),
        ("email=per%20son%40example.com", "whitespace inside"),
    ];

    for (body, description) in test_cases {
        let response = app.post_subscription(body.into()).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 Bad Request when the payload was {}.",
            description
        );
        let state: serde_json::Value = response.json().await.unwrap();
        assert_eq!(state["error"], "Invalid email address provided.");
        assert_eq!(state["success"], false);
    }
}

#[tokio::test]
async fn subscribe_returns_400_when_the_email_field_is_missing() {
    let app = spawn_app().await;

    let response = app.post_subscription("name=ursula".into()).await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn subscribe_returns_503_when_the_relay_is_not_configured() {
    let app = spawn_app_with(|config| config.delivery.service_id = "".into()).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_subscription("email=person%40example.com".into())
        .await;

    assert_eq!(503, response.status().as_u16());
    let state: serde_json::Value = response.json().await.unwrap();
    assert_eq!(state["error"], "Email service not configured properly");
}

#[tokio::test]
async fn subscribe_returns_502_and_skips_the_auto_response_when_quota_is_exceeded() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(402).set_body_string("Payment Required"))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_subscription("email=person%40example.com".into())
        .await;

    assert_eq!(502, response.status().as_u16());
    let state: serde_json::Value = response.json().await.unwrap();
    assert_eq!(state["error"], "Email service quota exceeded.");
    assert_eq!(state["success"], false);
    assert_eq!(state["is_loading"], false);
}

#[tokio::test]
async fn subscribe_succeeds_with_a_warning_when_only_the_auto_response_fails() {
    let app = spawn_app().await;

    for_template("template_notify")
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;
    for_template("template_reply")
        .respond_with(ResponseTemplate::new(422).set_body_string("The recipients address is empty"))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_subscription("email=person%40example.com".into())
        .await;

    assert_eq!(200, response.status().as_u16());
    let state: serde_json::Value = response.json().await.unwrap();
    assert_eq!(state["success"], true);
    let error = state["error"].as_str().unwrap();
    assert!(error.contains("'To' field"));
    assert!(error.contains("template_reply"));
}
