use serde_json::json;

use crate::common::{PASSWORD, TestApp, routes};

#[tokio::test]
async fn register_login_and_me_flow() {
    let app = TestApp::spawn().await;

    let token = app
        .create_authenticated_user("Jonathan Maxwell Fitzgerald", "jon@example.com")
        .await;

    let me = app.get_with_token(routes::ME, &token).await;
    assert_eq!(me.status, 200);
    assert_eq!(me.body["name"], "Jonathan Maxwell Fitzgerald");
    assert_eq!(me.body["email"], "jon@example.com");
    assert_eq!(me.body["role"], "user");
}

#[tokio::test]
async fn email_is_stored_lowercased() {
    let app = TestApp::spawn().await;

    let reg = app
        .post_without_token(
            routes::REGISTER,
            &json!({
                "name": "Margaret Josephine Caulfield",
                "email": "  Margaret@Example.COM ",
                "password": PASSWORD,
            }),
        )
        .await;
    assert_eq!(reg.status, 201, "{}", reg.text);
    assert_eq!(reg.body["email"], "margaret@example.com");

    // Login works with the normalized address.
    let token = app.login("margaret@example.com", PASSWORD).await;
    let me = app.get_with_token(routes::ME, &token).await;
    assert_eq!(me.body["email"], "margaret@example.com");
}

#[tokio::test]
async fn register_enforces_field_rules() {
    let app = TestApp::spawn().await;

    // Name too short.
    let res = app
        .post_without_token(
            routes::REGISTER,
            &json!({
                "name": "Short Name",
                "email": "short@example.com",
                "password": PASSWORD,
            }),
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.error_code(), "VALIDATION_ERROR");

    // Password missing an uppercase letter.
    let res = app
        .post_without_token(
            routes::REGISTER,
            &json!({
                "name": "Margaret Josephine Caulfield",
                "email": "margaret@example.com",
                "password": "secret123!",
            }),
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.error_code(), "VALIDATION_ERROR");

    // Malformed email.
    let res = app
        .post_without_token(
            routes::REGISTER,
            &json!({
                "name": "Margaret Josephine Caulfield",
                "email": "not-an-email",
                "password": PASSWORD,
            }),
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::spawn().await;

    app.create_authenticated_user("Jonathan Maxwell Fitzgerald", "dupe@example.com")
        .await;

    let res = app
        .post_without_token(
            routes::REGISTER,
            &json!({
                "name": "Margaret Josephine Caulfield",
                "email": "Dupe@Example.com",
                "password": PASSWORD,
            }),
        )
        .await;
    assert_eq!(res.status, 409, "{}", res.text);
    assert_eq!(res.error_code(), "EMAIL_TAKEN");
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = TestApp::spawn().await;

    app.create_authenticated_user("Jonathan Maxwell Fitzgerald", "jon@example.com")
        .await;

    let res = app
        .post_without_token(
            routes::LOGIN,
            &json!({ "email": "jon@example.com", "password": "Wrong123!" }),
        )
        .await;
    assert_eq!(res.status, 401);
    assert_eq!(res.error_code(), "INVALID_CREDENTIALS");

    // Unknown account looks identical to a wrong password.
    let res = app
        .post_without_token(
            routes::LOGIN,
            &json!({ "email": "nobody@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(res.status, 401);
    assert_eq!(res.error_code(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::ME).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.error_code(), "TOKEN_MISSING");

    let res = app.get_with_token(routes::ME, "not-a-jwt").await;
    assert_eq!(res.status, 401);
    assert_eq!(res.error_code(), "TOKEN_INVALID");
}

#[tokio::test]
async fn password_update_flow() {
    let app = TestApp::spawn().await;

    let token = app
        .create_authenticated_user("Jonathan Maxwell Fitzgerald", "jon@example.com")
        .await;

    // Wrong current password is rejected.
    let res = app
        .put_with_token(
            routes::PASSWORD,
            &json!({ "current_password": "Wrong123!", "new_password": "Changed456#" }),
            &token,
        )
        .await;
    assert_eq!(res.status, 401);

    let res = app
        .put_with_token(
            routes::PASSWORD,
            &json!({ "current_password": PASSWORD, "new_password": "Changed456#" }),
            &token,
        )
        .await;
    assert_eq!(res.status, 204, "{}", res.text);

    // The old password no longer works; the new one does.
    let res = app
        .post_without_token(
            routes::LOGIN,
            &json!({ "email": "jon@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(res.status, 401);

    app.login("jon@example.com", "Changed456#").await;
}
