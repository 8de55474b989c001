use serde_json::json;

use crate::common::{TestApp, routes};

fn average(res: &crate::common::TestResponse) -> f64 {
    res.body["average_rating"]
        .as_f64()
        .expect("response should carry average_rating")
}

fn total(res: &crate::common::TestResponse) -> i64 {
    res.body["total_ratings"]
        .as_i64()
        .expect("response should carry total_ratings")
}

#[tokio::test]
async fn aggregate_tracks_every_mutation() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let store_id = app
        .create_store(&admin, "Fresh Market Grocery", "fresh@example.com", None)
        .await;

    let alice = app
        .create_authenticated_user("Alice Pemberton Worthington", "alice@example.com")
        .await;
    let bob = app
        .create_authenticated_user("Robert Calloway Fitzwilliam", "bob@example.com")
        .await;

    // First rating.
    let res = app.submit_rating(&alice, store_id, 5).await;
    assert_eq!(average(&res), 5.0);
    assert_eq!(total(&res), 1);

    // Second rater.
    let res = app.submit_rating(&bob, store_id, 3).await;
    assert_eq!(average(&res), 4.0);
    assert_eq!(total(&res), 2);

    // Re-rating replaces in place: the count does not grow.
    let res = app.submit_rating(&alice, store_id, 1).await;
    assert_eq!(average(&res), 2.0);
    assert_eq!(total(&res), 2);

    // Deleting one rating.
    let res = app
        .delete_with_token(&routes::store_rating(store_id), &alice)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(average(&res), 3.0);
    assert_eq!(total(&res), 1);

    // Deleting the last rating resets the aggregate.
    let res = app
        .delete_with_token(&routes::store_rating(store_id), &bob)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(average(&res), 0.0);
    assert_eq!(total(&res), 0);

    // The committed store row agrees with the last response.
    let details = app.get_with_token(&routes::store(store_id), &bob).await;
    assert_eq!(details.status, 200);
    assert_eq!(details.body["average_rating"].as_f64().unwrap(), 0.0);
    assert_eq!(details.body["total_ratings"].as_i64().unwrap(), 0);
}

#[tokio::test]
async fn average_rounds_to_one_fractional_digit() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let store_id = app
        .create_store(&admin, "Corner Bakery and Cafe", "bakery@example.com", None)
        .await;

    let mut last = None;
    for (i, value) in [5, 4, 4].into_iter().enumerate() {
        let name = format!("Integration Rater Number {:02}", i);
        let email = format!("rater{i}@example.com");
        let token = app.create_authenticated_user(&name, &email).await;
        last = Some(app.submit_rating(&token, store_id, value).await);
    }

    // 13 / 3 = 4.333... -> 4.3
    let res = last.unwrap();
    assert_eq!(average(&res), 4.3);
    assert_eq!(total(&res), 3);
}

#[tokio::test]
async fn out_of_range_values_never_touch_the_store() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let store_id = app
        .create_store(&admin, "Fresh Market Grocery", "fresh@example.com", None)
        .await;
    let token = app
        .create_authenticated_user("Alice Pemberton Worthington", "alice@example.com")
        .await;

    for value in [0, 6, -3] {
        let res = app
            .post_with_token(
                routes::RATINGS,
                &json!({ "store_id": store_id, "value": value }),
                &token,
            )
            .await;
        assert_eq!(res.status, 400, "value {value}: {}", res.text);
        assert_eq!(res.error_code(), "VALIDATION_ERROR");
    }

    let details = app.get_with_token(&routes::store(store_id), &token).await;
    assert_eq!(details.body["total_ratings"].as_i64().unwrap(), 0);
}

#[tokio::test]
async fn rating_a_missing_store_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app
        .create_authenticated_user("Alice Pemberton Worthington", "alice@example.com")
        .await;

    let res = app
        .post_with_token(
            routes::RATINGS,
            &json!({ "store_id": 999_999, "value": 4 }),
            &token,
        )
        .await;
    assert_eq!(res.status, 404);
    assert_eq!(res.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn deleting_a_rating_that_does_not_exist_is_not_found() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let store_id = app
        .create_store(&admin, "Fresh Market Grocery", "fresh@example.com", None)
        .await;

    let alice = app
        .create_authenticated_user("Alice Pemberton Worthington", "alice@example.com")
        .await;
    let bob = app
        .create_authenticated_user("Robert Calloway Fitzwilliam", "bob@example.com")
        .await;
    app.submit_rating(&bob, store_id, 4).await;

    let res = app
        .delete_with_token(&routes::store_rating(store_id), &alice)
        .await;
    assert_eq!(res.status, 404);
    assert_eq!(res.error_code(), "NOT_FOUND");

    // Bob's rating and the aggregate are untouched.
    let details = app.get_with_token(&routes::store(store_id), &bob).await;
    assert_eq!(details.body["average_rating"].as_f64().unwrap(), 4.0);
    assert_eq!(details.body["total_ratings"].as_i64().unwrap(), 1);
}

#[tokio::test]
async fn my_rating_reflects_the_callers_submission() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let store_id = app
        .create_store(&admin, "Fresh Market Grocery", "fresh@example.com", None)
        .await;
    let token = app
        .create_authenticated_user("Alice Pemberton Worthington", "alice@example.com")
        .await;

    let res = app.get_with_token(&routes::my_rating(store_id), &token).await;
    assert_eq!(res.status, 200);
    assert!(res.body["value"].is_null());

    app.submit_rating(&token, store_id, 4).await;

    let res = app.get_with_token(&routes::my_rating(store_id), &token).await;
    assert_eq!(res.body["value"].as_i64(), Some(4));
    assert!(res.body["created_at"].is_string());
}

#[tokio::test]
async fn only_plain_users_may_rate() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let store_id = app
        .create_store(&admin, "Fresh Market Grocery", "fresh@example.com", None)
        .await;
    let owner = app
        .create_user_with_role(
            "Oswald Montgomery Bancroft",
            "owner@example.com",
            "store_owner",
        )
        .await;

    for token in [&admin, &owner] {
        let res = app
            .post_with_token(
                routes::RATINGS,
                &json!({ "store_id": store_id, "value": 4 }),
                token,
            )
            .await;
        assert_eq!(res.status, 403, "{}", res.text);
        assert_eq!(res.error_code(), "PERMISSION_DENIED");
    }
}

#[tokio::test]
async fn concurrent_raters_are_all_counted() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let store_id = app
        .create_store(&admin, "Fresh Market Grocery", "fresh@example.com", None)
        .await;

    let mut tokens = Vec::new();
    for i in 0..8 {
        let name = format!("Concurrent Rater Number {:02}", i);
        let email = format!("concurrent{i}@example.com");
        tokens.push(app.create_authenticated_user(&name, &email).await);
    }

    let mut handles = Vec::new();
    for (i, token) in tokens.iter().cloned().enumerate() {
        let client = app.client.clone();
        let url = format!("http://{}{}", app.addr, routes::RATINGS);
        let value = (i % 5 + 1) as i64;
        handles.push(tokio::spawn(async move {
            let res = client
                .post(url)
                .header("Authorization", format!("Bearer {token}"))
                .json(&json!({ "store_id": store_id, "value": value }))
                .send()
                .await
                .expect("request failed");
            assert_eq!(res.status().as_u16(), 200);
        }));
    }
    for handle in handles {
        handle.await.expect("task panicked");
    }

    // Sum of (i % 5) + 1 for i in 0..8 is 21; 21 / 8 = 2.625 -> 2.6.
    let details = app
        .get_with_token(&routes::store(store_id), &tokens[0])
        .await;
    assert_eq!(details.body["total_ratings"].as_i64().unwrap(), 8);
    assert_eq!(details.body["average_rating"].as_f64().unwrap(), 2.6);
}

#[tokio::test]
async fn concurrent_resubmissions_stay_one_row() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let store_id = app
        .create_store(&admin, "Fresh Market Grocery", "fresh@example.com", None)
        .await;
    let token = app
        .create_authenticated_user("Alice Pemberton Worthington", "alice@example.com")
        .await;

    let mut handles = Vec::new();
    for value in 1..=5 {
        let client = app.client.clone();
        let url = format!("http://{}{}", app.addr, routes::RATINGS);
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            let res = client
                .post(url)
                .header("Authorization", format!("Bearer {token}"))
                .json(&json!({ "store_id": store_id, "value": value }))
                .send()
                .await
                .expect("request failed");
            assert_eq!(res.status().as_u16(), 200);
        }));
    }
    for handle in handles {
        handle.await.expect("task panicked");
    }

    // Whatever order the five submissions landed in, there is exactly one
    // rating and the aggregate equals it.
    let details = app.get_with_token(&routes::store(store_id), &token).await;
    assert_eq!(details.body["total_ratings"].as_i64().unwrap(), 1);

    let mine = app.get_with_token(&routes::my_rating(store_id), &token).await;
    let value = mine.body["value"].as_i64().unwrap();
    assert!((1..=5).contains(&value));
    assert_eq!(
        details.body["average_rating"].as_f64().unwrap(),
        value as f64
    );
}
