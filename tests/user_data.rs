mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{raw_request, request, signup_and_login};

#[tokio::test]
async fn test_duplicate_favorite_conflict() -> Result<()> {
    let app = common::test_app().await?;
    let token = signup_and_login(&app, "alice").await?;

    let body = json!({
        "movieId": 550,
        "title": "Fight Club",
        "poster_path": "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg",
    });
    let (status, created) = request(
        &app,
        "POST",
        "/api/favorites",
        Some(token.as_str()),
        Some(body.clone()),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["movieId"], 550);
    assert_eq!(created["title"], "Fight Club");
    assert!(created["id"].as_str().is_some());
    assert!(created["userId"].as_str().is_some());

    let (status, err) = request(&app, "POST", "/api/favorites", Some(token.as_str()), Some(body)).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["message"], "Movie already in favorites");

    // exactly one stored row after both calls
    let (status, list) = request(&app, "GET", "/api/favorites", Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_favorite_lifecycle_releases_index() -> Result<()> {
    let app = common::test_app().await?;
    let token = signup_and_login(&app, "bert").await?;
    let body = json!({ "movieId": 550, "title": "Fight Club" });

    let (status, created) = request(
        &app,
        "POST",
        "/api/favorites",
        Some(token.as_str()),
        Some(body.clone()),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = request(
        &app,
        "POST",
        "/api/favorites",
        Some(token.as_str()),
        Some(body.clone()),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let id = created["id"].as_str().unwrap();
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/favorites/{}", id),
        Some(token.as_str()),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // the unique pair is free again
    let (status, _) = request(&app, "POST", "/api/favorites", Some(token.as_str()), Some(body)).await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn test_delete_not_owned_reports_not_found() -> Result<()> {
    let app = common::test_app().await?;
    let alice = signup_and_login(&app, "alice").await?;
    let bob = signup_and_login(&app, "bob").await?;

    let (_, created) = request(
        &app,
        "POST",
        "/api/favorites",
        Some(alice.as_str()),
        Some(json!({ "movieId": 603, "title": "The Matrix" })),
    )
    .await?;
    let id = created["id"].as_str().unwrap();

    // bob knows the id but does not own the row
    let (status, err) = request(
        &app,
        "DELETE",
        &format!("/api/favorites/{}", id),
        Some(bob.as_str()),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["message"], "Favorite not found");

    let (_, list) = request(&app, "GET", "/api/favorites", Some(alice.as_str()), None).await?;
    assert_eq!(list.as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_lists_are_owner_scoped() -> Result<()> {
    let app = common::test_app().await?;
    let alice = signup_and_login(&app, "alice").await?;
    let bob = signup_and_login(&app, "bob").await?;

    for (token, movie_id) in [(&alice, 550), (&bob, 550), (&bob, 603), (&alice, 27205)] {
        let (status, _) = request(
            &app,
            "POST",
            "/api/favorites",
            Some(token.as_str()),
            Some(json!({ "movieId": movie_id, "title": "whatever" })),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, alice_list) = request(&app, "GET", "/api/favorites", Some(alice.as_str()), None).await?;
    let alice_ids: Vec<i64> = alice_list
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["movieId"].as_i64().unwrap())
        .collect();
    assert_eq!(alice_ids, vec![550, 27205]);

    let (_, bob_list) = request(&app, "GET", "/api/favorites", Some(bob.as_str()), None).await?;
    assert_eq!(bob_list.as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_duplicate_creates() -> Result<()> {
    let app = common::test_app().await?;
    let token = signup_and_login(&app, "racer").await?;
    let body = json!({ "movieId": 11, "title": "Star Wars" });

    let (first, second) = tokio::join!(
        request(
            &app,
            "POST",
            "/api/favorites",
            Some(token.as_str()),
            Some(body.clone())
        ),
        request(
            &app,
            "POST",
            "/api/favorites",
            Some(token.as_str()),
            Some(body.clone())
        ),
    );
    let statuses = [first?.0, second?.0];
    assert!(statuses.contains(&StatusCode::CREATED));
    assert!(statuses.contains(&StatusCode::CONFLICT));

    let (_, list) = request(&app, "GET", "/api/favorites", Some(token.as_str()), None).await?;
    assert_eq!(list.as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_create_without_movie_id_rejected() -> Result<()> {
    let app = common::test_app().await?;
    let token = signup_and_login(&app, "carol").await?;

    for path in ["/api/favorites", "/api/watchlist"] {
        let (status, err) = request(
            &app,
            "POST",
            path,
            Some(token.as_str()),
            Some(json!({ "title": "No id" })),
        )
        .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["message"], "movieId is required");
    }
    Ok(())
}

#[tokio::test]
async fn test_watchlist_duplicate_and_zero_row_delete() -> Result<()> {
    let app = common::test_app().await?;
    let token = signup_and_login(&app, "dave").await?;
    let body = json!({ "movieId": 27205, "title": "Inception" });

    let (status, created) = request(
        &app,
        "POST",
        "/api/watchlist",
        Some(token.as_str()),
        Some(body.clone()),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, err) = request(&app, "POST", "/api/watchlist", Some(token.as_str()), Some(body)).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["message"], "Movie already in watchlist");

    let id = created["id"].as_str().unwrap().to_string();
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/watchlist/{}", id),
        Some(token.as_str()),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // deleting again matches zero rows, same policy as the other resources
    let (status, err) = request(
        &app,
        "DELETE",
        &format!("/api/watchlist/{}", id),
        Some(token.as_str()),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["message"], "Watchlist item not found");
    Ok(())
}

#[tokio::test]
async fn test_review_validation() -> Result<()> {
    let app = common::test_app().await?;
    let token = signup_and_login(&app, "erin").await?;

    let cases = [
        (json!({ "content": "Fine", "rating": 3 }), "movieId is required"),
        (json!({ "movieId": 550, "rating": 3 }), "content is required"),
        (json!({ "movieId": 550, "content": "   " }), "content is required"),
        (json!({ "movieId": 550, "content": "Fine" }), "rating is required"),
        (
            json!({ "movieId": 550, "content": "Fine", "rating": 6 }),
            "rating must be between 0 and 5",
        ),
        (
            json!({ "movieId": 550, "content": "Fine", "rating": -1 }),
            "rating must be between 0 and 5",
        ),
    ];
    for (body, expected) in cases {
        let (status, err) = request(&app, "POST", "/api/reviews", Some(token.as_str()), Some(body)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["message"], expected);
    }

    // nothing was stored along the way
    let (_, list) = request(&app, "GET", "/api/reviews", Some(token.as_str()), None).await?;
    assert!(list.as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_one_review_per_movie() -> Result<()> {
    let app = common::test_app().await?;
    let token = signup_and_login(&app, "frank").await?;
    let body = json!({ "movieId": 550, "content": "Still holds up", "rating": 5 });

    let (status, _) = request(
        &app,
        "POST",
        "/api/reviews",
        Some(token.as_str()),
        Some(body.clone()),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, err) = request(&app, "POST", "/api/reviews", Some(token.as_str()), Some(body)).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["message"], "You have already reviewed this movie");
    Ok(())
}

#[tokio::test]
async fn test_movie_reviews_cross_user_with_username() -> Result<()> {
    let app = common::test_app().await?;
    let anna = signup_and_login(&app, "anna").await?;
    let ben = signup_and_login(&app, "ben").await?;

    let (status, _) = request(
        &app,
        "POST",
        "/api/reviews",
        Some(anna.as_str()),
        Some(json!({ "movieId": 27205, "content": "Great film", "rating": 5 })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    // ben sees anna's review, with her name attached
    let (status, reviews) = request(&app, "GET", "/api/reviews/movie/27205", Some(ben.as_str()), None).await?;
    assert_eq!(status, StatusCode::OK);
    let reviews = reviews.as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["username"], "anna");
    assert_eq!(reviews[0]["content"], "Great film");
    assert_eq!(reviews[0]["rating"], 5);

    // but his own reviews listing stays owner-scoped
    let (_, own) = request(&app, "GET", "/api/reviews", Some(ben.as_str()), None).await?;
    assert!(own.as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_review_delete_owner_scoped() -> Result<()> {
    let app = common::test_app().await?;
    let anna = signup_and_login(&app, "anna").await?;
    let ben = signup_and_login(&app, "ben").await?;

    let (_, created) = request(
        &app,
        "POST",
        "/api/reviews",
        Some(anna.as_str()),
        Some(json!({ "movieId": 603, "content": "Blue pill", "rating": 4 })),
    )
    .await?;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, err) = request(
        &app,
        "DELETE",
        &format!("/api/reviews/{}", id),
        Some(ben.as_str()),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["message"], "Review not found");

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/reviews/{}", id),
        Some(anna.as_str()),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/reviews/{}", id),
        Some(anna.as_str()),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_auth_rejection_messages() -> Result<()> {
    let app = common::test_app().await?;

    let (status, err) = raw_request(&app, "GET", "/api/favorites", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["message"], "No authorization header");

    let (status, err) = raw_request(&app, "GET", "/api/favorites", Some("Bearer"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["message"], "Bearer token not found");

    let (status, err) =
        raw_request(&app, "GET", "/api/favorites", Some("Bearer not-a-jwt"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(err["message"]
        .as_str()
        .unwrap()
        .starts_with("Verification Failed:"));

    // well-signed token for an account that does not exist
    let ghost = filmshelf_rs::api::auth::create_token("ghost", common::SECRET, 1)?;
    let (status, err) = request(&app, "GET", "/api/favorites", Some(ghost.as_str()), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["message"], "User not found");
    Ok(())
}

#[tokio::test]
async fn test_path_and_body_parse_errors_are_json() -> Result<()> {
    let app = common::test_app().await?;
    let token = signup_and_login(&app, "nina").await?;

    // a route parameter that fails to parse never reaches a handler,
    // but the answer keeps the usual error shape
    let (status, err) = request(&app, "GET", "/api/movies/not-a-number", None, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["message"].as_str().unwrap().contains("not-a-number"));

    let (status, err) = request(
        &app,
        "GET",
        "/api/reviews/movie/latest",
        Some(token.as_str()),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["message"].as_str().is_some());

    // a body that is not JSON at all
    let (status, err) = common::request_with_body(
        &app,
        "POST",
        "/api/favorites",
        Some(token.as_str()),
        Some("application/json"),
        "{ not json",
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["message"].as_str().is_some());

    // valid JSON of the wrong shape
    let (status, err) = common::request_with_body(
        &app,
        "POST",
        "/api/favorites",
        Some(token.as_str()),
        Some("application/json"),
        r#"{ "movieId": "not-a-number" }"#,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["message"].as_str().is_some());

    // no content type on the request
    let (status, err) = common::request_with_body(
        &app,
        "POST",
        "/api/favorites",
        Some(token.as_str()),
        None,
        "{}",
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["message"].as_str().is_some());
    Ok(())
}

#[tokio::test]
async fn test_login_and_register_errors() -> Result<()> {
    let app = common::test_app().await?;
    common::register(&app, "grace", "password1").await?;

    let (status, err) = request(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "username": "grace", "password": "wrongpass9" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["message"], "Authentication failed. Wrong password.");

    let (status, err) = request(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "username": "nobody", "password": "password1" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["message"], "Authentication failed. User not found.");

    let (status, err) = request(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "username": "", "password": "" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Username and password are required.");

    // register-side validation
    let (status, _) = request(
        &app,
        "POST",
        "/api/users?action=register",
        None,
        Some(json!({ "username": "no spaces allowed", "password": "password1" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app,
        "POST",
        "/api/users?action=register",
        None,
        Some(json!({ "username": "harry", "password": "letters" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, err) = request(
        &app,
        "POST",
        "/api/users?action=register",
        None,
        Some(json!({ "username": "grace", "password": "password1" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["message"], "Username already exists.");
    Ok(())
}

#[tokio::test]
async fn test_cross_collection_rows_are_independent() -> Result<()> {
    let app = common::test_app().await?;
    let token = signup_and_login(&app, "iris").await?;

    // the same movie can live in all three collections at once
    let (status, _) = request(
        &app,
        "POST",
        "/api/favorites",
        Some(token.as_str()),
        Some(json!({ "movieId": 550, "title": "Fight Club" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = request(
        &app,
        "POST",
        "/api/watchlist",
        Some(token.as_str()),
        Some(json!({ "movieId": 550, "title": "Fight Club" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = request(
        &app,
        "POST",
        "/api/reviews",
        Some(token.as_str()),
        Some(json!({ "movieId": 550, "content": "Rewatched", "rating": 4 })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(())
}
