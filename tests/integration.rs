mod common;

use serde_json::json;
use spin_sdk::http::Method;

use common::{app, app_with, call, create_post, fake_advisor, get, post, register};

#[tokio::test]
async fn test_full_user_flow() {
    let app = app();

    // 1. Register and log in
    let (user_id, token) = register(&app, "ada").await;

    // 2. Profile
    let (status, profile) = get(&app, "/profile", Some(&token)).await;
    assert_eq!(status, 200);
    assert_eq!(profile["user"]["username"], "ada");
    assert!(profile["user"].get("password").is_none(), "password leaked: {:?}", profile);

    // 3. Empty feed
    let (status, feed) = get(&app, "/feed", Some(&token)).await;
    assert_eq!(status, 200);
    assert_eq!(feed["feed"]["state"], "empty");
    assert_eq!(feed["feed"]["message"], "No posts yet");

    // 4. Create post
    let post_id = create_post(&app, &token, "Sunset over the lake").await;

    // 5. Edit post
    let (status, edited) = call(
        &app,
        Method::Put,
        &format!("/posts/{}", post_id),
        Some(&token),
        Some(json!({ "caption": "Sunrise over the lake" })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(edited["post"]["caption"], "Sunrise over the lake");
    assert_eq!(edited["post"]["userId"], user_id);

    // 6. Feed shows it
    let (_, feed) = get(&app, "/feed", Some(&token)).await;
    assert_eq!(feed["feed"]["state"], "items");
    let item = &feed["feed"]["items"][0];
    assert_eq!(item["caption"], "Sunrise over the lake");
    assert_eq!(item["isOwn"], true);
    assert_eq!(item["likesLabel"], "No likes yet");
    assert_eq!(item["timeAgo"], "just now");

    // 7. Delete post
    let (status, _) = call(&app, Method::Delete, &format!("/posts/{}", post_id), Some(&token), None).await;
    assert_eq!(status, 200);
    let (_, posts) = get(&app, "/posts", None).await;
    assert_eq!(posts["posts"], json!([]));

    // 8. Logout revokes the token
    let (status, _) = post(&app, "/logout", Some(&token), json!({})).await;
    assert_eq!(status, 200);
    let (status, _) = get(&app, "/profile", Some(&token)).await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn test_sign_up_validation() {
    let app = app();

    let cases = [
        (json!({ "email": "bad", "username": "ada", "password": "secret1" }), "Invalid email format"),
        (json!({ "email": "a@b.io", "username": "ad", "password": "secret1" }), "Username must be at least 3 characters"),
        (json!({ "email": "a@b.io", "username": "ada", "password": "" }), "Password is required"),
        (json!({ "email": "a@b.io", "username": "ada", "password": "short" }), "Password must be at least 6 characters"),
        (
            json!({ "email": "a@b.io", "username": "ada", "password": "secret1", "confirmPassword": "secret2" }),
            "Passwords do not match",
        ),
    ];
    for (body, message) in cases {
        let (status, resp) = post(&app, "/users", None, body).await;
        assert_eq!(status, 400);
        assert_eq!(resp["success"], false);
        assert_eq!(resp["message"], message);
    }
}

#[tokio::test]
async fn test_duplicate_accounts_conflict() {
    let app = app();
    register(&app, "ada").await;

    let (status, resp) = post(
        &app,
        "/users",
        None,
        json!({ "email": "ada@example.com", "username": "other", "password": "secret1" }),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(resp["message"], "Email already in use");

    let (status, resp) = post(
        &app,
        "/users",
        None,
        json!({ "email": "new@example.com", "username": "ada", "password": "secret1" }),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(resp["message"], "Username already taken");
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let app = app();
    register(&app, "ada").await;

    let (status, resp) = post(&app, "/login", None, json!({ "email": "ada@example.com", "password": "wrong!" })).await;
    assert_eq!(status, 401);
    assert_eq!(resp["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_create_post_requires_auth() {
    let app = app();

    let (status, _) = post(&app, "/posts", None, json!({ "image": "x", "caption": "hi" })).await;
    assert_eq!(status, 401);
    let (status, _) = post(&app, "/posts", Some("not-a-token"), json!({ "image": "x", "caption": "hi" })).await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn test_post_content_validation() {
    let app = app();
    let (_, token) = register(&app, "ada").await;

    let (status, resp) = post(&app, "/posts", Some(&token), json!({ "image": "", "caption": "hi" })).await;
    assert_eq!(status, 400);
    assert_eq!(resp["message"], "Please upload an image");

    let (status, resp) = post(&app, "/posts", Some(&token), json!({ "image": "x", "caption": "   " })).await;
    assert_eq!(status, 400);
    assert_eq!(resp["message"], "Please add a caption");

    let (status, resp) = post(&app, "/posts", Some(&token), json!({ "image": "x", "caption": "a".repeat(2201) })).await;
    assert_eq!(status, 400);
    assert_eq!(resp["message"], "Caption is too long");

    // Markup alone leaves nothing to show
    let (status, resp) = post(
        &app,
        "/posts",
        Some(&token),
        json!({ "image": "x", "caption": "<script>x</script>" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(resp["message"], "Please add a caption");
    let (_, listing) = get(&app, "/posts", None).await;
    assert!(listing["posts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_post_image_size_limit() {
    let app = app();
    let (_, token) = register(&app, "ada").await;

    // 4.5 MB decoded
    let image = format!("data:image/png;base64,{}", "A".repeat(6_000_000));
    let (status, resp) = post(&app, "/posts", Some(&token), json!({ "image": image, "caption": "big" })).await;
    assert_eq!(status, 201);
    let post_id = resp["post"]["id"].as_str().unwrap().to_string();

    // 5.5 MB decoded
    let image = format!("data:image/png;base64,{}", "A".repeat(7_689_560));
    let (status, resp) = post(&app, "/posts", Some(&token), json!({ "image": image.clone(), "caption": "bigger" })).await;
    assert_eq!(status, 400);
    assert_eq!(resp["message"], "Image size must be less than 5MB");

    let (status, resp) = call(
        &app,
        Method::Put,
        &format!("/posts/{}", post_id),
        Some(&token),
        Some(json!({ "image": image })),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(resp["message"], "Image size must be less than 5MB");
}

#[tokio::test]
async fn test_text_is_stored_as_typed() {
    let app = app();
    let (_, ada) = register(&app, "ada").await;
    let (_, bob) = register(&app, "bob").await;

    let (status, resp) = post(
        &app,
        "/posts",
        Some(&ada),
        json!({ "image": "data:image/png;base64,AAAA", "caption": "x < y & \"z\"" }),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(resp["post"]["caption"], "x < y & \"z\"");
    let post_id = resp["post"]["id"].as_str().unwrap().to_string();
    let comments_uri = format!("/posts/{}/comments", post_id);

    let (status, resp) = post(&app, &comments_uri, Some(&bob), json!({ "text": "x < y & \"z\"" })).await;
    assert_eq!(status, 201);
    assert_eq!(resp["comment"]["text"], "x < y & \"z\"");
    let comment_id = resp["comment"]["id"].as_str().unwrap().to_string();

    let (_, thread) = get(&app, &comments_uri, Some(&ada)).await;
    assert_eq!(thread["comments"]["items"][0]["text"], "x < y & \"z\"");

    // Markup-only comments and replies are rejected
    let (status, resp) = post(&app, &comments_uri, Some(&bob), json!({ "text": "<b></b>" })).await;
    assert_eq!(status, 400);
    assert_eq!(resp["message"], "Comment is required");

    let replies_uri = format!("{}/{}/replies", comments_uri, comment_id);
    let (status, resp) = post(&app, &replies_uri, Some(&ada), json!({ "text": "<b></b>" })).await;
    assert_eq!(status, 400);
    assert_eq!(resp["message"], "Comment is required");

    let (_, thread) = get(&app, &comments_uri, Some(&ada)).await;
    assert_eq!(thread["comments"]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_only_owner_can_change_post() {
    let app = app();
    let (_, ada) = register(&app, "ada").await;
    let (_, bob) = register(&app, "bob").await;
    let post_id = create_post(&app, &ada, "Mine").await;

    let (status, resp) = call(
        &app,
        Method::Put,
        &format!("/posts/{}", post_id),
        Some(&bob),
        Some(json!({ "caption": "Yours now" })),
    )
    .await;
    assert_eq!(status, 403);
    assert_eq!(resp["message"], "Not authorized to update this post");

    let (status, resp) = call(&app, Method::Delete, &format!("/posts/{}", post_id), Some(&bob), None).await;
    assert_eq!(status, 403);
    assert_eq!(resp["message"], "Not authorized to delete this post");
}

#[tokio::test]
async fn test_like_toggles() {
    let app = app();
    let (_, ada) = register(&app, "ada").await;
    let (bob_id, bob) = register(&app, "bob").await;
    let post_id = create_post(&app, &ada, "Like me").await;
    let uri = format!("/posts/{}/like", post_id);

    let (_, resp) = post(&app, &uri, Some(&bob), json!({})).await;
    assert_eq!(resp["liked"], true);
    assert_eq!(resp["post"]["likes"], json!([bob_id]));

    let (_, feed) = get(&app, "/feed", Some(&ada)).await;
    assert_eq!(feed["feed"]["items"][0]["likesLabel"], "1 like");

    let (_, resp) = post(&app, &uri, Some(&bob), json!({})).await;
    assert_eq!(resp["liked"], false);
    assert_eq!(resp["post"]["likes"], json!([]));
}

#[tokio::test]
async fn test_comment_thread_and_notifications() {
    let app = app();
    let (ada_id, ada) = register(&app, "ada").await;
    let (bob_id, bob) = register(&app, "bob").await;
    let post_id = create_post(&app, &ada, "Thoughts?").await;
    let comments_uri = format!("/posts/{}/comments", post_id);

    // Bob comments; Ada is notified with a preview
    let (status, resp) = post(
        &app,
        &comments_uri,
        Some(&bob),
        json!({ "text": "This is a rather long comment that goes on and on" }),
    )
    .await;
    assert_eq!(status, 201);
    let comment_id = resp["comment"]["id"].as_str().unwrap().to_string();

    let (_, notes) = get(&app, "/notifications", Some(&ada)).await;
    assert_eq!(notes["unread"], 1);
    assert_eq!(notes["badge"], "1");
    let note = &notes["notifications"]["items"][0];
    assert_eq!(note["type"], "comment");
    assert_eq!(note["from"]["username"], "bob");
    assert_eq!(note["message"], "commented on your post: \"This is a rather long comment ...\"");

    // Ada's own comment does not notify her
    post(&app, &comments_uri, Some(&ada), json!({ "text": "Thanks" })).await;
    let (_, count) = get(&app, "/notifications/count", Some(&ada)).await;
    assert_eq!(count["unread"], 1);

    // Ada may reply to Bob's comment, not to her own
    let (_, thread) = get(&app, &comments_uri, Some(&ada)).await;
    let items = thread["comments"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["canReply"], true);
    assert_eq!(items[1]["canReply"], false);

    let (status, resp) = post(
        &app,
        &format!("{}/{}/replies", comments_uri, comment_id),
        Some(&ada),
        json!({ "text": "Glad you liked it" }),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(resp["reply"]["userId"], ada_id);

    let (_, notes) = get(&app, "/notifications", Some(&bob)).await;
    let note = &notes["notifications"]["items"][0];
    assert_eq!(note["type"], "reply");
    assert_eq!(note["commentId"], comment_id);
    assert_eq!(note["message"], "replied to your comment: \"Glad you liked it\"");

    // Only the author edits or deletes a comment
    let comment_uri = format!("{}/{}", comments_uri, comment_id);
    let (status, _) = call(&app, Method::Put, &comment_uri, Some(&ada), Some(json!({ "text": "hijack" }))).await;
    assert_eq!(status, 403);
    let (status, resp) = call(&app, Method::Put, &comment_uri, Some(&bob), Some(json!({ "text": "Edited" }))).await;
    assert_eq!(status, 200);
    assert_eq!(resp["comment"]["userId"], bob_id);
    let (status, _) = call(&app, Method::Delete, &comment_uri, Some(&bob), None).await;
    assert_eq!(status, 200);

    let (_, thread) = get(&app, &comments_uri, Some(&ada)).await;
    assert_eq!(thread["comments"]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_notification_read_and_clear() {
    let app = app();
    let (ada_id, ada) = register(&app, "ada").await;
    let (_, bob) = register(&app, "bob").await;
    let (_, cy) = register(&app, "cyd").await;

    post(&app, &format!("/users/{}/follow", ada_id), Some(&bob), json!({})).await;
    post(&app, &format!("/users/{}/follow", ada_id), Some(&cy), json!({})).await;

    let (_, notes) = get(&app, "/notifications", Some(&ada)).await;
    assert_eq!(notes["unread"], 2);
    let first = notes["notifications"]["items"][0]["id"].as_str().unwrap().to_string();

    let (status, resp) = post(&app, &format!("/notifications/{}/read", first), Some(&ada), json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(resp["notification"]["read"], true);
    let (_, count) = get(&app, "/notifications/count", Some(&ada)).await;
    assert_eq!(count["unread"], 1);

    let (status, _) = post(&app, "/notifications/missing/read", Some(&ada), json!({})).await;
    assert_eq!(status, 404);

    post(&app, "/notifications/read", Some(&ada), json!({})).await;
    let (_, count) = get(&app, "/notifications/count", Some(&ada)).await;
    assert_eq!(count["unread"], 0);
    assert_eq!(count["badge"], serde_json::Value::Null);

    let (status, _) = call(&app, Method::Delete, &format!("/notifications/{}", first), Some(&ada), None).await;
    assert_eq!(status, 200);
    let (_, notes) = get(&app, "/notifications", Some(&ada)).await;
    assert_eq!(notes["notifications"]["items"].as_array().unwrap().len(), 1);

    call(&app, Method::Delete, "/notifications", Some(&ada), None).await;
    let (_, notes) = get(&app, "/notifications", Some(&ada)).await;
    assert_eq!(notes["notifications"]["state"], "empty");
    assert_eq!(notes["notifications"]["message"], "No notifications yet");
}

#[tokio::test]
async fn test_follow_toggle_and_lists() {
    let app = app();
    let (ada_id, ada) = register(&app, "ada").await;
    let (bob_id, bob) = register(&app, "bob").await;
    let follow_uri = format!("/users/{}/follow", bob_id);

    let (status, resp) = post(&app, &follow_uri, Some(&ada), json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(resp["following"], true);
    assert_eq!(resp["target"]["followers"], json!([ada_id]));

    let (_, notes) = get(&app, "/notifications", Some(&bob)).await;
    assert_eq!(notes["notifications"]["items"][0]["type"], "follow");
    assert_eq!(notes["notifications"]["items"][0]["message"], "started following you");

    let (_, list) = get(&app, &format!("/users/{}/followers", bob_id), Some(&bob)).await;
    assert_eq!(list["users"][0]["username"], "ada");
    assert_eq!(list["users"][0]["action"], "Follow");

    let (_, list) = get(&app, &format!("/users/{}/following", ada_id), Some(&ada)).await;
    assert_eq!(list["users"][0]["action"], "Unfollow");

    let (_, resp) = post(&app, &follow_uri, Some(&ada), json!({})).await;
    assert_eq!(resp["following"], false);
    assert_eq!(resp["follower"]["following"], json!([]));

    let (status, resp) = post(&app, &format!("/users/{}/follow", ada_id), Some(&ada), json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(resp["message"], "You cannot follow yourself");

    let (status, _) = get(&app, &format!("/users/{}", uuid::Uuid::new_v4()), None).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_profile_image_limit() {
    let app = app();
    let (_, token) = register(&app, "ada").await;

    let (status, resp) = call(
        &app,
        Method::Put,
        "/profile",
        Some(&token),
        Some(json!({ "profileImage": "data:image/png;base64,AAAA" })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(resp["user"]["profileImage"], "data:image/png;base64,AAAA");

    let (status, resp) = call(
        &app,
        Method::Put,
        "/profile",
        Some(&token),
        Some(json!({ "profileImage": "A".repeat(3 * 1024 * 1024) })),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(resp["message"], "Profile image must be less than 2MB");

    // Data URLs are measured by their decoded size: 1.9 MB fits
    let image = format!("data:image/png;base64,{}", "A".repeat(2_656_392));
    let (status, _) = call(&app, Method::Put, "/profile", Some(&token), Some(json!({ "profileImage": image }))).await;
    assert_eq!(status, 200);

    // 2.1 MB does not
    let image = format!("data:image/png;base64,{}", "A".repeat(2_936_016));
    let (status, resp) = call(&app, Method::Put, "/profile", Some(&token), Some(json!({ "profileImage": image }))).await;
    assert_eq!(status, 400);
    assert_eq!(resp["message"], "Profile image must be less than 2MB");
}

#[tokio::test]
async fn test_careervice_flow_with_fallback() {
    let app = app();

    let (status, resp) = post(
        &app,
        "/careervice/signup",
        None,
        json!({ "email": "ana@example.com", "password": "secret1", "fullName": "Ana Pop" }),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(resp["user"]["fullName"], "Ana Pop");

    let (status, resp) = post(
        &app,
        "/careervice/signup",
        None,
        json!({ "email": "ana@example.com", "password": "secret1", "fullName": "Ana Again" }),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(resp["message"], "Email already in use");

    let (status, resp) = post(
        &app,
        "/careervice/login",
        None,
        json!({ "email": "ana@example.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(status, 200);
    let token = resp["token"].as_str().unwrap().to_string();

    // Chatter tokens and CareerVice tokens do not mix
    let (status, _) = get(&app, "/profile", Some(&token)).await;
    assert_eq!(status, 401);

    let (status, resp) = call(
        &app,
        Method::Put,
        "/careervice/profile",
        Some(&token),
        Some(json!({ "country": "Romania", "qualification": "12th" })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(resp["user"]["profile"]["country"], "Romania");

    let (status, _) = get(&app, "/careervice/suggestions/latest", Some(&token)).await;
    assert_eq!(status, 404);

    let (status, resp) = post(
        &app,
        "/careervice/suggestions",
        Some(&token),
        json!({
            "level": "graduate",
            "interests": ["Business"],
            "strengths": ["Leadership"],
            "fears": ["Failure"]
        }),
    )
    .await;
    assert_eq!(status, 201);
    let text = resp["suggestion"]["aiResponse"].as_str().unwrap();
    assert!(text.starts_with("Based on your profile as a college graduate"));
    assert!(text.contains("• Management, Marketing, Entrepreneurship"));

    let (_, latest) = get(&app, "/careervice/suggestions/latest", Some(&token)).await;
    assert_eq!(latest["suggestion"]["level"], "graduate");

    let (status, resp) = post(
        &app,
        "/careervice/suggestions",
        Some(&token),
        json!({ "level": "", "interests": [], "strengths": [], "fears": [] }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(resp["message"], "Please select your education level");
}

#[tokio::test]
async fn test_careervice_uses_backend_reply() {
    let app = app_with(fake_advisor(Some("Become a data scientist.")));
    let (_, resp) = post(
        &app,
        "/careervice/signup",
        None,
        json!({ "email": "ana@example.com", "password": "secret1", "fullName": "Ana Pop" }),
    )
    .await;
    let token = resp["token"].as_str().unwrap().to_string();

    let form = json!({ "level": "12th", "interests": ["Technology"], "strengths": ["Math"], "fears": [] });
    post(&app, "/careervice/suggestions", Some(&token), form.clone()).await;
    let (_, resp) = post(&app, "/careervice/suggestions", Some(&token), form).await;
    assert_eq!(resp["suggestion"]["aiResponse"], "Become a data scientist.");

    let (_, list) = get(&app, "/careervice/suggestions", Some(&token)).await;
    assert_eq!(list["suggestions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_stub_endpoints() {
    let app = app();

    let (status, resp) = get(&app, "/", None).await;
    assert_eq!(status, 200);
    assert_eq!(resp, json!("SERVER IS RUNNING SUCCESSFULLY"));

    let account = json!({ "name": "Ana", "email": "ana@example.com", "password": "pw", "phone": "0700" });
    let (status, resp) = post(&app, "/signup", None, account.clone()).await;
    assert_eq!(status, 201);
    assert_eq!(resp["message"], "Signup successful");
    assert!(resp["values"].get("password").is_none());

    let (status, resp) = post(&app, "/signup", None, account).await;
    assert_eq!(status, 200);
    assert_eq!(resp["error"], "Email already exists. Please sign in.");

    let (_, resp) = post(&app, "/signin", None, json!({ "email": "ana@example.com", "password": "pw" })).await;
    assert_eq!(resp["message"], "Login Successfull");
    assert_eq!(resp["values"]["name"], "Ana");

    let (_, resp) = post(&app, "/signin", None, json!({ "email": "ana@example.com", "password": "nope" })).await;
    assert_eq!(resp["error"], "User not found. Try signing up");
}

#[tokio::test]
async fn test_unknown_route() {
    let app = app();
    let (status, resp) = get(&app, "/nowhere", None).await;
    assert_eq!(status, 404);
    assert_eq!(resp["message"], "No route found");
}
