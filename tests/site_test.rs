use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use pretty_assertions::assert_eq;
use skillsprout::{app, AppState, Catalog, Config, SharedAcademy};
use tower::ServiceExt;

const ADMIN: &str = "ms_tam";

fn test_state() -> AppState {
    let config = Config {
        admin_users: vec![ADMIN.to_owned()],
        password_memory_kib: 64,
        password_iterations: 1,
        ..Config::default()
    };
    AppState::new(Catalog::builtin().unwrap(), config).unwrap()
}

fn site() -> (Router, SharedAcademy) {
    let state = test_state();
    let academy = state.academy.clone();
    (app(state), academy)
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, cookie: Option<&str>, form: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_owned())).unwrap()
}

fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_owned)
}

fn location(response: &Response<Body>) -> &str {
    response.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Registers through the form and returns the logged-in session cookie.
async fn register(app: &Router, username: &str, full_name: &str) -> String {
    let form = format!("username={username}&password=sprout&full_name={}", full_name.replace(' ', "+"));
    let response = send(app, post("/register", None, &form)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/c");
    session_cookie(&response).expect("register sets a session cookie")
}

#[tokio::test]
async fn home_requires_login() {
    let (app, _) = site();
    let response = send(&app, get("/", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn registered_user_sees_home_and_profile() {
    let (app, academy) = site();
    let cookie = register(&app, "ivy", "Ivy Green").await;

    let home = send(&app, get("/", Some(&cookie))).await;
    assert_eq!(home.status(), StatusCode::OK);
    assert!(body_text(home).await.contains("SkillSprout"));

    let profile = body_text(send(&app, get("/p", Some(&cookie))).await).await;
    assert!(profile.contains("Ivy Green"));
    assert!(profile.contains("No badges yet."));

    assert!(academy.read().await.user("ivy").is_some());
}

#[tokio::test]
async fn duplicate_registration_is_reported() {
    let (app, academy) = site();
    register(&app, "ivy", "Ivy Green").await;

    let response = send(&app, post("/register", None, "username=ivy&password=x&full_name=Other")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("already taken"));
    assert_eq!(academy.read().await.user("ivy").unwrap().full_name, "Ivy Green");
}

#[tokio::test]
async fn empty_fields_are_rejected_before_the_store() {
    let (app, academy) = site();
    let response = send(&app, post("/register", None, "username=ivy&password=&full_name=Ivy")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Please fill in every field."));
    assert!(academy.read().await.users().is_empty());
}

#[tokio::test]
async fn login_checks_password_and_follows_return_url() {
    let (app, _) = site();
    register(&app, "ivy", "Ivy Green").await;

    let wrong = send(&app, post("/login", None, "username=ivy&password=nope")).await;
    assert_eq!(wrong.status(), StatusCode::OK);
    assert!(session_cookie(&wrong).is_none());
    assert!(body_text(wrong).await.contains("wrong username or password"));

    let login_page = send(&app, get("/login?return_url=/c/1", None)).await;
    let pending = session_cookie(&login_page).unwrap();

    let ok = send(&app, post("/login", Some(&pending), "username=ivy&password=sprout")).await;
    assert_eq!(ok.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&ok), "/c/1");
    let cookie = session_cookie(&ok).unwrap();

    let profile = send(&app, get("/p", Some(&cookie))).await;
    assert_eq!(profile.status(), StatusCode::OK);
}

#[tokio::test]
async fn finishing_a_course_awards_its_badge_once() {
    let (app, academy) = site();
    let cookie = register(&app, "ivy", "Ivy Green").await;

    for module_id in [11, 12] {
        let response = send(&app, post(&format!("/c/1/{module_id}"), Some(&cookie), "")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/c/1");
    }
    assert!(academy.read().await.user("ivy").unwrap().earned_badges().is_empty());

    send(&app, post("/c/1/13", Some(&cookie), "")).await;
    let class_page = body_text(send(&app, get("/c/1", Some(&cookie))).await).await;
    assert!(class_page.contains("You earned the Robot Whisperer badge!"));
    assert!(class_page.contains("badge earned"));

    send(&app, post("/c/1/12", Some(&cookie), "")).await;
    let class_page = body_text(send(&app, get("/c/1", Some(&cookie))).await).await;
    assert!(!class_page.contains("You earned"));

    let profile = body_text(send(&app, get("/p", Some(&cookie))).await).await;
    assert!(profile.contains("Robot Whisperer"));

    let academy = academy.read().await;
    let user = academy.user("ivy").unwrap();
    assert_eq!(user.completed_count(), 3);
    assert_eq!(user.earned_badges().iter().copied().collect::<Vec<_>>(), vec![101]);
}

#[tokio::test]
async fn racing_registrations_keep_one_user() {
    let (app, academy) = site();
    let form = "username=twin&password=sprout&full_name=Twin";
    let (first, second) = tokio::join!(
        send(&app, post("/register", None, form)),
        send(&app, post("/register", None, form)),
    );

    let mut statuses = vec![first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::SEE_OTHER]);
    let rejected = if first.status() == StatusCode::OK { first } else { second };
    assert!(body_text(rejected).await.contains("already taken"));
    assert_eq!(academy.read().await.users().len(), 1);
}

#[tokio::test]
async fn completing_requires_login_and_a_real_module() {
    let (app, _) = site();
    let anonymous = send(&app, post("/c/1/11", None, "")).await;
    assert_eq!(anonymous.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&anonymous), "/login?return_url=/c/1");

    let cookie = register(&app, "ivy", "Ivy Green").await;
    let foreign = send(&app, post("/c/1/21", Some(&cookie), "")).await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);

    let missing = send(&app, get("/c/99", Some(&cookie))).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn course_list_filters_by_age_and_difficulty() {
    let (app, _) = site();
    let all = body_text(send(&app, get("/c", None)).await).await;
    assert!(all.contains("Code Sprouts"));
    assert!(all.contains("Game Makers"));

    let young = body_text(send(&app, get("/c?age=4-7&age=8-10", None)).await).await;
    assert!(young.contains("Code Sprouts"));
    assert!(young.contains("Little Scientists"));
    assert!(!young.contains("Game Makers"));

    let none = body_text(send(&app, get("/c?age=4-7&difficulty=mastery", None)).await).await;
    assert!(none.contains("No courses match"));
}

#[tokio::test]
async fn friends_are_added_both_ways() {
    let (app, academy) = site();
    let ann = register(&app, "ann", "Ann Lee").await;
    let bob = register(&app, "bob", "Bob Ray").await;

    let response = send(&app, post("/p/friends", Some(&ann), "username=bob")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let ann_page = body_text(send(&app, get("/p/friends", Some(&ann))).await).await;
    assert!(ann_page.contains("You and bob are now friends!"));
    assert!(ann_page.contains("Bob Ray"));

    let bob_page = body_text(send(&app, get("/p/friends", Some(&bob))).await).await;
    assert!(bob_page.contains("Ann Lee"));

    send(&app, post("/p/friends", Some(&ann), "username=ann")).await;
    let ann_page = body_text(send(&app, get("/p/friends", Some(&ann))).await).await;
    assert!(ann_page.contains("You can&#39;t add yourself"));

    send(&app, post("/p/friends", Some(&ann), "username=zed")).await;
    let ann_page = body_text(send(&app, get("/p/friends", Some(&ann))).await).await;
    assert!(ann_page.contains("There is nobody called zed."));

    let academy = academy.read().await;
    assert_eq!(academy.friends_of("ann").len(), 1);
    assert_eq!(academy.friends_of("bob").len(), 1);
}

#[tokio::test]
async fn only_friends_can_view_a_profile() {
    let (app, academy) = site();
    let ann = register(&app, "ann", "Ann Lee").await;
    register(&app, "bob", "Bob Ray").await;
    let bob_id = academy.read().await.user("bob").unwrap().user_id;

    let before = send(&app, get(&format!("/p/u/{bob_id}"), Some(&ann))).await;
    assert_eq!(before.status(), StatusCode::NOT_FOUND);

    send(&app, post("/p/friends", Some(&ann), "username=bob")).await;
    let after = send(&app, get(&format!("/p/u/{bob_id}"), Some(&ann))).await;
    assert_eq!(after.status(), StatusCode::OK);
    assert!(body_text(after).await.contains("Bob Ray"));
}

#[tokio::test]
async fn bio_is_overwritten_and_escaped() {
    let (app, academy) = site();
    let cookie = register(&app, "ivy", "Ivy Green").await;

    send(&app, post("/p/bio", Some(&cookie), "bio=I+like+frogs")).await;
    send(&app, post("/p/bio", Some(&cookie), "bio=%3Cb%3Etoads%3C%2Fb%3E")).await;
    assert_eq!(academy.read().await.user("ivy").unwrap().bio, "<b>toads</b>");

    let profile = body_text(send(&app, get("/p", Some(&cookie))).await).await;
    assert!(profile.contains("&lt;b&gt;toads&lt;/b&gt;"));
    assert!(!profile.contains("I like frogs"));
}

#[tokio::test]
async fn leaderboard_ranks_by_category() {
    let (app, _) = site();
    let ann = register(&app, "ann", "Ann Lee").await;
    register(&app, "bob", "Bob Ray").await;
    send(&app, post("/c/2/21", Some(&ann), "")).await;

    let page = body_text(send(&app, get("/leaderboards?category=modules", None)).await).await;
    assert!(page.contains("Modules Completed"));
    let ann_at = page.find("Ann Lee").unwrap();
    let bob_at = page.find("Bob Ray").unwrap();
    assert!(ann_at < bob_at);

    let default = body_text(send(&app, get("/leaderboards", None)).await).await;
    assert!(default.contains("<h2>Badges Earned</h2>"));
}

#[tokio::test]
async fn admin_panel_is_for_admins_only() {
    let (app, _) = site();
    let kid = register(&app, "ivy", "Ivy Green").await;
    let admin = register(&app, ADMIN, "Ms Tam").await;

    let refused = send(&app, get("/admin", Some(&kid))).await;
    assert_eq!(refused.status(), StatusCode::NOT_FOUND);
    assert!(body_text(refused).await.contains("admin panel"));

    let panel = send(&app, get("/admin", Some(&admin))).await;
    assert_eq!(panel.status(), StatusCode::OK);
    let panel = body_text(panel).await;
    assert!(panel.contains("2 users"));
    assert!(panel.contains("Ivy Green"));
}

#[tokio::test]
async fn logout_ends_the_session() {
    let (app, _) = site();
    let cookie = register(&app, "ivy", "Ivy Green").await;

    let response = send(&app, get("/logout", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let home = send(&app, get("/", Some(&cookie))).await;
    assert_eq!(home.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&home), "/login");
}
