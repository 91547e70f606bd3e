use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{auth, include_res, res, session::FLASH, AppResult, AppState, SharedAcademy};

#[derive(Deserialize)]
pub(crate) struct AddFriendForm {
    #[serde(default)]
    username: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn friends_page(
    State(academy): State<SharedAcademy>,
    session: Session,
) -> AppResult<Response> {
    let username = match auth::require_user(&session, "/p/friends").await? {
        Ok(username) => username,
        Err(redirect) => return Ok(redirect),
    };
    let flash = session.remove::<String>(FLASH).await?;

    let academy = academy.read().await;
    let friend_items: String = academy
        .friends_of(&username)
        .into_iter()
        .map(|friend| {
            include_res!(str, "/pages/profiles/friend_item.html")
                .replace("{user_id}", &friend.user_id.to_string())
                .replace("{full_name}", &res::escape(&friend.full_name))
                .replace("{username}", &res::escape(&friend.username))
                .replace("{badges}", &friend.earned_badges().len().to_string())
        })
        .collect();

    Ok(res::page(
        "Friends",
        &include_res!(str, "/pages/profiles/friends.html")
            .replace("{notice}", &res::notice(flash.as_deref()))
            .replace(
                "{friend_items}",
                if friend_items.is_empty() { "<li>No friends yet. Add one below!</li>" } else { &friend_items },
            ),
    ).into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn add_friend(
    State(academy): State<SharedAcademy>,
    session: Session,
    Form(AddFriendForm { username: candidate }): Form<AddFriendForm>,
) -> AppResult<Response> {
    let username = match auth::require_user(&session, "/p/friends").await? {
        Ok(username) => username,
        Err(redirect) => return Ok(redirect),
    };
    let candidate = candidate.trim();

    let message = {
        let mut academy = academy.write().await;
        if candidate.is_empty() {
            "Type a username to add a friend.".to_owned()
        } else if academy.add_friend(&username, candidate) {
            format!("You and {candidate} are now friends!")
        } else if candidate == username {
            "You can't add yourself as a friend.".to_owned()
        } else if academy.user(candidate).is_none() {
            format!("There is nobody called {candidate}.")
        } else {
            format!("You and {candidate} are already friends.")
        }
    };

    session.insert(FLASH, message).await?;
    Ok(Redirect::to("/p/friends").into_response())
}
