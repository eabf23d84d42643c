use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    response::{Html, Redirect},
    routing::{get, post},
    Form, Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::Session;

use crate::auth;
use crate::error::AppError;
use crate::outfit;
use crate::pages;
use crate::session::{session_layer, CurrentUser, SESSION_USER_KEY};
use crate::state::AppState;
use crate::user_models::{LoginForm, RegisterForm, UserIdentity};

pub fn router(state: Arc<AppState>) -> Router {
    let uploads = ServeDir::new(state.images.dir());
    let body_limit = state.max_upload_bytes;
    let sessions = session_layer(state.secure_cookies);

    Router::new()
        .route("/", get(login_page))
        .route("/login", post(login))
        .route("/register", get(register_page).post(register))
        .route("/welcome", get(welcome))
        .route("/add-item", post(add_item))
        .route("/delete-item/:item_id", post(delete_item))
        .route("/random-combination", get(random_combination))
        .route("/logout", get(logout))
        .nest_service("/uploads", uploads)
        .layer(sessions)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn login_page() -> Html<String> {
    Html(pages::login_page())
}

async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, AppError> {
    let identity =
        auth::authenticate(&state.users, &form.username, &form.password, state.bcrypt_cost).await?;

    // Fresh id on every login so a pre-login cookie cannot be reused.
    session.cycle_id().await.context("Failed to rotate session id")?;
    session
        .insert(SESSION_USER_KEY, identity)
        .await
        .context("Failed to store session")?;

    Ok(Redirect::to("/welcome"))
}

async fn register_page() -> Html<String> {
    Html(pages::register_page())
}

async fn register(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, AppError> {
    auth::register(&state.users, form, state.bcrypt_cost).await?;
    Ok(Redirect::to("/"))
}

async fn welcome(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
) -> Html<String> {
    let items = state.items.list_by_owner(&user).await;
    Html(pages::welcome_page(&user.username, &items))
}

/// An upload as read off the multipart body, before anything is written.
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

async fn add_item(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut upload: Option<Upload> = None;
    let mut category: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("image") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                upload = Some(Upload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            Some("category") => {
                category = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let upload = match upload {
        Some(upload) if !upload.file_name.is_empty() => upload,
        _ => return Err(AppError::Validation("No file selected.".into())),
    };
    let category = category.ok_or_else(|| AppError::Validation("No category given.".into()))?;

    let stored_name = state.images.save(&upload.file_name, &upload.bytes)?;
    let item = state
        .items
        .create_item(&user, &state.images, stored_name, category)
        .await?;

    tracing::info!(
        username = %user.username,
        item_id = %item.id,
        category = %item.category,
        bytes = upload.bytes.len(),
        "item added"
    );
    Ok(Redirect::to("/welcome"))
}

async fn delete_item(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> Result<Redirect, AppError> {
    if let Some(item) = state.items.delete_item(&user, &state.images, &item_id).await? {
        tracing::info!(username = %user.username, item_id = %item.id, "item deleted");
    }
    Ok(Redirect::to("/welcome"))
}

async fn random_combination(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, AppError> {
    let outfit = outfit::random_outfit(&state.items, &user).await?;
    tracing::debug!(
        username = %user.username,
        top = %outfit.top.id,
        bottom = %outfit.bottom.id,
        shoes = %outfit.shoes.id,
        "outfit generated"
    );
    Ok(Html(pages::outfit_page(&outfit)))
}

async fn logout(session: Session) -> Result<Redirect, AppError> {
    if let Ok(Some(identity)) = session.get::<UserIdentity>(SESSION_USER_KEY).await {
        tracing::info!(username = %identity.username, "logged out");
    }

    session.flush().await.context("Failed to clear session")?;
    Ok(Redirect::to("/"))
}
