//! Registration, login, logout and the current user.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use shop_core::User;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::auth_service::{AuthService, Registration};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub status: &'static str,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub status: &'static str,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: &'static str,
}

async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RegisterBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    let Json(body) = body?;

    let token = AuthService::new(state)
        .register(Registration {
            name: body.name,
            email: body.email,
            password: body.password,
            password_confirmation: body.password_confirmation,
            phone: body.phone,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            status: "success",
            token,
        }),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(body) = body?;

    let token = AuthService::new(state).login(&body.email, &body.password).await?;

    Ok(Json(TokenResponse {
        status: "success",
        token,
    }))
}

async fn me(auth: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        status: "success",
        user: auth.user,
    })
}

async fn logout(State(state): State<Arc<AppState>>, auth: AuthUser) -> ApiResult<Json<MessageResponse>> {
    AuthService::new(state).logout(&auth.user, &auth.token_id).await?;

    Ok(Json(MessageResponse {
        status: "success",
        message: "Logged out successfully",
    }))
}
