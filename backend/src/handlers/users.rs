//! User CRUD endpoints. Reads are public; writes are gated: admin creation
//! requires an admin caller, update/delete sit behind the admin middleware.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    middleware::auth::bearer_token,
    models::user::{CreateUser, UpdateUser, User, UserResponse, UserRole},
    repositories::{session as session_repo, user as user_repo},
    utils::password::hash_password,
};

pub async fn list_users(
    State((pool, _config)): State<(PgPool, Config)>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = user_repo::list_users(&pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_user(
    State((pool, _config)): State<(PgPool, Config)>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_repo::find_by_id(&pool, &id)
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn get_user_by_email(
    State((pool, _config)): State<(PgPool, Config)>,
    Path(email): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_repo::find_by_email(&pool, &email)
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(UserResponse::from(user)))
}

/// Public registration. Creating an admin account is only allowed for an
/// authenticated admin caller.
pub async fn create_user(
    State((pool, config)): State<(PgPool, Config)>,
    headers: HeaderMap,
    Json(payload): Json<CreateUser>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    payload.validate()?;

    if payload.role == UserRole::Admin {
        let caller = match bearer_token(&headers) {
            Some(token) => session_repo::validate_token(&pool, &config, &token)
                .await
                .map_err(|e| AppError::InternalServerError(e.into()))?,
            None => None,
        };
        let is_admin_caller = caller.map(|s| s.user.is_admin()).unwrap_or(false);
        if !is_admin_caller {
            return Err(AppError::Forbidden(
                "Only administrators can create admin accounts".to_string(),
            ));
        }
    }

    if user_repo::find_by_email(&pool, &payload.email)
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?
        .is_some()
    {
        return Err(AppError::Conflict(
            "This email is already registered".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.password).map_err(AppError::InternalServerError)?;

    let mut user = User::new(payload.email, password_hash, payload.name, payload.role);
    user.phone = payload.phone;
    user.company = payload.company;
    user.address = payload.address;
    user.city = payload.city;
    user.state = payload.state;
    user.country = payload.country;

    user_repo::insert(&pool, &user)
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?;

    tracing::info!(user_id = %user.id, "user created");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn update_user(
    State((pool, _config)): State<(PgPool, Config)>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUser>,
) -> Result<Json<Value>, AppError> {
    payload.validate()?;

    if payload.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    let existing = user_repo::find_by_id(&pool, &id)
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(new_email) = payload.email.as_deref() {
        if new_email != existing.email
            && user_repo::find_by_email(&pool, new_email)
                .await
                .map_err(|e| AppError::InternalServerError(e.into()))?
                .is_some()
        {
            return Err(AppError::Conflict(
                "This email is already registered to another user".to_string(),
            ));
        }
    }

    let password_hash = match payload.password.as_deref() {
        Some(password) => Some(hash_password(password).map_err(AppError::InternalServerError)?),
        None => None,
    };

    user_repo::update(&pool, &id, &payload, password_hash.as_deref())
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?;

    Ok(Json(json!({ "success": true, "message": "User updated" })))
}

pub async fn delete_user(
    State((pool, _config)): State<(PgPool, Config)>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let deleted = user_repo::delete(&pool, &id)
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?;

    if !deleted {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %id, "user deleted");

    Ok(Json(json!({ "success": true, "message": "User deleted" })))
}
