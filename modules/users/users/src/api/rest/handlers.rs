use std::sync::Arc;

use axum::{Extension, Json, http::StatusCode};
use tg_errors::Failure;
use tracing::{field::Empty, info, instrument};

use crate::domain::service::Service;

use super::dto::{
    CreateUserReq, ListUsersQuery, ListedUserDto, PublicUserDto, UpdateUserReq, UserDto,
};
use super::extract::{JsonBody, QueryParams, UuidParam};

type ApiResult<T> = Result<T, Failure>;

/// `POST /users`: register a Telegram account.
#[instrument(skip_all, fields(tg_id = Empty))]
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    JsonBody(req): JsonBody<CreateUserReq>,
) -> ApiResult<(StatusCode, Json<PublicUserDto>)> {
    let new_user = req.into_new_user()?;
    tracing::Span::current().record("tg_id", new_user.tg_id);
    info!("Creating user");
    let user = svc.create_user(new_user).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `GET /users/{uuid}`: full record including timestamps.
#[instrument(skip_all, fields(user_uuid = %uuid))]
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    UuidParam(uuid): UuidParam,
) -> ApiResult<Json<UserDto>> {
    let user = svc.get_user(uuid).await?;
    Ok(Json(user.into()))
}

/// `GET /users`: one page, newest first.
#[instrument(skip_all)]
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    QueryParams(query): QueryParams<ListUsersQuery>,
) -> ApiResult<Json<Vec<ListedUserDto>>> {
    let page = query.page_request()?;
    let users = svc.list_users(page).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// `PUT /users/{uuid}`: partial update; `lastName: null` clears the last name.
#[instrument(skip_all, fields(user_uuid = %uuid))]
pub async fn update_user(
    Extension(svc): Extension<Arc<Service>>,
    UuidParam(uuid): UuidParam,
    JsonBody(req): JsonBody<UpdateUserReq>,
) -> ApiResult<Json<PublicUserDto>> {
    let user = svc.update_user(uuid, req.into_patch()?).await?;
    Ok(Json(user.into()))
}

/// `DELETE /users/{uuid}`: returns the removed record.
#[instrument(skip_all, fields(user_uuid = %uuid))]
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    UuidParam(uuid): UuidParam,
) -> ApiResult<Json<UserDto>> {
    info!("Deleting user");
    let user = svc.delete_user(uuid).await?;
    Ok(Json(user.into()))
}
