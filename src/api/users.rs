use actix_multipart::Multipart;
use actix_web::{cookie::Cookie, http::StatusCode, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::api::forms::read_form;
use crate::api::parse_id;
use crate::api::response::ApiResponse;
use crate::auth::{AuthUser, TokenIssuer};
use crate::error::ApiError;
use crate::services::mutations::{MutationCoordinator, NewUser};
use crate::services::views::{UserPublic, ViewComposer};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/refresh-token", web::post().to(refresh_token))
            .route("/change-password", web::post().to(change_password))
            .route("/current-user", web::get().to(current_user))
            .route("/update-account", web::patch().to(update_account))
            .route("/avatar", web::patch().to(update_avatar))
            .route("/cover-image", web::patch().to(update_cover))
            .route("/c/{username}", web::get().to(channel_profile))
            .route("/history", web::get().to(watch_history))
            .route("/history", web::delete().to(clear_watch_history))
            .route("/history/{videoId}", web::delete().to(remove_watch_entry)),
    );
}

fn auth_cookie<'a>(name: &'a str, value: &'a str) -> Cookie<'a> {
    Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .secure(true)
        .finish()
}

async fn register(
    payload: Multipart,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let mut form = read_form(payload).await?;
    let new_user = NewUser {
        username: form.require_text("username")?.to_string(),
        email: form.require_text("email")?.to_string(),
        full_name: form.require_text("fullName")?.to_string(),
        password: form.require_text("password")?.to_string(),
    };
    let avatar = form
        .require_file("avatar")
        .map_err(|_| ApiError::BadRequest("Avatar file is required".into()))?;
    let cover = form.take_file("coverImage");

    let user = mutations.register(new_user, avatar, cover).await?;
    Ok(ApiResponse::created(
        UserPublic::from_user(&user),
        "User registered successfully",
    ))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: Option<String>,
    email: Option<String>,
    password: String,
}

async fn login(
    body: web::Json<LoginRequest>,
    mutations: web::Data<MutationCoordinator>,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ApiError> {
    let identifier = body
        .username
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .or(body.email.as_deref())
        .ok_or_else(|| ApiError::BadRequest("Username or email is required".into()))?;

    let user = mutations.login(identifier, &body.password).await?;
    let access = issuer.issue_access(user.id)?;
    let refresh = issuer.issue_refresh(user.id)?;
    mutations
        .store_refresh_token(user.id, Some(refresh.clone()))
        .await?;

    let body = ApiResponse {
        status_code: StatusCode::OK.as_u16(),
        data: Some(json!({
            "user": UserPublic::from_user(&user),
            "accessToken": access,
            "refreshToken": refresh,
        })),
        message: "User logged in successfully".to_string(),
        success: true,
    };
    Ok(HttpResponse::Ok()
        .cookie(auth_cookie("accessToken", &access))
        .cookie(auth_cookie("refreshToken", &refresh))
        .json(body))
}

async fn logout(
    user: AuthUser,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    mutations.store_refresh_token(user.0, None).await?;
    let mut access = auth_cookie("accessToken", "");
    access.make_removal();
    let mut refresh = auth_cookie("refreshToken", "");
    refresh.make_removal();
    let body = ApiResponse::<serde_json::Value> {
        status_code: StatusCode::OK.as_u16(),
        data: Some(json!({})),
        message: "User logged out".to_string(),
        success: true,
    };
    Ok(HttpResponse::Ok().cookie(access).cookie(refresh).json(body))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest {
    refresh_token: Option<String>,
}

async fn refresh_token(
    req: HttpRequest,
    body: Option<web::Json<RefreshRequest>>,
    mutations: web::Data<MutationCoordinator>,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ApiError> {
    let incoming = req
        .cookie("refreshToken")
        .map(|c| c.value().to_string())
        .or_else(|| body.and_then(|b| b.into_inner().refresh_token))
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized request".into()))?;

    let user_id = issuer.verify_refresh(&incoming)?;
    let user = mutations
        .verify_stored_refresh_token(user_id, &incoming)
        .await?;

    let access = issuer.issue_access(user.id)?;
    let refresh = issuer.issue_refresh(user.id)?;
    mutations
        .store_refresh_token(user.id, Some(refresh.clone()))
        .await?;

    let body = ApiResponse {
        status_code: StatusCode::OK.as_u16(),
        data: Some(json!({
            "accessToken": access,
            "refreshToken": refresh,
        })),
        message: "Access token refreshed".to_string(),
        success: true,
    };
    Ok(HttpResponse::Ok()
        .cookie(auth_cookie("accessToken", &access))
        .cookie(auth_cookie("refreshToken", &refresh))
        .json(body))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest {
    old_password: String,
    new_password: String,
    confirm_password: String,
}

async fn change_password(
    user: AuthUser,
    body: web::Json<ChangePasswordRequest>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    mutations
        .change_password(
            user.0,
            &body.old_password,
            &body.new_password,
            &body.confirm_password,
        )
        .await?;
    Ok(ApiResponse::ok(json!({}), "Password changed successfully"))
}

async fn current_user(
    user: AuthUser,
    views: web::Data<ViewComposer>,
) -> Result<HttpResponse, ApiError> {
    let profile = views.current_user(user.0).await?;
    Ok(ApiResponse::ok(profile, "Current user fetched successfully"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAccountRequest {
    full_name: String,
    email: String,
}

async fn update_account(
    user: AuthUser,
    body: web::Json<UpdateAccountRequest>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let updated = mutations
        .update_account(user.0, &body.full_name, &body.email)
        .await?;
    Ok(ApiResponse::ok(
        UserPublic::from_user(&updated),
        "Account details updated successfully",
    ))
}

async fn update_avatar(
    user: AuthUser,
    payload: Multipart,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let mut form = read_form(payload).await?;
    let upload = form
        .require_file("avatar")
        .map_err(|_| ApiError::BadRequest("Avatar file is missing".into()))?;
    let updated = mutations.update_avatar(user.0, upload).await?;
    Ok(ApiResponse::ok(
        UserPublic::from_user(&updated),
        "User avatar updated successfully",
    ))
}

async fn update_cover(
    user: AuthUser,
    payload: Multipart,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let mut form = read_form(payload).await?;
    let upload = form
        .require_file("coverImage")
        .map_err(|_| ApiError::BadRequest("Cover image file is missing".into()))?;
    let updated = mutations.update_cover(user.0, upload).await?;
    Ok(ApiResponse::ok(
        UserPublic::from_user(&updated),
        "User cover image updated successfully",
    ))
}

async fn channel_profile(
    path: web::Path<String>,
    viewer: Option<AuthUser>,
    views: web::Data<ViewComposer>,
) -> Result<HttpResponse, ApiError> {
    let username = path.into_inner();
    if username.trim().is_empty() {
        return Err(ApiError::BadRequest("Username is missing".into()));
    }
    let profile = views
        .channel_profile(&username, viewer.map(|v| v.0))
        .await?;
    Ok(ApiResponse::ok(profile, "User channel fetched successfully"))
}

async fn watch_history(
    user: AuthUser,
    views: web::Data<ViewComposer>,
) -> Result<HttpResponse, ApiError> {
    let history = views.watch_history(user.0).await?;
    Ok(ApiResponse::ok(
        history,
        "User watch history fetched successfully",
    ))
}

async fn clear_watch_history(
    user: AuthUser,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    mutations.clear_watch_history(user.0).await?;
    Ok(ApiResponse::ok(
        json!({}),
        "Watch history cleared successfully",
    ))
}

async fn remove_watch_entry(
    user: AuthUser,
    path: web::Path<String>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let video_id = parse_id(&path.into_inner(), "video")?;
    mutations.remove_watch_entry(user.0, video_id).await?;
    Ok(ApiResponse::ok(
        json!({}),
        "Video removed from watch history",
    ))
}
