use crate::{
    api::{into_body, JsonOrForm},
    middleware::{auth::TOKEN_COOKIE, CurrentUser},
    models::UserInfo,
    services::auth_service::{self, AuthResponse, LoginRequest, RegisterRequest},
    state::AppState,
    utils::AppError,
};
use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    web, HttpResponse,
};

fn session_cookie(state: &AppState, token: &str) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .secure(state.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::hours(state.jwt.expiration_hours()))
        .finish()
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    state: web::Data<AppState>,
    request: JsonOrForm<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let request = into_body(request);
    log::info!("📝 POST /auth/register - email: {}", request.email);

    let response = auth_service::register(&state, request)
        .await
        .inspect_err(|e| log::warn!("❌ Registration failed: {}", e))?;

    Ok(HttpResponse::Created()
        .cookie(session_cookie(&state, &response.token))
        .json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    request: JsonOrForm<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let request = into_body(request);
    let email = request.email.clone();
    log::info!("🔐 POST /auth/login - email: {}", email);

    let response = auth_service::login(&state, request)
        .await
        .inspect_err(|e| log::warn!("❌ Login failed: {} - {}", email, e))?;

    log::info!("✅ Login successful: {}", email);
    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&state, &response.token))
        .json(response))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Not authorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(user: CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": UserInfo::from(&user.0)
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Session cookie cleared")
    )
)]
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    let mut cookie = session_cookie(&state, "");
    cookie.make_removal();

    HttpResponse::Ok().cookie(cookie).json(serde_json::json!({
        "success": true,
        "message": "Logged out"
    }))
}
