pub mod auth;
pub mod health;
pub mod swagger;
pub mod workspaces;

use crate::{middleware::AuthMiddleware, utils::AppError};
use actix_web::web;

const BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Request body sent either as JSON or as an HTML form.
pub type JsonOrForm<T> = web::Either<web::Json<T>, web::Form<T>>;

pub fn into_body<T>(body: JsonOrForm<T>) -> T {
    match body {
        web::Either::Left(json) => json.into_inner(),
        web::Either::Right(form) => form.into_inner(),
    }
}

/// Route table shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(BODY_LIMIT))
    .app_data(
        web::JsonConfig::default()
            .limit(BODY_LIMIT)
            .error_handler(|err, _| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::FormConfig::default()
            .limit(BODY_LIMIT)
            .error_handler(|err, _| AppError::Validation(err.to_string()).into()),
    )
    .route("/", web::get().to(health::welcome))
    .route("/health", web::get().to(health::health_check))
    .service(
        web::scope("/api/auth")
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            .route("/logout", web::post().to(auth::logout))
            .service(
                web::resource("/me")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(auth::get_me)),
            ),
    )
    .service(
        web::scope("/api/workspaces")
            .wrap(AuthMiddleware)
            .route("", web::get().to(workspaces::list_workspaces))
            .route("", web::post().to(workspaces::create_workspace))
            .route("/{id}", web::get().to(workspaces::get_workspace))
            .route("/{id}", web::put().to(workspaces::update_workspace))
            .route("/{id}", web::delete().to(workspaces::delete_workspace))
            .route("/{id}/insights", web::post().to(workspaces::add_insight))
            .route("/{id}/insights/{insight_id}", web::get().to(workspaces::get_insight))
            .route("/{id}/insights/{insight_id}", web::delete().to(workspaces::delete_insight))
            .route("/{id}/insights/{insight_id}/chat", web::post().to(workspaces::append_chat))
            .route("/{id}/members", web::post().to(workspaces::add_member))
            .route("/{id}/members/{user_id}", web::delete().to(workspaces::remove_member)),
    );
}

#[cfg(test)]
mod tests {
    use super::configure;
    use crate::state::AppState;
    use actix_web::{test, web, App};

    #[actix_web::test]
    async fn root_returns_welcome_message() {
        let (state, _) = AppState::in_memory();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, serde_json::json!({ "message": "Welcome to Finaxial API" }));
    }
}
