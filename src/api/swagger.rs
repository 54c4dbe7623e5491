use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Finaxial API",
        version = "1.0.0",
        description = "Workspaces and AI-generated financial insights.\n\n**Authentication:** protected endpoints accept a JWT either as `Authorization: Bearer <token>` or in the `token` cookie set by login/register."
    ),
    paths(
        // Health
        crate::api::health::welcome,
        crate::api::health::health_check,

        // Auth
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::get_me,
        crate::api::auth::logout,

        // Workspaces
        crate::api::workspaces::list_workspaces,
        crate::api::workspaces::create_workspace,
        crate::api::workspaces::get_workspace,
        crate::api::workspaces::update_workspace,
        crate::api::workspaces::delete_workspace,
        crate::api::workspaces::add_member,
        crate::api::workspaces::remove_member,

        // Insights
        crate::api::workspaces::add_insight,
        crate::api::workspaces::get_insight,
        crate::api::workspaces::delete_insight,
        crate::api::workspaces::append_chat,
    ),
    components(
        schemas(
            crate::api::health::WelcomeResponse,
            crate::api::health::HealthResponse,
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::AuthResponse,
            crate::models::UserInfo,
            crate::models::CreateWorkspaceRequest,
            crate::models::UpdateWorkspaceRequest,
            crate::models::AddMemberRequest,
            crate::models::WorkspaceResponse,
            crate::models::CreateInsightRequest,
            crate::models::InsightResponse,
            crate::api::workspaces::AppendChatRequest,
        )
    ),
    tags(
        (name = "Health", description = "Liveness endpoints."),
        (name = "Auth", description = "Registration, login and the current session."),
        (name = "Workspaces", description = "Workspaces owned by or shared with the caller."),
        (name = "Insights", description = "Per-file analysis results stored inside a workspace."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
        }
    }
}
