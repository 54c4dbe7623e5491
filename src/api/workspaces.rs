use crate::{
    api::{into_body, JsonOrForm},
    middleware::CurrentUser,
    models::{
        AddMemberRequest, ChatMessage, CreateInsightRequest, CreateWorkspaceRequest,
        InsightResponse, UpdateWorkspaceRequest, WorkspaceResponse,
    },
    services::workspace_service::{self, parse_id},
    state::AppState,
    utils::AppError,
};
use actix_web::{web, HttpResponse};
use serde::Deserialize;

type HandlerResult = Result<HttpResponse, AppError>;

fn workspace_json(status: actix_web::http::StatusCode, workspace: crate::models::Workspace) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({
        "success": true,
        "workspace": WorkspaceResponse::from(workspace)
    }))
}

fn ok_workspace(workspace: crate::models::Workspace) -> HttpResponse {
    workspace_json(actix_web::http::StatusCode::OK, workspace)
}

/// GET /api/workspaces - Workspaces owned by or shared with the caller
#[utoipa::path(
    get,
    path = "/api/workspaces",
    tag = "Workspaces",
    responses(
        (status = 200, description = "Workspaces visible to the caller", body = [WorkspaceResponse]),
        (status = 401, description = "Not authorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_workspaces(state: web::Data<AppState>, user: CurrentUser) -> HandlerResult {
    let workspaces = workspace_service::list(&state, &user.0).await?;
    let workspaces: Vec<WorkspaceResponse> =
        workspaces.into_iter().map(WorkspaceResponse::from).collect();

    log::info!("📂 GET /workspaces - {} workspaces for {}", workspaces.len(), user.0.id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": workspaces.len(),
        "workspaces": workspaces
    })))
}

/// POST /api/workspaces - Creates a workspace owned by the caller
#[utoipa::path(
    post,
    path = "/api/workspaces",
    tag = "Workspaces",
    request_body = CreateWorkspaceRequest,
    responses(
        (status = 201, description = "Workspace created", body = WorkspaceResponse),
        (status = 400, description = "Validation failed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_workspace(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: JsonOrForm<CreateWorkspaceRequest>,
) -> HandlerResult {
    let workspace = workspace_service::create(&state, &user.0, into_body(body)).await?;
    Ok(workspace_json(actix_web::http::StatusCode::CREATED, workspace))
}

/// GET /api/workspaces/{id}
#[utoipa::path(
    get,
    path = "/api/workspaces/{id}",
    tag = "Workspaces",
    params(("id" = String, Path, description = "Workspace id")),
    responses(
        (status = 200, description = "Workspace", body = WorkspaceResponse),
        (status = 404, description = "Workspace not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_workspace(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> HandlerResult {
    let id = parse_id(&path, "workspace")?;
    Ok(ok_workspace(workspace_service::get(&state, &user.0, &id).await?))
}

/// PUT /api/workspaces/{id} - Renames or re-describes a workspace (owner only)
#[utoipa::path(
    put,
    path = "/api/workspaces/{id}",
    tag = "Workspaces",
    params(("id" = String, Path, description = "Workspace id")),
    request_body = UpdateWorkspaceRequest,
    responses(
        (status = 200, description = "Workspace updated", body = WorkspaceResponse),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Workspace not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_workspace(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    body: JsonOrForm<UpdateWorkspaceRequest>,
) -> HandlerResult {
    let id = parse_id(&path, "workspace")?;
    let workspace = workspace_service::update(&state, &user.0, &id, into_body(body)).await?;
    Ok(ok_workspace(workspace))
}

/// DELETE /api/workspaces/{id} - Removes the workspace and every insight in it (owner only)
#[utoipa::path(
    delete,
    path = "/api/workspaces/{id}",
    tag = "Workspaces",
    params(("id" = String, Path, description = "Workspace id")),
    responses(
        (status = 200, description = "Workspace deleted"),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Workspace not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_workspace(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> HandlerResult {
    let id = parse_id(&path, "workspace")?;
    workspace_service::delete(&state, &user.0, &id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Workspace deleted"
    })))
}

/// POST /api/workspaces/{id}/insights - Stores the analysis of one file
#[utoipa::path(
    post,
    path = "/api/workspaces/{id}/insights",
    tag = "Insights",
    params(("id" = String, Path, description = "Workspace id")),
    request_body = CreateInsightRequest,
    responses(
        (status = 201, description = "Insight stored", body = InsightResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Workspace not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_insight(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    body: web::Json<CreateInsightRequest>,
) -> HandlerResult {
    let id = parse_id(&path, "workspace")?;
    let insight = workspace_service::add_insight(&state, &user.0, &id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "insight": InsightResponse::from(insight)
    })))
}

#[utoipa::path(
    get,
    path = "/api/workspaces/{id}/insights/{insight_id}",
    tag = "Insights",
    params(
        ("id" = String, Path, description = "Workspace id"),
        ("insight_id" = String, Path, description = "Insight id")
    ),
    responses(
        (status = 200, description = "Insight", body = InsightResponse),
        (status = 404, description = "Workspace or insight not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_insight(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(String, String)>,
) -> HandlerResult {
    let (id, insight_id) = path.into_inner();
    let id = parse_id(&id, "workspace")?;
    let insight_id = parse_id(&insight_id, "insight")?;

    let insight = workspace_service::get_insight(&state, &user.0, &id, &insight_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "insight": InsightResponse::from(insight)
    })))
}

#[utoipa::path(
    delete,
    path = "/api/workspaces/{id}/insights/{insight_id}",
    tag = "Insights",
    params(
        ("id" = String, Path, description = "Workspace id"),
        ("insight_id" = String, Path, description = "Insight id")
    ),
    responses(
        (status = 200, description = "Insight removed", body = WorkspaceResponse),
        (status = 404, description = "Workspace or insight not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_insight(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(String, String)>,
) -> HandlerResult {
    let (id, insight_id) = path.into_inner();
    let id = parse_id(&id, "workspace")?;
    let insight_id = parse_id(&insight_id, "insight")?;

    let workspace = workspace_service::delete_insight(&state, &user.0, &id, &insight_id).await?;
    Ok(ok_workspace(workspace))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AppendChatRequest {
    #[schema(value_type = Vec<Object>)]
    pub messages: Vec<ChatMessage>,
}

/// POST /api/workspaces/{id}/insights/{insight_id}/chat - Appends assistant chat turns
#[utoipa::path(
    post,
    path = "/api/workspaces/{id}/insights/{insight_id}/chat",
    tag = "Insights",
    params(
        ("id" = String, Path, description = "Workspace id"),
        ("insight_id" = String, Path, description = "Insight id")
    ),
    request_body = AppendChatRequest,
    responses(
        (status = 200, description = "Chat updated", body = InsightResponse),
        (status = 404, description = "Workspace or insight not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn append_chat(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(String, String)>,
    body: web::Json<AppendChatRequest>,
) -> HandlerResult {
    let (id, insight_id) = path.into_inner();
    let id = parse_id(&id, "workspace")?;
    let insight_id = parse_id(&insight_id, "insight")?;

    let insight =
        workspace_service::append_chat(&state, &user.0, &id, &insight_id, body.into_inner().messages)
            .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "insight": InsightResponse::from(insight)
    })))
}

/// POST /api/workspaces/{id}/members - Shares the workspace with a registered user (owner only)
#[utoipa::path(
    post,
    path = "/api/workspaces/{id}/members",
    tag = "Workspaces",
    params(("id" = String, Path, description = "Workspace id")),
    request_body = AddMemberRequest,
    responses(
        (status = 200, description = "Member added", body = WorkspaceResponse),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Workspace or user not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_member(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    body: JsonOrForm<AddMemberRequest>,
) -> HandlerResult {
    let id = parse_id(&path, "workspace")?;
    let workspace = workspace_service::add_member(&state, &user.0, &id, into_body(body)).await?;
    Ok(ok_workspace(workspace))
}

#[utoipa::path(
    delete,
    path = "/api/workspaces/{id}/members/{user_id}",
    tag = "Workspaces",
    params(
        ("id" = String, Path, description = "Workspace id"),
        ("user_id" = String, Path, description = "Member user id")
    ),
    responses(
        (status = 200, description = "Member removed", body = WorkspaceResponse),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Workspace or member not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_member(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(String, String)>,
) -> HandlerResult {
    let (id, member_id) = path.into_inner();
    let id = parse_id(&id, "workspace")?;
    let member_id = parse_id(&member_id, "user")?;

    let workspace = workspace_service::remove_member(&state, &user.0, &id, &member_id).await?;
    Ok(ok_workspace(workspace))
}
