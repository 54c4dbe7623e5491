// Access rules for workspaces:
//   owner         -> everything
//   member        -> read, add/remove insights, chat
//   anyone else   -> 404, the workspace is not disclosed

use crate::{
    database::WorkspaceChange,
    models::{
        user::normalize_email, AddMemberRequest, ChatMessage, CreateInsightRequest,
        CreateWorkspaceRequest, Insight, UpdateWorkspaceRequest, User, Workspace,
    },
    state::AppState,
    utils::{AppError, AppResult},
};
use mongodb::bson::oid::ObjectId;

pub fn parse_id(raw: &str, what: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| AppError::Validation(format!("Invalid {} id", what)))
}

fn not_found() -> AppError {
    AppError::NotFound("Workspace not found".into())
}

fn insight_not_found() -> AppError {
    AppError::NotFound("Insight not found".into())
}

async fn load_accessible(state: &AppState, id: &ObjectId, user: &User) -> AppResult<Workspace> {
    match state.workspaces.find_by_id(id).await? {
        Some(workspace) if workspace.has_access(&user.id) => Ok(workspace),
        _ => Err(not_found()),
    }
}

async fn load_owned(state: &AppState, id: &ObjectId, user: &User) -> AppResult<Workspace> {
    let workspace = load_accessible(state, id, user).await?;
    if !workspace.is_owner(&user.id) {
        return Err(AppError::Forbidden(
            "Only the workspace owner can perform this action".into(),
        ));
    }
    Ok(workspace)
}

pub async fn list(state: &AppState, user: &User) -> AppResult<Vec<Workspace>> {
    state.workspaces.list_for_user(&user.id).await
}

pub async fn create(
    state: &AppState,
    user: &User,
    request: CreateWorkspaceRequest,
) -> AppResult<Workspace> {
    let mut workspace = Workspace::new(&request.name, request.description.as_deref(), user.id)?;
    state.workspaces.create(&mut workspace).await?;
    log::info!("✅ Workspace {} created by {}", workspace.id, user.id);
    Ok(workspace)
}

pub async fn get(state: &AppState, user: &User, id: &ObjectId) -> AppResult<Workspace> {
    load_accessible(state, id, user).await
}

pub async fn update(
    state: &AppState,
    user: &User,
    id: &ObjectId,
    request: UpdateWorkspaceRequest,
) -> AppResult<Workspace> {
    let mut workspace = load_owned(state, id, user).await?;
    let renamed = request.name.is_some();
    let redescribed = request.description.is_some();
    if let Some(name) = request.name {
        workspace.name = name;
    }
    if let Some(description) = request.description {
        workspace.description = Some(description);
    }
    workspace.prepare_for_save()?;

    let change = WorkspaceChange::Details {
        name: renamed.then(|| workspace.name.clone()),
        description: redescribed.then(|| workspace.description.clone()),
    };
    state.workspaces.apply(id, change).await?.ok_or_else(not_found)
}

pub async fn delete(state: &AppState, user: &User, id: &ObjectId) -> AppResult<()> {
    load_owned(state, id, user).await?;
    if !state.workspaces.delete(id).await? {
        return Err(not_found());
    }
    log::info!("🗑️ Workspace {} deleted by {}", id, user.id);
    Ok(())
}

pub async fn add_insight(
    state: &AppState,
    user: &User,
    id: &ObjectId,
    request: CreateInsightRequest,
) -> AppResult<Insight> {
    load_accessible(state, id, user).await?;
    let insight = Insight::from_request(request)?;
    state
        .workspaces
        .apply(id, WorkspaceChange::PushInsight(insight.clone()))
        .await?
        .ok_or_else(not_found)?;
    log::info!("📊 Insight '{}' added to workspace {}", insight.file_name, id);
    Ok(insight)
}

pub async fn get_insight(
    state: &AppState,
    user: &User,
    id: &ObjectId,
    insight_id: &ObjectId,
) -> AppResult<Insight> {
    let workspace = load_accessible(state, id, user).await?;
    workspace.insight(insight_id).cloned().ok_or_else(insight_not_found)
}

pub async fn delete_insight(
    state: &AppState,
    user: &User,
    id: &ObjectId,
    insight_id: &ObjectId,
) -> AppResult<Workspace> {
    let mut workspace = load_accessible(state, id, user).await?;
    if !workspace.remove_insight(insight_id) {
        return Err(insight_not_found());
    }
    state
        .workspaces
        .apply(id, WorkspaceChange::PullInsight(*insight_id))
        .await?
        .ok_or_else(insight_not_found)
}

pub async fn append_chat(
    state: &AppState,
    user: &User,
    id: &ObjectId,
    insight_id: &ObjectId,
    messages: Vec<ChatMessage>,
) -> AppResult<Insight> {
    if messages.is_empty() {
        return Err(AppError::Validation("No messages to append".into()));
    }
    if messages.iter().any(|m| m.content().trim().is_empty()) {
        return Err(AppError::Validation("Chat messages cannot be empty".into()));
    }

    let workspace = load_accessible(state, id, user).await?;
    if workspace.insight(insight_id).is_none() {
        return Err(insight_not_found());
    }

    let change = WorkspaceChange::PushChat { insight_id: *insight_id, messages };
    state
        .workspaces
        .apply(id, change)
        .await?
        .and_then(|workspace| workspace.insight(insight_id).cloned())
        .ok_or_else(insight_not_found)
}

pub async fn add_member(
    state: &AppState,
    user: &User,
    id: &ObjectId,
    request: AddMemberRequest,
) -> AppResult<Workspace> {
    let mut workspace = load_owned(state, id, user).await?;
    let email = normalize_email(&request.email)?;
    let member = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("No user with that email".into()))?;

    if !workspace.add_member(member.id)? {
        return Ok(workspace);
    }
    let workspace = state
        .workspaces
        .apply(id, WorkspaceChange::AddMember(member.id))
        .await?
        .ok_or_else(not_found)?;
    log::info!("👥 User {} added to workspace {}", member.id, id);
    Ok(workspace)
}

pub async fn remove_member(
    state: &AppState,
    user: &User,
    id: &ObjectId,
    member_id: &ObjectId,
) -> AppResult<Workspace> {
    let mut workspace = load_owned(state, id, user).await?;
    let member_not_found = || AppError::NotFound("Member not found".into());
    if !workspace.remove_member(member_id) {
        return Err(member_not_found());
    }
    state
        .workspaces
        .apply(id, WorkspaceChange::PullMember(*member_id))
        .await?
        .ok_or_else(member_not_found)
}
