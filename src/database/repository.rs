use crate::models::{ChatMessage, Insight, User, Workspace};
use crate::utils::AppResult;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Identity lookup. The password hash is never returned.
    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<User>>;

    /// Login lookup, password hash included. `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Fails with `AppError::Conflict` when the email is taken.
    async fn create(&self, user: &User) -> AppResult<()>;
}

/// One in-place change to a stored workspace. Each is applied as a single
/// document update, so concurrent changes to other fields or array entries
/// are never overwritten.
#[derive(Debug, Clone)]
pub enum WorkspaceChange {
    /// Sets the name and/or description. `Some(None)` clears the description.
    /// Values must already be trimmed and validated.
    Details {
        name: Option<String>,
        description: Option<Option<String>>,
    },
    PushInsight(Insight),
    /// No-op (returns `None`) unless the insight exists.
    PullInsight(ObjectId),
    /// No-op (returns `None`) unless the insight exists.
    PushChat {
        insight_id: ObjectId,
        messages: Vec<ChatMessage>,
    },
    /// Adds the user unless already a member.
    AddMember(ObjectId),
    /// No-op (returns `None`) unless the user is a member.
    PullMember(ObjectId),
}

#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    /// Runs the save hook, then inserts.
    async fn create(&self, workspace: &mut Workspace) -> AppResult<()>;

    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<Workspace>>;

    /// Workspaces owned by or shared with `user_id`, most recently updated first.
    async fn list_for_user(&self, user_id: &ObjectId) -> AppResult<Vec<Workspace>>;

    /// Applies `change`, stamps `updatedAt` and returns the workspace as stored
    /// afterwards. `None` when the workspace (or the targeted entry) is gone.
    async fn apply(&self, id: &ObjectId, change: WorkspaceChange) -> AppResult<Option<Workspace>>;

    /// Removes the workspace together with its embedded insights.
    async fn delete(&self, id: &ObjectId) -> AppResult<bool>;
}
