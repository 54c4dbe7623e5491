use super::{UserRepository, WorkspaceChange, WorkspaceRepository};
use crate::models::{User, Workspace};
use crate::utils::{AppError, AppResult};
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process stand-in for MongoDB used by the handler tests.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<ObjectId, User>>,
    workspaces: RwLock<HashMap<ObjectId, Workspace>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn remove_user(&self, id: &ObjectId) {
        self.users.write().await.remove(id);
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned().map(User::without_password))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("User already exists".into()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }
}

#[async_trait]
impl WorkspaceRepository for MemoryStore {
    async fn create(&self, workspace: &mut Workspace) -> AppResult<()> {
        workspace.prepare_for_save()?;
        self.workspaces.write().await.insert(workspace.id, workspace.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<Workspace>> {
        Ok(self.workspaces.read().await.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: &ObjectId) -> AppResult<Vec<Workspace>> {
        let mut list: Vec<Workspace> = self
            .workspaces
            .read()
            .await
            .values()
            .filter(|w| w.has_access(user_id))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(list)
    }

    async fn apply(&self, id: &ObjectId, change: WorkspaceChange) -> AppResult<Option<Workspace>> {
        let mut workspaces = self.workspaces.write().await;
        let Some(stored) = workspaces.get_mut(id) else {
            return Ok(None);
        };

        let applied = match change {
            WorkspaceChange::Details { name, description } => {
                let mut next = stored.clone();
                if let Some(name) = name {
                    next.name = name;
                }
                if let Some(description) = description {
                    next.description = description;
                }
                next.validate()?;
                *stored = next;
                true
            }
            WorkspaceChange::PushInsight(insight) => {
                insight.validate()?;
                stored.push_insight(insight);
                true
            }
            WorkspaceChange::PullInsight(insight_id) => stored.remove_insight(&insight_id),
            WorkspaceChange::PushChat { insight_id, messages } => {
                match stored.financial_insights.iter_mut().find(|i| i.id == insight_id) {
                    Some(insight) => {
                        insight.assistant_chat.extend(messages);
                        true
                    }
                    None => false,
                }
            }
            WorkspaceChange::AddMember(member) => {
                if !stored.members.contains(&member) {
                    stored.members.push(member);
                }
                true
            }
            WorkspaceChange::PullMember(member) => stored.remove_member(&member),
        };

        if !applied {
            return Ok(None);
        }
        stored.updated_at = BsonDateTime::now();
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: &ObjectId) -> AppResult<bool> {
        Ok(self.workspaces.write().await.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateInsightRequest, Insight};

    fn insight(file_name: &str) -> Insight {
        Insight::from_request(CreateInsightRequest {
            file_name: file_name.into(),
            summary: "s".into(),
            insights: "i".into(),
            recommendations: "r".into(),
            charts: vec![],
            assistant_chat: vec![],
            raw_response: None,
        })
        .unwrap()
    }

    fn push(insight: Insight) -> WorkspaceChange {
        WorkspaceChange::PushInsight(insight)
    }

    fn file_names(workspace: &Workspace) -> Vec<&str> {
        workspace.financial_insights.iter().map(|i| i.file_name.as_str()).collect()
    }

    #[actix_rt::test]
    async fn identity_lookup_strips_password() {
        let store = MemoryStore::new();
        let user = User::new("Ana", "ana@example.com", "hash".into()).unwrap();
        UserRepository::create(&store, &user).await.unwrap();

        let by_id = UserRepository::find_by_id(&store, &user.id).await.unwrap().unwrap();
        assert!(by_id.password.is_none());

        let by_email = store.find_by_email("ana@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.password.as_deref(), Some("hash"));
    }

    #[actix_rt::test]
    async fn pushed_insights_preserve_order() {
        let store = MemoryStore::new();
        let mut workspace = Workspace::new("Q3", None, ObjectId::new()).unwrap();
        WorkspaceRepository::create(&store, &mut workspace).await.unwrap();

        store.apply(&workspace.id, push(insight("a.csv"))).await.unwrap();
        let updated = store
            .apply(&workspace.id, push(insight("b.csv")))
            .await
            .unwrap()
            .unwrap();

        let names: Vec<_> = updated.financial_insights.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, ["a.csv", "b.csv"]);
    }

    #[actix_rt::test]
    async fn deleting_workspace_drops_its_insights() {
        let store = MemoryStore::new();
        let mut workspace = Workspace::new("Q3", None, ObjectId::new()).unwrap();
        WorkspaceRepository::create(&store, &mut workspace).await.unwrap();
        store.apply(&workspace.id, push(insight("a.csv"))).await.unwrap();

        assert!(store.delete(&workspace.id).await.unwrap());
        assert!(WorkspaceRepository::find_by_id(&store, &workspace.id).await.unwrap().is_none());
        assert!(store.apply(&workspace.id, push(insight("b.csv"))).await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn removal_from_stale_read_keeps_later_appends() {
        let store = MemoryStore::new();
        let mut workspace = Workspace::new("Q3", None, ObjectId::new()).unwrap();
        WorkspaceRepository::create(&store, &mut workspace).await.unwrap();

        let first = insight("a.csv");
        store.apply(&workspace.id, push(first.clone())).await.unwrap();
        let snapshot = WorkspaceRepository::find_by_id(&store, &workspace.id)
            .await
            .unwrap()
            .unwrap();
        store.apply(&workspace.id, push(insight("b.csv"))).await.unwrap();

        assert!(snapshot.insight(&first.id).is_some());
        let updated = store
            .apply(&workspace.id, WorkspaceChange::PullInsight(first.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(file_names(&updated), ["b.csv"]);

        let stored = WorkspaceRepository::find_by_id(&store, &workspace.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(file_names(&stored), ["b.csv"]);
    }

    #[actix_rt::test]
    async fn missing_targets_leave_workspace_untouched() {
        let store = MemoryStore::new();
        let mut workspace = Workspace::new("Q3", None, ObjectId::new()).unwrap();
        WorkspaceRepository::create(&store, &mut workspace).await.unwrap();
        let before = workspace.updated_at;

        let stranger = ObjectId::new();
        assert!(store.apply(&workspace.id, WorkspaceChange::PullMember(stranger)).await.unwrap().is_none());
        assert!(store
            .apply(&workspace.id, WorkspaceChange::PushChat { insight_id: ObjectId::new(), messages: vec![] })
            .await
            .unwrap()
            .is_none());

        let stored = WorkspaceRepository::find_by_id(&store, &workspace.id).await.unwrap().unwrap();
        assert_eq!(stored.updated_at, before);
    }

    #[actix_rt::test]
    async fn members_are_added_once() {
        let store = MemoryStore::new();
        let mut workspace = Workspace::new("Q3", None, ObjectId::new()).unwrap();
        WorkspaceRepository::create(&store, &mut workspace).await.unwrap();
        let member = ObjectId::new();

        store.apply(&workspace.id, WorkspaceChange::AddMember(member)).await.unwrap();
        let updated = store
            .apply(&workspace.id, WorkspaceChange::AddMember(member))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.members, vec![member]);
    }
}
