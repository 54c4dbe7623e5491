pub mod repository;
pub mod vector_index;

#[cfg(test)]
pub mod memory;

pub use repository::{UserRepository, WorkspaceChange, WorkspaceRepository};

use crate::models::{User, Workspace};
use crate::utils::{AppError, AppResult};
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use std::time::Duration;

pub const USERS: &str = "users";
pub const WORKSPACES: &str = "workspaces";

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, mongodb::error::Error> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.app_name = Some("finaxial-api".to_string());
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(Duration::from_secs(300));
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        // Test connection
        db.run_command(doc! { "ping": 1 }).await?;

        let mongodb = Self { client, db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates necessary indexes for optimal query performance
    async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        log::info!("🔧 Creating database indexes...");

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users().create_index(email_index).await?;
        log::info!("   ✅ Index ready: users(email) unique");

        let workspaces = self.workspaces();
        for (field, keys) in [("owner", doc! { "owner": 1 }), ("members", doc! { "members": 1 })] {
            let index = IndexModel::builder().keys(keys).build();
            match workspaces.create_index(index).await {
                Ok(_) => log::info!("   ✅ Index ready: workspaces({})", field),
                Err(e) => log::debug!("   ℹ️  Index workspaces({}) skipped: {}", field, e),
            }
        }

        log::info!("✅ Database indexes ready");
        Ok(())
    }

    fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    fn users(&self) -> Collection<User> {
        self.collection(USERS)
    }

    fn workspaces(&self) -> Collection<Workspace> {
        self.collection(WORKSPACES)
    }

    /// Closes pooled connections. Call once the server has stopped.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        log::info!("🔌 MongoDB connection closed");
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl UserRepository for MongoDB {
    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<User>> {
        Ok(self
            .users()
            .find_one(doc! { "_id": id })
            .projection(doc! { "password": 0 })
            .await?)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.users().find_one(doc! { "email": email }).await?)
    }

    async fn create(&self, user: &User) -> AppResult<()> {
        match self.users().insert_one(user).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => {
                Err(AppError::Conflict("User already exists".into()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl WorkspaceRepository for MongoDB {
    async fn create(&self, workspace: &mut Workspace) -> AppResult<()> {
        workspace.prepare_for_save()?;
        self.workspaces().insert_one(&*workspace).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<Workspace>> {
        Ok(self.workspaces().find_one(doc! { "_id": id }).await?)
    }

    async fn list_for_user(&self, user_id: &ObjectId) -> AppResult<Vec<Workspace>> {
        let cursor = self
            .workspaces()
            .find(doc! { "$or": [ { "owner": user_id }, { "members": user_id } ] })
            .sort(doc! { "updatedAt": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn apply(&self, id: &ObjectId, change: WorkspaceChange) -> AppResult<Option<Workspace>> {
        let (filter, update, array_filters) = change_to_update(id, change)?;

        let workspaces = self.workspaces();
        let mut action = workspaces
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After);
        if let Some(array_filters) = array_filters {
            action = action.array_filters(array_filters);
        }
        Ok(action.await?)
    }

    async fn delete(&self, id: &ObjectId) -> AppResult<bool> {
        let result = self.workspaces().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

fn encode<T: serde::Serialize + ?Sized>(value: &T, what: &str) -> AppResult<mongodb::bson::Bson> {
    mongodb::bson::to_bson(value)
        .map_err(|e| AppError::Internal(format!("Failed to encode {}: {}", what, e)))
}

/// Filter, update document and array filters for one workspace change.
fn change_to_update(
    id: &ObjectId,
    change: WorkspaceChange,
) -> AppResult<(Document, Document, Option<Vec<Document>>)> {
    let mut filter = doc! { "_id": id };
    let mut set = doc! { "updatedAt": BsonDateTime::now() };
    let mut update = Document::new();
    let mut array_filters = None;

    match change {
        WorkspaceChange::Details { name, description } => {
            if let Some(name) = name {
                set.insert("name", name);
            }
            match description {
                Some(Some(description)) => {
                    set.insert("description", description);
                }
                Some(None) => {
                    update.insert("$unset", doc! { "description": "" });
                }
                None => {}
            }
        }
        WorkspaceChange::PushInsight(insight) => {
            insight.validate()?;
            update.insert("$push", doc! { "financialInsights": encode(&insight, "insight")? });
        }
        WorkspaceChange::PullInsight(insight_id) => {
            filter.insert("financialInsights._id", insight_id);
            update.insert("$pull", doc! { "financialInsights": { "_id": insight_id } });
        }
        WorkspaceChange::PushChat { insight_id, messages } => {
            filter.insert("financialInsights._id", insight_id);
            update.insert(
                "$push",
                doc! {
                    "financialInsights.$[target].assistantChat": {
                        "$each": encode(&messages, "chat messages")?
                    }
                },
            );
            array_filters = Some(vec![doc! { "target._id": insight_id }]);
        }
        WorkspaceChange::AddMember(member) => {
            update.insert("$addToSet", doc! { "members": member });
        }
        WorkspaceChange::PullMember(member) => {
            filter.insert("members", member);
            update.insert("$pull", doc! { "members": member });
        }
    }

    update.insert("$set", set);
    Ok((filter, update, array_filters))
}
