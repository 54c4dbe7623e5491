use super::insight::{Insight, InsightResponse};
use crate::utils::{AppError, AppResult};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;

/// Workspace document (collection "workspaces")
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Workspace {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    /// Set at creation, never reassigned.
    pub owner: ObjectId,
    #[serde(default)]
    pub members: Vec<ObjectId>,
    #[serde(rename = "financialInsights", default)]
    pub financial_insights: Vec<Insight>,
    #[serde(rename = "createdAt")]
    pub created_at: BsonDateTime,
    #[serde(rename = "updatedAt")]
    pub updated_at: BsonDateTime,
}

impl Workspace {
    pub fn new(name: &str, description: Option<&str>, owner: ObjectId) -> AppResult<Self> {
        let now = BsonDateTime::now();
        let mut workspace = Workspace {
            id: ObjectId::new(),
            name: name.to_string(),
            description: description.map(str::to_string),
            owner,
            members: Vec::new(),
            financial_insights: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        workspace.prepare_for_save()?;
        Ok(workspace)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Please add a workspace name".into()));
        }
        if self.name.chars().count() > NAME_MAX_LEN {
            return Err(AppError::Validation(format!(
                "Workspace name cannot be more than {} characters",
                NAME_MAX_LEN
            )));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > DESCRIPTION_MAX_LEN {
                return Err(AppError::Validation(format!(
                    "Description cannot be more than {} characters",
                    DESCRIPTION_MAX_LEN
                )));
            }
        }
        self.financial_insights.iter().try_for_each(Insight::validate)
    }

    /// Runs before insert and before details are written: trims, validates and stamps `updated_at`.
    pub fn prepare_for_save(&mut self) -> AppResult<()> {
        self.name = self.name.trim().to_string();
        self.description = self
            .description
            .take()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self.validate()?;
        self.updated_at = BsonDateTime::now();
        Ok(())
    }

    pub fn is_owner(&self, user_id: &ObjectId) -> bool {
        &self.owner == user_id
    }

    pub fn has_access(&self, user_id: &ObjectId) -> bool {
        self.is_owner(user_id) || self.members.contains(user_id)
    }

    /// Returns false when the user was already a member.
    pub fn add_member(&mut self, user_id: ObjectId) -> AppResult<bool> {
        if self.is_owner(&user_id) {
            return Err(AppError::Validation("The owner is already part of this workspace".into()));
        }
        if self.members.contains(&user_id) {
            return Ok(false);
        }
        self.members.push(user_id);
        Ok(true)
    }

    pub fn remove_member(&mut self, user_id: &ObjectId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != user_id);
        self.members.len() != before
    }

    pub fn push_insight(&mut self, insight: Insight) {
        self.financial_insights.push(insight);
    }

    pub fn insight(&self, insight_id: &ObjectId) -> Option<&Insight> {
        self.financial_insights.iter().find(|i| &i.id == insight_id)
    }

    pub fn remove_insight(&mut self, insight_id: &ObjectId) -> bool {
        let before = self.financial_insights.len();
        self.financial_insights.retain(|i| &i.id != insight_id);
        self.financial_insights.len() != before
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateWorkspaceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AddMemberRequest {
    pub email: String,
}

/// Workspace as returned by the API.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct WorkspaceResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub owner: String,
    pub members: Vec<String>,
    #[serde(rename = "financialInsights")]
    pub financial_insights: Vec<InsightResponse>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl From<Workspace> for WorkspaceResponse {
    fn from(workspace: Workspace) -> Self {
        WorkspaceResponse {
            id: workspace.id.to_hex(),
            name: workspace.name,
            description: workspace.description,
            owner: workspace.owner.to_hex(),
            members: workspace.members.iter().map(|id| id.to_hex()).collect(),
            financial_insights: workspace
                .financial_insights
                .into_iter()
                .map(InsightResponse::from)
                .collect(),
            created_at: workspace.created_at.try_to_rfc3339_string().unwrap_or_default(),
            updated_at: workspace.updated_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}
