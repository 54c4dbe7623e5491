use crate::utils::{AppError, AppResult};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Analysis result for one uploaded file, embedded in `Workspace.financialInsights`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Insight {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub summary: String,
    pub insights: String,
    pub recommendations: String,
    #[serde(default)]
    pub charts: Vec<Chart>,
    #[serde(rename = "assistantChat", default)]
    pub assistant_chat: Vec<ChatMessage>,
    #[serde(rename = "rawResponse", skip_serializing_if = "Option::is_none", default)]
    pub raw_response: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: BsonDateTime,
}

/// Chart rendered on the insight page, one variant per chart kind.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Chart {
    Bar(SeriesChart),
    Line(SeriesChart),
    Area(SeriesChart),
    Pie(SliceChart),
    Doughnut(SliceChart),
}

/// Categorical x-axis with one or more numeric series.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SeriesChart {
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SliceChart {
    pub title: String,
    pub slices: Vec<Slice>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
}

/// One turn of the assistant conversation attached to an insight.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ChatMessage {
    User(ChatContent),
    Assistant(ChatContent),
    System(ChatContent),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatContent {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

impl ChatMessage {
    pub fn content(&self) -> &str {
        match self {
            ChatMessage::User(c) | ChatMessage::Assistant(c) | ChatMessage::System(c) => &c.content,
        }
    }
}

impl Chart {
    /// Every series must have one value per label.
    fn validate(&self) -> AppResult<()> {
        match self {
            Chart::Bar(c) | Chart::Line(c) | Chart::Area(c) => {
                for dataset in &c.datasets {
                    if dataset.data.len() != c.labels.len() {
                        return Err(AppError::Validation(format!(
                            "Chart '{}': dataset '{}' has {} values for {} labels",
                            c.title,
                            dataset.label,
                            dataset.data.len(),
                            c.labels.len()
                        )));
                    }
                }
                Ok(())
            }
            Chart::Pie(_) | Chart::Doughnut(_) => Ok(()),
        }
    }
}

/// Body of `POST /api/workspaces/{id}/insights`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateInsightRequest {
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub summary: String,
    pub insights: String,
    pub recommendations: String,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub charts: Vec<Chart>,
    #[serde(rename = "assistantChat", default)]
    #[schema(value_type = Vec<Object>)]
    pub assistant_chat: Vec<ChatMessage>,
    #[serde(rename = "rawResponse", default)]
    pub raw_response: Option<String>,
}

impl Insight {
    pub fn from_request(request: CreateInsightRequest) -> AppResult<Self> {
        let insight = Insight {
            id: ObjectId::new(),
            file_name: request.file_name.trim().to_string(),
            summary: request.summary,
            insights: request.insights,
            recommendations: request.recommendations,
            charts: request.charts,
            assistant_chat: request.assistant_chat,
            raw_response: request.raw_response,
            created_at: BsonDateTime::now(),
        };
        insight.validate()?;
        Ok(insight)
    }

    pub fn validate(&self) -> AppResult<()> {
        for (field, value) in [
            ("fileName", &self.file_name),
            ("summary", &self.summary),
            ("insights", &self.insights),
            ("recommendations", &self.recommendations),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("Insight {} is required", field)));
            }
        }
        self.charts.iter().try_for_each(Chart::validate)
    }
}

/// Insight as returned by the API.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct InsightResponse {
    pub id: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub summary: String,
    pub insights: String,
    pub recommendations: String,
    #[schema(value_type = Vec<Object>)]
    pub charts: Vec<Chart>,
    #[serde(rename = "assistantChat")]
    #[schema(value_type = Vec<Object>)]
    pub assistant_chat: Vec<ChatMessage>,
    #[serde(rename = "rawResponse", skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<Insight> for InsightResponse {
    fn from(insight: Insight) -> Self {
        InsightResponse {
            id: insight.id.to_hex(),
            file_name: insight.file_name,
            summary: insight.summary,
            insights: insight.insights,
            recommendations: insight.recommendations,
            charts: insight.charts,
            assistant_chat: insight.assistant_chat,
            raw_response: insight.raw_response,
            created_at: insight.created_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}
