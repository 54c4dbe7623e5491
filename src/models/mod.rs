pub mod insight;
pub mod user;
pub mod workspace;

pub use insight::*;
pub use user::{User, UserInfo};
pub use workspace::{
    AddMemberRequest, CreateWorkspaceRequest, UpdateWorkspaceRequest, Workspace, WorkspaceResponse,
};
