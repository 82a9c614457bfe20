pub mod planner;
pub mod search;

pub use planner::SearchPlanner;
pub use search::{DuckDuckGoSearch, SearchHit, SearchTool};

use async_trait::async_trait;

use crate::error::DelegateError;

/// Turns a free-text task into a plain-text plan. The session loop treats
/// implementations as opaque and never lets their errors escape.
#[async_trait]
pub trait WorkflowPlanner: Send + Sync {
    async fn plan(&self, task: &str) -> Result<String, DelegateError>;
}
