//! Search-augmented workflow planner: one web search, then one completion.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::DelegateError;
use crate::llm_client::CompletionBackend;
use crate::memory::Message;
use crate::workflow::search::{SearchHit, SearchTool};
use crate::workflow::WorkflowPlanner;

pub const PLANNER_TEMPERATURE: f32 = 0.0;

const PLANNER_SYSTEM_PROMPT: &str = "You design practical step-by-step workflows. \
Use the web research provided when it is relevant, cite source URLs inline, \
and say so when the research does not cover part of the task. \
Answer with a numbered plan followed by a short list of tools or resources.";

pub struct SearchPlanner {
    backend: Arc<dyn CompletionBackend>,
    search: Arc<dyn SearchTool>,
    model: String,
    temperature: f32,
}

impl SearchPlanner {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        search: Arc<dyn SearchTool>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            search,
            model: model.into(),
            temperature: PLANNER_TEMPERATURE,
        }
    }
}

#[async_trait]
impl WorkflowPlanner for SearchPlanner {
    async fn plan(&self, task: &str) -> Result<String, DelegateError> {
        if task.trim().is_empty() {
            return Err(DelegateError::Planner(
                "no task given after 'workflow:'".to_string(),
            ));
        }
        info!("Planning workflow with {}", self.model);

        let hits = self.search.search(task).await?;
        debug!("Planner received {} search hit(s)", hits.len());
        if hits.is_empty() {
            warn!("No search results for workflow task");
        }

        let messages = vec![
            Message::system(PLANNER_SYSTEM_PROMPT),
            Message::user(research_prompt(task, &hits)),
        ];
        let plan = self
            .backend
            .complete(&messages, &self.model, self.temperature)
            .await?;
        Ok(plan)
    }
}

fn research_prompt(task: &str, hits: &[SearchHit]) -> String {
    let mut prompt = format!("Task: {}\n\nWeb research:\n", task);
    if hits.is_empty() {
        prompt.push_str("(the search returned no findings)\n");
    }
    for (i, hit) in hits.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n   URL: {}\n   {}\n", i + 1, hit.title, hit.url, hit.snippet));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompletionError;
    use std::sync::Mutex;

    struct FixedSearch(Vec<SearchHit>);

    #[async_trait]
    impl SearchTool for FixedSearch {
        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, DelegateError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchTool for FailingSearch {
        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, DelegateError> {
            Err(DelegateError::Search("timeout".into()))
        }
    }

    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<(Vec<Message>, String, f32)>>,
    }

    #[async_trait]
    impl CompletionBackend for RecordingBackend {
        async fn complete(
            &self,
            messages: &[Message],
            model: &str,
            temperature: f32,
        ) -> Result<String, CompletionError> {
            self.calls
                .lock()
                .unwrap()
                .push((messages.to_vec(), model.to_string(), temperature));
            Ok("1. check the forecast".to_string())
        }
    }

    fn hit() -> SearchHit {
        SearchHit {
            title: "Forecast".into(),
            url: "https://weather.example/today".into(),
            snippet: "Sunny, 21C".into(),
        }
    }

    #[tokio::test]
    async fn test_plan_feeds_research_to_model() {
        let backend = Arc::new(RecordingBackend::default());
        let planner = SearchPlanner::new(backend.clone(), Arc::new(FixedSearch(vec![hit()])), "planner-model");

        let plan = planner.plan("find today's weather").await.unwrap();
        assert_eq!(plan, "1. check the forecast");

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (messages, model, temperature) = &calls[0];
        assert_eq!(model, "planner-model");
        assert_eq!(*temperature, 0.0);
        assert_eq!(messages.len(), 2);
        assert!(messages[1].content.contains("Task: find today's weather"));
        assert!(messages[1].content.contains("https://weather.example/today"));
    }

    #[tokio::test]
    async fn test_plan_without_findings_still_asks_model() {
        let backend = Arc::new(RecordingBackend::default());
        let planner = SearchPlanner::new(backend.clone(), Arc::new(FixedSearch(vec![])), "m");

        planner.plan("design a backup routine").await.unwrap();
        let calls = backend.calls.lock().unwrap();
        assert!(calls[0].0[1].content.contains("no findings"));
    }

    #[tokio::test]
    async fn test_search_failure_surfaces_as_delegate_error() {
        let backend = Arc::new(RecordingBackend::default());
        let planner = SearchPlanner::new(backend.clone(), Arc::new(FailingSearch), "m");

        let err = planner.plan("anything").await.unwrap_err();
        assert!(err.to_string().contains("timeout"));
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_task_rejected() {
        let planner = SearchPlanner::new(
            Arc::new(RecordingBackend::default()),
            Arc::new(FixedSearch(vec![])),
            "m",
        );
        assert!(matches!(planner.plan("  ").await, Err(DelegateError::Planner(_))));
    }
}
