use mission_core::{Config, Strategy};

/// Outcome of routing a task: which strategy to run and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlan {
    pub strategy: Strategy,
    pub endpoint: String,
}

/// Picks the fast or general path from the task text. Never performs I/O.
#[derive(Debug, Clone)]
pub struct ModeRouter {
    keywords: Vec<String>,
    search_endpoint: String,
    stream_endpoint: String,
}

impl ModeRouter {
    pub fn new(
        keywords: Vec<String>,
        search_endpoint: impl Into<String>,
        stream_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|keyword| keyword.to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
            search_endpoint: search_endpoint.into(),
            stream_endpoint: stream_endpoint.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.fast_keywords.clone(),
            config.search_url(),
            config.stream_url(),
        )
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// The first keyword found in the task, if any.
    pub fn matched_keyword(&self, task: &str) -> Option<&str> {
        let task = task.to_lowercase();
        self.keywords
            .iter()
            .find(|keyword| task.contains(keyword.as_str()))
            .map(String::as_str)
    }

    pub fn strategy(&self, task: &str) -> Strategy {
        if self.matched_keyword(task).is_some() {
            Strategy::Fast
        } else {
            Strategy::General
        }
    }

    pub fn endpoint(&self, strategy: Strategy) -> &str {
        match strategy {
            Strategy::Fast => &self.search_endpoint,
            Strategy::General => &self.stream_endpoint,
        }
    }

    pub fn route(&self, task: &str) -> RoutePlan {
        self.plan(self.strategy(task))
    }

    /// Plan for an explicitly chosen strategy.
    pub fn plan(&self, strategy: Strategy) -> RoutePlan {
        RoutePlan {
            strategy,
            endpoint: self.endpoint(strategy).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> ModeRouter {
        ModeRouter::from_config(&Config::default())
    }

    #[test]
    fn document_queries_take_fast_path() {
        let router = router();
        for task in [
            "show me the report",
            "find the HRMS abstract",
            "What Is the leave POLICY?",
            "Explain the introduction",
        ] {
            assert_eq!(router.strategy(task), Strategy::Fast, "{task}");
        }
    }

    #[test]
    fn other_tasks_take_general_path() {
        let router = router();
        for task in ["plan a product launch", "design a rollout plan", ""] {
            assert_eq!(router.strategy(task), Strategy::General, "{task}");
        }
    }

    #[test]
    fn route_is_deterministic_and_carries_endpoint() {
        let router = router();
        let first = router.route("show me the report");
        for _ in 0..5 {
            assert_eq!(router.route("show me the report"), first);
        }
        assert_eq!(first.strategy, Strategy::Fast);
        assert_eq!(first.endpoint, "http://localhost:8001/search");

        let general = router.route("plan a product launch");
        assert_eq!(general.strategy, Strategy::General);
        assert_eq!(general.endpoint, "http://localhost:8001/agent/stream");
    }

    #[test]
    fn first_keyword_in_list_order_is_reported() {
        let router = ModeRouter::new(
            vec!["report".to_string(), "find".to_string()],
            "s",
            "g",
        );
        assert_eq!(router.matched_keyword("find the report"), Some("report"));
        assert_eq!(router.strategy("find the report"), Strategy::Fast);
    }

    #[test]
    fn keywords_are_normalised_to_lowercase() {
        let router = ModeRouter::new(vec!["Manual".to_string(), String::new()], "s", "g");
        assert_eq!(router.keywords(), ["manual".to_string()]);
        assert_eq!(router.strategy("read the MANUAL"), Strategy::Fast);
        assert_eq!(router.strategy("anything"), Strategy::General);
    }
}
