use super::error::ErrorKind;
use super::plan::RequestPlan;
use super::state::{Event, FetchRequest};
use crate::api::NewsGateway;
use chrono::Local;
use std::sync::Arc;

/// Runs [`FetchRequest`]s against a gateway and turns the outcome into an [`Event`].
#[derive(Clone)]
pub struct Retriever {
    gateway: Arc<dyn NewsGateway>,
}

impl Retriever {
    pub fn new(gateway: Arc<dyn NewsGateway>) -> Self {
        Self { gateway }
    }

    /// Fetch with date ranges resolved against the local clock.
    pub async fn fetch(&self, request: &FetchRequest) -> Event {
        let plan = RequestPlan::resolve(&request.query, &request.filters, Local::now());
        self.execute(request, &plan).await
    }

    pub async fn execute(&self, request: &FetchRequest, plan: &RequestPlan) -> Event {
        tracing::debug!(
            generation = request.generation,
            page = request.page,
            search = plan.is_search(),
            "Fetching articles"
        );
        match plan.execute(self.gateway.as_ref(), request.page).await {
            Ok(result) => {
                tracing::info!(
                    page = request.page,
                    count = result.articles.len(),
                    total = result.total_results,
                    "Fetched articles"
                );
                Event::FetchSucceeded {
                    generation: request.generation,
                    page: request.page,
                    result,
                }
            }
            Err(e) => {
                let kind = ErrorKind::classify(&e);
                tracing::warn!(page = request.page, ?kind, error = %e, "Article fetch failed");
                Event::FetchFailed {
                    generation: request.generation,
                    page: request.page,
                    kind,
                    message: Some(e.server_message().map(str::to_string).unwrap_or_else(|| e.to_string())),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{GatewayError, SearchFilters};
    use crate::filters::{Category, DateRange, FilterOptions};
    use crate::model::{test_article, ArticlePage};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Headlines(String, u32, Category),
        Search(String, u32, SearchFilters),
    }

    #[derive(Default)]
    struct FakeGateway {
        calls: Mutex<Vec<Call>>,
        fail_with: Option<u16>,
    }

    impl FakeGateway {
        fn respond(&self) -> Result<ArticlePage, GatewayError> {
            match self.fail_with {
                Some(status) => Err(GatewayError::HttpStatus {
                    status,
                    message: None,
                }),
                None => Ok(ArticlePage {
                    articles: vec![test_article("https://example.com/a", "A")],
                    total_results: 1,
                    received: 1,
                }),
            }
        }
    }

    #[async_trait]
    impl NewsGateway for FakeGateway {
        async fn top_headlines(
            &self,
            query: &str,
            page: u32,
            category: Category,
        ) -> Result<ArticlePage, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Headlines(query.to_string(), page, category));
            self.respond()
        }

        async fn search_everything(
            &self,
            query: &str,
            page: u32,
            filters: &SearchFilters,
        ) -> Result<ArticlePage, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Search(query.to_string(), page, *filters));
            self.respond()
        }
    }

    fn request(query: &str, page: u32, filters: FilterOptions) -> FetchRequest {
        FetchRequest {
            generation: 7,
            page,
            query: query.to_string(),
            filters,
        }
    }

    #[tokio::test]
    async fn test_headlines_for_plain_browse() {
        let gateway = Arc::new(FakeGateway::default());
        let retriever = Retriever::new(gateway.clone());
        let filters = FilterOptions::default().with_category(Category::Science);

        let event = retriever.fetch(&request("", 1, filters)).await;

        assert!(matches!(event, Event::FetchSucceeded { generation: 7, page: 1, .. }));
        assert_eq!(
            gateway.calls.lock().unwrap().clone(),
            vec![Call::Headlines(String::new(), 1, Category::Science)]
        );
    }

    #[tokio::test]
    async fn test_search_for_query_second_page() {
        let gateway = Arc::new(FakeGateway::default());
        let retriever = Retriever::new(gateway.clone());

        retriever
            .fetch(&request("bitcoin", 2, FilterOptions::default()))
            .await;

        let calls = gateway.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![Call::Search(
                "bitcoin".to_string(),
                2,
                SearchFilters::default()
            )]
        );
    }

    #[tokio::test]
    async fn test_date_range_bounds_reach_gateway() {
        let gateway = Arc::new(FakeGateway::default());
        let retriever = Retriever::new(gateway.clone());
        let filters = FilterOptions::default().with_date_range(DateRange::Week);
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap();
        let plan = RequestPlan::resolve("", &filters, now);

        retriever.execute(&request("", 1, filters), &plan).await;

        let calls = gateway.calls.lock().unwrap().clone();
        match &calls[..] {
            [Call::Search(query, 1, sent)] => {
                assert_eq!(query, "");
                assert_eq!(sent.from, Some(Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap()));
                assert_eq!(sent.to, Some(now));
            }
            other => panic!("unexpected calls {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failure_is_classified() {
        let gateway = Arc::new(FakeGateway {
            fail_with: Some(503),
            ..Default::default()
        });
        let retriever = Retriever::new(gateway);

        let event = retriever
            .fetch(&request("", 3, FilterOptions::default()))
            .await;

        match event {
            Event::FetchFailed {
                generation,
                page,
                kind,
                message,
            } => {
                assert_eq!(generation, 7);
                assert_eq!(page, 3);
                assert_eq!(kind, ErrorKind::Server);
                assert!(message.is_some());
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
