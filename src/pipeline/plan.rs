use crate::api::{GatewayError, NewsGateway, SearchFilters};
use crate::filters::{Category, FilterOptions};
use crate::model::ArticlePage;
use chrono::{DateTime, TimeZone};

/// Which gateway call a request maps to, with all parameters resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPlan {
    TopHeadlines {
        query: String,
        category: Category,
    },
    Everything {
        query: String,
        filters: SearchFilters,
    },
}

impl RequestPlan {
    /// Choose the endpoint for a query/filter combination.
    ///
    /// A non-empty query or a bounded date range needs the search endpoint
    /// (headlines cannot be date-filtered); everything else goes to top
    /// headlines scoped by category. Date bounds are resolved against `now`.
    pub fn resolve<Tz: TimeZone>(query: &str, filters: &FilterOptions, now: DateTime<Tz>) -> Self {
        let query = query.trim();
        if !query.is_empty() || filters.needs_search() {
            RequestPlan::Everything {
                query: query.to_string(),
                filters: SearchFilters::new(filters.date_range.resolve(now), filters.sort_by),
            }
        } else {
            RequestPlan::TopHeadlines {
                query: String::new(),
                category: filters.category,
            }
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, RequestPlan::Everything { .. })
    }

    pub async fn execute(
        &self,
        gateway: &dyn NewsGateway,
        page: u32,
    ) -> Result<ArticlePage, GatewayError> {
        match self {
            RequestPlan::TopHeadlines { query, category } => {
                gateway.top_headlines(query, page, *category).await
            }
            RequestPlan::Everything { query, filters } => {
                gateway.search_everything(query, page, filters).await
            }
        }
    }
}
