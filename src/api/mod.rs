//! Client for the remote news service.
//!
//! - [`NewsGateway`] is the seam the retrieval pipeline depends on
//! - [`NewsClient`] implements it over HTTP for NewsAPI-compatible endpoints
//! - `wire` holds the JSON response shapes and their conversion to [`crate::model`] types

mod newsapi;
mod wire;

pub use newsapi::{
    ClientOptions, GatewayError, NewsClient, NewsGateway, SearchFilters, DEFAULT_BASE_URL,
    DEFAULT_COUNTRY, DEFAULT_PAGE_SIZE,
};
