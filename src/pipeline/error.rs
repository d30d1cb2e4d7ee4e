use crate::api::GatewayError;

/// Classification of a failed (or empty) retrieval, used to pick the error view.
///
/// None of these are retried automatically; retry is always a user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No connectivity or the request timed out.
    Network,
    /// The remote service answered with a 5xx status.
    Server,
    /// The first page of a filter session came back empty.
    NotFound,
    /// Anything else: 4xx, malformed responses, missing API key.
    General,
}

impl ErrorKind {
    /// Classify a gateway failure.
    ///
    /// Connectivity and timeout failures are `Network`; any HTTP status of 500
    /// or above is `Server`; everything else, including 404, is `General`.
    pub fn classify(error: &GatewayError) -> Self {
        if error.is_connectivity() {
            ErrorKind::Network
        } else if error.status().is_some_and(|status| status >= 500) {
            ErrorKind::Server
        } else {
            ErrorKind::General
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ErrorKind::Network => "No connection",
            ErrorKind::Server => "News service unavailable",
            ErrorKind::NotFound => "No articles found",
            ErrorKind::General => "Something went wrong",
        }
    }

    /// Remediation hints shown under the error title.
    pub fn tips(self) -> &'static [&'static str] {
        match self {
            ErrorKind::Network => &[
                "Check your internet connection",
                "If you are behind a proxy, make sure it allows HTTPS",
                "Press r to try again",
            ],
            ErrorKind::Server => &[
                "The news service is having problems right now",
                "Wait a few minutes, then press r to try again",
            ],
            ErrorKind::NotFound => &[
                "Try a different or shorter search term",
                "Widen the date range or pick another category",
            ],
            ErrorKind::General => &[
                "Check that your API key is set (NEWSAPI_KEY or config.toml)",
                "Free API plans only return the first 100 results",
                "Press r to try again",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_statuses() {
        let server = GatewayError::HttpStatus {
            status: 503,
            message: None,
        };
        assert_eq!(ErrorKind::classify(&server), ErrorKind::Server);

        let boundary = GatewayError::HttpStatus {
            status: 500,
            message: None,
        };
        assert_eq!(ErrorKind::classify(&boundary), ErrorKind::Server);

        let not_found = GatewayError::HttpStatus {
            status: 404,
            message: Some("gone".to_string()),
        };
        assert_eq!(ErrorKind::classify(&not_found), ErrorKind::General);

        let unauthorized = GatewayError::HttpStatus {
            status: 401,
            message: None,
        };
        assert_eq!(ErrorKind::classify(&unauthorized), ErrorKind::General);
    }

    #[test]
    fn test_non_http_failures_are_general() {
        assert_eq!(
            ErrorKind::classify(&GatewayError::MissingApiKey),
            ErrorKind::General
        );
        assert_eq!(
            ErrorKind::classify(&GatewayError::ResponseTooLarge(10)),
            ErrorKind::General
        );
        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        assert_eq!(
            ErrorKind::classify(&GatewayError::Parse(parse)),
            ErrorKind::General
        );
    }

    #[test]
    fn test_every_kind_has_tips() {
        for kind in [
            ErrorKind::Network,
            ErrorKind::Server,
            ErrorKind::NotFound,
            ErrorKind::General,
        ] {
            assert!(!kind.title().is_empty());
            assert!(!kind.tips().is_empty());
        }
    }
}
