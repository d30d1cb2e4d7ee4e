use std::net::IpAddr;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("Private IP address not allowed: {0}")]
    PrivateIp(String),
    #[error("Localhost not allowed")]
    Localhost,
    #[error("URL has no host")]
    MissingHost,
}

/// Validate a URL the application will fetch itself (article downloads).
///
/// Rejects non-HTTP(S) schemes, localhost, and private or link-local
/// addresses, since article URLs come from third-party publishers.
///
/// ```
/// use newsdesk::util::validate_url;
///
/// assert!(validate_url("https://example.com/story.html").is_ok());
/// assert!(validate_url("http://192.168.1.1/story").is_err());
/// assert!(validate_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = validate_url_for_open(url_str)?;

    if let Some(host) = url.host_str() {
        if host == "localhost" {
            return Err(UrlValidationError::Localhost);
        }

        let host_for_parse = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        if let Ok(ip) = host_for_parse.parse::<IpAddr>() {
            if ip.is_loopback() {
                return Err(UrlValidationError::Localhost);
            }
            if is_private_ip(&ip) {
                return Err(UrlValidationError::PrivateIp(ip.to_string()));
            }
        }
    }

    Ok(url)
}

/// Validate a URL before handing it to the system browser.
///
/// Only the scheme and host are checked: the browser, not this process,
/// makes the request.
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            ipv4.is_private() || ipv4.is_loopback() || ipv4.is_link_local() || ipv4.is_unspecified()
        }
        IpAddr::V6(ipv6) => {
            if ipv6.is_loopback() || ipv6.is_unspecified() {
                return true;
            }
            let segments = ipv6.segments();
            // fc00::/7
            let is_unique_local = (segments[0] & 0xfe00) == 0xfc00;
            // fe80::/10
            let is_link_local = (segments[0] & 0xffc0) == 0xfe80;
            is_unique_local || is_link_local
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_article_urls_accepted() {
        assert!(validate_url("https://www.bbc.co.uk/news/world-123").is_ok());
        assert!(validate_url("http://news.example.org:8080/a").is_ok());
    }

    #[test]
    fn test_invalid_schemes() {
        assert!(validate_url("file:///etc/passwd").is_err());
        assert!(validate_url_for_open("javascript:alert(1)").is_err());
        assert!(validate_url_for_open("ftp://example.com").is_err());
    }

    #[test]
    fn test_local_targets_rejected_for_fetch() {
        assert!(validate_url("http://localhost/a").is_err());
        assert!(validate_url("http://127.0.0.1/a").is_err());
        assert!(validate_url("http://[::1]/a").is_err());
        assert!(validate_url("http://10.0.0.1:3000/a").is_err());
        assert!(validate_url("http://169.254.1.1/a").is_err());
        assert!(validate_url("http://[fe80::1]/a").is_err());
        assert!(validate_url("http://0.0.0.0/a").is_err());
    }

    #[test]
    fn test_open_allows_any_http_host() {
        assert!(validate_url_for_open("http://localhost:3000/article").is_ok());
        assert!(validate_url_for_open("https://example.com/a").is_ok());
    }
}
