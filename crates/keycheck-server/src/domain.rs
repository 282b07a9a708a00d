//! Resolution of the calling site's hostname and the domain-restriction rule.
//!
//! Matching is plain substring containment: a license for `example.com`
//! also passes for `notexample.com.evil.org`. Callers relying on the
//! restriction for anything stronger than branding should be aware of it.

use url::Url;

/// Origin assumed when the request carries neither `Referer` nor `Origin`.
pub const LOCAL_FALLBACK: &str = "http://localhost";

/// Hosts for which the domain restriction is not enforced.
const EXEMPT_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// Preview deployments live under this domain and are always exempt.
const PREVIEW_DOMAIN: &str = "vercel.app";

/// Hostname of `referer`, else `origin`, else [`LOCAL_FALLBACK`].
///
/// Empty header values count as absent. A value that is present but not an
/// absolute URL is an error. URLs without a host (e.g. `file:`) resolve to
/// the empty string.
pub fn request_host(referer: Option<&str>, origin: Option<&str>) -> Result<String, url::ParseError> {
    let source = [referer, origin]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or(LOCAL_FALLBACK);

    let url = Url::parse(source)?;
    Ok(url.host_str().unwrap_or_default().to_owned())
}

/// Development and preview hosts skip the domain check entirely.
pub fn is_exempt(host: &str) -> bool {
    host.contains(PREVIEW_DOMAIN) || EXEMPT_HOSTS.contains(&host)
}

/// Returns true if a request from `host` may use a license restricted to `domain`.
pub fn host_allowed(host: &str, domain: &str) -> bool {
    is_exempt(host) || host.contains(domain)
}
