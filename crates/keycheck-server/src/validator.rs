use std::sync::Arc;

use chrono::{DateTime, Utc};
use http::StatusCode;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::{
    catalog::{CatalogClient, CatalogError},
    config::PresentationDefaults,
    domain,
    error::ValidationError,
    model::{ClientConfig, LicenseRecord},
};

/// Outcome of a single validation: the client's config, or why it was refused.
pub type ValidationResult = Result<ClientConfig, ValidationError>;

/// Everything a validation looks at from the incoming request.
#[derive(Debug, Clone, Copy)]
pub struct LicenseRequest<'a> {
    pub key: Option<&'a str>,
    pub referer: Option<&'a str>,
    pub origin: Option<&'a str>,
    pub now: DateTime<Utc>,
}

/// Validates license keys against the remote catalog.
#[derive(Clone)]
pub struct Validator {
    catalog: CatalogClient,
    defaults: Arc<PresentationDefaults>,
}

impl Validator {
    pub fn new(catalog: CatalogClient, defaults: PresentationDefaults) -> Self {
        Self {
            catalog,
            defaults: Arc::new(defaults),
        }
    }

    pub fn catalog_url(&self) -> &str {
        self.catalog.url()
    }

    /// Run the full check: key presence, one catalog fetch, then [`evaluate`].
    pub async fn validate(&self, req: &LicenseRequest<'_>) -> ValidationResult {
        let Some(key) = req.key.filter(|k| !k.is_empty()) else {
            info!("rejected: no license key supplied");
            return Err(ValidationError::MissingKey);
        };

        let catalog = match self.catalog.fetch().await {
            Ok(records) => records,
            Err(CatalogError::Status(status)) => {
                error!(%status, url = self.catalog.url(), "failed to fetch licenses");
                return Err(ValidationError::FetchFailed);
            }
            Err(e) => {
                error!(error = %e, url = self.catalog.url(), "license validation error");
                return Err(ValidationError::Internal);
            }
        };

        evaluate(&catalog, key, req, &self.defaults)
    }
}

/// Apply the lookup, status, expiry and domain rules in that order. The first
/// failing rule decides the result.
pub fn evaluate(
    catalog: &[LicenseRecord],
    key: &str,
    req: &LicenseRequest<'_>,
    defaults: &PresentationDefaults,
) -> ValidationResult {
    let Some(record) = catalog.iter().find(|r| r.key.as_deref() == Some(key)) else {
        info!(key, "rejected: license key not found");
        return Err(ValidationError::NotFound);
    };

    if !record.is_active() {
        info!(key, status = ?record.status, "rejected: license inactive");
        return Err(ValidationError::Inactive);
    }

    if record.is_expired(req.now) {
        info!(key, expires = ?record.expires, "rejected: license expired");
        return Err(ValidationError::Expired);
    }

    let host = domain::request_host(req.referer, req.origin).map_err(|e| {
        error!(error = %e, referer = ?req.referer, origin = ?req.origin, "license validation error");
        ValidationError::Internal
    })?;

    if let Some(restricted) = record.restricted_domain() {
        if !domain::host_allowed(&host, restricted) {
            info!(key, %host, domain = restricted, "rejected: domain mismatch");
            return Err(ValidationError::DomainMismatch);
        }
    }

    info!(key, %host, client = ?record.client, "license accepted");
    Ok(record.to_config(defaults))
}

/// Status and JSON body the endpoint returns for `result`.
pub fn render(result: &ValidationResult) -> (StatusCode, Value) {
    match result {
        Ok(config) => (StatusCode::OK, json!({ "valid": true, "config": config })),
        Err(e) => (e.status(), e.body()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn catalog(v: Value) -> Vec<LicenseRecord> {
        serde_json::from_value(v).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn request<'a>(referer: Option<&'a str>) -> LicenseRequest<'a> {
        LicenseRequest {
            key: None,
            referer,
            origin: None,
            now: now(),
        }
    }

    fn check(records: &[LicenseRecord], key: &str, referer: Option<&str>) -> ValidationResult {
        evaluate(records, key, &request(referer), &PresentationDefaults::default())
    }

    #[test]
    fn first_matching_record_wins() {
        let records = catalog(json!([
            {"key": "dup", "status": "active", "client": "First"},
            {"key": "dup", "status": "inactive", "client": "Second"}
        ]));
        let cfg = check(&records, "dup", None).unwrap();
        assert_eq!(cfg.client.as_deref(), Some("First"));
    }

    #[test]
    fn key_match_is_exact() {
        let records = catalog(json!([{"key": "QTC-ABC", "status": "active"}]));
        assert_eq!(check(&records, "qtc-abc", None), Err(ValidationError::NotFound));
        assert_eq!(check(&records, "QTC-AB", None), Err(ValidationError::NotFound));
        assert!(check(&records, "QTC-ABC", None).is_ok());
    }

    #[test]
    fn inactive_takes_precedence_over_expired_and_domain() {
        let records = catalog(json!([{
            "key": "k", "status": "suspended", "expires": "2000-01-01", "domain": "example.com"
        }]));
        assert_eq!(
            check(&records, "k", Some("https://other.com")),
            Err(ValidationError::Inactive)
        );
    }

    #[test]
    fn expired_takes_precedence_over_domain() {
        let records = catalog(json!([{
            "key": "k", "status": "active", "expires": "2026-02-28", "domain": "example.com"
        }]));
        assert_eq!(
            check(&records, "k", Some("https://other.com")),
            Err(ValidationError::Expired)
        );
    }

    #[test]
    fn malformed_expiry_passes_through() {
        let records = catalog(json!([{"key": "k", "status": "active", "expires": "someday"}]));
        assert!(check(&records, "k", None).is_ok());
    }

    #[test]
    fn domain_mismatch_unless_exempt() {
        let records = catalog(json!([{"key": "k", "status": "active", "domain": "example.com"}]));
        assert_eq!(
            check(&records, "k", Some("https://other.com/")),
            Err(ValidationError::DomainMismatch)
        );
        assert!(check(&records, "k", Some("https://www.example.com/")).is_ok());
        assert!(check(&records, "k", Some("https://pr-12.vercel.app/")).is_ok());
        assert!(check(&records, "k", Some("http://127.0.0.1:5173/")).is_ok());
        assert!(check(&records, "k", None).is_ok());
    }

    #[test]
    fn bad_referer_is_internal_only_when_reached() {
        let records = catalog(json!([
            {"key": "ok", "status": "active"},
            {"key": "off", "status": "inactive"}
        ]));
        assert_eq!(check(&records, "ok", Some("::garbage::")), Err(ValidationError::Internal));
        assert_eq!(check(&records, "off", Some("::garbage::")), Err(ValidationError::Inactive));
    }

    #[test]
    fn render_success_body() {
        let records = catalog(json!([{
            "key": "k", "status": "active", "client": "Acme", "domain": "acme.com",
            "logo": "https://acme.com/logo.png", "webhook": "https://hooks.acme.com/lead"
        }]));
        let result = check(&records, "k", Some("https://acme.com/calc"));
        let (status, body) = render(&result);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "valid": true,
                "config": {
                    "client": "Acme",
                    "domain": "acme.com",
                    "logo": "https://acme.com/logo.png",
                    "primaryColor": "#4f46e5",
                    "webhook": "https://hooks.acme.com/lead",
                    "ctaUrl": "#",
                    "ctaText": "📞 Schedule a Tax Consultation"
                }
            })
        );
    }
}
