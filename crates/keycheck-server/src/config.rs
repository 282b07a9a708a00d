/// Catalog location used when `KEYCHECK_CATALOG_URL` is not set.
pub const DEFAULT_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/YOUR_USERNAME/quarterly-tax-calculator-licenses/main/licenses.json";

/// Fallback presentation values applied to records that leave a field blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationDefaults {
    pub primary_color: String,
    pub cta_url: String,
    pub cta_text: String,
}

impl Default for PresentationDefaults {
    fn default() -> Self {
        Self {
            primary_color: "#4f46e5".into(),
            cta_url: "#".into(),
            cta_text: "📞 Schedule a Tax Consultation".into(),
        }
    }
}
