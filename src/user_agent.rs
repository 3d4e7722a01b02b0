//! Polite User-Agent construction for Crossref API traffic.
//!
//! Crossref etiquette asks clients to identify themselves and carry a contact
//! address so operators can reach out when a crawler misbehaves. Single source
//! for the UA format so every request stays consistent.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/citenet";

/// Builds the polite User-Agent string carrying the contact mailto.
///
/// Format: `citenet/<version> (<project-url>; mailto:<contact>)`.
#[must_use]
pub(crate) fn polite_user_agent(mailto: &str) -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("citenet/{version} ({PROJECT_UA_URL}; mailto:{mailto})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polite_user_agent_contains_version_url_and_mailto() {
        let ua = polite_user_agent("crawler@example.com");
        assert!(
            ua.starts_with(&format!("citenet/{}", env!("CARGO_PKG_VERSION"))),
            "UA must start with tool name and crate version: {ua}"
        );
        assert!(ua.contains(PROJECT_UA_URL), "UA must contain project URL");
        assert!(
            ua.contains("mailto:crawler@example.com"),
            "UA must carry the contact address: {ua}"
        );
    }

    #[test]
    fn test_polite_user_agent_format_shape() {
        let ua = polite_user_agent("a@b.c");
        assert_eq!(
            ua,
            format!(
                "citenet/{} ({PROJECT_UA_URL}; mailto:a@b.c)",
                env!("CARGO_PKG_VERSION")
            )
        );
    }
}
