//! Shared User-Agent string for Pfam and PubSEED traffic.
//!
//! Single source for the project URL and UA format so every request the tool
//! makes identifies itself the same way (good citizenship; RFC 9308).

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/nicksrandall/pfam-fusions";

/// Default User-Agent for every outbound request.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("pfam-fusions/{version} (research-tool; +{PROJECT_UA_URL})")
}
