//! Redaction of secrets before connection strings reach the logs.

use std::sync::LazyLock;

use regex::Regex;

/// `scheme://user:` + password + `@host...`. The password runs to the last
/// `@`, so unencoded `@` inside it stays hidden.
static PASSWORD_IN_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(postgres(?:ql)?://[^:/@]+:)(.+)(@[^@]+)$").expect("valid regex")
});

/// Replace the password in a Postgres URL with `*****`.
///
/// URLs without an inline password are returned unchanged.
pub fn mask_database_url(url: &str) -> String {
    PASSWORD_IN_URL.replace(url, "${1}*****${3}").into_owned()
}
