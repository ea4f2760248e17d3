//! Connection string domain types
//!
//! Connection strings are parsed into ordered `key=value` segments and
//! reserialized, so host rewriting and password masking only ever touch the
//! value of the segment they target. Everything else round-trips byte for byte.

use std::fmt;

/// Fixed-width marker that replaces password values in diagnostics
pub const MASK: &str = "****";

/// Keys that carry the database host (ADO.NET / Npgsql spellings)
const HOST_KEYS: &[&str] = &[
    "server",
    "host",
    "data source",
    "address",
    "addr",
    "network address",
];

/// Keys that carry a secret
const PASSWORD_KEYS: &[&str] = &["password", "pwd"];

/// One `key=value` piece of a connection string
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    /// Raw key text including any surrounding whitespace; `None` for pieces without `=`
    key: Option<String>,
    value: String,
}

impl Segment {
    fn parse(raw: &str) -> Self {
        match raw.split_once('=') {
            Some((key, value)) => Self {
                key: Some(key.to_string()),
                value: value.to_string(),
            },
            None => Self {
                key: None,
                value: raw.to_string(),
            },
        }
    }

    fn key_is(&self, names: &[&str]) -> bool {
        self.key
            .as_deref()
            .map(|k| names.contains(&k.trim().to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Value with surrounding whitespace and one level of quoting removed.
    ///
    /// Returns the quoted text as written and, when it contains doubled
    /// quotes, the unescaped secret as well.
    fn bare_values(&self) -> Vec<String> {
        let value = self.value.trim();
        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                let inner = &value[1..value.len() - 1];
                let doubled: String = [quote, quote].iter().collect();
                let unescaped = inner.replace(&doubled, &quote.to_string());
                if unescaped == inner {
                    return vec![unescaped];
                }
                return vec![inner.to_string(), unescaped];
            }
        }
        vec![value.to_string()]
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}={}", key, self.value),
            None => f.write_str(&self.value),
        }
    }
}

/// Split on top-level `;`. A value that starts with a quote runs until the
/// matching quote, so `Password="a;b"` stays one segment. A doubled quote
/// inside a quoted value is an escaped quote, not the end of the value.
fn split_segments(raw: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut seen_eq = false;
    let mut value_empty = true;

    let mut chars = raw.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                if matches!(chars.peek(), Some(&(_, next)) if next == q) {
                    chars.next();
                } else {
                    quote = None;
                }
            }
            continue;
        }
        match c {
            ';' => {
                segments.push(Segment::parse(&raw[start..i]));
                start = i + 1;
                seen_eq = false;
                value_empty = true;
            }
            '=' if !seen_eq => seen_eq = true,
            '"' | '\'' if seen_eq && value_empty => {
                quote = Some(c);
                value_empty = false;
            }
            c if seen_eq && !c.is_whitespace() => value_empty = false,
            _ => {}
        }
    }
    segments.push(Segment::parse(&raw[start..]));
    segments
}

fn join_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(Segment::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

/// Replace the host part of a host segment value if it is one of `aliases`.
///
/// Keeps an optional `tcp:` prefix and any `,port` / `:port` / `\instance` suffix.
fn replace_host(value: &mut String, aliases: &[String], target: &str) -> Option<String> {
    let leading = value.len() - value.trim_start().len();
    let body = &value[leading..];
    let prefix_len = match body.get(..4) {
        Some(p) if p.eq_ignore_ascii_case("tcp:") => 4,
        _ => 0,
    };
    let host_start = leading + prefix_len;
    let rest = &value[host_start..];
    let host_len = rest
        .find(|c: char| matches!(c, ',' | ':' | '\\' | '/') || c.is_whitespace())
        .unwrap_or(rest.len());
    let host = &rest[..host_len];

    let alias = aliases.iter().find(|a| a.eq_ignore_ascii_case(host))?.clone();
    value.replace_range(host_start..host_start + host_len, target);
    Some(alias)
}

/// Rewrite the first host segment that names one of `aliases` to `target`.
///
/// Returns the rewritten string and the alias that was replaced, if any.
/// Later host segments are left alone even if they also name an alias.
pub fn rewrite_host_alias(raw: &str, aliases: &[String], target: &str) -> (String, Option<String>) {
    let mut segments = split_segments(raw);
    let mut replaced = None;

    for segment in segments.iter_mut().filter(|s| s.key_is(HOST_KEYS)) {
        if let Some(alias) = replace_host(&mut segment.value, aliases, target) {
            replaced = Some(alias);
            break;
        }
    }

    (join_segments(&segments), replaced)
}

/// Render a connection string with every password value replaced by [`MASK`].
///
/// Idempotent: masking a masked string returns it unchanged.
pub fn mask_connection_string(raw: &str) -> String {
    let mut segments = split_segments(raw);
    for segment in segments.iter_mut().filter(|s| s.key_is(PASSWORD_KEYS)) {
        segment.value = MASK.to_string();
    }
    join_segments(&segments)
}

/// A resolved connection string for one service
///
/// `Debug` and `Display` both render the masked form; the secret is only
/// reachable through [`ConnectionSpec::resolved_value`].
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSpec {
    source_key: String,
    raw_value: String,
    resolved_value: String,
    resolved_host_alias: Option<String>,
}

impl ConnectionSpec {
    /// Build a spec from a raw value, rewriting the first host alias to `target`
    pub fn new(
        source_key: impl Into<String>,
        raw_value: impl Into<String>,
        host_aliases: &[String],
        target: &str,
    ) -> Self {
        let raw_value = raw_value.into();
        let (resolved_value, resolved_host_alias) =
            rewrite_host_alias(&raw_value, host_aliases, target);
        Self {
            source_key: source_key.into(),
            raw_value,
            resolved_value,
            resolved_host_alias,
        }
    }

    /// Environment key the value was read from
    pub fn source_key(&self) -> &str {
        &self.source_key
    }

    /// Value handed to the migration tool (host alias rewritten)
    pub fn resolved_value(&self) -> &str {
        &self.resolved_value
    }

    /// Alias that was rewritten, if the value named one
    pub fn resolved_host_alias(&self) -> Option<&str> {
        self.resolved_host_alias.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved_value.trim().is_empty()
    }

    /// Diagnostic rendering with passwords masked
    pub fn masked(&self) -> String {
        mask_connection_string(&self.resolved_value)
    }

    /// Remove this connection's secrets from arbitrary text (tool output, command lines)
    pub fn scrub(&self, text: &str) -> String {
        let mut scrubbed = text
            .replace(&self.resolved_value, &self.masked())
            .replace(&self.raw_value, &mask_connection_string(&self.raw_value));
        for secret in self.password_values() {
            scrubbed = scrubbed.replace(&secret, MASK);
        }
        scrubbed
    }

    fn password_values(&self) -> Vec<String> {
        split_segments(&self.resolved_value)
            .iter()
            .filter(|s| s.key_is(PASSWORD_KEYS))
            .flat_map(|s| s.bare_values())
            .filter(|v| !v.is_empty())
            .collect()
    }
}

impl fmt::Debug for ConnectionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSpec")
            .field("source_key", &self.source_key)
            .field("value", &self.masked())
            .field("resolved_host_alias", &self.resolved_host_alias)
            .finish()
    }
}

impl fmt::Display for ConnectionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases() -> Vec<String> {
        vec!["mssql".to_string(), "postgres".to_string()]
    }

    #[test]
    fn test_backend_fallback_scenario() {
        let spec = ConnectionSpec::new(
            "CONNECTION_STRING",
            "Server=mssql;Database=AuthDb;User=sa;Password=pw;",
            &aliases(),
            "localhost",
        );
        assert_eq!(
            spec.resolved_value(),
            "Server=localhost;Database=AuthDb;User=sa;Password=pw;"
        );
        assert_eq!(spec.resolved_host_alias(), Some("mssql"));
        assert!(spec.masked().contains("Password=****"));
        assert!(!spec.masked().contains("pw"));
    }

    #[test]
    fn test_password_containing_alias_is_untouched() {
        let (rewritten, alias) = rewrite_host_alias(
            "Server=mssql;Database=App;Password=mssql-secret;",
            &aliases(),
            "localhost",
        );
        assert_eq!(
            rewritten,
            "Server=localhost;Database=App;Password=mssql-secret;"
        );
        assert_eq!(alias.as_deref(), Some("mssql"));
    }

    #[test]
    fn test_only_first_host_occurrence_rewritten() {
        // Multiple host segments are ambiguous; only the first match is rewritten.
        let (rewritten, _) = rewrite_host_alias(
            "Server=mssql;Failover Partner=x;Data Source=mssql;",
            &aliases(),
            "localhost",
        );
        assert_eq!(
            rewritten,
            "Server=localhost;Failover Partner=x;Data Source=mssql;"
        );
    }

    #[test]
    fn test_rewrite_keeps_port_and_prefix() {
        let (rewritten, _) = rewrite_host_alias(
            "Server=tcp:mssql,1433;Database=App",
            &aliases(),
            "localhost",
        );
        assert_eq!(rewritten, "Server=tcp:localhost,1433;Database=App");

        let (rewritten, alias) = rewrite_host_alias(
            "Host=postgres;Port=5432;Username=app;Password=pg",
            &aliases(),
            "localhost",
        );
        assert_eq!(rewritten, "Host=localhost;Port=5432;Username=app;Password=pg");
        assert_eq!(alias.as_deref(), Some("postgres"));
    }

    #[test]
    fn test_rewrite_ignores_hosts_that_merely_contain_alias() {
        let (rewritten, alias) =
            rewrite_host_alias("Server=mssql-replica;Database=App", &aliases(), "localhost");
        assert_eq!(rewritten, "Server=mssql-replica;Database=App");
        assert!(alias.is_none());
    }

    #[test]
    fn test_unrelated_strings_round_trip_exactly() {
        let raw = " Server = db.internal ; Database=App;;Trusted_Connection=True;";
        let (rewritten, alias) = rewrite_host_alias(raw, &aliases(), "localhost");
        assert_eq!(rewritten, raw);
        assert!(alias.is_none());
    }

    #[test]
    fn test_masking_is_idempotent() {
        let once = mask_connection_string("Server=localhost;User Id=sa;Password=Hunter2!;");
        assert_eq!(once, "Server=localhost;User Id=sa;Password=****;");
        assert_eq!(mask_connection_string(&once), once);
    }

    #[test]
    fn test_masking_covers_every_password_segment() {
        let masked = mask_connection_string("Password=first;Pwd=second;PASSWORD=third");
        assert!(!masked.contains("first"));
        assert!(!masked.contains("second"));
        assert!(!masked.contains("third"));
        assert_eq!(masked, "Password=****;Pwd=****;PASSWORD=****");
    }

    #[test]
    fn test_masking_quoted_password_with_delimiter() {
        let masked = mask_connection_string("Server=x;Password=\"se;cret\";Database=App");
        assert_eq!(masked, "Server=x;Password=****;Database=App");
        assert!(!masked.contains("se;cret"));
        assert!(!masked.contains("cret"));
    }

    #[test]
    fn test_masking_password_with_escaped_quote() {
        let masked = mask_connection_string("Server=x;Password=\"ab\"\"cd;efgh\";Database=App");
        assert_eq!(masked, "Server=x;Password=****;Database=App");
        assert!(!masked.contains("efgh"));
        assert!(!masked.contains("ab"));
    }

    #[test]
    fn test_scrub_handles_escaped_quote_in_password() {
        let spec = ConnectionSpec::new(
            "AUTHDb",
            "Server=mssql;Password='it''s;secret';Database=AuthDb",
            &aliases(),
            "localhost",
        );
        assert!(!spec.masked().contains("secret"));
        let scrubbed = spec.scrub("login as sa with it's;secret failed; raw 'it''s;secret'");
        assert!(!scrubbed.contains("secret"));
    }

    #[test]
    fn test_masking_many_passwords_never_leaks() {
        for secret in ["pw", "p@ss=word", "Str0ng!Pass", "with space"] {
            let raw = format!("Server=mssql;Database=AuthDb;User=sa;Password={};", secret);
            let spec = ConnectionSpec::new("K", raw, &aliases(), "localhost");
            assert!(!spec.masked().contains(secret), "leaked {}", secret);
        }
    }

    #[test]
    fn test_debug_and_display_are_masked() {
        let spec = ConnectionSpec::new(
            "BACKENDDb",
            "Server=mssql;Password=topsecret;",
            &aliases(),
            "localhost",
        );
        assert!(!format!("{:?}", spec).contains("topsecret"));
        assert!(!format!("{}", spec).contains("topsecret"));
    }

    #[test]
    fn test_scrub_removes_secret_from_tool_output() {
        let spec = ConnectionSpec::new(
            "BACKENDDb",
            "Server=mssql;Password=topsecret;",
            &aliases(),
            "localhost",
        );
        let output = "Login failed for connection 'Server=localhost;Password=topsecret;' (topsecret)";
        let scrubbed = spec.scrub(output);
        assert!(!scrubbed.contains("topsecret"));
        assert!(scrubbed.contains("Password=****"));
    }

    #[test]
    fn test_empty_value() {
        let spec = ConnectionSpec::new("K", "   ", &aliases(), "localhost");
        assert!(spec.is_empty());
    }
}
