//! What to stream: a log source address plus a resource identifier.

use std::fmt;

/// Address used when a target does not name one
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8080";

/// Path segment under which the log source serves streams
pub const LOGSTREAM_PATH: &str = "logstream";

/// Identifies one log stream: `(address, resource id)`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Target {
    address: Option<String>,
    resource_id: Option<String>,
}

impl Target {
    /// Target on the default address
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            address: None,
            resource_id: Some(resource_id.into()),
        }
    }

    /// Target with no resource; starting it is a no-op
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a target from optional parts, as they arrive from callers
    pub fn from_parts(address: Option<String>, resource_id: Option<String>) -> Self {
        Self {
            address: address.filter(|a| !a.trim().is_empty()),
            resource_id,
        }
    }

    /// Sets an explicit `host:port` or `ws://` base address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        let address = address.into();
        self.address = if address.trim().is_empty() {
            None
        } else {
            Some(address.trim().to_string())
        };
        self
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Resource identifier, `None` when absent or empty
    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Whether `start` would open a session for this target
    pub fn is_valid(&self) -> bool {
        self.resource_id().is_some()
    }

    /// Whether the identifier only uses characters the log source routes
    /// (`[-0-9A-Za-z.]`). Others are sent as-is.
    pub fn is_url_safe(&self) -> bool {
        self.resource_id().is_some_and(|id| {
            id.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        })
    }

    /// Resolves `ws://<address>/logstream/<resource id>`.
    ///
    /// An address that already carries a `ws://` or `wss://` scheme is used
    /// as the base URL. Returns `None` for targets without a resource.
    pub fn endpoint(&self, default_address: &str) -> Option<String> {
        let resource_id = self.resource_id()?;
        let address = self.address.as_deref().unwrap_or(default_address);

        let base = if address.starts_with("ws://") || address.starts_with("wss://") {
            address.trim_end_matches('/').to_string()
        } else {
            format!("ws://{}", address.trim_end_matches('/'))
        };

        Some(format!("{}/{}/{}", base, LOGSTREAM_PATH, resource_id))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}",
            self.resource_id().unwrap_or("<none>"),
            self.address.as_deref().unwrap_or("<default>")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_explicit_host_and_port() {
        let target = Target::new("task-abc").with_address("host:9000");
        assert_eq!(
            target.endpoint(DEFAULT_ADDRESS).as_deref(),
            Some("ws://host:9000/logstream/task-abc")
        );
    }

    #[test]
    fn falls_back_to_default_address() {
        let target = Target::new("task-foo");
        assert_eq!(
            target.endpoint(DEFAULT_ADDRESS).as_deref(),
            Some("ws://127.0.0.1:8080/logstream/task-foo")
        );
        assert_eq!(
            target.endpoint("logs:1234").as_deref(),
            Some("ws://logs:1234/logstream/task-foo")
        );
    }

    #[test]
    fn keeps_scheme_of_full_urls() {
        let target = Target::new("web-1.example").with_address("wss://logs.example.com/");
        assert_eq!(
            target.endpoint(DEFAULT_ADDRESS).as_deref(),
            Some("wss://logs.example.com/logstream/web-1.example")
        );
    }

    #[test]
    fn empty_or_missing_resource_is_invalid() {
        assert!(!Target::empty().is_valid());
        assert!(!Target::new("").is_valid());
        assert!(!Target::from_parts(Some("host:1".into()), None).is_valid());
        assert_eq!(Target::new("").endpoint(DEFAULT_ADDRESS), None);
    }

    #[test]
    fn blank_address_means_default() {
        let target = Target::from_parts(Some("  ".into()), Some("a".into()));
        assert_eq!(target.address(), None);
        let target = Target::new("a").with_address("");
        assert_eq!(target.address(), None);
    }

    #[test]
    fn display_does_not_guess_the_default_address() {
        assert_eq!(Target::new("task-foo").to_string(), "task-foo@<default>");
        assert_eq!(
            Target::new("task-foo").with_address("logs:9000").to_string(),
            "task-foo@logs:9000"
        );
        assert_eq!(Target::empty().to_string(), "<none>@<default>");
    }

    #[test]
    fn url_safety_follows_hostname_charset() {
        assert!(Target::new("task-foo.prod").is_url_safe());
        assert!(!Target::new("task foo").is_url_safe());
        assert!(!Target::new("a/b").is_url_safe());
        assert!(!Target::empty().is_url_safe());
    }
}
