/// Cache key: operation scope plus serialized parameters.
///
/// A key with fewer parameters acts as a prefix filter for invalidation, so
/// `messages` matches every `messages/<counterpart>` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    scope: &'static str,
    params: Vec<String>,
}

impl QueryKey {
    pub fn new(scope: &'static str) -> Self {
        Self {
            scope,
            params: Vec::new(),
        }
    }

    pub fn with(mut self, param: impl ToString) -> Self {
        self.params.push(param.to_string());
        self
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Whether `self` falls under `filter`.
    pub fn matches(&self, filter: &QueryKey) -> bool {
        self.scope == filter.scope && self.params.starts_with(&filter.params)
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.scope)?;
        for param in &self.params {
            write!(f, "/{param}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matching() {
        let key = QueryKey::new("messages").with("aaaaa-aa");
        assert!(key.matches(&QueryKey::new("messages")));
        assert!(key.matches(&QueryKey::new("messages").with("aaaaa-aa")));
        assert!(!key.matches(&QueryKey::new("messages").with("bbbbb-bb")));
        assert!(!key.matches(&QueryKey::new("isBlocked")));
        assert!(!QueryKey::new("messages").matches(&key));
    }

    #[test]
    fn test_display() {
        let key = QueryKey::new("discoveryFeed").with(0).with(50);
        assert_eq!(key.to_string(), "discoveryFeed/0/50");
    }
}
