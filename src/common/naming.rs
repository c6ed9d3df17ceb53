//! Name disambiguation for collections that must hold unique names.

use std::collections::HashSet;

/// Hands out unique names within one scope (a model's tables, a table's
/// columns or measures).
///
/// The first occurrence of a name is kept as is; later occurrences get a
/// ` (2)`, ` (3)`, ... suffix, skipping any suffixed name already taken.
#[derive(Debug, Default)]
pub struct NameScope {
    taken: HashSet<String>,
}

impl NameScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name`, returning the name to use and whether it had to change.
    pub fn claim(&mut self, name: &str) -> (String, bool) {
        if self.taken.insert(name.to_string()) {
            return (name.to_string(), false);
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{} ({})", name, n);
            if self.taken.insert(candidate.clone()) {
                return (candidate, true);
            }
            n += 1;
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_suffixes_duplicates() {
        let mut scope = NameScope::new();
        assert_eq!(scope.claim("Total"), ("Total".to_string(), false));
        assert_eq!(scope.claim("Total"), ("Total (2)".to_string(), true));
        assert_eq!(scope.claim("Total"), ("Total (3)".to_string(), true));
    }

    #[test]
    fn test_claim_skips_taken_suffix() {
        let mut scope = NameScope::new();
        scope.claim("Total (2)");
        scope.claim("Total");
        assert_eq!(scope.claim("Total"), ("Total (3)".to_string(), true));
        assert!(scope.contains("Total (2)"));
    }
}
