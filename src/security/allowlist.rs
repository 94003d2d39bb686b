//! Command allowlist policy.
//!
//! This module holds the set of base commands an administrator permits and
//! decides whether a candidate command string may run.

use std::collections::HashSet;

use crate::config::ConfigError;

/// Sentinel specification that permits every command.
pub const ALLOW_ALL: &str = "*";

/// Immutable allowlist built once at startup.
#[derive(Debug, Clone, Default)]
pub struct AllowlistPolicy {
    allow_all: bool,
    /// Configured order, kept for listing.
    ordered: Vec<String>,
    permitted: HashSet<String>,
}

impl AllowlistPolicy {
    /// Build a policy that admits any non-empty command.
    pub fn allow_all() -> Self {
        Self {
            allow_all: true,
            ..Self::default()
        }
    }

    /// Build a policy from explicit base command names.
    ///
    /// Names are trimmed; blanks and duplicates are dropped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ordered = Vec::new();
        let mut permitted = HashSet::new();
        for name in names {
            let trimmed = name.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }
            if permitted.insert(trimmed.to_string()) {
                ordered.push(trimmed.to_string());
            }
        }
        Self {
            allow_all: false,
            ordered,
            permitted,
        }
    }

    /// Parse the startup specification: `*` or a comma-separated list.
    pub fn from_spec(spec: &str) -> Result<Self, ConfigError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(ConfigError::MissingAllowlist);
        }
        if spec == ALLOW_ALL {
            return Ok(Self::allow_all());
        }
        Ok(Self::from_names(spec.split(',')))
    }

    /// Whether `command` may run under this policy.
    ///
    /// A command with no tokens is never admitted, in either mode.
    pub fn check(&self, command: &str) -> bool {
        let Some(base) = base_command(command) else {
            return false;
        };
        self.allow_all || self.permitted.contains(base)
    }

    pub fn allows_all(&self) -> bool {
        self.allow_all
    }

    /// Permitted base commands in configured order. Empty in allow-all mode.
    pub fn permitted(&self) -> &[String] {
        &self.ordered
    }
}

/// First whitespace-delimited token of a command string.
pub fn base_command(command: &str) -> Option<&str> {
    command.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_policy() -> AllowlistPolicy {
        AllowlistPolicy::from_names(["ls", "echo", "cat"])
    }

    #[test]
    fn test_listed_commands() {
        let policy = basic_policy();
        assert!(policy.check("ls"));
        assert!(policy.check("ls -la"));
        assert!(policy.check("echo hello"));
        assert!(policy.check("cat file.txt"));
        assert!(policy.check("  ls  -la  "));
    }

    #[test]
    fn test_unlisted_commands() {
        let policy = basic_policy();
        assert!(!policy.check("rm file.txt"));
        assert!(!policy.check("sudo ls"));
        assert!(!policy.check(""));
        assert!(!policy.check("   "));
    }

    #[test]
    fn test_exact_token_match() {
        let policy = basic_policy();
        // No path normalization, prefix or case folding
        assert!(!policy.check("/usr/bin/ls"));
        assert!(!policy.check("lsblk"));
        assert!(!policy.check("LS"));
        assert!(!policy.check("ech hello"));
    }

    #[test]
    fn test_allow_all() {
        let policy = AllowlistPolicy::allow_all();
        assert!(policy.allows_all());
        assert!(policy.check("rm -rf build"));
        assert!(policy.check("sudo ls"));
        assert!(policy.check("/usr/bin/ls"));
        assert!(!policy.check(""));
        assert!(!policy.check(" \t "));
    }

    #[test]
    fn test_empty_set_permits_nothing() {
        let policy = AllowlistPolicy::from_names(Vec::<String>::new());
        assert!(!policy.allows_all());
        assert!(policy.permitted().is_empty());
        assert!(!policy.check("ls"));
    }

    #[test]
    fn test_from_spec_list() {
        let policy = AllowlistPolicy::from_spec(" ls, cat ,,echo,ls ").unwrap();
        assert!(!policy.allows_all());
        assert_eq!(policy.permitted(), ["ls", "cat", "echo"]);
        assert!(policy.check("cat /etc/hosts"));
    }

    #[test]
    fn test_from_spec_allow_all() {
        let policy = AllowlistPolicy::from_spec("*").unwrap();
        assert!(policy.allows_all());
        assert!(policy.permitted().is_empty());
    }

    #[test]
    fn test_from_spec_missing() {
        assert!(matches!(
            AllowlistPolicy::from_spec(""),
            Err(ConfigError::MissingAllowlist)
        ));
        assert!(matches!(
            AllowlistPolicy::from_spec("  "),
            Err(ConfigError::MissingAllowlist)
        ));
    }

    #[test]
    fn test_base_command() {
        assert_eq!(base_command("git status"), Some("git"));
        assert_eq!(base_command("\tpwd\n"), Some("pwd"));
        assert_eq!(base_command(""), None);
    }
}
