// src/output/banner.rs

use std::fmt::Write;
use std::sync::Arc;

use owo_colors::OwoColorize;

use crate::config::HostTarget;

const LOGO: &str = r"
 ____                      _      _____     _ _
|  _ \ ___ _ __ ___   ___ | |_ __|_   _|_ _(_) |
| |_) / _ \ '_ ' _ \ / _ \| __/ _ \| |/ _' | | |
|  _ <  __/ | | | | | (_) | ||  __/| | (_| | | |
|_| \_\___|_| |_| |_|\___/ \__\___||_|\__,_|_|_|
";

const RULE: &str = "----------------------------------------------------------------";

/// Build identity shown at startup. Built once and passed down; nothing
/// global is mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupInfo {
    pub version: &'static str,
    pub commit: Option<&'static str>,
}

impl StartupInfo {
    /// Identity of this binary. The commit comes from `REMOTETAIL_GIT_COMMIT`
    /// at build time, when set.
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("REMOTETAIL_GIT_COMMIT"),
        }
    }

    pub fn version_line(&self) -> String {
        match self.commit {
            Some(commit) => format!("Version: {} ({commit})", self.version),
            None => format!("Version: {}", self.version),
        }
    }

    /// Logo, version and one `user@host:file` line per target.
    pub fn welcome(&self, targets: &[Arc<HostTarget>], colored: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{LOGO}");
        let _ = writeln!(out, "{}", self.version_line());
        let _ = writeln!(out, "{}", paint_rule(colored));

        for target in targets {
            let line = target.summary();
            if colored {
                let _ = writeln!(out, "{}", line.magenta());
            } else {
                let _ = writeln!(out, "{line}");
            }
        }

        let _ = writeln!(out, "{}", paint_rule(colored));
        out
    }
}

fn paint_rule(colored: bool) -> String {
    if colored {
        RULE.cyan().to_string()
    } else {
        RULE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Credential;

    fn target(name: &str) -> Arc<HostTarget> {
        Arc::new(HostTarget {
            name: name.to_string(),
            hostname: format!("{name}.example"),
            port: 22,
            user: "deploy".to_string(),
            credential: Credential::password("pw"),
            tail_file: "/var/log/app.log".to_string(),
            tail_lines: 0,
            follow_flags: None,
        })
    }

    #[test]
    fn welcome_lists_every_target() {
        let info = StartupInfo {
            version: "1.2.3",
            commit: Some("abc123"),
        };
        let text = info.welcome(&[target("web1"), target("web2")], false);
        assert!(text.contains("Version: 1.2.3 (abc123)"));
        assert!(text.contains("deploy@web1.example:/var/log/app.log"));
        assert!(text.contains("deploy@web2.example:/var/log/app.log"));
    }

    #[test]
    fn version_line_without_commit() {
        let info = StartupInfo {
            version: "0.1.0",
            commit: None,
        };
        assert_eq!(info.version_line(), "Version: 0.1.0");
    }
}
