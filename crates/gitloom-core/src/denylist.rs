//! Sensitive-filename deny-list.
//!
//! One more protective layer on top of git-ignore filtering: even when a file
//! is not ignored, a name that looks like credentials, keys, or tooling debris
//! is never committed. Rules are declarative and evaluated as a pure function
//! so they can be tested apart from the commit pipeline.

use std::path::Path;

/// A single deny rule, matched against the forward-slash path string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyRule {
    /// Path contains this fragment anywhere.
    Substring(&'static str),
    /// Path ends with this extension (including the dot).
    Extension(&'static str),
}

/// Patterns that must never reach a commit.
pub const DENY_RULES: &[DenyRule] = &[
    DenyRule::Substring("/.git"),
    DenyRule::Substring("/node_modules"),
    DenyRule::Substring("/.next"),
    DenyRule::Substring("/.vscode"),
    DenyRule::Substring("/.env"),
    DenyRule::Substring("__pycache__"),
    DenyRule::Substring("/.venv"),
    DenyRule::Substring("/venv/"),
    DenyRule::Substring("/env/"),
    DenyRule::Substring("/ENV/"),
    DenyRule::Substring("/.idea"),
    DenyRule::Substring("/.pytest_cache"),
    DenyRule::Substring("/.ipynb_checkpoints"),
    DenyRule::Substring("/.DS_Store"),
    DenyRule::Substring(".cursorignore"),
    DenyRule::Substring(".Identifier"),
    DenyRule::Substring("/build/"),
    DenyRule::Substring("/dist/"),
    DenyRule::Substring("credentials"),
    DenyRule::Substring("secret"),
    DenyRule::Extension(".log"),
    DenyRule::Extension(".tmp"),
    DenyRule::Extension(".bak"),
    DenyRule::Extension(".swp"),
    DenyRule::Extension(".swo"),
    DenyRule::Extension(".pem"),
    DenyRule::Extension(".key"),
    DenyRule::Extension(".env"),
    DenyRule::Extension(".config"),
    DenyRule::Extension(".pyc"),
    DenyRule::Extension(".pyo"),
    DenyRule::Extension(".pyd"),
];

impl DenyRule {
    fn matches(&self, path: &str) -> bool {
        match self {
            DenyRule::Substring(fragment) => path.contains(fragment),
            DenyRule::Extension(ext) => path.ends_with(ext),
        }
    }
}

/// Whether a path matches any deny rule. Comparison is done on the
/// forward-slash form so the rules behave identically across platforms.
pub fn is_denied(path: &Path) -> bool {
    let normalized = path.to_string_lossy().replace('\\', "/");
    DENY_RULES.iter().any(|rule| rule.matches(&normalized))
}

/// Drop deny-listed paths. Idempotent: filtering an already-filtered list is
/// a no-op.
pub fn filter_denied<P: AsRef<Path>>(paths: Vec<P>) -> Vec<P> {
    paths
        .into_iter()
        .filter(|p| !is_denied(p.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn credential_like_names_are_denied() {
        for path in [
            "/work/app/aws_credentials.txt",
            "/work/app/secret_rotation.md",
            "/work/app/deploy.pem",
            "/work/app/id_rsa.key",
            "/work/app/.env",
            "/work/app/staging.env",
            "/work/app/server.log",
        ] {
            assert!(is_denied(Path::new(path)), "{path} should be denied");
        }
    }

    #[test]
    fn tooling_directories_are_denied() {
        for path in [
            "/work/app/.git/config",
            "/work/app/node_modules/left-pad/index.js",
            "/work/app/__pycache__/mod.cpython-311.pyc",
            "/work/app/.venv/bin/python",
            "/work/app/build/output.o",
        ] {
            assert!(is_denied(Path::new(path)), "{path} should be denied");
        }
    }

    #[test]
    fn virtualenv_and_notebook_debris_are_denied() {
        for path in [
            "/work/app/env/bin/activate",
            "/work/app/ENV/pyvenv.cfg",
            "/work/app/.ipynb_checkpoints/analysis-checkpoint.ipynb",
            "/work/app/util.pyc",
            "/work/app/.cursorignore",
        ] {
            assert!(is_denied(Path::new(path)), "{path} should be denied");
        }
    }

    #[test]
    fn ordinary_sources_pass() {
        for path in [
            "/work/app/src/main.rs",
            "/work/app/README.md",
            "/work/app/docs/keys-to-success.md",
            "/work/app/src/environment.rs",
            "/work/app/Cargo.toml",
        ] {
            assert!(!is_denied(Path::new(path)), "{path} should pass");
        }
    }

    #[test]
    fn extension_rules_require_the_suffix() {
        // "key" in the middle of a name is fine; ".key" at the end is not.
        assert!(!is_denied(Path::new("/work/app/keyboard.rs")));
        assert!(is_denied(Path::new("/work/app/signing.key")));
    }

    #[test]
    fn filtering_is_a_fixed_point() {
        let input: Vec<PathBuf> = [
            "/w/src/lib.rs",
            "/w/secret.txt",
            "/w/notes.md",
            "/w/server.pem",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();

        let once = filter_denied(input);
        let twice = filter_denied(once.clone());
        assert_eq!(once, twice);
        assert_eq!(
            once,
            vec![PathBuf::from("/w/src/lib.rs"), PathBuf::from("/w/notes.md")]
        );
    }
}
