use std::path::{Path, PathBuf};

/// Replace `${ENV_VAR}` placeholders with values from the process
/// environment.
///
/// Unresolvable variables are left as-is.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Expand a configured path: `${VAR}` placeholders first, then a leading
/// `~` or `~/` against `home`.
pub fn expand_path(raw: &str, home: Option<&Path>) -> PathBuf {
    expand_path_with(raw, home, |name| std::env::var(name).ok())
}

fn expand_path_with(
    raw: &str,
    home: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> PathBuf {
    let substituted = substitute_env_with(raw.trim(), lookup);
    match (home, substituted.as_str()) {
        (Some(home), "~") => home.to_path_buf(),
        (Some(home), s) if s.starts_with("~/") => home.join(&s[2..]),
        _ => PathBuf::from(substituted),
    }
}

fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated placeholder, keep the tail verbatim.
            result.push_str(&rest[start..]);
            return result;
        };
        let name = &after[..end];
        match lookup(name).filter(|_| !name.is_empty()) {
            Some(value) => result.push_str(&value),
            None => {
                result.push_str("${");
                result.push_str(name);
                result.push('}');
            },
        }
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "SKILLCUE_TEST_ROOT" => Some("/opt/skills".to_string()),
            _ => None,
        }
    }

    #[test]
    fn substitutes_known_var() {
        assert_eq!(
            substitute_env_with("root=${SKILLCUE_TEST_ROOT}/active", lookup),
            "root=/opt/skills/active"
        );
    }

    #[test]
    fn leaves_unknown_and_unterminated_placeholders() {
        assert_eq!(substitute_env_with("${NOPE_XYZ}", lookup), "${NOPE_XYZ}");
        assert_eq!(substitute_env_with("a/${broken", lookup), "a/${broken");
        assert_eq!(substitute_env_with("${}", lookup), "${}");
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }

    #[test]
    fn expands_tilde_against_home() {
        let home = Path::new("/home/dev");
        assert_eq!(
            expand_path_with("~/.claude/skills", Some(home), lookup),
            PathBuf::from("/home/dev/.claude/skills")
        );
        assert_eq!(expand_path_with("~", Some(home), lookup), home);
        assert_eq!(
            expand_path_with("~/x", None, lookup),
            PathBuf::from("~/x")
        );
    }

    #[test]
    fn expands_env_inside_paths() {
        assert_eq!(
            expand_path_with("${SKILLCUE_TEST_ROOT}/cache", None, lookup),
            PathBuf::from("/opt/skills/cache")
        );
    }
}
