use super::VariableStore;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

fn token_pattern() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)\}")
            .expect("token pattern is a valid regex")
    })
}

/// Replaces every `${name}` (or `${name.path}`) token in `template` with the
/// stringified variable value.
///
/// Tokens that reference an unset variable are left verbatim. The template is scanned
/// once, so text inserted from a variable is never expanded again.
pub fn substitute<'t>(template: &'t str, variables: &VariableStore) -> Cow<'t, str> {
    if !template.contains("${") {
        return Cow::Borrowed(template);
    }
    token_pattern().replace_all(template, |caps: &Captures| match variables.resolve(&caps[1]) {
        Some(value) => value.to_string(),
        None => caps[0].to_string(),
    })
}

