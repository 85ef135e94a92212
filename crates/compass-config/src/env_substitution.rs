use compass_core::{CompassError, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::env;

// Supports both ${VAR} and ${VAR:-default}
static ENV_VAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}").expect("Invalid regex pattern")
});

/// Substitute environment variable references in raw configuration text.
///
/// A reference without a default whose variable is unset is an error; all such
/// variables are reported together.
pub fn substitute_env_vars(input: &str) -> Result<String> {
    let mut missing_vars = Vec::new();

    let result = ENV_VAR_REGEX.replace_all(input, |cap: &Captures| {
        let var_name = &cap[1];
        match env::var(var_name) {
            Ok(value) => value,
            Err(_) => match cap.get(2) {
                Some(default) => default.as_str().to_string(),
                None => {
                    missing_vars.push(var_name.to_string());
                    String::new()
                }
            },
        }
    });

    if !missing_vars.is_empty() {
        missing_vars.sort();
        missing_vars.dedup();
        return Err(CompassError::ConfigError(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result.into_owned())
}
