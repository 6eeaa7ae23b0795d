// ABOUTME: Environment variable parsing utilities
// ABOUTME: Provides helper functions for parsing and validating environment variables

use std::str::FromStr;

/// Parse an environment variable with a fallback default value
/// Returns the parsed value or the default if the variable is not set or cannot be parsed
pub fn parse_env_or_default<T>(var_name: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(var_name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Parse an environment variable with validation
/// Returns the parsed value if it passes validation, otherwise returns the default
/// Logs warnings when environment variables are set but fail validation or parsing
pub fn parse_env_or_default_with_validation<T, F>(var_name: &str, default: T, validator: F) -> T
where
    T: FromStr + Copy + std::fmt::Display,
    F: Fn(T) -> bool,
{
    match std::env::var(var_name) {
        Ok(raw_value) => match raw_value.parse::<T>() {
            Ok(parsed_value) => {
                if validator(parsed_value) {
                    parsed_value
                } else {
                    tracing::warn!(
                        "Environment variable {} has invalid value '{}', using default: {}",
                        var_name,
                        raw_value,
                        default
                    );
                    default
                }
            }
            Err(_) => {
                tracing::warn!(
                    "Environment variable {} has unparseable value '{}', using default: {}",
                    var_name,
                    raw_value,
                    default
                );
                default
            }
        },
        Err(_) => {
            // Variable not set - no warning needed, this is expected behavior
            default
        }
    }
}

/// Parse an environment variable with fallback to another variable
/// Tries the primary variable first, then falls back to the secondary, then to the default
pub fn parse_env_with_fallback<T>(primary_var: &str, fallback_var: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(primary_var)
        .or_else(|_| std::env::var(fallback_var))
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Parse a boolean environment variable, accepting "1"/"0" as well as "true"/"false"
pub fn parse_env_bool(var_name: &str, default: bool) -> bool {
    match std::env::var(var_name) {
        Ok(raw_value) => match raw_value.trim() {
            "1" => true,
            "0" => false,
            other => other.parse::<bool>().unwrap_or(default),
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_or_default_not_set() {
        std::env::remove_var("GLANCE_TEST_VAR_NOT_SET");
        let result: i32 = parse_env_or_default("GLANCE_TEST_VAR_NOT_SET", 42);
        assert_eq!(result, 42);
    }

    #[test]
    fn test_parse_env_or_default_set() {
        std::env::set_var("GLANCE_TEST_VAR_SET", "100");
        let result: i32 = parse_env_or_default("GLANCE_TEST_VAR_SET", 42);
        assert_eq!(result, 100);
        std::env::remove_var("GLANCE_TEST_VAR_SET");
    }

    #[test]
    fn test_parse_env_or_default_invalid() {
        std::env::set_var("GLANCE_TEST_VAR_INVALID", "not_a_number");
        let result: i32 = parse_env_or_default("GLANCE_TEST_VAR_INVALID", 42);
        assert_eq!(result, 42);
        std::env::remove_var("GLANCE_TEST_VAR_INVALID");
    }

    #[test]
    fn test_parse_env_with_validation_rejects() {
        std::env::set_var("GLANCE_TEST_VAR_RANGE", "70000");
        let result: u32 =
            parse_env_or_default_with_validation("GLANCE_TEST_VAR_RANGE", 3000, |v| v <= 65535);
        assert_eq!(result, 3000);
        std::env::remove_var("GLANCE_TEST_VAR_RANGE");
    }

    #[test]
    fn test_parse_env_with_fallback() {
        std::env::remove_var("GLANCE_TEST_PRIMARY");
        std::env::set_var("GLANCE_TEST_FALLBACK", "8080");
        let result: u16 = parse_env_with_fallback("GLANCE_TEST_PRIMARY", "GLANCE_TEST_FALLBACK", 80);
        assert_eq!(result, 8080);
        std::env::remove_var("GLANCE_TEST_FALLBACK");
    }

    #[test]
    fn test_parse_env_bool_numeric() {
        std::env::set_var("GLANCE_TEST_BOOL", "1");
        assert!(parse_env_bool("GLANCE_TEST_BOOL", false));
        std::env::set_var("GLANCE_TEST_BOOL", "0");
        assert!(!parse_env_bool("GLANCE_TEST_BOOL", true));
        std::env::remove_var("GLANCE_TEST_BOOL");
    }
}
