// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Named external configuration values.

const PREFIX: &str = "EUREKA_";

/// Looks up `EUREKA_<NAME>`, then `name` verbatim. Empty values count as unset.
pub fn lookup(name: &str) -> Option<String> {
    let prefixed = format!("{PREFIX}{}", name.to_uppercase());
    let value = [prefixed.as_str(), name]
        .into_iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.trim().is_empty());
    value
}

/// Like [`lookup`], falling back to a computed default.
pub fn resolve(name: &str, default: impl FnOnce() -> String) -> String {
    resolve_with(lookup, name, default)
}

/// [`resolve`] over an arbitrary source of values.
pub fn resolve_with(
    lookup: impl Fn(&str) -> Option<String>,
    name: &str,
    default: impl FnOnce() -> String,
) -> String {
    lookup(name).unwrap_or_else(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_variable_wins() {
        std::env::set_var("EUREKA_TEST_PROVIDER", "http://prefixed:8545");
        std::env::set_var("test_provider", "http://bare:8545");
        assert_eq!(lookup("test_provider").as_deref(), Some("http://prefixed:8545"));

        std::env::remove_var("EUREKA_TEST_PROVIDER");
        assert_eq!(lookup("test_provider").as_deref(), Some("http://bare:8545"));
        std::env::remove_var("test_provider");
    }

    #[test]
    fn falls_back_to_default() {
        std::env::set_var("EUREKA_TEST_EMPTY", " ");
        assert_eq!(resolve("test_empty", || "default".into()), "default");
        assert_eq!(resolve("test_unset_value", || "default".into()), "default");
    }

    #[test]
    fn resolves_from_custom_source() {
        let source = |name: &str| (name == "provider").then(|| "http://node:8545".to_owned());
        assert_eq!(
            resolve_with(source, "provider", || "default".into()),
            "http://node:8545"
        );
        assert_eq!(resolve_with(source, "pk", || "default".into()), "default");
    }
}
