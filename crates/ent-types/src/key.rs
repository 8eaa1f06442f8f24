//! Object key and bucket name validation.
//!
//! Valid keys:
//! - Must be non-empty
//! - Must be relative (no leading `/`) and use `/` as the only separator
//! - Must not contain `\` or NUL
//! - Components between slashes must be non-empty and must not be `.` or `..`
//! - No component may start with [`TEMP_PREFIX`]
//!
//! Keys may contain `/` to express hierarchy; the disk engine maps each
//! component onto a directory.

use crate::error::TypeError;

/// Reserved file-name prefix for in-flight writes inside a bucket directory.
pub const TEMP_PREFIX: &str = ".ent-pending-";

/// Characters that are forbidden anywhere in a key.
const FORBIDDEN_CHARS: &[char] = &['\\', '\0'];

/// Validate an object key, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use ent_types::validate_key;
///
/// assert!(validate_key("my/big.blob").is_ok());
/// assert!(validate_key("").is_err());
/// assert!(validate_key("../etc/passwd").is_err());
/// ```
pub fn validate_key(key: &str) -> Result<(), TypeError> {
    let invalid = |reason: String| TypeError::InvalidKey {
        key: key.to_string(),
        reason,
    };

    if key.is_empty() {
        return Err(invalid("key must not be empty".into()));
    }

    for ch in FORBIDDEN_CHARS {
        if key.contains(*ch) {
            return Err(invalid(format!("contains forbidden character: {ch:?}")));
        }
    }

    if key.starts_with('/') {
        return Err(invalid("must be relative".into()));
    }

    for component in key.split('/') {
        match component {
            "" => return Err(invalid("empty path component".into())),
            "." | ".." => return Err(invalid(format!("path component {component:?} not allowed"))),
            c if c.starts_with(TEMP_PREFIX) => {
                return Err(invalid(format!("component must not start with {TEMP_PREFIX:?}")))
            }
            _ => {}
        }
    }

    Ok(())
}

/// Validate a bucket name. Bucket names are single path components.
pub fn validate_bucket_name(name: &str) -> Result<(), TypeError> {
    let invalid = |reason: &str| TypeError::InvalidKey {
        key: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("bucket name must not be empty"));
    }
    if name == "." || name == ".." {
        return Err(invalid("bucket name must not be '.' or '..'"));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(invalid("bucket name must be a single path component"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_keys() {
        for key in ["test.zip", "my/big.blob", "a/b/c/d", "a-b_c.d~e+f", ".hidden", "a/.b"] {
            assert!(validate_key(key).is_ok(), "expected {key:?} to be valid");
        }
    }

    #[test]
    fn empty_key() {
        assert!(validate_key("").is_err());
    }

    #[test]
    fn absolute_key() {
        assert!(validate_key("/etc/passwd").is_err());
    }

    #[test]
    fn traversal_components() {
        assert!(validate_key("..").is_err());
        assert!(validate_key("a/../b").is_err());
        assert!(validate_key("./a").is_err());
    }

    #[test]
    fn empty_components() {
        assert!(validate_key("a//b").is_err());
        assert!(validate_key("a/").is_err());
    }

    #[test]
    fn forbidden_characters() {
        assert!(validate_key("a\\b").is_err());
        assert!(validate_key("a\0b").is_err());
    }

    #[test]
    fn reserved_temp_prefix() {
        assert!(validate_key(".ent-pending-abc").is_err());
        assert!(validate_key("dir/.ent-pending-abc").is_err());
        assert!(validate_key("dir/x.ent-pending-abc").is_ok());
    }

    #[test]
    fn bucket_names() {
        assert!(validate_bucket_name("bit").is_ok());
        assert!(validate_bucket_name("").is_err());
        assert!(validate_bucket_name("..").is_err());
        assert!(validate_bucket_name("a/b").is_err());
    }

    mod props {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn simple_hierarchies_are_valid(parts in proptest::collection::vec("[a-z0-9_-]{1,8}", 1..5)) {
                let key = parts.join("/");
                prop_assert!(validate_key(&key).is_ok());
            }

            #[test]
            fn parent_component_always_rejected(prefix in "[a-z]{0,4}", suffix in "[a-z]{0,4}") {
                let mut parts = Vec::new();
                if !prefix.is_empty() { parts.push(prefix); }
                parts.push("..".to_string());
                if !suffix.is_empty() { parts.push(suffix); }
                prop_assert!(validate_key(&parts.join("/")).is_err());
            }
        }
    }
}
