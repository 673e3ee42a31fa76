//! Component keys for versioned update packages
//!
//! Update packages are published as `<component>_<version>.<ext>`. Stripping
//! the numeric version suffix groups every version of one component under a
//! single key, which is what the stop-list and the repository validator match
//! against.

/// Derive the component key of a file name
///
/// A trailing `_<digits>` immediately before the extension is removed; the
/// extension itself is kept. Names without such a suffix are returned
/// trimmed but otherwise unchanged.
///
/// ```rust
/// use repomirror_types::component_key;
///
/// assert_eq!(component_key("AAA_123.zip"), "AAA.zip");
/// assert_eq!(component_key("tool_v2.zip"), "tool_v2.zip");
/// ```
pub fn component_key(name: &str) -> String {
    let name = name.trim();
    let (stem, extension) = split_extension(name);

    match stem.rsplit_once('_') {
        Some((head, version))
            if !version.is_empty() && version.bytes().all(|b| b.is_ascii_digit()) =>
        {
            format!("{}{}", head, extension)
        }
        _ => name.to_string(),
    }
}

/// Split `name` into stem and extension (with its leading dot)
///
/// Leading dots never start an extension, so `.profile` has none.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if name[..idx].bytes().any(|b| b != b'.') => name.split_at(idx),
        _ => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("AAA_123.zip", "AAA.zip")]
    #[case("BBB_1.zip", "BBB.zip")]
    #[case("foo_bar_12.tar.gz", "foo_bar_12.tar.gz")]
    #[case("foo_bar.tar_12.gz", "foo_bar.tar.gz")]
    #[case("update_7", "update")]
    #[case("no_version.zip", "no_version.zip")]
    #[case("trailing_.zip", "trailing_.zip")]
    #[case("plain.zip", "plain.zip")]
    #[case("  spaced_5.zip  ", "spaced.zip")]
    #[case(".hidden_3", ".hidden")]
    #[case(".profile", ".profile")]
    fn test_component_key(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(component_key(name), expected);
    }

    #[test]
    fn test_versions_share_a_key() {
        assert_eq!(component_key("PKG_100.zip"), component_key("PKG_101.zip"));
        assert_ne!(component_key("PKG_100.zip"), component_key("PKG_100.rar"));
    }

    proptest! {
        #[test]
        fn test_key_is_idempotent(
            stem in "[A-Za-z]{1,8}",
            version in "[0-9]{1,5}",
            ext in "(zip|rar|7z)",
        ) {
            let name = format!("{}_{}.{}", stem, version, ext);
            let key = component_key(&name);
            prop_assert_eq!(&key, &format!("{}.{}", stem, ext));
            prop_assert_eq!(component_key(&key), key);
        }
    }
}
