//! Parsing of `MLSD` listings and hash replies

/// One entry of an `MLSD` listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Entry name
    pub name: String,
    /// Value of the `type` fact, lower-cased
    pub kind: String,
    /// Value of the `size` fact, if present and numeric
    pub size: Option<u64>,
}

impl ListingEntry {
    /// Whether the entry is a regular file
    pub fn is_file(&self) -> bool {
        self.kind == "file"
    }
}

/// Parse one `MLSD` line such as `type=file;size=42;modify=20240101000000; a.zip`
///
/// Returns `None` for lines without a name.
pub fn parse_mlsd_line(line: &str) -> Option<ListingEntry> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (facts, name) = line.split_once(' ')?;
    if name.trim().is_empty() {
        return None;
    }

    let mut kind = String::new();
    let mut size = None;
    for fact in facts.split(';').filter(|fact| !fact.is_empty()) {
        let Some((key, value)) = fact.split_once('=') else {
            continue;
        };
        match key.to_ascii_lowercase().as_str() {
            "type" => kind = value.to_ascii_lowercase(),
            "size" => size = value.parse().ok(),
            _ => {}
        }
    }

    Some(ListingEntry {
        name: name.to_string(),
        kind,
        size,
    })
}

/// Extract an MD5 digest from a hash-command reply
///
/// The digest is the last whitespace-separated token. Only 32 hex digits are
/// accepted; the result is lower-cased.
pub fn parse_hash_reply(reply: &str) -> Option<String> {
    let token = reply.split_whitespace().last()?;
    if token.len() == 32 && token.bytes().all(|b| b.is_ascii_hexdigit()) {
        Some(token.to_ascii_lowercase())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_file_entry() {
        let entry = parse_mlsd_line("type=file;size=1024;modify=20240101120000; update_12.zip\r\n").unwrap();
        assert_eq!(entry.name, "update_12.zip");
        assert_eq!(entry.size, Some(1024));
        assert!(entry.is_file());
    }

    #[test]
    fn test_name_may_contain_spaces() {
        let entry = parse_mlsd_line("Type=File;Size=5; release notes.txt").unwrap();
        assert_eq!(entry.name, "release notes.txt");
        assert!(entry.is_file());
    }

    #[rstest]
    #[case("type=dir;modify=20240101120000; archive")]
    #[case("type=cdir; .")]
    #[case("type=pdir; ..")]
    fn test_directories_are_not_files(#[case] line: &str) {
        assert!(!parse_mlsd_line(line).unwrap().is_file());
    }

    #[test]
    fn test_missing_or_bad_size() {
        assert_eq!(parse_mlsd_line("type=file; a.zip").unwrap().size, None);
        assert_eq!(parse_mlsd_line("type=file;size=big; a.zip").unwrap().size, None);
    }

    #[test]
    fn test_line_without_name() {
        assert!(parse_mlsd_line("type=file;size=1;").is_none());
        assert!(parse_mlsd_line("type=file;size=1; ").is_none());
    }

    #[rstest]
    #[case("213 D41D8CD98F00B204E9800998ECF8427E", Some("d41d8cd98f00b204e9800998ecf8427e"))]
    #[case("/pub/a.zip d41d8cd98f00b204e9800998ecf8427e\r\n", Some("d41d8cd98f00b204e9800998ecf8427e"))]
    #[case("213", None)]
    #[case("", None)]
    #[case("213 not-a-digest", None)]
    fn test_parse_hash_reply(#[case] reply: &str, #[case] expected: Option<&str>) {
        assert_eq!(parse_hash_reply(reply).as_deref(), expected);
    }
}
