use std::sync::LazyLock;

use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::entry::{DirectoryEntry, EntryType};
use crate::core_error::ProtocolError;

/// What to do with a listing line that cannot be parsed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingPolicy {
    /// Fail the whole listing on the first bad line.
    #[default]
    Strict,
    /// Log the bad line and keep going.
    SkipMalformed,
}

// <type><perms>[acl] <links> <owner> <group> <size> <month> <day> <year|HH:MM> <name>
static LISTING_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<type>[dlcbsp-])(?P<perms>[rwxsStT-]{9})[+@.]?\s+(?P<links>\d+)\s+(?P<owner>\S+)\s+(?P<group>\S+)\s+(?P<size>\d+)\s+(?P<time>\S+\s+\d{1,2}\s+(?:\d{4}|\d{1,2}:\d{2}))\s+(?P<name>\S.*)$",
    )
    .expect("listing line regex is valid")
});

static TOTAL_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^total\s+\d+$").expect("total line regex is valid"));

/// Parses a single listing line. Errors report it as line 1.
pub fn parse_line(line: &str) -> Result<DirectoryEntry, ProtocolError> {
    parse_numbered_line(line, 1)
}

fn parse_numbered_line(line: &str, line_no: usize) -> Result<DirectoryEntry, ProtocolError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let malformed = || ProtocolError::MalformedListingLine {
        line_no,
        line: line.to_string(),
    };

    let caps = LISTING_LINE_RE.captures(line).ok_or_else(malformed)?;
    let entry_type = caps["type"]
        .chars()
        .next()
        .map(EntryType::from_char)
        .ok_or_else(malformed)?;
    let hard_links: u64 = caps["links"].parse().map_err(|_| malformed())?;
    let size: u64 = caps["size"].parse().map_err(|_| malformed())?;

    let remainder = &caps["name"];
    let (name, link_target) = match (entry_type, remainder.split_once(" -> ")) {
        (EntryType::Link, Some((name, target))) => (name.to_string(), Some(target.to_string())),
        _ => (remainder.to_string(), None),
    };

    Ok(DirectoryEntry {
        entry_type,
        permissions: caps["perms"].to_string(),
        hard_links,
        owner: caps["owner"].to_string(),
        group: caps["group"].to_string(),
        size,
        timestamp: caps["time"].to_string(),
        name,
        link_target,
    })
}

/// Parses the body of a LIST transfer.
///
/// Blank lines and the `total N` summary line are ignored, CRLF and LF are both
/// accepted. Entries come back in server order.
pub fn parse_listing(
    body: &str,
    policy: ListingPolicy,
) -> Result<Vec<DirectoryEntry>, ProtocolError> {
    let mut entries = Vec::new();

    for (i, line) in body.split('\n').enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || TOTAL_LINE_RE.is_match(line) {
            continue;
        }

        match parse_numbered_line(line, i + 1) {
            Ok(entry) => entries.push(entry),
            Err(e) => match policy {
                ListingPolicy::Strict => return Err(e),
                ListingPolicy::SkipMalformed => warn!("Skipping listing line: {}", e),
            },
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directory_line() {
        let entry = parse_line("drwxr-xr-x 2 user group 4096 Jan 1 12:34 subdir").unwrap();
        assert_eq!(entry.entry_type(), EntryType::Directory);
        assert_eq!(entry.permissions(), "rwxr-xr-x");
        assert_eq!(entry.hard_links(), 2);
        assert_eq!(entry.owner(), "user");
        assert_eq!(entry.group(), "group");
        assert_eq!(entry.size(), 4096);
        assert_eq!(entry.timestamp(), "Jan 1 12:34");
        assert_eq!(entry.name(), "subdir");
        assert_eq!(entry.link_target(), None);
        assert!(entry.is_dir());
    }

    #[test]
    fn test_parse_file_with_year_and_padding() {
        let entry =
            parse_line("-rw-r--r--    1 ftp      ftp        1048576 Dec 24  1998 old release.tar.gz\r")
                .unwrap();
        assert_eq!(entry.entry_type(), EntryType::File);
        assert_eq!(entry.size(), 1_048_576);
        assert_eq!(entry.timestamp(), "Dec 24  1998");
        assert_eq!(entry.name(), "old release.tar.gz");
    }

    #[test]
    fn test_type_characters() {
        let cases = [
            ('d', EntryType::Directory),
            ('-', EntryType::File),
            ('l', EntryType::Link),
            ('c', EntryType::CharDevice),
            ('b', EntryType::BlockDevice),
            ('s', EntryType::Socket),
            ('p', EntryType::Pipe),
        ];
        for (c, expected) in cases {
            let line = format!("{}rw-rw-rw- 1 root root 0 Mar 3 2020 node", c);
            assert_eq!(parse_line(&line).unwrap().entry_type(), expected);
            assert_eq!(expected.as_char(), c);
        }
        assert_eq!(EntryType::from_char('D'), EntryType::Unknown);
    }

    #[test]
    fn test_symlink_keeps_full_name_and_target() {
        let entry =
            parse_line("lrwxrwxrwx 1 root root 11 Feb 9 08:00 my link -> ../some target").unwrap();
        assert_eq!(entry.entry_type(), EntryType::Link);
        assert_eq!(entry.name(), "my link");
        assert_eq!(entry.link_target(), Some("../some target"));
        assert_eq!(
            entry.to_string(),
            "lrwxrwxrwx   1 root     root             11 Feb 9 08:00 my link -> ../some target"
        );
    }

    #[test]
    fn test_arrow_in_regular_file_name_is_kept() {
        let entry = parse_line("-rw-r--r-- 1 a b 3 Feb 9 08:00 a -> b").unwrap();
        assert_eq!(entry.name(), "a -> b");
        assert_eq!(entry.link_target(), None);
    }

    #[test]
    fn test_special_permission_bits_and_acl_marker() {
        let entry = parse_line("drwxrwxrwt+ 12 root root 4096 Oct 18 09:20 tmp").unwrap();
        assert_eq!(entry.permissions(), "rwxrwxrwt");
        assert_eq!(entry.name(), "tmp");
    }

    #[test]
    fn test_malformed_lines() {
        let lines = [
            "xrwxr-xr-x 2 user group 4096 Jan 1 12:34 subdir",
            "drwxr-xr-x 2 user group big Jan 1 12:34 subdir",
            "drwxr-xr 2 user group 4096 Jan 1 12:34 subdir",
            "drwxr-xr-x 2 user group 4096 Jan 1 subdir",
            "drwxr-xr-x 2 user group 4096 Jan 1 12:34",
            "drwxr-xr-x 2 user group 4096 Jan 1 12:34   ",
            "226 Transfer complete",
        ];
        for line in lines {
            match parse_line(line) {
                Err(ProtocolError::MalformedListingLine { line_no, line: raw }) => {
                    assert_eq!(line_no, 1);
                    assert_eq!(raw, line);
                }
                other => panic!("{:?} gave {:?}", line, other),
            }
        }
    }

    #[test]
    fn test_listing_keeps_order_and_skips_noise() {
        let body = "total 12\r\n\
                    drwxr-xr-x 2 user group 4096 Jan 1 12:34 a\r\n\
                    \r\n\
                    -rw-r--r-- 1 user group 10 Jan 2 2001 b\r\n\
                    lrwxrwxrwx 1 user group 1 Jan 3 10:00 c -> a\n";
        let entries = parse_listing(body, ListingPolicy::Strict).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_strict_listing_reports_line_number() {
        let body = "drwxr-xr-x 2 user group 4096 Jan 1 12:34 a\n\
                    garbage here\n\
                    -rw-r--r-- 1 user group 10 Jan 2 2001 b\n";
        match parse_listing(body, ListingPolicy::Strict) {
            Err(ProtocolError::MalformedListingLine { line_no, line }) => {
                assert_eq!(line_no, 2);
                assert_eq!(line, "garbage here");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_skip_malformed_listing() {
        let body = "drwxr-xr-x 2 user group 4096 Jan 1 12:34 a\n\
                    garbage here\n\
                    -rw-r--r-- 1 user group 10 Jan 2 2001 b\n";
        let entries = parse_listing(body, ListingPolicy::SkipMalformed).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].name(), "b");
    }

    #[test]
    fn test_empty_listing() {
        assert!(parse_listing("", ListingPolicy::Strict).unwrap().is_empty());
        assert!(parse_listing("\r\n\r\n", ListingPolicy::Strict)
            .unwrap()
            .is_empty());
    }
}
