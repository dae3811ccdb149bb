use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryType {
    Directory,
    File,
    Link,
    CharDevice,
    BlockDevice,
    Socket,
    Pipe,
    Unknown,
}

impl EntryType {
    /// Maps the leading `ls -l` type character.
    pub fn from_char(c: char) -> Self {
        match c {
            'd' => EntryType::Directory,
            '-' => EntryType::File,
            'l' => EntryType::Link,
            'c' => EntryType::CharDevice,
            'b' => EntryType::BlockDevice,
            's' => EntryType::Socket,
            'p' => EntryType::Pipe,
            _ => EntryType::Unknown,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            EntryType::Directory => 'd',
            EntryType::File => '-',
            EntryType::Link => 'l',
            EntryType::CharDevice => 'c',
            EntryType::BlockDevice => 'b',
            EntryType::Socket => 's',
            EntryType::Pipe => 'p',
            EntryType::Unknown => '?',
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, EntryType::Directory)
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One parsed line of a directory listing.
///
/// The timestamp is kept exactly as the server printed it, its format depends on
/// the server and on the age of the file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DirectoryEntry {
    pub(super) entry_type: EntryType,
    pub(super) permissions: String,
    pub(super) hard_links: u64,
    pub(super) owner: String,
    pub(super) group: String,
    pub(super) size: u64,
    pub(super) timestamp: String,
    pub(super) name: String,
    pub(super) link_target: Option<String>,
}

impl DirectoryEntry {
    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn permissions(&self) -> &str {
        &self.permissions
    }

    pub fn hard_links(&self) -> u64 {
        self.hard_links
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where a symbolic link points, `None` for every other entry type.
    pub fn link_target(&self) -> Option<&str> {
        self.link_target.as_deref()
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type.is_dir()
    }
}

impl fmt::Display for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} {:>3} {:<8} {:<8} {:>10} {} {}",
            self.entry_type,
            self.permissions,
            self.hard_links,
            self.owner,
            self.group,
            self.size,
            self.timestamp,
            self.name
        )?;
        if let Some(target) = &self.link_target {
            write!(f, " -> {}", target)?;
        }
        Ok(())
    }
}
