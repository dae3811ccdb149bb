// Unix `ls -l` style directory listings

pub mod entry;
pub mod parser;

pub use entry::{DirectoryEntry, EntryType};
pub use parser::{parse_line, parse_listing, ListingPolicy};
