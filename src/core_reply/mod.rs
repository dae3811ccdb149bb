// Control channel replies: line grammar and the timed reader

pub mod reader;
pub mod reply;

pub use reader::ReplyReader;
pub use reply::{Reply, ReplyAssembler};
