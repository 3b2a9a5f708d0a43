pub mod json_file;
pub mod stub;

pub use json_file::JsonFileFeed;
pub use stub::StubFeed;
