pub mod feeds;
pub mod llm;
pub mod sqlite;
