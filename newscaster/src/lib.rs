// Library interface for newscaster modules
// This allows tests and the binaries to import modules

pub mod ingestion;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod scraping;
pub mod script;
pub mod speech;

pub use pipeline::Newscaster;
