pub mod deadline;
pub mod media_downloader;
pub mod profile_fetcher;
pub mod profile_summarizer;
pub mod retry;

#[cfg(test)]
pub(crate) mod testing;
