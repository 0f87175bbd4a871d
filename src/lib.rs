//! # VidNavigator SDK for Rust
//!
//! Async Rust client for the [VidNavigator](https://vidnavigator.com)
//! Developer API. Fetch and generate transcripts, analyze videos and
//! uploaded files, and search both -- transcription and ranking all happen
//! server-side.
//!
//! ## Quick start
//!
//! ```no_run
//! use vidnavigator::Client;
//!
//! #[tokio::main]
//! async fn main() -> vidnavigator::Result<()> {
//!     let client = Client::new("vn_your_api_key")?;
//!
//!     let resp = client
//!         .get_transcript("https://www.youtube.com/watch?v=dQw4w9WgXcQ", Some("en"))
//!         .await?;
//!
//!     if let Some(title) = &resp.data.video_info.title {
//!         println!("{title}");
//!     }
//!     for seg in &resp.data.transcript {
//!         println!("  [{:.1}-{:.1}] {}", seg.start, seg.end, seg.text);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Every failure is a [`VidNavigatorError`]. Non-2xx responses map onto one
//! variant per documented status code:
//!
//! ```no_run
//! use vidnavigator::{Client, VidNavigatorError};
//!
//! # async fn example(client: &Client) {
//! match client.get_file("file_123").await {
//!     Ok(file) => println!("{:?}", file.data.file_info.status),
//!     Err(VidNavigatorError::NotFound { message }) => eprintln!("gone: {message}"),
//!     Err(e) if e.is_retryable() => eprintln!("try again later: {e}"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! # }
//! ```

mod client;
mod errors;
mod models;

pub use client::{Client, ClientBuilder};
pub use errors::{Result, VidNavigatorError};
pub use models::{
    AnalysisData, AnalysisResponse, AnalysisResult, Envelope, FileData, FileInfo,
    FileResponse, FileSearchData, FileSearchResponse, FileSearchResult, FilesListData,
    FilesListResponse, FilesQuery, PersonPlaceSubject, TranscriptData, TranscriptResponse,
    TranscriptSegment, UsageData, UsageResponse, VideoInfo, VideoSearchData,
    VideoSearchOptions, VideoSearchResponse, VideoSearchResult,
};
