use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The `{status, data}` wrapper returned by every endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope<T> {
    /// Usually "success".
    pub status: String,
    pub data: T,
}

pub type TranscriptResponse = Envelope<TranscriptData>;
pub type AnalysisResponse = Envelope<AnalysisData>;
pub type VideoSearchResponse = Envelope<VideoSearchData>;
pub type FileSearchResponse = Envelope<FileSearchData>;
pub type FilesListResponse = Envelope<FilesListData>;
pub type FileResponse = Envelope<FileData>;
pub type UsageResponse = Envelope<UsageData>;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TranscriptSegment {
    pub text: String,
    /// Seconds from video start.
    pub start: f64,
    pub end: f64,
}

/// Metadata of an online video.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VideoInfo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub url: Option<String>,
    pub channel: Option<String>,
    pub channel_url: Option<String>,
    /// Seconds.
    pub duration: Option<f64>,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub published_date: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub category: Option<String>,
    pub available_languages: Option<Vec<String>>,
    pub selected_language: Option<String>,
}

/// Metadata of an uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FileInfo {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Bytes.
    pub size: Option<u64>,
    /// MIME type, e.g. "video/mp4".
    #[serde(rename = "type")]
    pub file_type: Option<String>,
    pub duration: Option<f64>,
    /// e.g. "processing", "completed", "failed".
    pub status: Option<String>,
    /// ISO 8601.
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub original_file_date: Option<String>,
    pub has_transcript: Option<bool>,
    /// Set when processing failed.
    pub error_message: Option<String>,
}

/// A person, place or subject extracted by analysis.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PersonPlaceSubject {
    pub name: Option<String>,
    pub context: Option<String>,
    pub description: Option<String>,
    pub importance: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisResult {
    pub summary: Option<String>,
    pub people: Option<Vec<PersonPlaceSubject>>,
    pub places: Option<Vec<PersonPlaceSubject>>,
    pub key_subjects: Option<Vec<PersonPlaceSubject>>,
    /// Seconds into the media where `relevant_text` occurs.
    pub timestamp: Option<f64>,
    pub relevant_text: Option<String>,
    /// Free-form; the server may answer with a string or a structured value.
    pub query_answer: Option<serde_json::Value>,
}

/// One hit of `search_videos`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VideoSearchResult {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub channel: Option<String>,
    pub published_date: Option<String>,
    pub duration: Option<f64>,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub relevance_score: Option<f64>,
    pub transcript_summary: Option<String>,
    pub people: Option<Vec<PersonPlaceSubject>>,
    pub places: Option<Vec<PersonPlaceSubject>>,
    pub key_subjects: Option<Vec<PersonPlaceSubject>>,
    pub timestamp: Option<f64>,
    pub relevant_text: Option<String>,
    pub query_relevance: Option<String>,
}

/// One hit of `search_files`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FileSearchResult {
    pub id: Option<String>,
    pub name: Option<String>,
    pub duration: Option<f64>,
    pub size: Option<u64>,
    #[serde(rename = "type")]
    pub file_type: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub original_file_date: Option<String>,
    pub file_url: Option<String>,
    pub relevance_score: Option<f64>,
    pub timestamp: Option<f64>,
    pub relevant_text: Option<String>,
    pub query_answer: Option<String>,
    pub transcript_summary: Option<String>,
    pub people: Option<Vec<PersonPlaceSubject>>,
    pub places: Option<Vec<PersonPlaceSubject>>,
    pub key_subjects: Option<Vec<PersonPlaceSubject>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscriptData {
    pub video_info: VideoInfo,
    pub transcript: Vec<TranscriptSegment>,
}

/// Exactly one of `video_info` / `file_info` is set, depending on the endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisData {
    #[serde(default)]
    pub video_info: Option<VideoInfo>,
    #[serde(default)]
    pub file_info: Option<FileInfo>,
    pub transcript: Vec<TranscriptSegment>,
    pub transcript_analysis: AnalysisResult,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoSearchData {
    pub results: Vec<VideoSearchResult>,
    pub query: String,
    pub total_found: u64,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileSearchData {
    pub results: Vec<FileSearchResult>,
    pub query: String,
    pub total_found: u64,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilesListData {
    pub files: Vec<FileInfo>,
    pub total_count: u64,
    pub limit: u32,
    pub offset: u32,
    pub has_more: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileData {
    pub file_info: FileInfo,
    /// `None` while the file is still being processed.
    #[serde(default)]
    pub transcript: Option<Vec<TranscriptSegment>>,
}

/// Usage and storage counters. Keys are defined by the server and vary by
/// plan, so they are kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UsageData {
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl UsageData {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }
}

/// Query parameters for `get_files`.
#[derive(Debug, Clone)]
pub struct FilesQuery {
    /// Default: 50.
    pub limit: u32,
    /// Default: 0.
    pub offset: u32,
    /// Only return files in this processing status.
    pub status: Option<String>,
}

impl Default for FilesQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            status: None,
        }
    }
}

/// Search configuration for `search_videos`.
#[derive(Debug, Clone)]
pub struct VideoSearchOptions {
    /// Default: true.
    pub use_enhanced_search: bool,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    /// Default: "relevance".
    pub focus: String,
    /// Server-defined duration filter.
    pub duration: Option<u32>,
}

impl Default for VideoSearchOptions {
    fn default() -> Self {
        Self {
            use_enhanced_search: true,
            start_year: None,
            end_year: None,
            focus: "relevance".to_string(),
            duration: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transcript_envelope_parses_with_sparse_video_info() {
        let raw = json!({
            "status": "success",
            "data": {
                "video_info": { "title": "Never Gonna Give You Up", "views": 1500000000u64 },
                "transcript": [
                    { "text": "We're no strangers to love", "start": 18.64, "end": 21.88 }
                ]
            }
        });

        let resp: TranscriptResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.status, "success");
        assert_eq!(
            resp.data.video_info.title.as_deref(),
            Some("Never Gonna Give You Up")
        );
        assert_eq!(resp.data.video_info.views, Some(1_500_000_000));
        assert_eq!(resp.data.video_info.channel, None);
        assert_eq!(resp.data.video_info.available_languages, None);
        assert_eq!(resp.data.transcript.len(), 1);
        assert_eq!(resp.data.transcript[0].start, 18.64);
    }

    #[test]
    fn segment_requires_text_and_times() {
        let missing_end = json!({ "text": "hi", "start": 0.0 });
        assert!(serde_json::from_value::<TranscriptSegment>(missing_end).is_err());
    }

    #[test]
    fn file_info_type_field_is_renamed() {
        let info: FileInfo = serde_json::from_value(json!({
            "id": "f_1",
            "type": "video/mp4",
            "has_transcript": true
        }))
        .unwrap();
        assert_eq!(info.file_type.as_deref(), Some("video/mp4"));
        assert_eq!(info.has_transcript, Some(true));
        assert_eq!(info.error_message, None);

        let back = serde_json::to_value(&info).unwrap();
        assert_eq!(back["type"], "video/mp4");
    }

    #[test]
    fn analysis_accepts_structured_query_answer() {
        let raw = json!({
            "status": "success",
            "data": {
                "file_info": { "id": "f_9", "name": "talk.mp3" },
                "transcript": [],
                "transcript_analysis": {
                    "summary": "A talk.",
                    "people": [{ "name": "Ada", "importance": "high" }],
                    "query_answer": { "answer": "yes", "confidence": 0.9 }
                }
            }
        });

        let resp: AnalysisResponse = serde_json::from_value(raw).unwrap();
        assert!(resp.data.video_info.is_none());
        let analysis = resp.data.transcript_analysis;
        assert_eq!(analysis.people.unwrap()[0].name.as_deref(), Some("Ada"));
        assert_eq!(analysis.places, None);
        assert_eq!(analysis.query_answer.unwrap()["answer"], "yes");
    }

    #[test]
    fn search_data_requires_total_found() {
        let raw = json!({ "results": [], "query": "rust" });
        assert!(serde_json::from_value::<VideoSearchData>(raw).is_err());
    }

    #[test]
    fn usage_keeps_unknown_keys() {
        let usage: UsageResponse = serde_json::from_value(json!({
            "status": "success",
            "data": { "api_calls_this_month": 12, "storage_used_bytes": 2048 }
        }))
        .unwrap();
        assert_eq!(usage.data.get("api_calls_this_month"), Some(&json!(12)));
        assert_eq!(usage.data.fields.len(), 2);
    }

    #[test]
    fn option_defaults() {
        let files = FilesQuery::default();
        assert_eq!((files.limit, files.offset), (50, 0));

        let search = VideoSearchOptions::default();
        assert!(search.use_enhanced_search);
        assert_eq!(search.focus, "relevance");
    }
}
