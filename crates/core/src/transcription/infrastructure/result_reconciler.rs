use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::transcription::domain::model_tier::ModelTier;
use crate::transcription::domain::transcript::{TextSegment, TranscriptionResult};

/// Layout of `<base>.json` as written by the whisper CLI. Unknown fields
/// (`seek`, `tokens`, `avg_logprob`, ...) are ignored; missing or `null`
/// fields take their zero value.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WhisperJson {
    #[serde(deserialize_with = "null_as_default")]
    text: String,
    #[serde(deserialize_with = "null_as_default")]
    language: String,
    #[serde(deserialize_with = "null_as_default")]
    duration: f64,
    #[serde(deserialize_with = "null_as_default")]
    segments: Vec<WhisperJsonSegment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WhisperJsonSegment {
    #[serde(deserialize_with = "null_as_default")]
    id: i64,
    #[serde(deserialize_with = "null_as_default")]
    start: f64,
    #[serde(deserialize_with = "null_as_default")]
    end: f64,
    #[serde(deserialize_with = "null_as_default")]
    text: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Build a [`TranscriptionResult`] from the artifacts the tool left in
/// `output_dir` for `audio_path`.
///
/// `<base>.txt` seeds the text and artifact path. A parseable `<base>.json`
/// then overrides text, language, duration and segments. An unparseable JSON
/// file is skipped and the plain text stands. No artifacts at all yields an
/// empty result rather than an error.
pub fn reconcile(audio_path: &Path, output_dir: &Path, model: ModelTier) -> TranscriptionResult {
    let mut result = TranscriptionResult::empty(model);
    let Some(base) = audio_path.file_stem() else {
        log::warn!("No file name in {}", audio_path.display());
        return result;
    };
    let base = base.to_string_lossy();

    let txt_path = output_dir.join(format!("{base}.txt"));
    if let Ok(bytes) = fs::read(&txt_path) {
        result.text = String::from_utf8_lossy(&bytes).into_owned();
        result.file_path = Some(txt_path);
    }

    let json_path = output_dir.join(format!("{base}.json"));
    if let Ok(bytes) = fs::read(&json_path) {
        match serde_json::from_slice::<WhisperJson>(&bytes) {
            Ok(parsed) => apply_json(&mut result, parsed),
            Err(e) => log::debug!("Ignoring unparseable {}: {e}", json_path.display()),
        }
    }

    if !result.has_ordered_segments() {
        log::warn!(
            "Segments for {} are not in chronological order",
            audio_path.display()
        );
    }

    result
}

fn apply_json(result: &mut TranscriptionResult, parsed: WhisperJson) {
    result.text = parsed.text;
    result.language = parsed.language;
    result.duration = parsed.duration;
    result.segments = parsed
        .segments
        .into_iter()
        .map(|s| TextSegment {
            id: s.id,
            start: s.start,
            end: s.end,
            text: s.text.trim().to_string(),
        })
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    const SAMPLE_JSON: &str = r#"{
        "text": " Hello there. General Kenobi.",
        "language": "en",
        "duration": 4.5,
        "segments": [
            {"id": 0, "seek": 0, "start": 0.0, "end": 1.8, "text": " Hello there.", "tokens": [50364, 2425]},
            {"id": 1, "seek": 0, "start": 1.8, "end": 4.5, "text": " General Kenobi.  "}
        ]
    }"#;

    fn write(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    #[test]
    fn test_text_only_is_verbatim_without_segments() {
        let dir = TempDir::new().unwrap();
        write(&dir, "sample.txt", "hello world\n");

        let r = reconcile(Path::new("/audio/sample.mp3"), dir.path(), ModelTier::Base);
        assert_eq!(r.text, "hello world\n");
        assert_eq!(r.file_path, Some(dir.path().join("sample.txt")));
        assert!(r.segments.is_empty());
        assert!(r.language.is_empty());
        assert_eq!(r.model, ModelTier::Base);
    }

    #[test]
    fn test_json_overrides_text() {
        let dir = TempDir::new().unwrap();
        write(&dir, "sample.txt", "plain text version");
        write(&dir, "sample.json", SAMPLE_JSON);

        let r = reconcile(Path::new("sample.wav"), dir.path(), ModelTier::Small);
        assert_eq!(r.text, " Hello there. General Kenobi.");
        assert_eq!(r.language, "en");
        assert_relative_eq!(r.duration, 4.5);
        assert_eq!(r.file_path, Some(dir.path().join("sample.txt")));
        assert_eq!(r.model, ModelTier::Small);
    }

    #[test]
    fn test_json_segments_are_trimmed_and_ordered() {
        let dir = TempDir::new().unwrap();
        write(&dir, "talk.json", SAMPLE_JSON);

        let r = reconcile(Path::new("talk.m4a"), dir.path(), ModelTier::Tiny);
        assert_eq!(r.segments.len(), 2);
        assert_eq!(r.segments[0].id, 0);
        assert_eq!(r.segments[0].text, "Hello there.");
        assert_relative_eq!(r.segments[0].end, 1.8);
        assert_eq!(r.segments[1].id, 1);
        assert_eq!(r.segments[1].text, "General Kenobi.");
        assert_relative_eq!(r.segments[1].start, 1.8);
        assert!(r.has_ordered_segments());
        assert!(r.file_path.is_none());
    }

    #[test]
    fn test_malformed_json_falls_back_to_text() {
        let dir = TempDir::new().unwrap();
        write(&dir, "sample.txt", "still useful");
        write(&dir, "sample.json", "{\"text\": \"truncated");

        let r = reconcile(Path::new("sample.mp3"), dir.path(), ModelTier::Base);
        assert_eq!(r.text, "still useful");
        assert!(r.segments.is_empty());
        assert!(r.language.is_empty());
    }

    #[test]
    fn test_json_with_wrong_types_falls_back_to_text() {
        let dir = TempDir::new().unwrap();
        write(&dir, "sample.txt", "text wins");
        write(&dir, "sample.json", r#"{"text": 42}"#);

        let r = reconcile(Path::new("sample.mp3"), dir.path(), ModelTier::Base);
        assert_eq!(r.text, "text wins");
    }

    #[test]
    fn test_json_missing_fields_default() {
        let dir = TempDir::new().unwrap();
        write(&dir, "sample.json", r#"{"text": "only text"}"#);

        let r = reconcile(Path::new("sample.mp3"), dir.path(), ModelTier::Base);
        assert_eq!(r.text, "only text");
        assert!(r.language.is_empty());
        assert_eq!(r.duration, 0.0);
        assert!(r.segments.is_empty());
    }

    #[test]
    fn test_negative_segment_id_is_kept() {
        let dir = TempDir::new().unwrap();
        write(&dir, "s.txt", "plain");
        write(
            &dir,
            "s.json",
            r#"{"text": "json", "language": "en", "duration": 2.0,
                "segments": [{"id": -1, "start": 0.0, "end": 2.0, "text": "json"}]}"#,
        );

        let r = reconcile(Path::new("s.mp3"), dir.path(), ModelTier::Base);
        assert_eq!(r.text, "json");
        assert_eq!(r.language, "en");
        assert_relative_eq!(r.duration, 2.0);
        assert_eq!(r.segments.len(), 1);
        assert_eq!(r.segments[0].id, -1);
    }

    #[test]
    fn test_null_fields_take_zero_values() {
        let dir = TempDir::new().unwrap();
        write(&dir, "s.txt", "plain");
        write(
            &dir,
            "s.json",
            r#"{"text": "json", "language": null, "duration": null,
                "segments": [{"id": null, "start": 0.5, "end": 1.0, "text": null}]}"#,
        );

        let r = reconcile(Path::new("s.mp3"), dir.path(), ModelTier::Base);
        assert_eq!(r.text, "json");
        assert!(r.language.is_empty());
        assert_eq!(r.duration, 0.0);
        assert_eq!(r.segments[0].id, 0);
        assert!(r.segments[0].text.is_empty());
        assert_relative_eq!(r.segments[0].start, 0.5);
    }

    #[test]
    fn test_null_segments_is_empty() {
        let dir = TempDir::new().unwrap();
        write(&dir, "s.json", r#"{"text": "json", "segments": null}"#);

        let r = reconcile(Path::new("s.mp3"), dir.path(), ModelTier::Base);
        assert_eq!(r.text, "json");
        assert!(r.segments.is_empty());
    }

    #[test]
    fn test_no_artifacts_yields_empty_result() {
        let dir = TempDir::new().unwrap();
        write(&dir, "other.txt", "belongs to another input");

        let r = reconcile(Path::new("sample.mp3"), dir.path(), ModelTier::Large);
        assert_eq!(r, TranscriptionResult::empty(ModelTier::Large));
    }

    #[test]
    fn test_only_last_extension_is_stripped() {
        let dir = TempDir::new().unwrap();
        write(&dir, "show.part1.txt", "episode");

        let r = reconcile(Path::new("show.part1.mp3"), dir.path(), ModelTier::Base);
        assert_eq!(r.text, "episode");
    }
}
