//! Durable per-image result files.
//!
//! Each response is written to a temporary file in the output directory and
//! renamed over `{stable_id}.json`, so the target name only ever holds a
//! complete document. Re-running over the same inputs replaces the previous
//! file.

use crate::error::{TaskError, TaskResult};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes response documents as indented JSON.
#[derive(Debug, Clone)]
pub struct ResultPersister {
    indent: usize,
}

impl Default for ResultPersister {
    fn default() -> Self {
        Self { indent: 4 }
    }
}

impl ResultPersister {
    pub fn new(indent: usize) -> Self {
        Self { indent }
    }

    /// Render a document with this persister's indentation.
    pub fn render(&self, document: &serde_json::Value) -> Result<Vec<u8>, serde_json::Error> {
        let indent = " ".repeat(self.indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut buf = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        document.serialize(&mut serializer)?;
        Ok(buf)
    }

    /// Write `document` to `{output_dir}/{stable_id}.json` atomically.
    pub fn persist(
        &self,
        output_dir: &Path,
        stable_id: &str,
        document: &serde_json::Value,
    ) -> TaskResult<PathBuf> {
        let target = output_dir.join(format!("{stable_id}.json"));
        let failed = |message: String| TaskError::Persistence {
            path: target.clone(),
            message,
        };

        let rendered = self.render(document).map_err(|e| failed(e.to_string()))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(&format!(".{stable_id}."))
            .suffix(".tmp")
            .tempfile_in(output_dir)
            .map_err(|e| failed(e.to_string()))?;
        tmp.write_all(&rendered).map_err(|e| failed(e.to_string()))?;
        tmp.as_file().sync_all().map_err(|e| failed(e.to_string()))?;
        tmp.persist(&target).map_err(|e| failed(e.error.to_string()))?;

        Ok(target)
    }

    /// [`persist`](Self::persist) on the blocking pool, so the temp-file write
    /// and `sync_all` don't stall the runtime.
    pub async fn persist_blocking(
        &self,
        output_dir: &Path,
        stable_id: &str,
        document: serde_json::Value,
    ) -> TaskResult<PathBuf> {
        let persister = self.clone();
        let dir = output_dir.to_path_buf();
        let id = stable_id.to_string();
        let target = output_dir.join(format!("{stable_id}.json"));

        match tokio::task::spawn_blocking(move || persister.persist(&dir, &id, &document)).await {
            Ok(result) => result,
            Err(e) => Err(TaskError::Persistence {
                path: target,
                message: format!("write task failed: {e}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_persist_blocking_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = json!({"id": "chatcmpl-9"});

        let path = ResultPersister::default()
            .persist_blocking(dir.path(), "frame_009", doc.clone())
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("frame_009.json"));
        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written, doc);
    }

    #[tokio::test]
    async fn test_persist_blocking_reports_missing_directory() {
        let err = ResultPersister::default()
            .persist_blocking(Path::new("/definitely/not/here"), "x", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Persistence { .. }));
    }

    #[test]
    fn test_persist_writes_indented_json() {
        let dir = tempfile::tempdir().unwrap();
        let doc = json!({"choices": [{"message": {"content": "two people"}}]});

        let path = ResultPersister::default()
            .persist(dir.path(), "frame_001", &doc)
            .unwrap();

        assert_eq!(path, dir.path().join("frame_001.json"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n    \"choices\""));
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_persist_overwrites_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let persister = ResultPersister::default();
        persister.persist(dir.path(), "a", &json!({"v": 1})).unwrap();
        persister.persist(dir.path(), "a", &json!({"v": 2})).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["a.json".to_string()]);

        let parsed: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join("a.json")).unwrap()).unwrap();
        assert_eq!(parsed["v"], 2);
    }

    #[test]
    fn test_persist_missing_directory_is_persistence_error() {
        let err = ResultPersister::default()
            .persist(Path::new("/nonexistent/iris/out"), "a", &json!({}))
            .unwrap_err();
        match err {
            TaskError::Persistence { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/iris/out/a.json"));
            }
            other => panic!("Expected persistence error, got {other:?}"),
        }
    }

    #[test]
    fn test_render_respects_indent() {
        let rendered = ResultPersister::new(2).render(&json!({"k": 1})).unwrap();
        assert_eq!(String::from_utf8(rendered).unwrap(), "{\n  \"k\": 1\n}");
    }
}
