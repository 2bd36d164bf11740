//! Flat-file feedback storage.
//!
//! One file per submission, `<id>.txt`:
//!
//! ```text
//! 2024-06-15T14:30:45Z      timestamp
//! bug                       type
//! new                       status
//! email: someone@corp.com   empty value when anonymous
//! message, any number of lines
//! ```
//!
//! The email line is always written. Files written before it existed have
//! the message on line 4 and load unchanged.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;

use crate::library::IconError;
use crate::utils::date::DateTimeUtc;

const EMAIL_PREFIX: &str = "email:";

/// Status given to new submissions.
pub const STATUS_NEW: &str = "new";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub id: u64,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub message: String,
}

impl Feedback {
    /// Parse a stored file. `None` for files too short to be feedback.
    fn parse(id: u64, content: &str) -> Option<Self> {
        let lines: Vec<&str> = content.lines().collect();
        if lines.len() < 4 {
            return None;
        }
        let (email, body) = match lines[3].strip_prefix(EMAIL_PREFIX) {
            Some(email) => {
                let email = email.trim();
                ((!email.is_empty()).then(|| email.to_string()), &lines[4..])
            }
            None => (None, &lines[3..]),
        };
        Some(Self {
            id,
            timestamp: lines[0].trim().to_string(),
            kind: lines[1].trim().to_string(),
            status: lines[2].trim().to_string(),
            email,
            message: body.join("\n").trim().to_string(),
        })
    }

    fn render(&self) -> String {
        let mut out = format!("{}\n{}\n{}\n", self.timestamp, self.kind, self.status);
        out.push_str(EMAIL_PREFIX);
        if let Some(email) = &self.email {
            out.push(' ');
            out.push_str(email);
        }
        out.push('\n');
        out.push_str(&self.message);
        out.push('\n');
        out
    }
}

/// Header fields must stay on one line to keep the layout intact.
fn single_line(value: &str) -> String {
    value.split(['\r', '\n']).collect::<Vec<_>>().join(" ").trim().to_string()
}

/// Directory of feedback files. Writers are serialized so ids stay unique.
#[derive(Debug)]
pub struct FeedbackStore {
    dir: PathBuf,
    write: Mutex<()>,
}

impl FeedbackStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, id: u64) -> PathBuf {
        self.dir.join(format!("{id}.txt"))
    }

    /// Numeric ids of every `<n>.txt` file.
    fn ids(&self) -> Result<Vec<u64>, IconError> {
        let read = match fs::read_dir(&self.dir) {
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(IconError::Io(self.dir.clone(), err)),
        };
        let mut ids = Vec::new();
        for entry in read {
            let path = entry.map_err(IconError::io(&self.dir))?.path();
            if path.extension().is_some_and(|e| e == "txt")
                && let Some(id) = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|s| s.parse().ok())
            {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Store a new submission with the next free id.
    pub fn submit(
        &self,
        kind: &str,
        message: &str,
        email: Option<&str>,
        now: DateTimeUtc,
    ) -> Result<Feedback, IconError> {
        let _guard = self.write.lock();
        fs::create_dir_all(&self.dir).map_err(IconError::io(&self.dir))?;

        let id = self.ids()?.into_iter().max().unwrap_or(0) + 1;
        let feedback = Feedback {
            id,
            timestamp: now.to_rfc3339(),
            kind: single_line(kind),
            status: STATUS_NEW.to_string(),
            email: email.map(single_line).filter(|e| !e.is_empty()),
            message: message.trim().to_string(),
        };

        let path = self.path(id);
        fs::write(&path, feedback.render()).map_err(IconError::io(path))?;
        Ok(feedback)
    }

    /// Load one submission.
    pub fn get(&self, id: u64) -> Result<Feedback, IconError> {
        let path = self.path(id);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(IconError::FeedbackNotFound(id));
            }
            Err(err) => return Err(IconError::Io(path, err)),
        };
        Feedback::parse(id, &content).ok_or(IconError::FeedbackNotFound(id))
    }

    /// All readable submissions, newest first.
    ///
    /// Unreadable or malformed files are logged and skipped.
    pub fn list(&self) -> Result<Vec<Feedback>, IconError> {
        let mut all: Vec<Feedback> = self
            .ids()?
            .into_iter()
            .filter_map(|id| match self.get(id) {
                Ok(feedback) => Some(feedback),
                Err(err) => {
                    crate::log!("feedback"; "skipping {}.txt: {}", id, err.message());
                    None
                }
            })
            .collect();
        all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(all)
    }

    /// Rewrite the status line of a submission.
    pub fn set_status(&self, id: u64, status: &str) -> Result<Feedback, IconError> {
        let _guard = self.write.lock();
        let mut feedback = self.get(id)?;
        feedback.status = single_line(status);
        let path = self.path(id);
        fs::write(&path, feedback.render()).map_err(IconError::io(path))?;
        Ok(feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn at(second: u8) -> DateTimeUtc {
        DateTimeUtc::new(2024, 6, 15, 12, 0, second)
    }

    #[test]
    fn test_submit_assigns_increasing_ids() {
        let dir = TempDir::new().unwrap();
        let store = FeedbackStore::new(dir.path().join("feedback"));

        let first = store.submit("bug", "broken icon", None, at(1)).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.status, STATUS_NEW);

        // Gaps and stray files do not matter: next id is max + 1.
        fs::write(store.dir().join("7.txt"), "x\ny\nz\nw\n").unwrap();
        fs::write(store.dir().join("notes.txt"), "").unwrap();
        let next = store.submit("idea", "more flags", None, at(2)).unwrap();
        assert_eq!(next.id, 8);
    }

    #[test]
    fn test_file_layout() {
        let dir = TempDir::new().unwrap();
        let store = FeedbackStore::new(dir.path());
        store
            .submit("bug", "line one\nline two", Some("a@b.c"), at(5))
            .unwrap();

        let content = fs::read_to_string(dir.path().join("1.txt")).unwrap();
        assert_eq!(
            content,
            "2024-06-15T12:00:05Z\nbug\nnew\nemail: a@b.c\nline one\nline two\n"
        );
        let loaded = store.get(1).unwrap();
        assert_eq!(loaded.email.as_deref(), Some("a@b.c"));
        assert_eq!(loaded.message, "line one\nline two");
    }

    #[test]
    fn test_anonymous_message_that_looks_like_email() {
        let dir = TempDir::new().unwrap();
        let store = FeedbackStore::new(dir.path());
        store
            .submit("bug", "email: export button does nothing", None, at(3))
            .unwrap();

        let content = fs::read_to_string(dir.path().join("1.txt")).unwrap();
        assert_eq!(
            content,
            "2024-06-15T12:00:03Z\nbug\nnew\nemail:\nemail: export button does nothing\n"
        );
        let loaded = store.get(1).unwrap();
        assert_eq!(loaded.email, None);
        assert_eq!(loaded.message, "email: export button does nothing");
    }

    #[test]
    fn test_legacy_layout_loads() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("3.txt"),
            "2024-01-01T10:00:00.123456\nfeature\nread\nplease add dark flags\n",
        )
        .unwrap();
        let store = FeedbackStore::new(dir.path());
        let feedback = store.get(3).unwrap();
        assert_eq!(feedback.kind, "feature");
        assert_eq!(feedback.status, "read");
        assert_eq!(feedback.email, None);
        assert_eq!(feedback.message, "please add dark flags");
    }

    #[test]
    fn test_list_newest_first_skips_malformed() {
        let dir = TempDir::new().unwrap();
        let store = FeedbackStore::new(dir.path());
        store.submit("a", "old", None, at(1)).unwrap();
        store.submit("b", "new", None, at(9)).unwrap();
        fs::write(dir.path().join("50.txt"), "too\nshort\n").unwrap();

        let list = store.list().unwrap();
        let messages: Vec<_> = list.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(messages, vec!["new", "old"]);
    }

    #[test]
    fn test_set_status() {
        let dir = TempDir::new().unwrap();
        let store = FeedbackStore::new(dir.path());
        store.submit("bug", "msg", Some("x@y.z"), at(1)).unwrap();

        let updated = store.set_status(1, "in_progress\nsneaky").unwrap();
        assert_eq!(updated.status, "in_progress sneaky");
        let reloaded = store.get(1).unwrap();
        assert_eq!(reloaded.status, "in_progress sneaky");
        assert_eq!(reloaded.email.as_deref(), Some("x@y.z"));
        assert_eq!(reloaded.message, "msg");

        assert!(matches!(
            store.set_status(99, "read"),
            Err(IconError::FeedbackNotFound(99))
        ));
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FeedbackStore::new(dir.path().join("none"));
        assert!(store.list().unwrap().is_empty());
    }
}
