//! HTTP responses.
//!
//! Handlers build a [`Reply`]; [`send`] turns it into a `tiny_http` response
//! with CORS headers on every answer.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tiny_http::{Header, Request, Response, StatusCode};

use crate::export::Download;
use crate::library::IconError;
use crate::utils::mime::{self, types};

#[derive(Debug)]
pub enum Body {
    Bytes(Vec<u8>),
    File(PathBuf),
    Empty,
}

/// A response not yet sent.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Body,
    /// File name for `Content-Disposition: attachment`.
    pub attachment: Option<String>,
}

impl Reply {
    pub fn json(value: &Value) -> Self {
        Self::json_with_status(200, value)
    }

    pub fn json_with_status(status: u16, value: &Value) -> Self {
        Self {
            status,
            content_type: types::JSON,
            body: Body::Bytes(value.to_string().into_bytes()),
            attachment: None,
        }
    }

    pub fn error(err: &IconError) -> Self {
        Self::json_with_status(err.status(), &json!({ "error": err.message() }))
    }

    pub fn not_found() -> Self {
        Self::json_with_status(404, &json!({ "error": "Not found" }))
    }

    pub fn unavailable() -> Self {
        Self::json_with_status(503, &json!({ "error": "Server is shutting down" }))
    }

    /// 204 answer to CORS preflight.
    pub fn preflight() -> Self {
        Self {
            status: 204,
            content_type: types::PLAIN,
            body: Body::Empty,
            attachment: None,
        }
    }

    pub fn bytes(content_type: &'static str, bytes: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            body: Body::Bytes(bytes),
            attachment: None,
        }
    }

    /// Stream a file from disk, typed by extension.
    pub fn file(path: PathBuf) -> Self {
        Self {
            status: 200,
            content_type: mime::from_path(&path),
            body: Body::File(path),
            attachment: None,
        }
    }

    pub fn attachment(mut self, file_name: impl Into<String>) -> Self {
        self.attachment = Some(file_name.into());
        self
    }

    /// Body bytes, for in-memory bodies.
    #[cfg(test)]
    pub fn body_bytes(&self) -> &[u8] {
        match &self.body {
            Body::Bytes(bytes) => bytes,
            _ => &[],
        }
    }

    #[cfg(test)]
    pub fn body_json(&self) -> Value {
        serde_json::from_slice(self.body_bytes()).unwrap()
    }
}

impl From<Download> for Reply {
    fn from(download: Download) -> Self {
        Self::bytes(download.content_type, download.bytes).attachment(download.file_name)
    }
}

/// Send a reply, adding content type, CORS and attachment headers.
pub fn send(request: Request, reply: Reply) -> Result<()> {
    let mut headers = vec![
        make_header("Content-Type", reply.content_type),
        make_header("Access-Control-Allow-Origin", "*"),
        make_header("Access-Control-Allow-Methods", "GET, POST, PUT, OPTIONS"),
        make_header("Access-Control-Allow-Headers", "*"),
    ];
    if let Some(name) = &reply.attachment {
        let value = format!("attachment; filename=\"{}\"", name.replace('"', ""));
        if let Ok(header) = Header::from_bytes("Content-Disposition", value.as_bytes()) {
            headers.push(header);
        }
    }

    let status = StatusCode(reply.status);
    let response = match reply.body {
        Body::Bytes(bytes) => Response::from_data(bytes).boxed(),
        Body::Empty => Response::empty(status).boxed(),
        Body::File(path) => {
            let file =
                File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
            Response::from_file(file).boxed()
        }
    };

    let response = headers
        .into_iter()
        .fold(response.with_status_code(status), Response::with_header);
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}
