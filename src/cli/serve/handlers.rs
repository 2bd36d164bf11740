//! JSON endpoint handlers.
//!
//! [`dispatch`] is the whole HTTP surface minus the socket: it takes the
//! method, raw URL and body of a request and returns the [`Reply`] to send.
//! Every library error is turned into `{"error": ...}` here.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tiny_http::Method;

use super::AppState;
use super::path::{Target, resolve_path};
use super::response::Reply;
use super::router::{IconPath, Mount, Route};
use crate::export::{self, ExportFormat};
use crate::feedback::STATUS_RESPONDED;
use crate::library::catalog::{self, Folder};
use crate::library::{
    IconError, IconKind, IconLocation, Mode, ROOT_FOLDER, resolve, validate_segment,
};
use crate::utils::date::DateTimeUtc;
use crate::utils::mime::types;
use crate::{debug, log};

/// Route a request and run its handler.
pub fn dispatch(state: &AppState, method: &Method, url: &str, body: &[u8]) -> Reply {
    let Some(target) = Target::parse(url) else {
        return Reply::not_found();
    };
    let route = Route::parse(method, &target.segments());
    debug!("serve"; "{} {} -> {:?}", method, url, route);

    match handle(state, route, &target, body) {
        Ok(reply) => reply,
        Err(err) => {
            log!("serve"; "{} {}: {}", method, url, err.message());
            Reply::error(&err)
        }
    }
}

fn handle(state: &AppState, route: Route, target: &Target, body: &[u8]) -> Result<Reply, IconError> {
    let library = &state.library;
    let config = library.config();
    let mode = || Mode::from_query(target.query("mode"));

    let reply: Reply = match route {
        Route::Health => Reply::json(&json!({
            "message": "Icon Manager Backend is running!",
            "png_export": true,
        })),
        Route::Preflight => Reply::preflight(),
        Route::NotFound => Reply::not_found(),

        Route::Icons => {
            let tree = resolve(config, IconKind::Icon, ROOT_FOLDER, mode()?);
            folders_reply(catalog::folders(&tree)?)
        }
        Route::FolderIcons(folder) => {
            let tree = resolve(config, IconKind::Icon, ROOT_FOLDER, mode()?);
            Reply::json(&json!({ "icons": catalog::folder_icons(&tree, &folder)? }))
        }
        Route::ColorfulIcons => folders_reply(catalog::folders(&config.colorful)?),
        Route::SingleColor => {
            let dir = resolve(config, IconKind::SingleColor, ROOT_FOLDER, mode()?);
            Reply::json(&json!({ "icons": catalog::icon_stems(&dir)? }))
        }
        Route::Flags => Reply::json(&json!({ "flags": catalog::flags(&config.flags)? })),
        Route::Infographics => Reply::json(&json!({
            "infographics": catalog::infographics(&config.infographics)?
        })),

        Route::Groups(path) => {
            let location = path_location(&path, target)?;
            Reply::json(&json!({ "groups": library.groups(&location, &path.icon)? }))
        }
        Route::Svg(path) => {
            let location = path_location(&path, target)?;
            Reply::bytes(types::SVG, library.read_svg(&location, &path.icon)?)
        }
        Route::CheckGreyscale { folder, icon } => {
            let location = IconLocation::new(IconKind::Colorful, &folder, Mode::Light)?;
            Reply::json(&json!({ "is_greyscale": library.is_greyscale(&location, &icon)? }))
        }

        Route::UpdateColor => {
            let req: ColorRequest = parse_body(body)?;
            let location = req.place.location(IconKind::Icon)?;
            let updated = library.update_color(&location, &req.icon_name, &req.group_id, &req.color)?;
            Reply::json(&json!({ "status": "Color updated", "updated": updated }))
        }
        Route::Greyscale => {
            let req: IconRequest = parse_body(body)?;
            let location = IconLocation::new(IconKind::Colorful, &req.place.folder, Mode::Light)?;
            library.greyscale(&location, &req.icon_name)?;
            Reply::json(&json!({ "status": "Converted to greyscale" }))
        }
        Route::Revert => {
            let req: IconRequest = parse_body(body)?;
            let location = req.place.location(IconKind::Colorful)?;
            library.revert(&location, &req.icon_name)?;
            Reply::json(&json!({ "status": "Reverted to original colors" }))
        }
        Route::ExportPng => {
            let req: IconRequest = parse_body(body)?;
            let location = req.place.location(IconKind::Icon)?;
            export::png(library, &location, &req.icon_name)?.into()
        }
        Route::DownloadSvg => {
            let req: IconRequest = parse_body(body)?;
            let location = req.place.location(IconKind::Icon)?;
            export::svg(library, &location, &req.icon_name)?.into()
        }
        Route::ExportZip => {
            let req: ZipRequest = parse_body(body)?;
            let location = req.place.location(IconKind::Icon)?;
            export::zip(library, &location, &req.items, req.format, DateTimeUtc::now())?.into()
        }

        Route::SubmitFeedback => {
            let req: FeedbackRequest = parse_body(body)?;
            if req.message.trim().is_empty() {
                return Err(IconError::InvalidRequest("message must not be empty".into()));
            }
            let now = DateTimeUtc::now();
            let feedback = state
                .feedback
                .submit(&req.kind, &req.message, req.email.as_deref(), now)?;
            log!("feedback"; "received #{} ({})", feedback.id, feedback.kind);
            state.notifier.feedback_received(&feedback, now);
            Reply::json(&json!({
                "status": "Feedback submitted successfully",
                "id": feedback.id,
            }))
        }
        Route::ListFeedback => Reply::json(&json!({ "feedback": state.feedback.list()? })),
        Route::FeedbackStatus(id) => {
            let status = target
                .query("status")
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| IconError::InvalidRequest("missing status".into()))?;
            state.feedback.set_status(id, status)?;
            Reply::json(&json!({ "status": "Feedback status updated successfully" }))
        }
        Route::FeedbackRespond(id) => {
            let req: RespondRequest = parse_body(body)?;
            let feedback = state.feedback.get(id)?;
            let emailed = state.notifier.feedback_response(&feedback, &req.message);
            state.feedback.set_status(id, STATUS_RESPONDED)?;
            Reply::json(&json!({ "status": "Response recorded", "emailed": emailed }))
        }

        Route::InfographicDownload(name) => {
            validate_segment(&name)?;
            let master = config.infographics_master_path();
            if !master.is_file() {
                return Err(IconError::FileNotFound(master));
            }
            Reply::file(master).attachment(config.infographics_master.clone())
        }
        Route::Static { mount, path } => static_file(state, mount, &path),
    };
    Ok(reply)
}

fn static_file(state: &AppState, mount: Mount, path: &[String]) -> Reply {
    let segments: Vec<&str> = path.iter().map(String::as_str).collect();
    match resolve_path(&segments, &mount.dir(state.library.config())) {
        Some(file) => Reply::file(file),
        None => Reply::not_found(),
    }
}

/// `{"folders": {name: [icons]}}`, keeping the catalog order.
fn folders_reply(folders: Vec<Folder>) -> Reply {
    let folders: Map<String, Value> = folders
        .into_iter()
        .map(|f| (f.name, json!(f.icons)))
        .collect();
    Reply::json(&json!({ "folders": folders }))
}

fn path_location(path: &IconPath, target: &Target) -> Result<IconLocation, IconError> {
    IconLocation::parse(&path.kind, &path.folder, target.query("mode"))
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, IconError> {
    serde_json::from_slice(body).map_err(|e| IconError::InvalidRequest(e.to_string()))
}

fn root_folder() -> String {
    ROOT_FOLDER.to_string()
}

/// Where a request points: type, folder and mode, all optional.
#[derive(Debug, Deserialize)]
struct Place {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default = "root_folder")]
    folder: String,
    mode: Option<String>,
}

impl Place {
    fn location(&self, default_kind: IconKind) -> Result<IconLocation, IconError> {
        let kind = match &self.kind {
            Some(kind) => kind.parse()?,
            None => default_kind,
        };
        IconLocation::new(kind, &self.folder, Mode::from_query(self.mode.as_deref())?)
    }
}

#[derive(Debug, Deserialize)]
struct IconRequest {
    icon_name: String,
    #[serde(flatten)]
    place: Place,
}

#[derive(Debug, Deserialize)]
struct ColorRequest {
    icon_name: String,
    group_id: String,
    color: String,
    #[serde(flatten)]
    place: Place,
}

#[derive(Debug, Deserialize)]
struct ZipRequest {
    items: Vec<String>,
    #[serde(default)]
    format: ExportFormat,
    #[serde(flatten)]
    place: Place,
}

#[derive(Debug, Deserialize)]
struct FeedbackRequest {
    #[serde(rename = "type")]
    kind: String,
    message: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RespondRequest {
    message: String,
}
