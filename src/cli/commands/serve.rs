//! Serve command - the browser UI and its JSON API.
//!
//! Serves a single page with the link form, accepts download submissions,
//! and exposes polling and file-delivery endpoints for running jobs.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::jobs::{JobRegistry, JobSink};
use crate::orchestrator::Orchestrator;
use crate::workspace;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    jobs: Arc<JobRegistry>,
}

/// Run the web server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    // Surface missing tools at startup; every request re-checks anyway.
    if let Err(e) = preflight::yt_dlp_path(&settings) {
        Output::warning(&e.to_string());
    }
    if let Err(e) = preflight::ffmpeg_path(&settings) {
        Output::warning(&e.to_string());
    }

    let _sweeper = workspace::spawn_sweeper(&settings);

    let state = Arc::new(AppState {
        orchestrator: Orchestrator::new(settings),
        jobs: Arc::new(JobRegistry::default()),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/downloads", post(submit_download))
        .route("/api/downloads/{id}", get(job_status))
        .route("/api/downloads/{id}/file", get(job_file))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Hent");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Web UI", "GET  /");
    Output::kv("Health", "GET  /health");
    Output::kv("Submit", "POST /api/downloads");
    Output::kv("Job status", "GET  /api/downloads/:id");
    Output::kv("Job file", "GET  /api/downloads/:id/file");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct DownloadRequest {
    /// The submitted link, exactly as typed into the form.
    link: String,
}

#[derive(Serialize)]
struct DownloadResponse {
    job_id: Uuid,
}

#[derive(Serialize)]
struct JobStatusResponse {
    /// "running" until the pipeline finishes, then "done".
    state: &'static str,
    /// Completion fraction in [0, 1].
    progress: f64,
    /// Short line for the progress display.
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn index() -> Html<&'static str> {
    Html(PAGE)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn submit_download(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DownloadRequest>,
) -> impl IntoResponse {
    let id = state.jobs.create();
    let sink = JobSink::new(state.jobs.clone(), id);

    let task_state = state.clone();
    tokio::spawn(async move {
        let delivery = task_state.orchestrator.download_music(&req.link, &sink).await;
        task_state.jobs.finish(id, delivery);
    });

    Json(DownloadResponse { job_id: id })
}

async fn job_status(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(id): axum::extract::Path<Uuid>,
) -> Response {
    match state.jobs.snapshot(id) {
        Some(snapshot) => {
            let file_name = snapshot
                .file
                .as_deref()
                .and_then(|f| f.file_name())
                .map(|n| n.to_string_lossy().into_owned());
            let file_url = snapshot
                .file
                .is_some()
                .then(|| format!("/api/downloads/{}/file", id));

            Json(JobStatusResponse {
                state: if snapshot.done { "done" } else { "running" },
                progress: snapshot.fraction,
                description: snapshot.description,
                status: snapshot.status,
                file_url,
                file_name,
            })
            .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Unknown job: {}", id),
            }),
        )
            .into_response(),
    }
}

async fn job_file(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(id): axum::extract::Path<Uuid>,
) -> Response {
    let Some(path) = state.jobs.file_for(id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No file for job: {}", id),
            }),
        )
            .into_response();
    };

    // The workspace may already have been swept.
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("File unavailable: {}", e),
                }),
            )
                .into_response();
        }
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());
    let content_type = if path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
    {
        "application/zip"
    } else {
        "audio/mpeg"
    };

    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", header_safe_name(&name)),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Strip characters that cannot appear in a quoted header value.
fn header_safe_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// === Page ===

const PAGE: &str = r##"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Youtube2MP3</title>
<style>
  :root { --accent: #b91c1c; }
  * { box-sizing: border-box; }
  body { font-family: system-ui, sans-serif; background: #fafafa; color: #1f2937; margin: 0; }
  main { max-width: 640px; margin: 3rem auto; padding: 0 1rem; }
  h1 { margin-bottom: 0.25rem; }
  .sub { color: #6b7280; margin-top: 0; }
  label { display: block; font-size: 0.85rem; color: #374151; margin: 1rem 0 0.25rem; }
  input[type=text] { width: 100%; padding: 0.6rem; border: 1px solid #d1d5db; border-radius: 6px; font-size: 1rem; }
  .buttons { display: flex; gap: 0.5rem; margin-top: 0.75rem; }
  button { padding: 0.55rem 1.2rem; border-radius: 6px; border: 1px solid #d1d5db; background: #fff; cursor: pointer; font-size: 0.95rem; }
  button.primary { background: var(--accent); border-color: var(--accent); color: #fff; }
  button:disabled { opacity: 0.6; cursor: default; }
  .progress { height: 8px; background: #e5e7eb; border-radius: 4px; margin-top: 1.25rem; overflow: hidden; }
  .progress div { height: 100%; width: 0; background: var(--accent); transition: width 0.3s; }
  .desc { font-size: 0.85rem; color: #6b7280; min-height: 1.2rem; margin-top: 0.3rem; }
  .file { display: none; margin-top: 1rem; padding: 0.75rem; border: 1px solid #d1d5db; border-radius: 6px; background: #fff; }
  .file a { color: var(--accent); font-weight: 600; }
  .status { margin-top: 1rem; }
  .status input { background: #f3f4f6; }
  details { margin-top: 2rem; color: #4b5563; font-size: 0.9rem; }
  details li { margin: 0.3rem 0; }
</style>
</head>
<body>
<main>
  <h1>Youtube2MP3</h1>
  <p class="sub">Paste a YouTube link and get the audio back as MP3.</p>

  <label for="link">YouTube link</label>
  <input type="text" id="link" placeholder="https://www.youtube.com/watch?v=...">

  <div class="buttons">
    <button class="primary" id="download">Download MP3</button>
    <button id="clear">Clear</button>
  </div>

  <div class="progress"><div id="bar"></div></div>
  <p class="desc" id="desc"></p>

  <div class="file" id="file">
    <a id="file-link" href="">download</a>
  </div>

  <div class="status">
    <label for="status">Status</label>
    <input type="text" id="status" readonly>
  </div>

  <details>
    <summary>Tips</summary>
    <ul>
      <li>Playlist links download every entry; several files arrive as one zip.</li>
      <li>MP3 conversion needs ffmpeg installed on the server.</li>
      <li>Finished files are swept after a while, so download them promptly.</li>
    </ul>
  </details>
</main>
<script>
(function () {
  var link = document.getElementById('link');
  var download = document.getElementById('download');
  var clear = document.getElementById('clear');
  var bar = document.getElementById('bar');
  var desc = document.getElementById('desc');
  var fileBox = document.getElementById('file');
  var fileLink = document.getElementById('file-link');
  var status = document.getElementById('status');
  var timer = null;

  function reset() {
    if (timer) { clearInterval(timer); timer = null; }
    bar.style.width = '0';
    desc.textContent = '';
    status.value = '';
    fileBox.style.display = 'none';
    download.disabled = false;
  }

  function finish(job) {
    clearInterval(timer);
    timer = null;
    download.disabled = false;
    status.value = job.status || '';
    if (job.file_url) {
      bar.style.width = '100%';
      fileLink.href = job.file_url;
      fileLink.textContent = job.file_name || 'download';
      fileBox.style.display = 'block';
    }
  }

  function poll(id) {
    timer = setInterval(function () {
      fetch('/api/downloads/' + id)
        .then(function (res) {
          if (!res.ok) { throw new Error('job not found'); }
          return res.json();
        })
        .then(function (job) {
          bar.style.width = Math.round(job.progress * 100) + '%';
          desc.textContent = job.description || '';
          if (job.state === 'done') { finish(job); }
        })
        .catch(function (err) {
          clearInterval(timer);
          timer = null;
          download.disabled = false;
          status.value = 'Error: ' + err.message;
        });
    }, 600);
  }

  download.addEventListener('click', function () {
    reset();
    download.disabled = true;
    fetch('/api/downloads', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ link: link.value })
    })
      .then(function (res) { return res.json(); })
      .then(function (data) { poll(data.job_id); })
      .catch(function (err) {
        download.disabled = false;
        status.value = 'Error: ' + err.message;
      });
  });

  clear.addEventListener('click', function () {
    link.value = '';
    reset();
  });

  link.addEventListener('keydown', function (e) {
    if (e.key === 'Enter') { download.click(); }
  });
})();
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_safe_name_passes_plain_names() {
        assert_eq!(header_safe_name("Song Title.mp3"), "Song Title.mp3");
        assert_eq!(header_safe_name("downloads.zip"), "downloads.zip");
    }

    #[test]
    fn test_header_safe_name_replaces_quotes_and_controls() {
        assert_eq!(header_safe_name("a\"b.mp3"), "a_b.mp3");
        assert_eq!(header_safe_name("a\\b.mp3"), "a_b.mp3");
        assert_eq!(header_safe_name("a\nb.mp3"), "a_b.mp3");
    }

    #[test]
    fn test_header_safe_name_replaces_non_ascii() {
        assert_eq!(header_safe_name("blåbær.mp3"), "bl_b_r.mp3");
    }

    #[test]
    fn test_page_wires_the_api_routes() {
        assert!(PAGE.contains("/api/downloads"));
        assert!(PAGE.contains("Download MP3"));
        assert!(PAGE.contains("Clear"));
        assert!(PAGE.contains("Tips"));
    }
}
