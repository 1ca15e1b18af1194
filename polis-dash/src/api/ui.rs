//! Dashboard page
//!
//! GET / shows the input form (pre-filled from `?report=` / `?lang=` when
//! enabled). POST /run executes one session and returns the same page with
//! the status message and output region.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::present::escape_html;
use crate::session::{RunOutcome, RunRequest};
use crate::AppState;

const APP_JS: &str = include_str!("../ui/app.js");

/// Query parameters that pre-fill the inputs
#[derive(Debug, Default, Deserialize)]
pub struct PrefillQuery {
    pub report: Option<String>,
    pub lang: Option<String>,
}

/// Status line shown above the output region
enum Notice {
    Success(String),
    Error(String),
}

struct PageContent {
    report: String,
    lang: String,
    notice: Option<Notice>,
    output: Option<(String, String)>,
}

/// GET /
pub async fn serve_index(
    State(state): State<AppState>,
    Query(query): Query<PrefillQuery>,
) -> Html<String> {
    let config = &state.config;
    let (report, lang) = if config.query_prefill {
        (
            query.report.unwrap_or_else(|| config.default_report_url.clone()),
            query.lang.unwrap_or_default(),
        )
    } else {
        (config.default_report_url.clone(), String::new())
    };

    Html(render_page(
        &state,
        PageContent {
            report,
            lang,
            notice: None,
            output: None,
        },
    ))
}

/// POST /run
///
/// Load and recipe failures propagate as the generic error response.
pub async fn run_analysis(
    State(state): State<AppState>,
    Form(request): Form<RunRequest>,
) -> ApiResult<Html<String>> {
    let report = request.report.clone();
    let lang = request.lang.clone().unwrap_or_default();

    let outcome = state.services.session().run(request).await?;

    let content = match outcome {
        RunOutcome::Rejected { message, .. } => PageContent {
            report,
            lang,
            notice: Some(Notice::Error(message)),
            output: None,
        },
        RunOutcome::Completed(run) => {
            let run = *run;
            PageContent {
                report,
                lang,
                notice: Some(Notice::Success(run.status_message)),
                output: Some((run.output.plot_html, run.output.inspection_html)),
            }
        }
    };

    Ok(Html(render_page(&state, content)))
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        APP_JS,
    )
        .into_response()
}

fn render_page(state: &AppState, content: PageContent) -> String {
    let language_input = if state.config.translation_enabled {
        format!(
            r#"<label for="lang">Translate to language (2-letter code, e.g. <code>en</code>, <code>fr</code>). Leave blank to skip.</label>
    <input id="lang" name="lang" type="text" maxlength="2" value="{}">"#,
            escape_html(&content.lang)
        )
    } else {
        String::new()
    };

    let notice = match &content.notice {
        Some(Notice::Success(msg)) => format!(r#"<div class="notice success">{}</div>"#, escape_html(msg)),
        Some(Notice::Error(msg)) => format!(r#"<div class="notice error">{}</div>"#, escape_html(msg)),
        None => String::new(),
    };

    let output = match &content.output {
        Some((plot, inspection)) => format!(
            "<h2>Statement Map</h2>\n{}\n{}",
            plot, inspection
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Pol.is → Polis2 Statements</title>
    <style>
        body {{ font-family: system-ui, -apple-system, sans-serif; margin: 24px 40px; line-height: 1.5; }}
        h1 {{ color: #333; border-bottom: 2px solid #0066cc; padding-bottom: 10px; }}
        label {{ display: block; margin-top: 12px; }}
        input[type=text] {{ width: 100%; max-width: 640px; padding: 6px; }}
        #lang {{ width: 4em; }}
        button {{ margin-top: 16px; padding: 10px 20px; background: #0066cc; color: white; border: 0; border-radius: 4px; }}
        button:disabled {{ background: #7a9cc6; }}
        .notice {{ margin: 16px 0; padding: 10px 14px; border-radius: 4px; }}
        .success {{ background: #e6f4ea; color: #1e6b35; }}
        .error {{ background: #fdecea; color: #a11d1d; }}
        #progress {{ margin: 16px 0; color: #555; }}
        table {{ border-collapse: collapse; font-size: 13px; }}
        th, td {{ border: 1px solid #ddd; padding: 4px 6px; text-align: left; }}
        pre {{ background: #f5f5f5; padding: 10px; max-height: 400px; overflow: auto; }}
    </style>
</head>
<body>
    <h1>Pol.is Report → Polis2 Statements Explorer</h1>
    <p>Paste a <strong>Pol.is report URL</strong> (e.g. <code>https://pol.is/report/xxxx</code>).
    This app will load the report, run the statements recipe, and render the statement map.</p>

    <form id="run-form" method="post" action="/run">
    <label for="report">Pol.is report URL</label>
    <input id="report" name="report" type="text" value="{report}">
    {language_input}
    <input id="run-token" name="run_token" type="hidden" value="">
    <button type="submit">Run analysis</button>
    </form>

    <div id="progress" hidden></div>
    {notice}
    {output}

    <p><small>Module: polis-dash v{version}</small></p>
    <script src="/static/app.js"></script>
</body>
</html>"#,
        report = escape_html(&content.report),
        language_input = language_input,
        notice = notice,
        output = output,
        version = env!("CARGO_PKG_VERSION"),
    )
}
