//! HTML pages served by the `/`, `/status` and not-found routes.

use crate::state::StatusReport;

const STYLE: &str = "body{font-family:-apple-system,Helvetica,sans-serif;margin:2em;color:#222}\
code{background:#f2f2f2;padding:2px 4px;border-radius:3px}\
.ok{color:#1a7f37}.off{color:#b42318}";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

pub fn index_page() -> String {
    page(
        "Photo Server",
        "<h1>Photo Server</h1>\n\
         <ul>\n\
         <li><a href=\"/status\"><code>GET /status</code></a> - server status page</li>\n\
         <li><a href=\"/api/status\"><code>GET /api/status</code></a> - server status as JSON</li>\n\
         <li><a href=\"/api/photo\"><code>GET /api/photo</code></a> - take a photo, returned as base64 JPEG in JSON</li>\n\
         </ul>",
    )
}

pub fn status_page(report: &StatusReport) -> String {
    let server_class = if report.state.is_running() { "ok" } else { "off" };
    let (camera_class, camera_text) = if report.camera_active {
        ("ok", "active")
    } else {
        ("off", "inactive")
    };
    page(
        "Photo Server Status",
        &format!(
            "<h1>Status</h1>\n\
             <p>Server: <span class=\"{server_class}\">{}</span></p>\n\
             <p>Camera: <span class=\"{camera_class}\">{camera_text}</span></p>\n\
             <p><a href=\"/\">Back</a></p>",
            escape(&report.state.status_text())
        ),
    )
}

pub fn not_found_page(path: &str) -> String {
    page(
        "404 Not Found",
        &format!(
            "<h1>404 Not Found</h1>\n<p>No route for <code>{}</code>.</p>\n<p><a href=\"/\">Back</a></p>",
            escape(path)
        ),
    )
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
