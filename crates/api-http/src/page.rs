//! Server-rendered HTML

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use ddbackup_core::domain::Device;
use std::fmt::Write;

const STYLESHEET: &str = "/style.css";

/// Escape text for use in element content and double-quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<link rel=\"stylesheet\" href=\"{STYLESHEET}\">\n\
         </head>\n<body>\n{body}</body>\n</html>\n",
        title = escape_html(title),
    )
}

/// Device table, schedule and both forms
pub fn render_index(
    devices: &[Device],
    schedule: &str,
    next_fire: Option<DateTime<Utc>>,
) -> String {
    let mut body = String::from("<h1>Device Backups</h1>\n");

    body.push_str("<h2>Devices</h2>\n");
    if devices.is_empty() {
        body.push_str("<p>No devices registered.</p>\n");
    } else {
        body.push_str(
            "<table>\n<tr><th>ID</th><th>User</th><th>IP</th><th>Output File</th></tr>\n",
        );
        for device in devices {
            // Writing to a String cannot fail
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                device.id,
                escape_html(&device.user),
                escape_html(&device.ip),
                escape_html(&device.output_file),
            );
        }
        body.push_str("</table>\n");
    }

    body.push_str("<h2>Schedule</h2>\n");
    let _ = writeln!(
        body,
        "<p>Current schedule: <code>{}</code></p>",
        escape_html(schedule)
    );
    match next_fire {
        Some(at) => {
            let _ = writeln!(
                body,
                "<p>Next backup: <time>{}</time></p>",
                at.format("%Y-%m-%d %H:%M UTC")
            );
        }
        None => body.push_str("<p>Next backup: not scheduled</p>\n"),
    }

    body.push_str(
        "<h2>Add Device</h2>\n\
         <form method=\"post\" action=\"/add-device\">\n\
         <input name=\"user\" placeholder=\"user\">\n\
         <input name=\"ip\" placeholder=\"ip\">\n\
         <input name=\"outputFile\" placeholder=\"output file\">\n\
         <button type=\"submit\">Add</button>\n\
         </form>\n",
    );
    let _ = write!(
        body,
        "<h2>Set Schedule</h2>\n\
         <form method=\"post\" action=\"/set-schedule\">\n\
         <input name=\"schedule\" value=\"{}\">\n\
         <button type=\"submit\">Save</button>\n\
         </form>\n",
        escape_html(schedule)
    );

    layout("Device Backups", &body)
}

pub fn render_error(status: StatusCode, message: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n<p><a href=\"/\">Back</a></p>\n",
        status,
        escape_html(message)
    );
    layout(status.canonical_reason().unwrap_or("Error"), &body)
}
