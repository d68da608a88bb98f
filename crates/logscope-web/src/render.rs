//! HTML rendering for the index and view pages.

use serde_json::Value;

use logscope_types::{LEVEL_FIELD, LogRecord, MESSAGE_FIELD};

use crate::config::SavedConfig;

/// Everything the directory view page needs
pub struct ViewPage<'a> {
    pub dir: &'a str,
    pub rule_set: &'a str,
    pub rule_set_names: Vec<&'a str>,
    pub dir_rule_set_names: Vec<&'a str>,
    pub limit: usize,
    pub offset: usize,
    pub step: usize,
    pub records: &'a [LogRecord],
}

/// Escape text for both element content and attribute values
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Field value as shown to the operator: strings bare, other values as JSON
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Wrap page content in the shared chrome
fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"/static/style.css\">\n\
         </head>\n\
         <body>\n{body}</body>\n\
         </html>\n",
        title = escape(title),
    )
}

/// A bare page carrying one message, used for errors
pub fn message_page(text: &str) -> String {
    let body = format!("<p class=\"notice\">{}</p>\n", escape(text));
    page("logscope", &body)
}

/// The landing page: configured directories and rule sets
pub fn index_page(config: &SavedConfig) -> String {
    let mut body = String::from("<h1>logscope</h1>\n");

    body.push_str("<h2>Log directories</h2>\n<ul>\n");
    for dir in config.dir_names() {
        let mut links = format!(
            "<a href=\"/view/{dir}\">{dir}</a>",
            dir = escape(dir)
        );
        for name in config.dir_rule_set_names(dir) {
            links.push_str(&format!(
                " &middot; <a href=\"/view/{dir}/{name}\">{name}</a>",
                dir = escape(dir),
                name = escape(name),
            ));
        }
        body.push_str(&format!("<li>{links}</li>\n"));
    }
    body.push_str("</ul>\n");

    body.push_str("<h2>Rule sets</h2>\n<ul>\n");
    for name in config.rule_set_names() {
        body.push_str(&format!("<li>{}</li>\n", escape(name)));
    }
    body.push_str("</ul>\n");

    page("logscope", &body)
}

/// The directory view: rule-set links, pager, record table
pub fn view_page(view: &ViewPage<'_>) -> String {
    let mut body = format!("<h1>{}</h1>\n", escape(view.dir));

    body.push_str("<p class=\"rulesets\">Rule sets: ");
    body.push_str(&format!(
        "<a href=\"{}\">(none)</a>",
        view_url(view.dir, "", view.limit, 0, view.step)
    ));
    for name in view.dir_rule_set_names.iter().chain(&view.rule_set_names) {
        let marker = if *name == view.rule_set { " class=\"active\"" } else { "" };
        body.push_str(&format!(
            " <a{marker} href=\"{url}\">{name}</a>",
            url = view_url(view.dir, name, view.limit, 0, view.step),
            name = escape(name),
        ));
    }
    body.push_str("</p>\n");

    body.push_str("<p class=\"pager\">");
    if view.offset > 0 {
        let newer = view.offset.saturating_sub(view.step);
        body.push_str(&format!(
            "<a href=\"{}\">newer</a> ",
            view_url(view.dir, view.rule_set, view.limit, newer, view.step)
        ));
    }
    body.push_str(&format!(
        "<span>showing {} records from offset {}</span>",
        view.records.len(),
        view.offset,
    ));
    body.push_str(&format!(
        " <a href=\"{}\">older</a>",
        view_url(
            view.dir,
            view.rule_set,
            view.limit,
            view.offset.saturating_add(view.step),
            view.step
        )
    ));
    body.push_str("</p>\n");

    body.push_str("<table class=\"records\">\n<tr><th>time</th><th>level</th><th>message</th><th></th></tr>\n");
    for record in view.records {
        body.push_str(&record_row(record));
    }
    body.push_str("</table>\n");

    page(&format!("logscope: {}", view.dir), &body)
}

fn view_url(dir: &str, rule_set: &str, limit: usize, offset: usize, step: usize) -> String {
    let base = if rule_set.is_empty() {
        format!("/view/{}", escape(dir))
    } else {
        format!("/view/{}/{}", escape(dir), escape(rule_set))
    };
    format!("{base}?limit={limit}&offset={offset}&step={step}")
}

fn record_row(record: &LogRecord) -> String {
    let cell = |name: &str| {
        record
            .get(name)
            .map(|value| escape(&display_value(value)))
            .unwrap_or_default()
    };
    let level = record.level().unwrap_or_default();
    let time = record
        .time()
        .map(|value| escape(&display_value(value)))
        .unwrap_or_default();
    format!(
        "<tr class=\"level-{level}\"><td>{time}</td><td>{level_cell}</td><td>{message}</td><td class=\"extra\">{extra}</td></tr>\n",
        level = escape(level),
        time = time,
        level_cell = cell(LEVEL_FIELD),
        message = cell(MESSAGE_FIELD),
        extra = extra_params(record),
    )
}

/// Remaining fields as `"name"=value` pairs, sorted by name
fn extra_params(record: &LogRecord) -> String {
    record
        .extra_fields()
        .iter()
        .map(|(name, value)| {
            format!("&quot;{}&quot;={}", escape(name), escape(&display_value(value)))
        })
        .collect::<Vec<_>>()
        .join(" ")
}
