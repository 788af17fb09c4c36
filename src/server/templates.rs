//! HTML pages served by the web UI

use serde_json::{Map, Value};

use crate::inference::{FieldType, COMPANY_FIELDS};

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Outcome Screener</title>
    <style>
        body{font-family:system-ui,sans-serif;background:#111827;color:#f3f4f6;margin:0;padding:2rem}
        a{color:#60a5fa}
        form{display:grid;grid-template-columns:repeat(auto-fill,minmax(260px,1fr));gap:.75rem;margin:1rem 0}
        label{display:flex;flex-direction:column;font-size:.85rem;color:#9ca3af}
        input{margin-top:.25rem;padding:.4rem;border-radius:4px;border:1px solid #374151;background:#1f2937;color:#f3f4f6}
        button{padding:.5rem 1rem;border:0;border-radius:4px;background:#3b82f6;color:#fff;cursor:pointer}
        table{border-collapse:collapse;font-size:.8rem;width:100%}
        th,td{border:1px solid #374151;padding:.3rem .5rem;text-align:left}
        th{background:#1f2937}
        #result{margin-top:1rem;font-weight:600}
    </style>
</head>
<body>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

const PREDICT_SCRIPT: &str = r#"<script>
document.getElementById('predict-form').addEventListener('submit', async (e) => {
    e.preventDefault();
    const out = document.getElementById('result');
    const res = await fetch('/predict', {method: 'POST', body: new URLSearchParams(new FormData(e.target))});
    const body = await res.json();
    out.textContent = body.error
        ? 'Error: ' + body.error
        : body.Prediction + ' (confidence ' + body.Confidence + '%)';
});
</script>
"#;

/// Escape text for HTML element and attribute content
pub fn escape_html(text: &str) -> String {
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

fn prediction_form() -> String {
    let mut html = String::from("<form id=\"predict-form\" method=\"post\" action=\"/predict\">\n");
    for field in COMPANY_FIELDS {
        let input_type = match field.kind {
            FieldType::Categorical => "text",
            FieldType::Integer | FieldType::Float => "text\" inputmode=\"decimal",
        };
        html.push_str(&format!(
            "    <label>{}<input type=\"{}\" name=\"{}\"{}></label>\n",
            field.column,
            input_type,
            field.form_name(),
            if field.required { " required" } else { "" },
        ));
    }
    html.push_str("    <div><button type=\"submit\">Predict</button></div>\n</form>\n");
    html.push_str("<div id=\"result\"></div>\n");
    html
}

const SEARCH_BOX: &str = r#"<form method="get" action="/search_companies" style="display:flex;gap:.5rem">
    <input type="text" name="company_name" placeholder="Company name">
    <button type="submit">Search</button>
</form>
"#;

/// Home page: search box and prediction form
pub fn index_page() -> String {
    let mut html = String::from(PAGE_HEAD);
    html.push_str("<h1>Outcome Screener</h1>\n<h2>Search companies</h2>\n");
    html.push_str(SEARCH_BOX);
    html.push_str("<h2>Predict outcome</h2>\n");
    html.push_str(&prediction_form());
    html.push_str(PREDICT_SCRIPT);
    html.push_str(PAGE_TAIL);
    html
}

/// Standalone prediction form
pub fn predict_page() -> String {
    let mut html = String::from(PAGE_HEAD);
    html.push_str("<h1>Predict outcome</h1>\n<p><a href=\"/\">Home</a></p>\n");
    html.push_str(&prediction_form());
    html.push_str(PREDICT_SCRIPT);
    html.push_str(PAGE_TAIL);
    html
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => escape_html(s),
        Some(other) => escape_html(&other.to_string()),
    }
}

/// Search results as an HTML table
pub fn search_results_page(query: &str, columns: &[String], rows: &[&Map<String, Value>]) -> String {
    let mut html = String::from(PAGE_HEAD);
    html.push_str(&format!(
        "<h1>Results for \"{}\"</h1>\n<p>{} match(es). <a href=\"/\">Home</a></p>\n",
        escape_html(query),
        rows.len()
    ));
    html.push_str(SEARCH_BOX);

    if rows.is_empty() {
        html.push_str("<p>No companies found.</p>\n");
    } else {
        html.push_str("<table>\n<thead><tr>");
        for column in columns {
            html.push_str(&format!("<th>{}</th>", escape_html(column)));
        }
        html.push_str("</tr></thead>\n<tbody>\n");
        for row in rows {
            html.push_str("<tr>");
            for column in columns {
                html.push_str(&format!("<td>{}</td>", cell(row.get(column))));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>\n");
    }

    html.push_str(PAGE_TAIL);
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href='x'>&</a>"), "&lt;a href=&#39;x&#39;&gt;&amp;&lt;/a&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_form_lists_every_field() {
        let page = index_page();
        for field in COMPANY_FIELDS {
            assert!(page.contains(&format!("name=\"{}\"", field.form_name())));
        }
    }

    #[test]
    fn test_results_table() {
        let row = json!({"name_org": "Acme <Corp>", "num_funding_rounds": 2, "city": null});
        let row = row.as_object().unwrap();
        let columns = vec!["name_org".to_string(), "num_funding_rounds".to_string(), "city".to_string()];
        let page = search_results_page("acme", &columns, &[row]);
        assert!(page.contains("<td>Acme &lt;Corp&gt;</td><td>2</td><td></td>"));
        assert!(page.contains("1 match(es)"));

        let empty = search_results_page("zzz", &columns, &[]);
        assert!(empty.contains("No companies found."));
    }
}
