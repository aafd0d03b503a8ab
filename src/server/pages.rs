//! Server-rendered HTML for the three user-facing pages.

use std::fmt::Write;

use crate::features::{FeatureSpec, EDUCATION_NOTE, FEATURES};
use crate::server::types::ResultView;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<nav><a href="/">Home</a> | <a href="/predict">Predict</a></nav>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
        body = body,
    )
}

pub fn index_page() -> String {
    let mut body = String::from("<h1>Heart Disease Risk Prediction</h1>\n");
    body.push_str("<p>The model uses the following inputs:</p>\n<table class=\"features\">\n");
    body.push_str("<tr><th>Feature</th><th>Description</th></tr>\n");
    for feature in FEATURES.iter() {
        let _ = writeln!(
            body,
            "<tr class=\"feature\"><td>{}</td><td>{}</td></tr>",
            escape(feature.name),
            escape(feature.description)
        );
    }
    body.push_str("</table>\n");
    let _ = writeln!(body, "<p class=\"note\">{}</p>", escape(EDUCATION_NOTE));
    body.push_str("<p><a href=\"/predict\">Make a prediction</a></p>\n");
    layout("Heart Disease Risk", &body)
}

fn input_control(feature: &FeatureSpec) -> String {
    let mut attrs = String::new();
    if let Some(min) = feature.min {
        let _ = write!(attrs, " min=\"{}\"", escape(min));
    }
    if let Some(max) = feature.max {
        let _ = write!(attrs, " max=\"{}\"", escape(max));
    }
    if let Some(step) = feature.step {
        let _ = write!(attrs, " step=\"{}\"", escape(step));
    }
    format!(
        "<p><label for=\"{name}\">{label}</label>\n<input type=\"number\" id=\"{name}\" name=\"{name}\"{attrs} required></p>",
        name = escape(feature.name),
        label = escape(feature.label),
        attrs = attrs,
    )
}

pub fn predict_page() -> String {
    let mut body = String::from("<h1>Enter Patient Data</h1>\n");
    body.push_str("<form method=\"post\" action=\"/result\">\n");
    for feature in FEATURES.iter() {
        body.push_str(&input_control(feature));
        body.push('\n');
    }
    body.push_str("<button type=\"submit\">Predict</button>\n</form>\n");
    layout("Predict Heart Disease Risk", &body)
}

pub fn result_page(view: &ResultView) -> String {
    let mut body = String::from("<h1>Prediction Result</h1>\n");
    match (&view.error, view.prediction, &view.label, &view.probability) {
        (Some(error), ..) => {
            let _ = writeln!(body, "<p class=\"error\">⚠️ {}</p>", escape(error));
        }
        (None, Some(prediction), Some(label), Some(probability)) => {
            let _ = writeln!(
                body,
                "<p class=\"label\">Result: <strong>{}</strong></p>",
                escape(label)
            );
            let _ = writeln!(body, "<p class=\"prediction\">Prediction: {}</p>", prediction);
            let _ = writeln!(
                body,
                "<p class=\"probability\">Probability of heart disease: {}</p>",
                escape(probability)
            );
        }
        _ => body.push_str("<p class=\"error\">⚠️ No result available</p>\n"),
    }
    body.push_str("<p><a href=\"/predict\">Try again</a></p>\n");
    layout("Prediction Result", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<b>\"x\" & 'y'</b>"),
            "&lt;b&gt;&quot;x&quot; &amp; &#x27;y&#x27;&lt;/b&gt;"
        );
        assert_eq!(escape("kg/m²"), "kg/m²");
    }

    #[test]
    fn test_index_lists_every_feature() {
        let html = index_page();
        assert_eq!(html.matches("<tr class=\"feature\">").count(), 14);
        assert!(html.contains("<td>glucose</td><td>Glucose (mg/dL)</td>"));
        assert!(html.contains("education"));
    }

    #[test]
    fn test_predict_form_hints() {
        let html = predict_page();
        assert_eq!(html.matches("<input type=\"number\"").count(), 14);
        assert!(html.contains("name=\"male\" min=\"0\" max=\"1\" required"));
        assert!(html.contains("name=\"age\" min=\"0\" required"));
        assert!(html.contains("name=\"BMI\" step=\"0.1\" required"));
        assert!(html.contains("action=\"/result\""));
    }

    #[test]
    fn test_result_page_success() {
        let view = ResultView {
            prediction: Some(1),
            label: Some("High Risk".to_string()),
            probability: Some("71.20%".to_string()),
            error: None,
        };
        let html = result_page(&view);
        assert!(html.contains("<strong>High Risk</strong>"));
        assert!(html.contains("Prediction: 1"));
        assert!(html.contains("71.20%"));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn test_result_page_error_is_escaped() {
        let view = ResultView {
            prediction: None,
            label: None,
            probability: None,
            error: Some("could not convert '<script>' to a number".to_string()),
        };
        let html = result_page(&view);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("class=\"label\""));
    }
}
