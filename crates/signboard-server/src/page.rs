use chrono::NaiveDate;
use handlebars::{Handlebars, RenderError};
use serde::Serialize;
use signboard_core::config::DisplayTarget;
use signboard_core::display::PushOutcome;
use signboard_core::record::IncidentRecord;
use signboard_core::types::Reason;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.hbs");

#[derive(Serialize)]
struct ReasonOption {
    name: &'static str,
    selected: bool,
}

#[derive(Serialize)]
struct IndexView<'a> {
    days_since: i64,
    prior_count: i64,
    incident_number: &'a str,
    /// Pre-fills the date input; today when the record has no date.
    incident_date: String,
    reason: &'static str,
    reasons: Vec<ReasonOption>,
    last_reset: Option<String>,
    display: String,
}

/// Render the main page for an already refreshed record.
pub fn index(
    record: &IncidentRecord,
    target: &DisplayTarget,
    today: NaiveDate,
) -> Result<String, RenderError> {
    let view = IndexView {
        days_since: record.days_since,
        prior_count: record.prior_count,
        incident_number: &record.incident_number,
        incident_date: record
            .incident_date
            .unwrap_or(today)
            .format("%Y-%m-%d")
            .to_string(),
        reason: record.reason.as_str(),
        reasons: Reason::all()
            .iter()
            .map(|r| ReasonOption {
                name: r.as_str(),
                selected: *r == record.reason,
            })
            .collect(),
        last_reset: record
            .last_reset
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
        display: describe_target(target),
    };
    Handlebars::new().render_template(INDEX_TEMPLATE, &view)
}

fn describe_target(target: &DisplayTarget) -> String {
    match target {
        DisplayTarget::Http { url, .. } => format!("sends to {url}"),
        DisplayTarget::Local { device } => format!("writes to {}", device.display()),
        DisplayTarget::None => "no display configured".to_string(),
    }
}

/// Short HTML reply for a manual push.
pub fn push_message(outcome: &PushOutcome) -> String {
    let text = match outcome {
        PushOutcome::Sent { .. } => "Sign sent to E-Paper display successfully!",
        PushOutcome::Skipped => "No display configured, nothing was sent.",
        PushOutcome::Failed(_) => "Error sending to display. Check logs.",
    };
    format!(r#"{text} <a href="/">Go back</a>"#)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 18).unwrap()
    }

    fn record() -> IncidentRecord {
        let now = NaiveDateTime::parse_from_str("2025-10-03 09:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        IncidentRecord::initial(now).refreshed(today())
    }

    #[test]
    fn index_shows_counters_and_selected_reason() {
        let html = index(&record(), &DisplayTarget::default(), today()).unwrap();
        assert!(html.contains(r#"id="days-since">15<"#));
        assert!(html.contains(r#"id="prior-count">2<"#));
        assert!(html.contains(r#"value="2025-10-03""#));
        assert!(html.contains(r#"<option value="Deploy" selected>"#));
        assert!(html.contains(r#"<option value="Change">"#));
        assert!(html.contains("2025-10-03 09:30"));
        assert!(html.contains("sends to http://192.168.86.120:5000/display/binary"));
    }

    #[test]
    fn index_escapes_incident_number() {
        let mut r = record();
        r.incident_number = "<b>7</b>".into();
        let html = index(&r, &DisplayTarget::None, today()).unwrap();
        assert!(!html.contains("<b>7</b>"));
        assert!(html.contains("&lt;b&gt;7&lt;/b&gt;"));
    }

    #[test]
    fn index_defaults_date_input_to_today() {
        let mut r = record();
        r.incident_date = None;
        r.last_reset = None;
        let html = index(&r, &DisplayTarget::None, today()).unwrap();
        assert!(html.contains(r#"value="2025-10-18""#));
        assert!(html.contains("Last reset: never"));
    }

    #[test]
    fn push_messages_link_back() {
        let sent = push_message(&PushOutcome::Sent { bytes: 192_000 });
        assert!(sent.contains("successfully"));
        let failed = push_message(&PushOutcome::Failed("boom".into()));
        assert!(failed.starts_with("Error sending to display"));
        assert!(failed.ends_with(r#"<a href="/">Go back</a>"#));
    }
}
