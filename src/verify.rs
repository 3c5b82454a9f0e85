//! Portal Verification Module
//!
//! Probes the FAVA portal with a single weekly request to check that it is
//! reachable, answers with JSON, and still carries the columns this client
//! depends on. Run this before a long catalog download.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::FavaConfig;
use crate::ingest::fava::build_source_list_url;
use crate::model::validate_request;

/// Columns every downstream step relies on. All of them are numeric.
pub const REQUIRED_FIELDS: &[&str] = &["flareID", "week", "best_ra", "best_dec", "sigma"];

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalVerification {
    pub timestamp: String,
    pub url: String,
    pub status: VerificationStatus,
    pub reachable: bool,
    pub http_status: Option<u16>,
    pub record_count: usize,
    pub fields_missing: Vec<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    /// Reachable, but the week was empty or rows lacked required columns.
    PartialSuccess,
    Failed,
}

// ============================================================================
// Body Inspection
// ============================================================================

/// `true` if the row carries a usable number under `field`: a JSON number or
/// a numeric string. `null`, `""` and text don't count.
fn has_numeric(row: &Value, field: &str) -> bool {
    match row.get(field) {
        Some(Value::Number(_)) => true,
        Some(Value::String(s)) => s.trim().parse::<f64>().is_ok(),
        _ => false,
    }
}

/// Fills in `record_count`, `fields_missing` and `status` from a response
/// body. Kept separate from the request so it can run on fixtures.
pub fn inspect_body(result: &mut PortalVerification, body: &str) {
    let json: Value = match serde_json::from_str(body.trim()) {
        Ok(json) => json,
        Err(e) => {
            result.status = VerificationStatus::Failed;
            result.error_message = Some(format!("Parse error: {}", e));
            return;
        }
    };

    let rows = match json {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        other => {
            result.status = VerificationStatus::Failed;
            result.error_message = Some(format!("Parse error: expected a JSON array, got {}", other));
            return;
        }
    };

    result.record_count = rows.len();
    if rows.is_empty() {
        result.status = VerificationStatus::PartialSuccess;
        result.error_message = Some("No sources returned for this week".to_string());
        return;
    }

    result.fields_missing = REQUIRED_FIELDS
        .iter()
        .filter(|field| !rows.iter().all(|row| has_numeric(row, field)))
        .map(|field| field.to_string())
        .collect();

    result.status = if result.fields_missing.is_empty() {
        VerificationStatus::Success
    } else {
        VerificationStatus::PartialSuccess
    };
}

// ============================================================================
// Portal Verification
// ============================================================================

/// Requests `week` at the configured threshold and inspects the answer.
///
/// An invalid week or threshold is reported as `Failed` without contacting
/// the portal.
pub fn verify_portal(
    client: &reqwest::blocking::Client,
    config: &FavaConfig,
    week: u32,
) -> PortalVerification {
    let url = build_source_list_url(&config.api_url, week, config.threshold);
    let mut result = PortalVerification {
        timestamp: Utc::now().to_rfc3339(),
        url: url.clone(),
        status: VerificationStatus::Failed,
        reachable: false,
        http_status: None,
        record_count: 0,
        fields_missing: Vec::new(),
        error_message: None,
    };

    if let Err(e) = validate_request(week, week, config.threshold) {
        result.error_message = Some(e.to_string());
        return result;
    }

    match client.get(&url).header("Accept", "application/json").send() {
        Ok(response) => {
            result.reachable = true;
            result.http_status = Some(response.status().as_u16());

            if !response.status().is_success() {
                result.error_message = Some(format!("HTTP error: {}", response.status()));
                return result;
            }

            match response.text() {
                Ok(body) => inspect_body(&mut result, &body),
                Err(e) => result.error_message = Some(format!("Failed to read body: {}", e)),
            }
        }
        Err(e) => {
            result.error_message = Some(format!("Request failed: {}", e));
        }
    }

    result
}

pub fn print_summary(report: &PortalVerification) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("📊 FAVA PORTAL VERIFICATION");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!("URL:        {}", report.url);
    println!("Checked at: {}", report.timestamp);
    println!("Reachable:  {}", if report.reachable { "yes" } else { "no" });
    if let Some(code) = report.http_status {
        println!("HTTP:       {}", code);
    }
    println!("Sources:    {}", report.record_count);
    if !report.fields_missing.is_empty() {
        println!("Missing:    {}", report.fields_missing.join(", "));
    }
    match report.status {
        VerificationStatus::Success => println!("Status:     ✓ OK"),
        VerificationStatus::PartialSuccess => println!("Status:     ⚠ Partial"),
        VerificationStatus::Failed => println!("Status:     ✗ FAILED"),
    }
    if let Some(error) = &report.error_message {
        println!("Detail:     {}", error);
    }
    println!("═══════════════════════════════════════════════════════════");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> PortalVerification {
        PortalVerification {
            timestamp: String::new(),
            url: String::new(),
            status: VerificationStatus::Failed,
            reachable: true,
            http_status: Some(200),
            record_count: 0,
            fields_missing: Vec::new(),
            error_message: None,
        }
    }

    #[test]
    fn test_complete_rows_are_success() {
        let mut result = blank();
        inspect_body(
            &mut result,
            r#"[{"flareID": 1, "week": 1, "best_ra": 1.0, "best_dec": 2.0, "sigma": 6.1}]"#,
        );
        assert_eq!(result.status, VerificationStatus::Success);
        assert_eq!(result.record_count, 1);
    }

    #[test]
    fn test_missing_columns_are_reported() {
        let mut result = blank();
        inspect_body(&mut result, r#"[{"flareID": 1, "week": 1, "sigma": 6.1}]"#);
        assert_eq!(result.status, VerificationStatus::PartialSuccess);
        assert_eq!(result.fields_missing, vec!["best_ra".to_string(), "best_dec".to_string()]);
    }

    #[test]
    fn test_null_and_blank_positions_are_reported() {
        let mut result = blank();
        inspect_body(
            &mut result,
            r#"[{"flareID": 1, "week": 1, "best_ra": null, "best_dec": "", "sigma": 6.1}]"#,
        );
        assert_eq!(result.status, VerificationStatus::PartialSuccess);
        assert_eq!(result.fields_missing, vec!["best_ra".to_string(), "best_dec".to_string()]);
    }

    #[test]
    fn test_text_in_numeric_column_is_reported() {
        let mut result = blank();
        inspect_body(
            &mut result,
            r#"[
                {"flareID": "1", "week": "1", "best_ra": "83.6", "best_dec": "22.0", "sigma": "6.1"},
                {"flareID": "2", "week": "1", "best_ra": "83.6", "best_dec": "22.0", "sigma": "n/a"}
            ]"#,
        );
        assert_eq!(result.status, VerificationStatus::PartialSuccess);
        assert_eq!(result.fields_missing, vec!["sigma".to_string()]);
    }

    #[test]
    fn test_invalid_week_is_not_requested() {
        let client = reqwest::blocking::Client::new();
        // Unroutable URL: the request must never be attempted.
        let config = FavaConfig { api_url: "http://invalid.invalid".to_string(), ..Default::default() };
        let result = verify_portal(&client, &config, 0);
        assert_eq!(result.status, VerificationStatus::Failed);
        assert!(!result.reachable);
        assert_eq!(result.http_status, None);
        assert!(
            result.error_message.as_deref().unwrap_or("").starts_with("Invalid week range"),
            "got {:?}",
            result.error_message
        );
    }

    #[test]
    fn test_empty_week_is_partial() {
        let mut result = blank();
        inspect_body(&mut result, "[]");
        assert_eq!(result.status, VerificationStatus::PartialSuccess);
        assert_eq!(result.record_count, 0);
    }

    #[test]
    fn test_html_body_fails() {
        let mut result = blank();
        inspect_body(&mut result, "<html></html>");
        assert_eq!(result.status, VerificationStatus::Failed);
        assert!(result.error_message.unwrap().starts_with("Parse error"));
    }
}
