//! Upload handler: a base64 multipart event in, a base64 PDF response out.
//!
//! The event shape is the one HTTP gateways hand to serverless functions:
//!
//! ```json
//! { "isBase64Encoded": true,
//!   "headers": { "content-type": "multipart/form-data; boundary=..." },
//!   "body": "<base64 multipart body>" }
//! ```
//!
//! [`handle_event`] never fails. Anything wrong with the upload is answered
//! with 400 (413 when too large) and `Failed to parse uploaded file: …`;
//! anything that goes wrong on our side is a 500 with
//! `Failed to generate report: …`.

use crate::config::ReportConfig;
use crate::convert::convert_from_bytes;
use crate::error::ReportError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use tracing::{debug, error, info, warn};

/// Name of the form field carrying the CSV.
pub const FILE_FIELD: &str = "file";

/// An incoming upload event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadEvent {
    #[serde(default)]
    pub is_base64_encoded: bool,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl UploadEvent {
    /// Build an event around a raw multipart body.
    pub fn multipart(body: &[u8], content_type: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), content_type.into());
        Self {
            is_base64_encoded: true,
            body: Some(STANDARD.encode(body)),
            headers,
        }
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The response handed back to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl HandlerResponse {
    /// 200 with the PDF as a base64 attachment.
    pub fn pdf(pdf: &[u8], filename: &str) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/pdf".to_string());
        headers.insert(
            "Content-Disposition".to_string(),
            format!("attachment; filename=\"{filename}\""),
        );
        Self {
            status_code: 200,
            headers,
            body: STANDARD.encode(pdf),
            is_base64_encoded: true,
        }
    }

    /// JSON error body; the prefix depends on whose fault it was.
    pub fn from_error(err: &ReportError) -> Self {
        let prefix = if err.is_input_error() {
            "Failed to parse uploaded file"
        } else {
            "Failed to generate report"
        };
        let body = serde_json::json!({ "error": format!("{prefix}: {err}") }).to_string();

        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code: err.status_code(),
            headers,
            body,
            is_base64_encoded: false,
        }
    }

    /// The `error` message of a failure response.
    pub fn error_message(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        value.get("error")?.as_str().map(str::to_string)
    }

    /// Decoded PDF of a success response.
    pub fn pdf_bytes(&self) -> Option<Vec<u8>> {
        if self.status_code != 200 || !self.is_base64_encoded {
            return None;
        }
        STANDARD.decode(&self.body).ok()
    }
}

/// Answer one upload event.
pub async fn handle_event(event: &UploadEvent, config: &ReportConfig) -> HandlerResponse {
    match process(event, config).await {
        Ok(pdf) => {
            info!("Responding with {} byte report", pdf.len());
            HandlerResponse::pdf(&pdf, &config.attachment_filename)
        }
        Err(e) => {
            if e.is_input_error() {
                warn!("Rejected upload: {}", e);
            } else {
                error!("Report generation failed: {}", e);
            }
            HandlerResponse::from_error(&e)
        }
    }
}

async fn process(event: &UploadEvent, config: &ReportConfig) -> Result<Vec<u8>, ReportError> {
    let body = decode_body(event, config.max_upload_bytes)?;
    let content_type = event
        .header("content-type")
        .ok_or(ReportError::MissingContentType)?;
    let csv = extract_file(body, content_type).await?;
    debug!("Uploaded CSV is {} bytes", csv.len());

    let output = convert_from_bytes(csv, config).await?;
    Ok(output.pdf)
}

/// Base64-decode the event body and enforce the size limit.
pub fn decode_body(event: &UploadEvent, limit: usize) -> Result<Vec<u8>, ReportError> {
    if !event.is_base64_encoded {
        return Err(ReportError::NotBase64Encoded);
    }
    // Gateways may wrap long base64 bodies across lines.
    let encoded: String = event
        .body
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    // Reject obviously oversized bodies before allocating for them.
    let estimate = encoded.len() / 4 * 3;
    if estimate > limit.saturating_add(3) {
        return Err(ReportError::UploadTooLarge {
            size: estimate,
            limit,
        });
    }

    let body = STANDARD
        .decode(&encoded)
        .map_err(|e| ReportError::InvalidBase64(e.to_string()))?;
    if body.len() > limit {
        return Err(ReportError::UploadTooLarge {
            size: body.len(),
            limit,
        });
    }
    Ok(body)
}

/// Pull the `file` field out of a multipart/form-data body.
pub async fn extract_file(body: Vec<u8>, content_type: &str) -> Result<Vec<u8>, ReportError> {
    let boundary =
        multer::parse_boundary(content_type).map_err(|e| ReportError::InvalidMultipart(e.to_string()))?;

    let stream = futures::stream::once(async move { Ok::<_, Infallible>(Bytes::from(body)) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ReportError::InvalidMultipart(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            debug!("Skipping form field {:?}", field.name());
            continue;
        }
        if let Some(name) = field.file_name() {
            debug!("Received upload '{}'", name);
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| ReportError::InvalidMultipart(e.to_string()))?;
        return Ok(data.to_vec());
    }

    Err(ReportError::MissingFileField)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "X-SEMINAR-BOUNDARY";

    const SURVEY: &str = "\
Timestamp,Name,Rate [Importance],Rate [Methods],Rate [Results],Rate [Future],Takeaways,Strengths,Suggestions,Rate [Research],Rate [Presentation]
1,Ann,4: Agree,4,4,4,Great talk,Clear slides,More time,4,4
2,Bob,2: Disagree,2,2,2,Useful,Good pace,Fewer slides,2,2
";

    fn form(field: &str, content: &str) -> Vec<u8> {
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"survey.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        )
        .into_bytes()
    }

    fn content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    #[tokio::test]
    async fn valid_upload_returns_pdf_attachment() {
        let event = UploadEvent::multipart(&form("file", SURVEY), content_type());
        let resp = handle_event(&event, &ReportConfig::default()).await;
        assert_eq!(resp.status_code, 200);
        assert!(resp.is_base64_encoded);
        assert_eq!(resp.headers["Content-Type"], "application/pdf");
        assert_eq!(
            resp.headers["Content-Disposition"],
            "attachment; filename=\"seminar_summary.pdf\""
        );
        assert!(resp.pdf_bytes().unwrap().starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn plain_body_is_rejected() {
        let mut event = UploadEvent::multipart(&form("file", SURVEY), content_type());
        event.is_base64_encoded = false;
        let resp = handle_event(&event, &ReportConfig::default()).await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.headers["Content-Type"], "application/json");
        let msg = resp.error_message().unwrap();
        assert!(msg.contains("Failed to parse uploaded file:"), "{msg}");
        assert!(msg.contains("base64"), "{msg}");
    }

    #[tokio::test]
    async fn content_type_header_is_case_insensitive() {
        let mut event = UploadEvent::multipart(&form("file", SURVEY), content_type());
        let value = event.headers.remove("content-type").unwrap();
        event.headers.insert("Content-Type".to_string(), value);
        let resp = handle_event(&event, &ReportConfig::default()).await;
        assert_eq!(resp.status_code, 200);
    }

    #[tokio::test]
    async fn missing_content_type_is_400() {
        let mut event = UploadEvent::multipart(&form("file", SURVEY), content_type());
        event.headers.clear();
        let resp = handle_event(&event, &ReportConfig::default()).await;
        assert_eq!(resp.status_code, 400);
    }

    #[tokio::test]
    async fn missing_file_field_is_400() {
        let event = UploadEvent::multipart(&form("attachment", SURVEY), content_type());
        let resp = handle_event(&event, &ReportConfig::default()).await;
        assert_eq!(resp.status_code, 400);
        assert!(resp.error_message().unwrap().contains("'file'"));
    }

    #[tokio::test]
    async fn wrong_shape_is_400() {
        let csv = "a,b,Q [1],Q [2],Q [3],Q [4],t,s,i,Q [5]\nx,x,1,1,1,1,a,b,c,1\n";
        let event = UploadEvent::multipart(&form("file", csv), content_type());
        let resp = handle_event(&event, &ReportConfig::default()).await;
        assert_eq!(resp.status_code, 400);
        let msg = resp.error_message().unwrap();
        assert!(msg.starts_with("Failed to parse uploaded file:"), "{msg}");
    }

    #[tokio::test]
    async fn oversized_upload_is_413() {
        let config = ReportConfig::builder().max_upload_bytes(64).build().unwrap();
        let event = UploadEvent::multipart(&form("file", SURVEY), content_type());
        let resp = handle_event(&event, &config).await;
        assert_eq!(resp.status_code, 413);
    }

    #[test]
    fn invalid_base64_is_input_error() {
        let event = UploadEvent {
            is_base64_encoded: true,
            body: Some("not base64!!".to_string()),
            headers: BTreeMap::new(),
        };
        let err = decode_body(&event, 1024).unwrap_err();
        assert!(matches!(err, ReportError::InvalidBase64(_)));
    }

    #[test]
    fn line_wrapped_base64_is_accepted() {
        let event = UploadEvent::multipart(&form("file", SURVEY), content_type());
        let flat = event.body.clone().unwrap();
        let wrapped: String = flat
            .as_bytes()
            .chunks(76)
            .map(|chunk| format!("{}\r\n", std::str::from_utf8(chunk).unwrap()))
            .collect();
        let wrapped_event = UploadEvent {
            body: Some(wrapped),
            ..event
        };
        assert_eq!(
            decode_body(&wrapped_event, 1 << 20).unwrap(),
            form("file", SURVEY)
        );
    }

    #[tokio::test]
    async fn line_wrapped_upload_renders() {
        let mut event = UploadEvent::multipart(&form("file", SURVEY), content_type());
        let flat = event.body.take().unwrap();
        let (head, tail) = flat.split_at(flat.len() / 2);
        event.body = Some(format!("{head}\n{tail}\n"));
        let resp = handle_event(&event, &ReportConfig::default()).await;
        assert_eq!(resp.status_code, 200);
    }

    #[test]
    fn internal_errors_are_500() {
        let resp = HandlerResponse::from_error(&ReportError::RenderFailed("boom".into()));
        assert_eq!(resp.status_code, 500);
        assert_eq!(
            resp.error_message().unwrap(),
            "Failed to generate report: PDF rendering failed: boom"
        );
    }

    #[test]
    fn event_json_uses_gateway_field_names() {
        let event: UploadEvent = serde_json::from_str(
            r#"{"isBase64Encoded": true, "body": "YQ==", "headers": {"Content-Type": "text/csv"}}"#,
        )
        .unwrap();
        assert!(event.is_base64_encoded);
        assert_eq!(event.header("content-type"), Some("text/csv"));

        let resp = HandlerResponse::pdf(b"%PDF", "r.pdf");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["isBase64Encoded"], true);
    }
}
