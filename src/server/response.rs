use may_minihttp::Response;
use serde_json::Value;
use std::io;

pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Serialize a handler body. `Value::Null` means no body at all.
pub(crate) fn render_body(body: &Value) -> io::Result<Option<Vec<u8>>> {
    match body {
        Value::Null => Ok(None),
        other => serde_json::to_vec(other)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
    }
}

/// Write status line, extra header lines and body.
///
/// JSON bodies get `Content-Type: application/json`; a `Null` body is written
/// as an empty body without a content type.
pub fn write_handler_response(
    res: &mut Response,
    status: u16,
    body: &Value,
    extra_headers: &[&'static str],
) -> io::Result<()> {
    res.status_code(usize::from(status), status_reason(status));
    for &line in extra_headers {
        res.header(line);
    }
    if let Some(bytes) = render_body(body)? {
        res.header("Content-Type: application/json");
        res.body_vec(bytes);
    }
    Ok(())
}
