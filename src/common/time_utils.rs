use chrono::NaiveDateTime;

/// Wire format of an XML-RPC `dateTime.iso8601` value
pub const XMLRPC_DATETIME_FORMAT: &str = "%Y%m%dT%H:%M:%S";

/// Parse an XML-RPC timestamp. WordPress sometimes appends a `Z` or uses
/// dashes, so both forms are accepted.
pub fn parse_xmlrpc_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(trimmed, XMLRPC_DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Render a timestamp the way XML-RPC expects it
pub fn format_xmlrpc_datetime(dt: &NaiveDateTime) -> String {
    dt.format(XMLRPC_DATETIME_FORMAT).to_string()
}

/// Human-readable form used by the command-line host
pub fn display_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}
