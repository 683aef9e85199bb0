//! Dial address formatting.

/// Join a host and port into `host:port`, bracketing IPv6 literals.
pub fn format_address_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Parse an untyped port value, accepting only integers in `1..=65535`.
///
/// Surrounding whitespace, signs other than a leading `+`, and zero are
/// rejected.
pub fn parse_positive_port(raw: &str) -> Option<u16> {
    match raw.parse::<u16>() {
        Ok(port) if port > 0 => Some(port),
        _ => None,
    }
}
