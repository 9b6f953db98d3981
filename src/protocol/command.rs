/// A parsed request line: a verb and an optional raw body.
///
/// The body is kept as the exact bytes the client sent (minus framing), so
/// an inserted document round-trips byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: String,
    pub body: Option<Vec<u8>>,
}

impl Command {
    /// Parse a raw request line. NUL, CR and LF bytes are trimmed at both
    /// ends; the first space separates verb from body.
    pub fn parse(input: &[u8]) -> Self {
        let line = trim_framing(input);
        match line.iter().position(|&b| b == b' ') {
            Some(space) => Self {
                verb: String::from_utf8_lossy(&line[..space]).into_owned(),
                body: Some(line[space + 1..].to_vec()),
            },
            None => Self {
                verb: String::from_utf8_lossy(line).into_owned(),
                body: None,
            },
        }
    }
}

fn trim_framing(input: &[u8]) -> &[u8] {
    let is_framing = |b: u8| matches!(b, 0 | b'\n' | b'\r');
    let start = input
        .iter()
        .position(|&b| !is_framing(b))
        .unwrap_or(input.len());
    let end = input
        .iter()
        .rposition(|&b| !is_framing(b))
        .map_or(start, |at| at + 1);
    &input[start..end]
}
