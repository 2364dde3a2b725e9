//! Hex text helpers for the command line.

use crate::exit::{CliError, CliResult, USAGE};

/// Format bytes as space-separated uppercase hex pairs.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| hex::encode_upper([*b]))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse hex text into bytes.
///
/// Accepts pairs separated by whitespace, commas or colons, or run together
/// (`"01 00"`, `"0100"`, `"01:00"`). An optional `0x` prefix per group is
/// ignored.
pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let mut out = Vec::new();
    for group in input.split(|c: char| c.is_whitespace() || c == ',' || c == ':') {
        let group = group
            .strip_prefix("0x")
            .or_else(|| group.strip_prefix("0X"))
            .unwrap_or(group);
        if group.is_empty() {
            continue;
        }
        let bytes = hex::decode(group)
            .map_err(|err| CliError::new(USAGE, format!("invalid hex {group:?}: {err}")))?;
        out.extend_from_slice(&bytes);
    }
    Ok(out)
}

/// Parse a 16-bit word given as `0x`-prefixed hex or decimal.
pub fn parse_word(input: &str) -> CliResult<u16> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => input.parse::<u16>(),
    };
    parsed.map_err(|_| CliError::new(USAGE, format!("invalid 16-bit value: {input}")))
}
