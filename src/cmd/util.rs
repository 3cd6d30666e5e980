use layoutwalk::reflect::{Result, WalkError};
use serde::Serialize;

/// Parse decimal or `0x`-prefixed hex address literal.
pub(crate) fn parse_addr(value: &str) -> Result<u64> {
	let parsed = if let Some(stripped) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
		u64::from_str_radix(stripped, 16)
	} else {
		value.parse::<u64>()
	};

	parsed.map_err(|_| WalkError::InvalidAddressLiteral { value: value.to_owned() })
}

/// Render an address as fixed-width hex.
pub(crate) fn addr_hex(addr: u64) -> String {
	format!("0x{addr:016x}")
}

/// Render block code bytes as printable label.
pub(crate) fn render_code(code: [u8; 4]) -> String {
	let mut out = String::new();
	for byte in code {
		if byte == 0 {
			continue;
		}
		if byte.is_ascii_graphic() || byte == b' ' {
			out.push(char::from(byte));
		} else {
			out.push('.');
		}
	}
	if out.is_empty() { "....".to_owned() } else { out }
}

/// Print `payload` as pretty JSON on stdout.
pub(crate) fn emit_json<T: Serialize>(payload: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(payload)?);
	Ok(())
}
