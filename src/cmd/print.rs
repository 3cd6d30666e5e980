use std::fmt::Write;

use layoutwalk::reflect::Value;

/// Output truncation and formatting limits for visited values.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum number of fields printed for a single record.
	pub max_fields_per_record: usize,
	/// Maximum number of Unicode scalar values printed for strings.
	pub max_string_len: usize,
	/// Maximum number of elements printed for sequences.
	pub max_sequence_items: usize,
	/// Maximum recursive print depth for nested sequences/records.
	pub max_print_depth: u32,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_fields_per_record: 80,
			max_string_len: 200,
			max_sequence_items: 16,
			max_print_depth: 8,
		}
	}
}

/// Print one visited value tree.
pub fn print_value(value: &Value, options: PrintOptions) {
	print!("{}", format_value(value, options));
}

/// Render one visited value tree as indented text.
pub fn format_value(value: &Value, options: PrintOptions) -> String {
	let mut out = String::new();
	write_value(&mut out, value, 0, 0, options);
	out
}

fn write_value(out: &mut String, value: &Value, indent: usize, depth: u32, options: PrintOptions) {
	let pad = " ".repeat(indent);
	match value {
		Value::Integer(v) => line(out, format_args!("{pad}{v}")),
		Value::Float(v) => line(out, format_args!("{pad}{v}")),
		Value::Bool(v) => line(out, format_args!("{pad}{v}")),
		Value::Name(v) => line(out, format_args!("{pad}name:{v}")),
		Value::String(v) => line(out, format_args!("{pad}\"{}\"", truncate(v, options.max_string_len))),
		Value::Text(v) => line(out, format_args!("{pad}text:\"{}\"", truncate(v, options.max_string_len))),
		Value::Unsupported { kind } => line(out, format_args!("{pad}<unsupported {kind}>")),
		Value::Sequence(items) => {
			if depth >= options.max_print_depth {
				line(out, format_args!("{pad}[... {} items]", items.len()));
				return;
			}
			if items.is_empty() {
				line(out, format_args!("{pad}[]"));
				return;
			}
			line(out, format_args!("{pad}["));
			for item in items.iter().take(options.max_sequence_items) {
				write_value(out, item, indent + 2, depth + 1, options);
			}
			if items.len() > options.max_sequence_items {
				line(out, format_args!("{pad}  ... {} more", items.len() - options.max_sequence_items));
			}
			line(out, format_args!("{pad}]"));
		}
		Value::Record(item) => {
			if depth >= options.max_print_depth {
				line(out, format_args!("{pad}{} {{ ... }}", item.type_name));
				return;
			}
			line(out, format_args!("{pad}{} {{", item.type_name));
			for field in item.fields.iter().take(options.max_fields_per_record) {
				let nested = match &field.value {
					Value::Sequence(items) => !items.is_empty(),
					Value::Record(_) => true,
					_ => false,
				};
				if nested {
					line(out, format_args!("{pad}  {} =", field.name));
					write_value(out, &field.value, indent + 4, depth + 1, options);
				} else {
					let _ = write!(out, "{pad}  {} = ", field.name);
					write_value(out, &field.value, 0, depth + 1, options);
				}
			}
			if item.fields.len() > options.max_fields_per_record {
				line(out, format_args!("{pad}  ... {} more fields", item.fields.len() - options.max_fields_per_record));
			}
			line(out, format_args!("{pad}}}"));
		}
	}
}

fn line(out: &mut String, args: std::fmt::Arguments<'_>) {
	let _ = out.write_fmt(args);
	out.push('\n');
}

fn truncate(value: &str, max_chars: usize) -> String {
	if value.chars().count() <= max_chars {
		return value.to_owned();
	}
	let mut out: String = value.chars().take(max_chars).collect();
	out.push_str("...");
	out
}
