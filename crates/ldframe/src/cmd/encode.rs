use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ldframe_frame::{build_command_for, command_frame_len, command_name};
use serde::Serialize;

use crate::cmd::{resolve_class, resolve_command_word, EncodeArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::hex::{parse_hex, to_hex};
use crate::output::{print_raw, OutputFormat};

#[derive(Serialize)]
struct EncodeOutput<'a> {
    class: &'a str,
    command_word: u16,
    command_name: &'a str,
    frame_size: usize,
    frame: String,
}

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let class = resolve_class(&args.class)?;
    let word = resolve_command_word(&args.command)?;
    let data = match &args.data {
        Some(text) => parse_hex(text)?,
        None => Vec::new(),
    };

    let mut buf = vec![0u8; command_frame_len(&class, data.len())];
    let n = build_command_for(&class, &mut buf, word, &data)
        .map_err(|err| frame_error("encode failed", err))?;
    let wire = &buf[..n];
    tracing::debug!(command_word = word, len = n, "encoded command frame");

    match format {
        OutputFormat::Json => {
            let out = EncodeOutput {
                class: class.name(),
                command_word: word,
                command_name: command_name(word),
                frame_size: n,
                frame: to_hex(wire),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COMMAND", "WORD", "SIZE", "FRAME"])
                .add_row(vec![
                    command_name(word).to_string(),
                    format!("0x{word:04X}"),
                    n.to_string(),
                    to_hex(wire),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "command={} (0x{word:04X}) size={n} frame={}",
            command_name(word),
            to_hex(wire)
        ),
        OutputFormat::Hex => println!("{}", to_hex(wire)),
        OutputFormat::Raw => print_raw(wire),
    }

    Ok(SUCCESS)
}
