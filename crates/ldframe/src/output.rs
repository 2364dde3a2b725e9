use std::io::{self, IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ldframe_frame::{command_name, Frame, FrameClass};
use serde::Serialize;

use crate::hex::to_hex;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
    Hex,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    class: &'a str,
    payload_size: usize,
    payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    command_word: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    command_name: Option<&'a str>,
    timestamp: String,
}

pub fn print_frame(frame: &Frame, format: OutputFormat) {
    let command = frame
        .command()
        .filter(|_| frame.class == FrameClass::COMMAND_ACK.name());
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                class: frame.class,
                payload_size: frame.payload.len(),
                payload: to_hex(frame.payload.as_ref()),
                command_word: command.map(|(word, _)| word),
                command_name: command.map(|(word, _)| command_name(word)),
                timestamp: now_unix_seconds(),
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
                .set_header(vec!["CLASS", "SIZE", "COMMAND", "PAYLOAD"])
                .add_row(vec![
                    frame.class.to_string(),
                    frame.payload.len().to_string(),
                    command
                        .map(|(word, _)| format!("{} (0x{word:04X})", command_name(word)))
                        .unwrap_or_else(|| "-".to_string()),
                    to_hex(frame.payload.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => match command {
            Some((word, data)) => println!(
                "class={} size={} command={} (0x{word:04X}) data={}",
                frame.class,
                frame.payload.len(),
                command_name(word),
                to_hex(data)
            ),
            None => println!(
                "class={} size={} payload={}",
                frame.class,
                frame.payload.len(),
                to_hex(frame.payload.as_ref())
            ),
        },
        OutputFormat::Hex => println!("{}", to_hex(frame.payload.as_ref())),
        OutputFormat::Raw => print_raw(frame.payload.as_ref()),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// `Write` adapter that prints each flushed write batch as one hex line.
///
/// [`ldframe_frame::CommandWriter`] flushes after every frame, so each
/// frame lands on its own line.
pub struct HexLines<W: Write> {
    inner: W,
    pending: Vec<u8>,
}

impl<W: Write> HexLines<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            pending: Vec::new(),
        }
    }
}

impl<W: Write> Write for HexLines<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            writeln!(self.inner, "{}", to_hex(&self.pending))?;
            self.pending.clear();
        }
        self.inner.flush()
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
