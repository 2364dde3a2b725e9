use clap::{Args, Subcommand};
use std::path::PathBuf;

use ldframe_frame::{CommandWord, FrameClass};

use crate::exit::{CliError, CliResult, USAGE};
use crate::hex::parse_word;
use crate::output::OutputFormat;

pub mod commands;
pub mod decode;
pub mod encode;
pub mod exec;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode one command frame.
    Encode(EncodeArgs),
    /// Decode frames from a byte stream and print them.
    Decode(DecodeArgs),
    /// Run console command lines from stdin, emitting command frames.
    Exec(ExecArgs),
    /// List known command words.
    Commands(CommandsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Exec(args) => exec::run(args, format),
        Command::Commands(args) => commands::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Command name (e.g. enable-config) or numeric word (e.g. 0x00ff).
    pub command: String,
    /// Command data as hex (e.g. "01 00").
    #[arg(long, short = 'd')]
    pub data: Option<String>,
    /// Frame class to encode with.
    #[arg(long, default_value = "ack")]
    pub class: String,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame class to decode (ack, report).
    #[arg(long, short = 'c', default_value = "report")]
    pub class: String,
    /// Input file or device node. Default: stdin.
    #[arg(long, short = 'i', value_name = "PATH")]
    pub input: Option<PathBuf>,
    /// Treat the input as hex text instead of raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Exit after decoding N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Bytes requested per read.
    #[arg(long, default_value = "256")]
    pub chunk_size: usize,
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Write raw frames to this file or device instead of hex lines on stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// Stop at the first failing line.
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(Args, Debug, Default)]
pub struct CommandsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn resolve_class(name: &str) -> CliResult<FrameClass> {
    FrameClass::by_name(name).ok_or_else(|| {
        CliError::new(
            USAGE,
            format!("unknown frame class: {name} (expected ack or report)"),
        )
    })
}

/// Resolve a command given by name or as a numeric word.
pub(crate) fn resolve_command_word(input: &str) -> CliResult<u16> {
    match CommandWord::from_name(input) {
        Some(cmd) => Ok(cmd.word()),
        None => parse_word(input).map_err(|_| {
            CliError::new(
                USAGE,
                format!("unknown command {input:?}: use a command name or a 16-bit word"),
            )
        }),
    }
}
