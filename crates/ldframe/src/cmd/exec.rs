use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};

use ldframe_cmd::{CommandTable, DispatchError};
use ldframe_frame::{CommandWord, CommandWriter};

use crate::cmd::{resolve_command_word, ExecArgs};
use crate::exit::{dispatch_error, io_error, CliResult, FAILURE, SUCCESS};
use crate::hex::{parse_hex, parse_word};
use crate::output::{HexLines, OutputFormat};

const HANDLER_OK: i32 = 0;
const HANDLER_FAILED: i32 = 1;
const HANDLER_USAGE: i32 = 2;

/// Data word the sensor expects with `EnableConfig`.
const ENABLE_CONFIG_DATA: [u8; 2] = [0x01, 0x00];

/// Token limit for exec lines: `raw`, the word, and one token per data byte
/// of a full command/ack payload.
const EXEC_MAX_ARGS: usize = 2 + ldframe_frame::DEFAULT_CAPACITY;

pub(crate) struct ExecContext {
    writer: CommandWriter<Box<dyn Write>>,
    last_error: Option<String>,
}

impl ExecContext {
    fn new(out: Box<dyn Write>) -> Self {
        Self {
            writer: CommandWriter::new(out),
            last_error: None,
        }
    }

    fn send(&mut self, command_word: u16, data: &[u8]) -> i32 {
        match self.writer.send(command_word, data) {
            Ok(()) => HANDLER_OK,
            Err(err) => {
                self.last_error = Some(format!("send failed: {err}"));
                HANDLER_FAILED
            }
        }
    }

    fn usage(&mut self, message: impl Into<String>) -> i32 {
        self.last_error = Some(message.into());
        HANDLER_USAGE
    }
}

pub(crate) fn command_table() -> CommandTable<ExecContext> {
    CommandTable::with_max_args(EXEC_MAX_ARGS)
        .with("enable-config", enable_config)
        .with("end-config", end_config)
        .with("read-param", read_param)
        .with("firmware", firmware)
        .with("restart", restart)
        .with("factory-reset", factory_reset)
        .with("engineering", engineering)
        .with("baud", baud)
        .with("raw", raw)
}

pub fn run(args: ExecArgs, format: OutputFormat) -> CliResult<i32> {
    let out: Box<dyn Write> = match (&args.output, format) {
        (Some(path), _) => Box::new(
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?,
        ),
        (None, OutputFormat::Raw) => Box::new(io::stdout()),
        (None, _) => Box::new(HexLines::new(io::stdout())),
    };

    let table = command_table();
    let mut ctx = ExecContext::new(out);
    let mut failures = 0usize;

    for (idx, line) in io::stdin().lock().lines().enumerate() {
        let line = line.map_err(|err| io_error("failed reading stdin", err))?;
        let line_no = idx + 1;

        let failed = match table.dispatch(&mut ctx, &line) {
            Ok(HANDLER_OK) => false,
            Ok(code) => {
                let reason = ctx.last_error.take().unwrap_or_else(|| "failed".to_string());
                eprintln!("line {line_no}: {reason} (code {code})");
                true
            }
            Err(DispatchError::NoCommand) => {
                tracing::trace!(line = line_no, "blank line skipped");
                false
            }
            Err(err) => {
                eprintln!("line {line_no}: {}", dispatch_error("dispatch failed", &err));
                true
            }
        };

        if failed {
            failures += 1;
            if args.fail_fast {
                break;
            }
        }
    }

    tracing::info!(failures, "exec finished");
    Ok(if failures == 0 { SUCCESS } else { FAILURE })
}

fn enable_config(ctx: &mut ExecContext, _argv: &[&str]) -> i32 {
    ctx.send(CommandWord::EnableConfig.word(), &ENABLE_CONFIG_DATA)
}

fn end_config(ctx: &mut ExecContext, _argv: &[&str]) -> i32 {
    ctx.send(CommandWord::EndConfig.word(), &[])
}

fn read_param(ctx: &mut ExecContext, _argv: &[&str]) -> i32 {
    ctx.send(CommandWord::ReadParameter.word(), &[])
}

fn firmware(ctx: &mut ExecContext, _argv: &[&str]) -> i32 {
    ctx.send(CommandWord::ReadFirmwareVersion.word(), &[])
}

fn restart(ctx: &mut ExecContext, _argv: &[&str]) -> i32 {
    ctx.send(CommandWord::Restart.word(), &[])
}

fn factory_reset(ctx: &mut ExecContext, _argv: &[&str]) -> i32 {
    ctx.send(CommandWord::FactoryReset.word(), &[])
}

fn engineering(ctx: &mut ExecContext, argv: &[&str]) -> i32 {
    match argv.get(1).copied() {
        Some("on") => ctx.send(CommandWord::EnableEngineering.word(), &[]),
        Some("off") => ctx.send(CommandWord::CloseEngineering.word(), &[]),
        _ => ctx.usage("usage: engineering on|off"),
    }
}

fn baud(ctx: &mut ExecContext, argv: &[&str]) -> i32 {
    let Some(index) = argv.get(1) else {
        return ctx.usage("usage: baud <index>");
    };
    match parse_word(index) {
        Ok(index) => ctx.send(CommandWord::SetBaudRate.word(), &index.to_le_bytes()),
        Err(err) => ctx.usage(err.message),
    }
}

fn raw(ctx: &mut ExecContext, argv: &[&str]) -> i32 {
    let Some(word) = argv.get(1) else {
        return ctx.usage("usage: raw <word> [hex data...]");
    };
    // The dispatcher drops tokens past the limit, so a full argv may be cut.
    if argv.len() >= EXEC_MAX_ARGS {
        return ctx.usage(format!(
            "raw: at most {} data tokens; join bytes as one group (e.g. 0000280028)",
            EXEC_MAX_ARGS - 3
        ));
    }
    let word = match resolve_command_word(word) {
        Ok(word) => word,
        Err(err) => return ctx.usage(err.message),
    };
    match parse_hex(&argv[2..].join(" ")) {
        Ok(data) => ctx.send(word, &data),
        Err(err) => ctx.usage(err.message),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use ldframe_frame::{FrameClass, FrameDecoder};

    use super::*;

    #[derive(Clone, Default)]
    struct SharedSink(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run_lines(lines: &[&str]) -> (Vec<Result<i32, DispatchError>>, Vec<Vec<u8>>) {
        let sink = SharedSink::default();
        let mut ctx = ExecContext::new(Box::new(sink.clone()));
        let table = command_table();
        let results = lines
            .iter()
            .map(|line| table.dispatch(&mut ctx, line))
            .collect();

        let mut decoder = FrameDecoder::new(FrameClass::COMMAND_ACK);
        let mut payloads = Vec::new();
        for &byte in sink.0.borrow().iter() {
            if decoder.process_byte(byte) {
                payloads.push(decoder.payload().unwrap().to_vec());
            }
        }
        (results, payloads)
    }

    #[test]
    fn config_session_emits_frames() {
        let (results, payloads) = run_lines(&["enable-config", "read-param", "end-config"]);
        assert_eq!(results, vec![Ok(0), Ok(0), Ok(0)]);
        assert_eq!(
            payloads,
            vec![vec![0xFF, 0x00, 0x01, 0x00], vec![0x61, 0x00], vec![0xFE, 0x00]]
        );
    }

    #[test]
    fn engineering_and_baud_arguments() {
        let (results, payloads) =
            run_lines(&["engineering on", "engineering off", "baud 7", "engineering"]);
        assert_eq!(results, vec![Ok(0), Ok(0), Ok(0), Ok(HANDLER_USAGE)]);
        assert_eq!(
            payloads,
            vec![vec![0x62, 0x00], vec![0x63, 0x00], vec![0xA1, 0x00, 0x07, 0x00]]
        );
    }

    #[test]
    fn raw_command_with_data() {
        let (results, payloads) = run_lines(&["raw 0x0064 00 00 28 28", "raw set-sensitivity zz"]);
        assert_eq!(results, vec![Ok(0), Ok(HANDLER_USAGE)]);
        assert_eq!(payloads, vec![vec![0x64, 0x00, 0x00, 0x00, 0x28, 0x28]]);
    }

    #[test]
    fn raw_keeps_every_spaced_data_byte() {
        let (results, payloads) = run_lines(&["raw 0x0064 00 00 01 00 00 00 28 00 05 00"]);
        assert_eq!(results, vec![Ok(HANDLER_OK)]);
        assert_eq!(
            payloads,
            vec![vec![0x64, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x28, 0x00, 0x05, 0x00]]
        );
    }

    #[test]
    fn raw_rejects_lines_cut_by_token_limit() {
        let data = vec!["00"; EXEC_MAX_ARGS];
        let line = format!("raw 0x0064 {}", data.join(" "));
        let (results, payloads) = run_lines(&[line.as_str()]);
        assert_eq!(results, vec![Ok(HANDLER_USAGE)]);
        assert!(payloads.is_empty());

        let data = vec!["00"; 60];
        let line = format!("raw 0x0064 {}", data.join(" "));
        let (results, payloads) = run_lines(&[line.as_str()]);
        assert_eq!(results, vec![Ok(HANDLER_OK)]);
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].len(), 62);
    }

    #[test]
    fn dispatcher_errors_are_distinct() {
        let (results, payloads) = run_lines(&["", "reboot"]);
        assert_eq!(
            results,
            vec![
                Err(DispatchError::NoCommand),
                Err(DispatchError::Unknown("reboot".to_string()))
            ]
        );
        assert!(payloads.is_empty());
    }
}
