use std::fs::File;
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ldframe_frame::{FrameError, FrameReader, ReaderConfig};

use crate::cmd::{resolve_class, DecodeArgs};
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS};
use crate::hex::parse_hex;
use crate::output::{print_frame, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let class = resolve_class(&args.class)?;
    let input = open_input(&args)?;
    let config = ReaderConfig {
        chunk_size: args.chunk_size.max(1),
        ..ReaderConfig::default()
    };
    let mut reader = FrameReader::with_config(input, class, config);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        if args.count.is_some_and(|count| printed >= count) {
            break;
        }

        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => return Err(frame_error("read failed", err)),
        };

        print_frame(&frame, format);
        printed = printed.saturating_add(1);
    }

    let stats = reader.decoder().stats();
    tracing::info!(
        class = class.name(),
        frames = stats.frames,
        resyncs = stats.resyncs,
        oversized = stats.oversized,
        "decode finished"
    );

    Ok(SUCCESS)
}

fn open_input(args: &DecodeArgs) -> CliResult<Box<dyn Read>> {
    let source: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(File::open(path).map_err(|err| {
            io_error(&format!("failed opening {}", path.display()), err)
        })?),
        None => Box::new(std::io::stdin()),
    };

    if !args.hex {
        return Ok(source);
    }

    let mut text = String::new();
    let mut source = source;
    source
        .read_to_string(&mut text)
        .map_err(|err| io_error("failed reading hex input", err))?;
    Ok(Box::new(Cursor::new(parse_hex(&text)?)))
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        // A second interrupt while blocked on a read exits immediately.
        if !running.swap(false, Ordering::SeqCst) {
            std::process::exit(130);
        }
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
