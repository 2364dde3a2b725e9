use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ldframe_frame::CommandWord;
use serde::Serialize;

use crate::cmd::CommandsArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct CommandInfo {
    name: &'static str,
    word: u16,
}

#[derive(Serialize)]
struct CommandsOutput {
    commands: Vec<CommandInfo>,
}

pub fn run(_args: CommandsArgs, format: OutputFormat) -> CliResult<i32> {
    let commands: Vec<CommandInfo> = CommandWord::ALL
        .into_iter()
        .map(|cmd| CommandInfo {
            name: cmd.name(),
            word: cmd.word(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let out = CommandsOutput {
                commands,
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
                .set_header(vec!["NAME", "WORD"]);
            for cmd in &commands {
                table.add_row(vec![cmd.name.to_string(), format!("0x{:04X}", cmd.word)]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Hex | OutputFormat::Raw => {
            for cmd in &commands {
                println!("0x{:04X} {}", cmd.word, cmd.name);
            }
        }
    }

    Ok(SUCCESS)
}
