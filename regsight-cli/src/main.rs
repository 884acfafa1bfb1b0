//! Regsight CLI - PHY register datasheet extraction and report generation
//! from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use regsight::{extract_registers, render_report, ExtractionResult, ResetValue};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "regsight")]
#[command(about = "PHY register datasheet extraction and reporting tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract registers from a datasheet and print the model
    Dump {
        /// Path to the datasheet HTML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Render an HTML report, optionally annotated with live values
    Render {
        /// Path to the datasheet HTML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Report output path
        #[arg(short, long, default_value = "regs.html")]
        output: PathBuf,

        /// JSON file mapping register addresses to live values,
        /// e.g. {"0x0000": 8448}
        #[arg(long, value_name = "VALUES")]
        values: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for tooling
    Json,
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Dump { file, format } => handle_dump(&file, format),
        Commands::Render {
            file,
            output,
            values,
        } => handle_render(&file, &output, values.as_deref()),
    };

    process::exit(exit_code);
}

fn handle_dump(file: &PathBuf, format: OutputFormat) -> i32 {
    match extract_registers(file) {
        Ok(result) => {
            match format {
                OutputFormat::Human => output_human(&result),
                OutputFormat::Json => output_json(&result),
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn handle_render(file: &PathBuf, output: &PathBuf, values: Option<&std::path::Path>) -> i32 {
    let mut result = match extract_registers(file) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    if let Some(values_path) = values {
        let values = match load_live_values(values_path) {
            Ok(values) => values,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        };
        for reg in &mut result.registers {
            if let Some(value) = values.get(&reg.address) {
                reg.set_live_value(*value);
            }
        }
    }

    let html = render_report(&result.registers);
    if let Err(e) = std::fs::write(output, html) {
        eprintln!("Error: {}", e);
        return 1;
    }

    println!(
        "Wrote {} ({} registers, {} of {} tables rejected)",
        output.display(),
        result.registers.len(),
        result.stats.tables_rejected,
        result.stats.tables_seen
    );
    0
}

/// Load a JSON object mapping addresses (decimal or 0x-prefixed hex
/// strings) to register values.
fn load_live_values(path: &std::path::Path) -> Result<HashMap<u32, u32>, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let raw: HashMap<String, u32> =
        serde_json::from_str(&text).map_err(|e| format!("{}: {}", path.display(), e))?;

    let mut values = HashMap::new();
    for (key, value) in raw {
        let address = match key.strip_prefix("0x") {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => key.parse(),
        }
        .map_err(|_| format!("invalid register address {:?}", key))?;
        values.insert(address, value);
    }
    Ok(values)
}

fn output_human(result: &ExtractionResult) {
    for reg in &result.registers {
        match reg.reset_value {
            Some(reset) => println!("\n{} [0x{:04X}] reset 0x{:04X}", reg.name, reg.address, reset),
            None => println!("\n{} [0x{:04X}] reset UNDEFINED", reg.name, reg.address),
        }
        println!("{}", "─".repeat(60));
        for field in &reg.bitfields {
            let bits = if field.bit_length() == 1 {
                format!("{}", field.bit_start)
            } else {
                format!("{}-{}", field.bit_stop, field.bit_start)
            };
            let reset = match &field.reset_value {
                ResetValue::Value(v) => v.to_string(),
                ResetValue::Raw(s) => s.clone(),
            };
            println!("  {:>5}  {:<20} {:<6} {}", bits, field.name, field.access, reset);
            for (value, meaning) in &field.value_meanings {
                println!("         {} = {}", value, meaning);
            }
        }
    }

    println!("\nSummary:");
    println!("  Registers:       {}", result.registers.len());
    println!("  Tables seen:     {}", result.stats.tables_seen);
    println!("  Tables rejected: {}", result.stats.tables_rejected);
    println!("  Rows skipped:    {}", result.stats.rows_skipped);
}

fn output_json(result: &ExtractionResult) {
    let output = serde_json::json!({
        "registers": result.registers,
        "stats": result.stats,
    });
    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}
