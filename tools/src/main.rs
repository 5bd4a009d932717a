//! risk-runner: headless front end for the risk engine.
//!
//! Usage:
//!   risk-runner --persist data/risks.json --seed-defaults
//!   risk-runner --config risk.json --ipc-mode
//!
//! IPC mode reads one JSON command per line on stdin and writes one JSON
//! response per line on stdout.

use anyhow::Result;
use riskcalc_core::{
    band::heatmap_grid,
    config::RiskConfig,
    error::RiskError,
    model::{QualitativeInput, QuantitativeInput},
    query::{RiskQuery, SortKey, SortOrder},
    record::{Assessment, RiskKind, RiskRecord},
    service::RiskService,
    sweep::SweepAxis,
};
use serde::Serialize;
use std::env;
use std::io::{self, BufRead, Write};
use std::time::Instant;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    List {
        #[serde(default)]
        query: RiskQuery,
    },
    Get {
        id: String,
    },
    Stats,
    Heatmap,
    CreateQualitative {
        input: QualitativeInput,
    },
    CreateQuantitative {
        input: QuantitativeInput,
    },
    Update {
        id:    String,
        input: serde_json::Value,
    },
    Delete {
        id: String,
    },
    Simulate {
        input:      QuantitativeInput,
        iterations: Option<usize>,
        volatility: Option<f64>,
    },
    Sweep {
        input: QuantitativeInput,
        axis:  SweepAxis,
        steps: usize,
    },
}

/// Loop control, checked before a line is dispatched as a command.
#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcControl {
    Quit,
}

#[derive(Serialize)]
struct IpcError {
    code:    &'static str,
    message: String,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let seed_defaults = args.iter().any(|a| a == "--seed-defaults");

    let mut config = match string_arg(&args, "--config") {
        Some(path) => RiskConfig::load(path)?,
        None => RiskConfig::default(),
    }
    .with_env_overrides()?;
    if let Some(path) = string_arg(&args, "--persist") {
        config.persist_path = Some(path.to_string());
    }

    if !ipc_mode {
        println!("risk-runner");
        println!("  persist:   {}", config.persist_path.as_deref().unwrap_or("(none)"));
        println!("  backend:   {:?}", config.backend);
        println!("  debounce:  {} ms", config.debounce_ms);
        println!();
    }

    let mut service = RiskService::open(config)?;
    if seed_defaults {
        let seeded = service.seed_defaults()?;
        log::info!("Seeded {} demo risks", seeded.len());
    }

    if ipc_mode {
        run_ipc_loop(&mut service)?;
    } else {
        print_summary(&service)?;
    }

    service.flush();
    Ok(())
}

fn run_ipc_loop(service: &mut RiskService) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        if let Ok(IpcControl::Quit) = serde_json::from_str::<IpcControl>(&buffer) {
            break;
        }

        let response = parse_command(&buffer).and_then(|cmd| handle_command(service, cmd));
        let line = response_line(response);
        writeln!(stdout, "{line}")?;
        stdout.flush()?;

        service.poll_persistence(Instant::now());
    }
    Ok(())
}

fn parse_command(line: &str) -> Result<IpcCommand, RiskError> {
    serde_json::from_str(line).map_err(|e| RiskError::validation("command", e.to_string()))
}

/// `{"ok":true,"data":...}` or `{"ok":false,"error":{"code","message"}}`.
fn response_line(response: Result<serde_json::Value, RiskError>) -> serde_json::Value {
    match response {
        Ok(data) => serde_json::json!({ "ok": true, "data": data }),
        Err(e) => {
            if !matches!(e, RiskError::Validation { .. } | RiskError::NotFound { .. }) {
                log::error!("Command failed: {e}");
            }
            let error = IpcError {
                code:    e.code(),
                message: e.to_string(),
            };
            serde_json::json!({ "ok": false, "error": error })
        }
    }
}

fn handle_command(
    service: &mut RiskService,
    cmd: IpcCommand,
) -> Result<serde_json::Value, RiskError> {
    let data = match cmd {
        IpcCommand::List { query } => to_value(&service.find_all(&query)?)?,
        IpcCommand::Get { id } => to_value(service.require(&id)?)?,
        IpcCommand::Stats => to_value(&service.stats())?,
        IpcCommand::Heatmap => to_value(&heatmap_grid())?,
        IpcCommand::CreateQualitative { input } => to_value(&service.create_qualitative(input)?)?,
        IpcCommand::CreateQuantitative { input } => to_value(&service.create_quantitative(input)?)?,
        IpcCommand::Update { id, input } => to_value(&update_record(service, &id, input)?)?,
        IpcCommand::Delete { id } => {
            if !service.delete(&id) {
                return Err(RiskError::NotFound { id });
            }
            serde_json::json!({ "success": true })
        }
        IpcCommand::Simulate { input, iterations, volatility } => {
            to_value(&service.simulate(&input, iterations, volatility)?)?
        }
        IpcCommand::Sweep { input, axis, steps } => to_value(&service.sweep(&input, axis, steps)?)?,
    };
    Ok(data)
}

/// The stored record decides which input shape `input` must have.
fn update_record(
    service: &mut RiskService,
    id: &str,
    input: serde_json::Value,
) -> Result<RiskRecord, RiskError> {
    let kind = service.require(id)?.kind();
    let updated = match kind {
        RiskKind::Qualitative => {
            let input: QualitativeInput = serde_json::from_value(input)
                .map_err(|e| RiskError::validation("input", e.to_string()))?;
            service.update_qualitative(id, input)?
        }
        RiskKind::Quantitative => {
            let input: QuantitativeInput = serde_json::from_value(input)
                .map_err(|e| RiskError::validation("input", e.to_string()))?;
            service.update_quantitative(id, input)?
        }
    };
    updated.ok_or_else(|| RiskError::NotFound { id: id.to_string() })
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<serde_json::Value, RiskError> {
    Ok(serde_json::to_value(value)?)
}

fn print_summary(service: &RiskService) -> Result<()> {
    let stats = service.stats();

    println!("=== RISK SUMMARY ===");
    println!("  total:          {}", stats.total);
    for (kind, count) in &stats.by_type {
        println!("  {:<15} {count}", format!("{kind}:"));
    }
    for (band, count) in &stats.by_band {
        println!("  {:<15} {count}", format!("{band}:"));
    }
    println!(
        "  qualitative avg severity: {:.1} inherent / {:.1} residual",
        stats.qualitative.avg_inherent, stats.qualitative.avg_residual
    );
    println!(
        "  quantitative avg ALE:     {} inherent / {} residual",
        format_currency(stats.quantitative.avg_inherent),
        format_currency(stats.quantitative.avg_residual)
    );

    println!();
    println!("=== LATEST RISKS ===");
    let query = RiskQuery::default().sorted_by(SortKey::CreatedAt, SortOrder::Desc);
    let page = service.find_all(&query)?;
    if page.items.is_empty() {
        println!("  (No risks recorded yet)");
    }
    for record in &page.items {
        match &record.assessment {
            Assessment::Qualitative { input, output } => println!(
                "  {} | {} / {} | {} -> {}",
                record.created_at.format("%Y-%m-%d %H:%M"),
                input.asset_name,
                input.threat_description,
                output.inherent_band,
                output.residual_band,
            ),
            Assessment::Quantitative { input, output } => println!(
                "  {} | asset {} | ALE {} -> net {}",
                record.created_at.format("%Y-%m-%d %H:%M"),
                format_currency(input.asset_value),
                format_currency(output.ale_inherent),
                format_currency(output.net_residual),
            ),
        }
    }
    if page.has_next_page() {
        println!("  ... {} more", page.total - page.items.len());
    }
    Ok(())
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// `$1,234,567.89`. Non-finite values render empty.
fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}
