/// Print a summary of an ITAB recording
///
/// Usage: itab-info path/to/run.raw [--json] [--channels N] [-v]
use clap::Parser;
use itab::{coord_frame_name, read_raw_itab, MeasInfo, FIFFV_BIO_CH, FIFFV_MEG_CH};
use serde::Serialize;
use std::path::PathBuf;

const SUCCESS: i32 = 0;
const READ_ERROR: i32 = 1;
const OUTPUT_ERROR: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "itab-info", version, about = "Inspect ITAB MEG recordings")]
struct Cli {
    /// ITAB data file (.raw); the header is looked up next to it
    path: PathBuf,

    /// Print the measurement info as JSON
    #[arg(long)]
    json: bool,

    /// Number of channels to list
    #[arg(long, default_value_t = 10)]
    channels: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct InfoOutput<'a> {
    path: String,
    n_times: usize,
    duration_sec: f64,
    meas_date: Option<String>,
    info: &'a MeasInfo,
}

fn print_summary(info: &MeasInfo, n_times: usize, max_channels: usize) {
    println!("Basic Information:");
    println!("  Number of channels: {}", info.nchan);
    println!("  Sampling frequency: {:.2} Hz", info.sfreq);
    println!(
        "  Samples: {} ({:.2} s)",
        n_times,
        n_times as f64 / info.sfreq
    );
    if let Some(date) = info
        .meas_date
        .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
    {
        println!("  Measurement date: {}", date.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(subject) = &info.subject_info {
        println!("  Subject: {} {}", subject.first_name, subject.last_name);
    }
    if let (Some(low), Some(high)) = (info.lowpass, info.highpass) {
        println!("  Hardware filters: lowpass={} Hz, highpass={} Hz", low, high);
    }
    println!();

    // Count channels by type
    let meg_count = info.pick_kind(FIFFV_MEG_CH).len();
    let bio_count = info.pick_kind(FIFFV_BIO_CH).len();
    let other_count = info.nchan - meg_count - bio_count;
    let data_count = info.chs.iter().filter(|ch| ch.is_data_channel()).count();

    println!("Channel Types:");
    if meg_count > 0 {
        println!("  MEG channels: {}", meg_count);
    }
    if bio_count > 0 {
        println!("  BIO channels: {}", bio_count);
    }
    if other_count > 0 {
        println!("  Other channels: {}", other_count);
    }
    println!("  Data channels: {}", data_count);
    if !info.bads.is_empty() {
        println!("  Bad channels: {}", info.bads.join(", "));
    }
    println!();

    println!("First {} Channels:", max_channels.min(info.chs.len()));
    for (i, ch) in info.chs.iter().take(max_channels).enumerate() {
        println!(
            "  {}: {} ({}) - cal={:.2e} {}",
            i,
            ch.ch_name,
            ch.type_name(),
            ch.cal,
            ch.unit_label()
        );
    }
    if info.chs.len() > max_channels {
        println!("  ... and {} more channels", info.chs.len() - max_channels);
    }
    println!();

    println!("Digitization ({} points):", info.dig.len());
    for point in &info.dig {
        println!(
            "  {} #{} [{}]: ({:.4}, {:.4}, {:.4}) m",
            point.kind_name(),
            point.ident,
            coord_frame_name(point.coord_frame),
            point.r[0],
            point.r[1],
            point.r[2]
        );
    }

    if !info.events.is_empty() {
        println!();
        println!("Events: {}", info.events.len());
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let raw = match read_raw_itab(&cli.path, false) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(READ_ERROR);
        }
    };
    let info = raw.info();

    if cli.json {
        let output = InfoOutput {
            path: cli.path.display().to_string(),
            n_times: raw.n_times(),
            duration_sec: raw.n_times() as f64 / info.sfreq,
            meas_date: info
                .meas_date
                .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
                .map(|date| date.to_rfc3339()),
            info,
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(OUTPUT_ERROR);
            }
        }
    } else {
        println!("Opening ITAB file: {}", cli.path.display());
        println!("{}", "=".repeat(60));
        print_summary(info, raw.n_times(), cli.channels);
    }

    std::process::exit(SUCCESS);
}
