use std::{
    fs::{self, File},
    io::Write,
    panic,
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::{DateTime, Utc};
use tracing::error;
use tracing_appender::{non_blocking::WorkerGuard, rolling::Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::LoggingConfig;

pub fn init_tracing_log(config: &LoggingConfig) -> WorkerGuard {
    let format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_thread_ids(false)
        .with_target(true)
        .compact();

    let log_level = std::env::var("RUST_LOG")
        .map(|lev| lev.parse().expect("invalid RUST_LOG, change to eg 'info'"))
        .unwrap_or(tracing::Level::INFO);

    match config {
        LoggingConfig::Console => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
            let layer = tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(writer)
                .with_filter(get_crate_filter(log_level));

            tracing_subscriber::registry().with(layer).init();
            guard
        }

        LoggingConfig::File { dir_path, file_name } => {
            let file_appender = tracing_appender::rolling::Builder::new()
                .filename_prefix(file_name)
                .max_log_files(14)
                .rotation(Rotation::DAILY)
                .build(dir_path)
                .expect("failed to create file log appender");

            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(writer)
                .with_filter(get_crate_filter(log_level));

            tracing_subscriber::registry().with(layer).init();
            guard
        }
    }
}

const CRATES: &[&str] = &["api", "common", "execution", "node", "proposer", "types"];

fn get_crate_filter(crates_level: tracing::Level) -> EnvFilter {
    let mut env_filter = EnvFilter::new("info");

    for crate_name in CRATES {
        if let Ok(directive) = format!("pbs_{crate_name}={crates_level}").parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    env_filter
}

pub fn init_panic_hook(crash_log_path: Option<PathBuf>) {
    panic::set_hook(Box::new(move |info| {
        let backtrace = backtrace::Backtrace::new();
        let crash_log = format!("Panic: {info}\nFull backtrace:\n{backtrace:?}\n");

        error!("{crash_log}");
        eprintln!("{crash_log}");

        if let Some(crash_log_path) = crash_log_path.clone() {
            save_to_file(crash_log_path, crash_log);
        }
    }));
}

pub fn save_to_file(path: PathBuf, contents: String) {
    if let Some(parent_dir) = Path::new(&path).parent() {
        if let Err(err) = fs::create_dir_all(parent_dir) {
            eprintln!("failed to create crash log dir: {err}");
            return;
        }
    }

    match File::create(&path) {
        Ok(mut file) => {
            if let Err(err) = file.write_all(contents.as_bytes()) {
                eprintln!("failed to write crash log: {err}");
            }
        }
        Err(err) => eprintln!("failed to create crash log: {err}"),
    }
}

////// TIME //////

/// Formats a wall-clock instant as UTC with microsecond precision, eg `2024-05-01 12:00:00.000123`.
pub fn format_timestamp(time: SystemTime) -> String {
    let time: DateTime<Utc> = time.into();
    time.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}
