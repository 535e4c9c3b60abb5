// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Log output of the native binaries.
//!
//! Verbosity comes from `RUST_LOG` (default `info`). `RUST_LOG_FORMAT` picks the
//! [`LogFormat`] and `RUST_LOG_SPAN_EVENTS` lists the span events to report, e.g.
//! `new,close`. When `NFT_INDEXER_LOG_DIR` is set, the same output is appended to
//! `<log_name>.log` in that directory.

use std::{
    env,
    fs::{File, OpenOptions},
    path::PathBuf,
    sync::Arc,
};

use is_terminal::IsTerminal as _;
use tracing::Subscriber;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{
        self,
        format::{FmtSpan, Format, Full},
        time::FormatTime,
        FormatFields, MakeWriter,
    },
    layer::{Layer, SubscriberExt as _},
    registry::LookupSpan,
    util::SubscriberInitExt as _,
    EnvFilter,
};

/// How log lines are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
    Pretty,
}

impl LogFormat {
    /// Reads a `RUST_LOG_FORMAT` value. Anything unknown is plain output.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            _ => LogFormat::Plain,
        }
    }

    fn apply<S, N, W, T>(
        self,
        layer: fmt::Layer<S, N, Format<Full, T>, W>,
    ) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
        N: for<'writer> FormatFields<'writer> + Send + Sync + 'static,
        W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
        T: FormatTime + Send + Sync + 'static,
    {
        match self {
            LogFormat::Plain => layer.boxed(),
            LogFormat::Json => layer.json().boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
        }
    }
}

/// Installs the global subscriber. `log_name` names the optional log file.
pub fn init(log_name: &str) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let format = LogFormat::from_env_value(env::var("RUST_LOG_FORMAT").ok().as_deref());
    let span_events = env::var("RUST_LOG_SPAN_EVENTS")
        .map(|events| span_events(&events))
        .unwrap_or(FmtSpan::NONE);
    let colored = env::var("NO_COLOR").map_or(true, |value| value.is_empty())
        && std::io::stderr().is_terminal();

    let stderr = format.apply(
        fmt::layer()
            .with_span_events(span_events.clone())
            .with_writer(std::io::stderr)
            .with_ansi(colored),
    );
    let file = log_file(log_name).map(|file| {
        format.apply(
            fmt::layer()
                .with_span_events(span_events)
                .with_writer(Arc::new(file))
                .with_ansi(false),
        )
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file)
        .with(stderr)
        .init();
}

/// Opens `<NFT_INDEXER_LOG_DIR>/<log_name>.log` for appending, if the variable is set.
fn log_file(log_name: &str) -> Option<File> {
    let mut path = PathBuf::from(env::var_os("NFT_INDEXER_LOG_DIR")?);
    path.push(log_name);
    path.set_extension("log");
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(&path)
        .inspect_err(|error| eprintln!("Cannot write logs to {}: {error}", path.display()))
        .ok()
}

/// Parses a comma-separated list of span events. Unknown names are ignored.
fn span_events(events: &str) -> FmtSpan {
    events
        .split(',')
        .map(|event| match event.trim() {
            "new" => FmtSpan::NEW,
            "enter" => FmtSpan::ENTER,
            "exit" => FmtSpan::EXIT,
            "close" => FmtSpan::CLOSE,
            "active" => FmtSpan::ACTIVE,
            "full" => FmtSpan::FULL,
            _ => FmtSpan::NONE,
        })
        .fold(FmtSpan::NONE, |events, event| events | event)
}
