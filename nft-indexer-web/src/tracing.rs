// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use tracing_subscriber::{
    filter::LevelFilter, fmt::format::Pretty, layer::SubscriberExt as _,
    util::SubscriberInitExt as _,
};

/// Sends `info` and above to the developer console, and span timings to the
/// [Performance API](https://developer.mozilla.org/en-US/docs/Web/API/Performance).
///
/// Does nothing if a subscriber is already installed.
pub fn init() {
    let console = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(tracing_web::MakeWebConsoleWriter::new());
    let performance = tracing_web::performance_layer().with_details_from_fields(Pretty::default());
    let _ = tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(console)
        .with(performance)
        .try_init();
}
