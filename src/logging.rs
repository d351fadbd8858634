// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Process-wide `tracing` setup.
//!
//! The first connection installs a subscriber; its `LogLevel` and
//! `LogOutput` options win over `RUST_LOG`. Without either, only warnings
//! from this crate are emitted.
//!
//! ```text
//! LogLevel=DEBUG;LogOutput=/tmp/odbc.log
//! ```

use std::fs::OpenOptions;
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CRATE_TARGET: &str = "odbc_marshal";
const DEFAULT_LEVEL: &str = "warn";

static SUBSCRIBER: OnceLock<()> = OnceLock::new();

/// Logging options of a [`DriverConfig`](crate::config::DriverConfig).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// One of OFF, ERROR, WARN, INFO, DEBUG, TRACE.
    pub level: Option<String>,
    /// Append to this file instead of stderr.
    pub file: Option<String>,
}

impl LogConfig {
    /// Filter directive for this crate's events, `None` when disabled.
    fn directive(&self) -> Option<String> {
        match self.level.as_deref() {
            Some(level) if level.eq_ignore_ascii_case("off") => None,
            Some(level) => Some(format!("{}={}", CRATE_TARGET, level.to_ascii_lowercase())),
            None => Some(format!("{}={}", CRATE_TARGET, DEFAULT_LEVEL)),
        }
    }

    fn env_filter(&self) -> Option<EnvFilter> {
        let directive = self.directive()?;
        if self.level.is_none() {
            if let Ok(from_env) = EnvFilter::try_from_default_env() {
                return Some(from_env);
            }
        }
        Some(EnvFilter::new(directive))
    }

    /// Where formatted events go. Falls back to stderr when the file cannot
    /// be opened.
    fn writer(&self) -> (BoxMakeWriter, bool) {
        let Some(path) = self.file.as_deref() else {
            return (BoxMakeWriter::new(std::io::stderr), true);
        };
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), false),
            Err(e) => {
                eprintln!("odbc-marshal: cannot open log file {}: {}", path, e);
                (BoxMakeWriter::new(std::io::stderr), true)
            }
        }
    }
}

/// Install the subscriber once per process; later calls do nothing.
pub(crate) fn init_logging(config: &LogConfig) {
    SUBSCRIBER.get_or_init(|| {
        let Some(filter) = config.env_filter() else {
            return;
        };
        let (writer, ansi) = config.writer();
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(false);
        if tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()
            .is_ok()
        {
            tracing::debug!("Logging initialized");
        }
    });
}
