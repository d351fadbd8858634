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

//! Driver configuration.
//!
//! Options come from a connection string (`Key=Value;...`) or are set one at
//! a time. Keys are case-insensitive and values may be wrapped in braces,
//! which lets them contain `;`.
//!
//! | Key | Meaning | Default |
//! |---|---|---|
//! | `LogLevel` | OFF, ERROR, WARN, INFO, DEBUG or TRACE | unset (`RUST_LOG`) |
//! | `LogOutput` | log file path | stderr |
//! | `RowArraySize` | rowset size of new statements | 1 |
//! | `NestedValueMaxLength` | bound on one rendered nested element | 1024 |

use crate::cursor::DEFAULT_NESTED_VALUE_MAX_LENGTH;
use crate::error::{DriverErrorHelper, Result, SqlState};
use crate::logging::LogConfig;
use tracing::debug;

const LOG_LEVELS: [&str; 6] = ["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"];

/// Keys that belong to the driver manager and are ignored here.
const PASSTHROUGH_KEYS: [&str; 2] = ["DRIVER", "DSN"];

#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig {
    pub log: LogConfig,
    pub row_array_size: usize,
    pub nested_value_max_length: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            row_array_size: 1,
            nested_value_max_length: DEFAULT_NESTED_VALUE_MAX_LENGTH,
        }
    }
}

impl DriverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a connection string.
    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        let mut config = Self::default();
        for (key, value) in parse_connection_string(connection_string)? {
            config.set_option(&key, &value)?;
        }
        Ok(config)
    }

    /// Set one option.
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
        debug!("Setting option {}", key);
        match key.to_ascii_lowercase().as_str() {
            "loglevel" => {
                let level = value.trim().to_ascii_uppercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(invalid_value(key, value));
                }
                self.log.level = Some(level);
            }
            "logoutput" => {
                let path = value.trim();
                self.log.file = (!path.is_empty()).then(|| path.to_string());
            }
            "rowarraysize" => {
                self.row_array_size = parse_positive(value).ok_or_else(|| invalid_value(key, value))?;
            }
            "nestedvaluemaxlength" => {
                self.nested_value_max_length =
                    parse_positive(value).ok_or_else(|| invalid_value(key, value))?;
            }
            k if PASSTHROUGH_KEYS.iter().any(|p| p.eq_ignore_ascii_case(k)) => {}
            _ => {
                return Err(DriverErrorHelper::invalid_argument()
                    .state(SqlState::SHY092InvalidAttribute)
                    .message(format!("Unknown option '{}'", key)))
            }
        }
        Ok(())
    }

    /// Current value of an option, as text.
    pub fn get_option(&self, key: &str) -> Result<String> {
        let value = match key.to_ascii_lowercase().as_str() {
            "loglevel" => self.log.level.clone().unwrap_or_default(),
            "logoutput" => self.log.file.clone().unwrap_or_default(),
            "rowarraysize" => self.row_array_size.to_string(),
            "nestedvaluemaxlength" => self.nested_value_max_length.to_string(),
            _ => {
                return Err(DriverErrorHelper::invalid_argument()
                    .state(SqlState::SHY092InvalidAttribute)
                    .message(format!("Unknown option '{}'", key)))
            }
        };
        Ok(value)
    }
}

fn invalid_value(key: &str, value: &str) -> crate::error::Error {
    DriverErrorHelper::invalid_argument()
        .message(format!("Invalid value '{}' for option '{}'", value, key))
}

/// Parse a positive integer option value.
fn parse_positive(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok().filter(|v| *v > 0)
}

/// Split a connection string into key/value pairs.
fn parse_connection_string(input: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    let mut rest = input.trim();
    while !rest.is_empty() {
        let eq = rest.find('=').ok_or_else(|| {
            DriverErrorHelper::invalid_argument()
                .message(format!("Missing '=' in connection string near '{}'", rest))
        })?;
        let key = rest[..eq].trim().to_string();
        rest = rest[eq + 1..].trim_start();
        let value = if let Some(braced) = rest.strip_prefix('{') {
            let close = braced.find('}').ok_or_else(|| {
                DriverErrorHelper::invalid_argument()
                    .message(format!("Unterminated '{{' in value of '{}'", key))
            })?;
            let value = braced[..close].to_string();
            rest = braced[close + 1..].trim_start();
            rest = rest.strip_prefix(';').unwrap_or(rest);
            value
        } else {
            let end = rest.find(';').unwrap_or(rest.len());
            let value = rest[..end].trim().to_string();
            rest = rest.get(end + 1..).unwrap_or("");
            value
        };
        if !key.is_empty() {
            pairs.push((key, value));
        }
        rest = rest.trim_start();
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.row_array_size, 1);
        assert_eq!(config.nested_value_max_length, 1024);
        assert!(config.log.level.is_none());
    }

    #[test]
    fn test_from_connection_string() {
        let config = DriverConfig::from_connection_string(
            "Driver={Marshal Driver};loglevel=debug;LogOutput={/tmp/a;b.log};RowArraySize=10;",
        )
        .unwrap();
        assert_eq!(config.log.level.as_deref(), Some("DEBUG"));
        assert_eq!(config.log.file.as_deref(), Some("/tmp/a;b.log"));
        assert_eq!(config.row_array_size, 10);
        assert_eq!(config.get_option("ROWARRAYSIZE").unwrap(), "10");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = DriverConfig::from_connection_string("Colour=blue").unwrap_err();
        assert_eq!(err.sql_state(), SqlState::SHY092InvalidAttribute);
        let err = DriverConfig::new().get_option("Colour").unwrap_err();
        assert_eq!(err.sql_state(), SqlState::SHY092InvalidAttribute);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = DriverConfig::new();
        let err = config.set_option("RowArraySize", "many").unwrap_err();
        assert_eq!(err.sql_state(), SqlState::SHY024InvalidAttributeValue);
        assert!(config.set_option("NestedValueMaxLength", "0").is_err());
        assert!(config.set_option("LogLevel", "LOUD").is_err());
        assert_eq!(config.row_array_size, 1);
    }

    #[test]
    fn test_malformed_connection_string() {
        assert!(DriverConfig::from_connection_string("LogLevel").is_err());
        assert!(DriverConfig::from_connection_string("LogOutput={/tmp/x").is_err());
    }
}
