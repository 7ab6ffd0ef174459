// Copyright 2025 eraflo
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

//! Errors raised while loading configuration files.

use thiserror::Error;
use vesper_core::SetupError;

/// Failure to read, parse or validate a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The JSON document is malformed or does not match the schema.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The RON document is malformed or does not match the schema.
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    /// RON serialization failed.
    #[error("RON serialization error: {0}")]
    RonWrite(#[from] ron::Error),
    /// The file extension is neither `.json` nor `.ron`.
    #[error("unsupported config extension '{0}' (expected .json or .ron)")]
    UnsupportedFormat(String),
    /// The configuration parsed but describes an invalid scene.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] SetupError),
}
