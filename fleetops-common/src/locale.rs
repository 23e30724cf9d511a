//! Report messages shown to operators
//!
//! The dashboard is operated in Spanish; English is available for tooling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Language used for row-level messages and the rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    /// Generic message for a row that failed validation
    pub fn invalid_data(&self) -> &'static str {
        match self {
            Locale::Es => "Datos inválidos",
            Locale::En => "Invalid data",
        }
    }

    /// Fallback when the remote store rejects a row without a message
    pub fn unknown_error(&self) -> &'static str {
        match self {
            Locale::Es => "Error desconocido",
            Locale::En => "Unknown error",
        }
    }

    /// Message for rows that were never attempted because the run was cancelled
    pub fn cancelled(&self) -> &'static str {
        match self {
            Locale::Es => "Importación cancelada",
            Locale::En => "Import cancelled",
        }
    }

    /// One line of the error list, e.g. `Fila 3: duplicate`
    pub fn row_error_line(&self, row: usize, message: &str) -> String {
        match self {
            Locale::Es => format!("Fila {}: {}", row, message),
            Locale::En => format!("Row {}: {}", row, message),
        }
    }

    /// Labels for the summary counters: total, successful, failed
    pub fn summary_labels(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            Locale::Es => ("Total de filas", "Exitosas", "Fallidas"),
            Locale::En => ("Total rows", "Successful", "Failed"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Es => "es",
            Locale::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept region-qualified tags such as "es-CL" or "en_US"
        let lang = s
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match lang.as_str() {
            "es" => Ok(Locale::Es),
            "en" => Ok(Locale::En),
            _ => Err(Error::Config(format!("Unsupported locale: {}", s))),
        }
    }
}
