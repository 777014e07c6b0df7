// config.rs
//
// Configuration consumed by the three pipeline stages. CLI parsing lives
// in main.rs; this struct is what the library sees.

use std::path::PathBuf;

pub const DEFAULT_TIMEOUT: u64 = 1_000_000_000;

pub struct Config {
    pub input_files: Vec<PathBuf>,
    /// Consult the debug stepper before every fetch.
    pub debug: bool,
    /// Print the section layout table after linking.
    pub detail: bool,
    /// Maximum number of retired instructions before the run is declared
    /// dead ("Time Limit Exceeded").
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config { input_files: Vec::new(), debug: false, detail: false, timeout: DEFAULT_TIMEOUT }
    }
}
