pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod io;
pub mod logging;
pub mod repl;
pub mod stats;

pub use config::Settings;
pub use error::{CalcError, CalcResult};
pub use io::Console;
pub use repl::{Command, Repl, Session};
pub use stats::{Difference, Interval, Sample, StudyParams, Tail};
