//! Default command: the interactive calculator loop on stdio.

use crate::config::Settings;
use crate::error::CalcResult;
use crate::io::Console;
use crate::repl::Repl;

pub fn run_calculator(settings: &Settings, round_override: Option<usize>) -> CalcResult<()> {
    let console = Console::stdio();
    let mut repl = Repl::new(console, settings, round_override);
    repl.run()
}
