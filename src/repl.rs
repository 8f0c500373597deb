//! The interactive command loop.
//!
//! One numeric command code per iteration, dispatched against the session
//! state. Operations that need the study parameters (codes 1, 2, 5) redirect
//! to parameter entry when none are set, then resume automatically. The
//! pending command is a single `Option<Command>` field, never a stack.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::config::Settings;
use crate::display::Theme;
use crate::error::{CalcError, CalcResult};
use crate::io::Console;
use crate::stats::{self, Interval, Sample, StudyParams, Tail};

/// Display rounding is clamped to this range.
pub const ROUND_MIN: usize = 1;
pub const ROUND_MAX: usize = 9;

/// The eight operations plus exit, parsed from command codes 0-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Exit,
    TailTest,
    ConfidenceInterval,
    SetProportions,
    SetSuccesses,
    DHatFromZ,
    DecomposeInterval,
    SetRounding,
    Menu,
}

impl Command {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Exit),
            1 => Some(Self::TailTest),
            2 => Some(Self::ConfidenceInterval),
            3 => Some(Self::SetProportions),
            4 => Some(Self::SetSuccesses),
            5 => Some(Self::DHatFromZ),
            6 => Some(Self::DecomposeInterval),
            7 => Some(Self::SetRounding),
            8 => Some(Self::Menu),
            _ => None,
        }
    }
}

/// Mutable session state, process lifetime, no persistence.
pub struct Session {
    /// Decimal places for displayed values, in [1, 9].
    pub round: usize,
    /// Both samples plus d-hat/SEd once set via command 3 or 4.
    pub params: Option<StudyParams>,
    /// Command to re-run after a forced parameter entry.
    resume: Option<Command>,
}

impl Session {
    pub fn new(round: usize) -> Self {
        Self {
            round: round.clamp(ROUND_MIN, ROUND_MAX),
            params: None,
            resume: None,
        }
    }

    pub fn set_round(&mut self, round: usize) {
        self.round = round.clamp(ROUND_MIN, ROUND_MAX);
    }
}

pub struct Repl<R, W> {
    console: Console<R, W>,
    session: Session,
    theme: Theme,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    pub fn new(console: Console<R, W>, settings: &Settings, round_override: Option<usize>) -> Self {
        let round = round_override.unwrap_or(settings.display.round);
        Self {
            console,
            session: Session::new(round),
            theme: Theme::new(settings.display.color),
        }
    }

    /// Run the loop until command 0 or stdin EOF.
    pub fn run(&mut self) -> CalcResult<()> {
        match self.run_loop() {
            // EOF on stdin is a clean exit, same as command 0
            Err(CalcError::Eof) => Ok(()),
            other => other,
        }
    }

    fn run_loop(&mut self) -> CalcResult<()> {
        self.print_banner()?;

        let round = self.console.read_int(
            "Round to how many decimal places? : ",
            Some(self.session.round as i64),
            Some(ROUND_MIN as i64),
            Some(ROUND_MAX as i64),
        )?;
        self.session.set_round(round as usize);

        self.print_menu()?;
        let mut code =
            self.console
                .read_int("Enter the command code (0, or 1-8): ", Some(1), None, None)?;

        loop {
            debug!(code, "dispatching command");
            match Command::from_code(code) {
                Some(Command::Exit) => break,
                Some(command) => self.dispatch(command)?,
                None => {
                    writeln!(
                        self.console.writer(),
                        "Invalid code {code}. Should be 0 (to exit) or 1 to 8"
                    )?;
                    self.print_menu()?;
                }
            }
            code = self.console.read_int(
                "Enter the command code (0, or 1-8): ",
                Some(0),
                None,
                None,
            )?;
        }

        Ok(())
    }

    fn dispatch(&mut self, command: Command) -> CalcResult<()> {
        match command {
            Command::Exit => Ok(()),
            // These three need d and SEd to exist first
            Command::TailTest | Command::ConfidenceInterval | Command::DHatFromZ => {
                match self.session.params {
                    Some(params) => match command {
                        Command::TailTest => self.tail_test(params),
                        Command::ConfidenceInterval => self.confidence_interval(params),
                        _ => self.d_hat_from_z(params),
                    },
                    None => self.redirect_to_params(command),
                }
            }
            Command::SetProportions => self.set_from_proportions(),
            Command::SetSuccesses => self.set_from_successes(),
            Command::DecomposeInterval => self.decompose_interval(),
            Command::SetRounding => self.set_rounding(),
            Command::Menu => self.print_menu(),
        }
    }

    /// Missing-parameter redirect: remember the requested command, collect
    /// parameters (user picks counts vs proportions), then resume it.
    fn redirect_to_params(&mut self, requested: Command) -> CalcResult<()> {
        writeln!(
            self.console.writer(),
            "You must first use command code 3 or 4 to enter either n1,p1 n2,p2 or n1,x1 n2,x2 values"
        )?;
        self.session.resume = Some(requested);
        let counts = self
            .console
            .read_yes_no("Enter success counts (x) rather than proportions? [Y/n]: ", true)?;
        if counts {
            self.set_from_successes()
        } else {
            self.set_from_proportions()
        }
    }

    /// After either parameter-entry operation: store, report, resume.
    fn finish_params(&mut self, params: StudyParams) -> CalcResult<()> {
        let r = self.session.round;
        writeln!(
            self.console.writer(),
            "The point estimate (d-hat) is {d:.r$} and the standard error (SEd) = {se:.r$}",
            d = params.diff.point_estimate,
            se = params.diff.std_error,
        )?;
        debug!(
            d = params.diff.point_estimate,
            se = params.diff.std_error,
            "study parameters set"
        );
        self.session.params = Some(params);

        if let Some(next) = self.session.resume.take() {
            debug!(?next, "resuming pending command");
            return self.dispatch(next);
        }
        Ok(())
    }

    /// Command 1: one-tailed significance test for a given success count.
    fn tail_test(&mut self, params: StudyParams) -> CalcResult<()> {
        writeln!(
            self.console.writer(),
            "{}",
            self.theme.header(
                "Calculate the one sided (1-tail) chance for a number of successes, given a significance level"
            )
        )?;

        // Every success (or failure) in both samples gives SEd = 0 and an
        // undefined Z-score
        if params.diff.std_error == 0.0 {
            writeln!(
                self.console.writer(),
                "The standard error for the current parameters is 0, so a Z-score is undefined. Enter new parameters with code 3 or 4."
            )?;
            return Ok(());
        }

        // The success count being tested needs a concrete sample; the user
        // picks which of the two entered samples the count refers to.
        let which = self.console.read_int(
            "Test against which sample, 1 or 2? [1]: ",
            Some(1),
            Some(1),
            Some(2),
        )?;
        let sample = if which == 2 { params.second } else { params.first };

        let successes = self.console.read_int(
            "Number of successes to test for: ",
            None,
            Some(0),
            Some(sample.n as i64),
        )? as u64;
        let ratio = successes as f64 / sample.n as f64;
        let r = self.session.round;
        writeln!(
            self.console.writer(),
            "{successes} successes out of {n} tries is a p-hat value of {ratio:.r$}",
            n = sample.n,
        )?;

        let z = stats::z_score(ratio, sample.p_hat, params.diff.std_error);
        writeln!(
            self.console.writer(),
            "The Z-score for this p-hat of {ratio:.r$} is {z:.r$}"
        )?;

        let tail = if ratio > sample.p_hat {
            writeln!(
                self.console.writer(),
                "Since this is more than the average of {p:.r$}, we test on the right; anything too far right (less chance) is significant",
                p = sample.p_hat,
            )?;
            Tail::Right
        } else {
            writeln!(
                self.console.writer(),
                "Since this p-hat is less than the average of {p:.r$}, we test on the left; anything too far left (less chance) is significant",
                p = sample.p_hat,
            )?;
            Tail::Left
        };
        let chance = stats::tail_chance(z, tail);

        let alpha = self.console.read_float(
            "Enter the significance level for your test (alpha): ",
            None,
            Some(0.00001),
            Some(0.5),
        )?;
        writeln!(
            self.console.writer(),
            "The chance of getting a sample with {successes} successes out of {n} is {chance:.r$}",
            n = sample.n,
        )?;
        if alpha > chance {
            let verdict = self.theme.significant("SIGNIFICANT");
            writeln!(
                self.console.writer(),
                "{verdict}: the chance of {chance:.r$} is smaller than the alpha limit of {alpha}"
            )?;
        } else {
            let verdict = self.theme.not_significant("NOT significant");
            writeln!(
                self.console.writer(),
                "{verdict}: the chance of {chance:.r$} is >= the alpha limit of {alpha}"
            )?;
        }
        Ok(())
    }

    /// Command 2: confidence interval for d at a given confidence level.
    fn confidence_interval(&mut self, params: StudyParams) -> CalcResult<()> {
        writeln!(
            self.console.writer(),
            "{}",
            self.theme
                .header("Calculate the confidence interval for a given confidence level, such as 0.98 (98%)")
        )?;

        let confidence = self.console.read_float(
            "Enter the confidence level as a decimal (not %): ",
            None,
            Some(0.01),
            Some(0.99999),
        )?;
        let tail = (1.0 - confidence) / 2.0;
        let r = self.session.round;
        writeln!(
            self.console.writer(),
            "Only things with a chance of less than {tail:.w$} on the left (or right) fall outside the interval",
            w = r + 2,
        )?;

        let zstar = stats::critical_z(confidence);
        let me = (zstar * params.diff.std_error).abs();
        let interval = Interval::around(params.diff.point_estimate, me);
        writeln!(
            self.console.writer(),
            "For a {confidence} (or {pct}%) confidence interval, the Z* is {zstar:.r$} and the Margin of Error is {me:.r$}",
            pct = confidence * 100.0,
        )?;
        writeln!(
            self.console.writer(),
            "The interval can be given as {lower:.r$} < p1 - p2 < {upper:.r$}",
            lower = interval.lower,
            upper = interval.upper,
        )?;
        Ok(())
    }

    /// Command 3: set parameters from (n, p) pairs.
    fn set_from_proportions(&mut self) -> CalcResult<()> {
        writeln!(
            self.console.writer(),
            "{}",
            self.theme.header("Enter a new set of n1, p1 and n2, p2 values")
        )?;
        let r = self.session.round;
        writeln!(
            self.console.writer(),
            " Rounding final answers to {r} decimal places (code 7 to change this)"
        )?;

        let first = self.read_proportion_sample(1, r)?;
        let second = self.read_proportion_sample(2, r)?;
        self.finish_params(StudyParams::new(first, second))
    }

    fn read_proportion_sample(&mut self, label: usize, r: usize) -> CalcResult<Sample> {
        let n = self.console.read_int(
            &format!("N{label} (number of observations in sample #{label}): "),
            None,
            Some(2),
            None,
        )? as u64;
        let p = self.console.read_float(
            &format!("p{label} proportion of successes (p-hat {label}) in sample #{label}: "),
            None,
            Some(0.000001),
            Some(0.999999),
        )?;
        writeln!(
            self.console.writer(),
            "Sampling distribution of differences for {n} trials with a success proportion of {p:.r$}"
        )?;
        Ok(Sample::from_proportion(n, p))
    }

    /// Command 4: set parameters from (n, x) pairs.
    fn set_from_successes(&mut self) -> CalcResult<()> {
        writeln!(
            self.console.writer(),
            "{}",
            self.theme
                .header("Enter a new set of n1 trials, x1 successes (p-hat 1 = x1/n1), and n2, x2")
        )?;
        let r = self.session.round;
        writeln!(
            self.console.writer(),
            " Rounding final answers to {r} decimal places (code 7 to change this)"
        )?;

        let first = self.read_count_sample(1, r)?;
        let second = self.read_count_sample(2, r)?;
        self.finish_params(StudyParams::new(first, second))
    }

    fn read_count_sample(&mut self, label: usize, r: usize) -> CalcResult<Sample> {
        let n = self.console.read_int(
            &format!("N{label} (number of observations in sample {label}): "),
            None,
            Some(2),
            None,
        )? as u64;
        let x = self.console.read_int(
            &format!("x{label} (number of successes in sample {label}): "),
            None,
            Some(1),
            Some(n as i64),
        )? as u64;
        let sample = Sample::from_successes(n, x);
        writeln!(
            self.console.writer(),
            "Sampling distribution of differences for {n} trials with a {p:.r$} proportion of success (=x{label}/N{label})",
            p = sample.p_hat,
        )?;
        Ok(sample)
    }

    /// Command 5: d-hat value for a given Z.
    fn d_hat_from_z(&mut self, params: StudyParams) -> CalcResult<()> {
        writeln!(
            self.console.writer(),
            "{}",
            self.theme.header("Calculate d-hat given Z")
        )?;

        let z = self
            .console
            .read_float("Enter the value of Z (normalized): ", None, Some(-5.0), Some(5.0))?;
        let d_hat = params.diff.d_hat_for_z(z);
        let r = self.session.round;
        writeln!(
            self.console.writer(),
            "A Z value of {z} gives a d-hat value = {d_hat:.r$} for the current parameters d = {d:.r$} and SEd = {se:.r$}",
            d = params.diff.point_estimate,
            se = params.diff.std_error,
        )?;
        Ok(())
    }

    /// Command 6: point estimate and margin of error from interval bounds.
    fn decompose_interval(&mut self) -> CalcResult<()> {
        writeln!(
            self.console.writer(),
            "{}",
            self.theme
                .header("Given a confidence interval (lower, upper) find the point estimate and margin of error")
        )?;
        let round = self.console.read_int(
            "Round to how many decimal places? : ",
            Some(3),
            Some(ROUND_MIN as i64),
            Some(ROUND_MAX as i64),
        )?;
        self.session.set_round(round as usize);
        let r = self.session.round;

        let lower = self.console.read_float(
            "What is the lower limit of the p-hat interval? : ",
            None,
            Some(0.0001),
            Some(0.9998),
        )?;
        let upper = self.console.read_float(
            "What is the upper limit of the p-hat interval? : ",
            None,
            Some(lower.max(0.0002)),
            Some(0.9999),
        )?;
        let interval = Interval { lower, upper };
        writeln!(
            self.console.writer(),
            "For the interval ({lower},{upper}) the point estimate is {mid:.r$} and the margin of error is {me:.r$}",
            mid = interval.midpoint(),
            me = interval.margin_of_error(),
        )?;
        Ok(())
    }

    /// Command 7: change display rounding.
    fn set_rounding(&mut self) -> CalcResult<()> {
        let round = self.console.read_int(
            "Round to how many decimal places? : ",
            Some(4),
            Some(ROUND_MIN as i64),
            Some(ROUND_MAX as i64),
        )?;
        self.session.set_round(round as usize);
        Ok(())
    }

    fn print_banner(&mut self) -> CalcResult<()> {
        writeln!(
            self.console.writer(),
            "{}",
            self.theme
                .header("Difference in proportions helper: two-proportion z-test")
        )?;
        writeln!(
            self.console.writer(),
            "Standard symbols: N1 = # in sample #1, p1 = chance of success in sample 1 (p-hat 1)"
        )?;
        writeln!(
            self.console.writer(),
            "  N2 = # in sample #2, p2 = chance of success in sample 2 (p-hat 2)"
        )?;
        writeln!(
            self.console.writer(),
            "  d-hat = difference p1 - p2, also the point estimate (mean difference between proportions)"
        )?;
        writeln!(
            self.console.writer(),
            "  SEd = Standard Error of d-hat (standard deviation in the sampling distribution of d-hat)"
        )?;
        Ok(())
    }

    /// Command 8 (also printed at startup and after an invalid code).
    fn print_menu(&mut self) -> CalcResult<()> {
        let w = self.console.writer();
        writeln!(w, "Available command codes (for each loop iteration):")?;
        writeln!(
            w,
            "1 = Chance for a certain number of successes given alpha (significance level), for the current N, p values"
        )?;
        writeln!(w, "2 = Confidence interval for d-hat at a given confidence level")?;
        writeln!(w, "3 = Enter a new set of N, p values")?;
        writeln!(w, "4 = Enter a new set of N, successes values (p = successes/N)")?;
        writeln!(w, "5 = Calculate a d-hat value given a Z value")?;
        writeln!(
            w,
            "6 = Given a confidence interval, calculate the point estimate and margin of error"
        )?;
        writeln!(w, "7 = Set a new number of decimal digits for rounding")?;
        writeln!(w, "8 = Print the command codes list again")?;
        writeln!(w, "0 = Stop and exit the loop")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_session(script: &str) -> String {
        let mut out = Vec::new();
        {
            let console = Console::new(Cursor::new(script.as_bytes().to_vec()), &mut out);
            let mut repl = Repl::new(console, &Settings::default(), None);
            repl.run().unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn command_codes_map_to_operations() {
        assert_eq!(Command::from_code(0), Some(Command::Exit));
        assert_eq!(Command::from_code(1), Some(Command::TailTest));
        assert_eq!(Command::from_code(8), Some(Command::Menu));
        assert_eq!(Command::from_code(9), None);
        assert_eq!(Command::from_code(-1), None);
    }

    #[test]
    fn session_clamps_rounding() {
        let mut session = Session::new(0);
        assert_eq!(session.round, 1);
        session.set_round(99);
        assert_eq!(session.round, 9);
        session.set_round(5);
        assert_eq!(session.round, 5);
    }

    #[test]
    fn exit_immediately() {
        // default rounding, then command 0
        let out = run_session("\n0\n");
        assert!(out.contains("Difference in proportions helper"));
        assert!(out.contains("0 = Stop and exit the loop"));
    }

    #[test]
    fn eof_is_a_clean_exit() {
        let out = run_session("");
        assert!(out.contains("Round to how many decimal places?"));
    }

    #[test]
    fn set_proportions_then_confidence_interval() {
        // r=4; code 3 with (100, 0.5) and (200, 0.4); code 2 at 95%; exit
        let out = run_session("\n3\n100\n0.5\n200\n0.4\n2\n0.95\n0\n");
        assert!(out.contains("The point estimate (d-hat) is 0.1000"));
        // SEd = sqrt(0.25/100 + 0.24/200) = sqrt(0.0037)
        assert!(out.contains("standard error (SEd) = 0.0608"));
        // z* for 95% is 1.95996 -> 1.9600 at four places
        assert!(out.contains("the Z* is 1.9600"));
        // me = 1.95996 * 0.0608276 = 0.11922
        assert!(out.contains("Margin of Error is 0.1192"));
        assert!(out.contains("-0.0192 < p1 - p2 < 0.2192"));
    }

    #[test]
    fn set_successes_matches_proportion_entry() {
        // code 4 with (100, 50) and (200, 80) is the same study as above
        let out = run_session("\n4\n100\n50\n200\n80\n0\n");
        assert!(out.contains("The point estimate (d-hat) is 0.1000"));
        assert!(out.contains("standard error (SEd) = 0.0608"));
    }

    #[test]
    fn tail_test_uses_right_tail_above_the_mean() {
        // params (100, 0.5)/(100, 0.5); test 60 successes against sample 1
        let out = run_session("\n3\n100\n0.5\n100\n0.5\n1\n1\n60\n0.05\n0\n");
        assert!(out.contains("60 successes out of 100 tries is a p-hat value of 0.6000"));
        assert!(out.contains("we test on the right"));
        // SEd = sqrt(2 * 0.25/100) = 0.070711, z = 0.1/SEd = 1.4142
        assert!(out.contains("is 1.4142"));
    }

    #[test]
    fn tail_test_uses_left_tail_below_the_mean() {
        let out = run_session("\n3\n100\n0.5\n100\n0.5\n1\n1\n40\n0.05\n0\n");
        assert!(out.contains("we test on the left"));
    }

    #[test]
    fn tail_test_verdict_compares_alpha_to_chance() {
        // z = 1.4142 -> right-tail chance ~0.0786; alpha 0.5 > chance
        let out = run_session("\n3\n100\n0.5\n100\n0.5\n1\n1\n60\n0.5\n0\n");
        assert!(out.contains("SIGNIFICANT"));
        // alpha 0.01 < chance
        let out = run_session("\n3\n100\n0.5\n100\n0.5\n1\n1\n60\n0.01\n0\n");
        assert!(out.contains("NOT significant"));
    }

    #[test]
    fn d_hat_from_z_inverts() {
        // code 5 with z = 1 on the (100,0.5)/(100,0.5) study:
        // d-hat = 1 * 0.070711 + 0 = 0.0707
        let out = run_session("\n3\n100\n0.5\n100\n0.5\n5\n1\n0\n");
        assert!(out.contains("gives a d-hat value = 0.0707"));
    }

    #[test]
    fn decompose_interval_finds_midpoint_and_margin() {
        // code 6, default rounding (3), bounds 0.40/0.60
        let out = run_session("\n6\n\n0.40\n0.60\n0\n");
        assert!(out.contains("the point estimate is 0.500 and the margin of error is 0.100"));
    }

    #[test]
    fn decompose_interval_rejects_upper_below_lower() {
        let out = run_session("\n6\n\n0.40\n0.30\n0.60\n0\n");
        assert!(out.contains("below the minimum acceptable value of 0.4"));
        assert!(out.contains("the point estimate is 0.500"));
    }

    #[test]
    fn invalid_code_reports_and_reprints_menu() {
        let out = run_session("\n9\n0\n");
        assert!(out.contains("Invalid code 9. Should be 0 (to exit) or 1 to 8"));
        // menu printed at startup and again after the invalid code
        assert_eq!(out.matches("Available command codes").count(), 2);
    }

    #[test]
    fn missing_params_redirects_and_resumes() {
        // code 2 with no params: redirected to code 4 entry (default yes),
        // then the confidence interval runs without re-entering code 2
        let out = run_session("\n2\n\n100\n50\n200\n80\n0.95\n0\n");
        assert!(out.contains("You must first use command code 3 or 4"));
        assert!(out.contains("The point estimate (d-hat) is 0.1000"));
        assert!(out.contains("the Z* is 1.9600"));
    }

    #[test]
    fn missing_params_can_redirect_to_proportions() {
        // answering "n" to the counts question goes through code 3 instead
        let out = run_session("\n5\nn\n100\n0.5\n100\n0.5\n1\n0\n");
        assert!(out.contains("Enter a new set of n1, p1"));
        assert!(out.contains("gives a d-hat value = 0.0707"));
    }

    #[test]
    fn rounding_change_applies_to_later_output() {
        // r=2 via code 7, then set params: d-hat printed at two places
        let out = run_session("\n7\n2\n3\n100\n0.5\n200\n0.4\n0\n");
        assert!(out.contains("The point estimate (d-hat) is 0.10"));
        assert!(!out.contains("0.1000"));
    }

    #[test]
    fn tail_test_refuses_zero_standard_error() {
        // x = n for both samples: p-hat 1.0 each, SEd = 0, no Z-score
        let out = run_session("\n4\n100\n100\n200\n200\n1\n0\n");
        assert!(out.contains("standard error (SEd) = 0.0000"));
        assert!(out.contains("a Z-score is undefined"));
        assert!(!out.contains("NaN"));
    }

    #[test]
    fn tail_test_can_target_second_sample() {
        // samples (100, 0.5) and (200, 0.4); test 100 successes of n2=200
        let out = run_session("\n3\n100\n0.5\n200\n0.4\n1\n2\n100\n0.05\n0\n");
        assert!(out.contains("100 successes out of 200 tries is a p-hat value of 0.5000"));
        assert!(out.contains("we test on the right"));
    }
}
