//! `watch` mode commands read from stdin

use ig_trigger::{TestRunSummary, TriggerSignal};

/// One line of `watch` input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    /// Feed a host signal to the trigger
    Signal(TriggerSignal),
    /// Force Idle
    Reset,
    /// Reattach the surface (simulates a view reload)
    Reload,
    /// Print phase and countdown
    Status,
    Help,
    Quit,
}

pub const WATCH_HELP: &str = "\
commands:
  roll                         manual gamble
  task <exit-code>             a task process ended
  tests <passed> <failed> <errored>
                               a test run finished
  reset                        stop everything, back to idle
  reload                       reattach the view (resumes fever)
  status                       show phase and countdown
  quit";

impl WatchCommand {
    /// Parse a line; blank lines yield `None`
    pub fn parse(line: &str) -> Option<Result<Self, String>> {
        let mut words = line.split_whitespace();
        let head = words.next()?;
        let args: Vec<&str> = words.collect();

        let command = match (head, args.as_slice()) {
            ("roll", []) => Ok(Self::Signal(TriggerSignal::Manual)),
            ("task", [code]) => code
                .parse::<i32>()
                .map(|code| {
                    Self::Signal(TriggerSignal::TaskEnded {
                        exit_code: Some(code),
                    })
                })
                .map_err(|_| format!("bad exit code: {}", code)),
            ("tests", [passed, failed, errored]) => parse_counts(passed, failed, errored).map(
                |(passed, failed, errored)| {
                    Self::Signal(TriggerSignal::TestResults {
                        runs: vec![TestRunSummary::new(passed, failed, errored)],
                    })
                },
            ),
            ("reset", []) => Ok(Self::Reset),
            ("reload", []) => Ok(Self::Reload),
            ("status", []) => Ok(Self::Status),
            ("help" | "?", []) => Ok(Self::Help),
            ("quit" | "exit", []) => Ok(Self::Quit),
            _ => Err(format!("unknown command: {}", line.trim())),
        };
        Some(command)
    }
}

fn parse_counts(passed: &str, failed: &str, errored: &str) -> Result<(u32, u32, u32), String> {
    let parse = |s: &str| s.parse::<u32>().map_err(|_| format!("bad count: {}", s));
    Ok((parse(passed)?, parse(failed)?, parse(errored)?))
}
