use std::process::ExitCode;

fn main() -> ExitCode {
    stresslog_lib::run()
}
