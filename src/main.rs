use std::process::ExitCode;

fn main() -> ExitCode {
    pymap::cli::run()
}
