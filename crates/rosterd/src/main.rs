use std::process::ExitCode;

fn main() -> ExitCode {
    match rosterd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("rosterd: {error}");
            ExitCode::FAILURE
        }
    }
}
