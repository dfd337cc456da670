use std::process::ExitCode;

fn main() -> ExitCode {
    match markup_bridge_cli::run(std::env::args_os()) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}
