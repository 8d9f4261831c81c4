use std::process::ExitCode;

fn main() -> ExitCode {
    match corpus_shards::app::run_publish(std::env::args().skip(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
