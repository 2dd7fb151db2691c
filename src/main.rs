use std::process;

fn main() {
    if let Err(e) = cmdparser::cli::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
