use colored::Colorize;

fn main() {
    if let Err(err) = warning_capture::run() {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}
