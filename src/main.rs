fn main() {
    if let Err(err) = blackout_stats::app::run() {
        eprintln!("application startup failed: {err}");
        std::process::exit(1);
    }
}
