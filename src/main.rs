fn main() {
    if let Err(err) = csv_grouper::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
