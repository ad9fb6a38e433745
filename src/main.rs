fn main() {
    if let Err(err) = stockflow_layout::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
