fn main() {
    if let Err(err) = libcli::run() {
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}
