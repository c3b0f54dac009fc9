fn main() {
    deprank::cli::run();
}
