fn main() -> std::process::ExitCode {
    tireguide_cli::run()
}
