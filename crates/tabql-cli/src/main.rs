pub fn main() {
    std::process::exit(tabql_cli_lib::run_with_args(std::env::args_os()));
}
