#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = wayfinder_demo::run_from_env() {
        tracing::error!(target: "wayfinder.demo", error = %error, "command failed");
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}
