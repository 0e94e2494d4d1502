use std::path::Path;
use std::process::Output;

/// Run the CLI against `backend`, keeping credentials under `data_dir`.
pub async fn run_cli_with_env(args: &[&str], data_dir: &Path, backend: &str) -> Output {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_storefront"))
        .args(args)
        .env("STOREFRONT_DATA_DIR", data_dir)
        .env("STOREFRONT_BACKEND_URL", backend)
        .env_remove("STOREFRONT_REFRESH_MODE")
        .env_remove("STOREFRONT_PASSWORD")
        .env("NO_COLOR", "1")
        .output()
        .await
        .expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_with_env_success(args: &[&str], data_dir: &Path, backend: &str) -> String {
    let output = run_cli_with_env(args, data_dir, backend).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
