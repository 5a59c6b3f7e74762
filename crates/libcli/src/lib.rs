use anyhow::Context;

/// Builds the single-thread runtime and drives the benchmark against the
/// fixed signaling endpoint. Only returns if startup fails; once the
/// benchmark is running the process lives until it is killed.
pub fn run() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(libbench::run(libbench::SERVER_URL));
    Ok(())
}
