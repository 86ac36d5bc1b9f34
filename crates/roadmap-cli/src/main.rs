use roadmap_cli::{cli, init_tracing, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let output = run(&matches).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
