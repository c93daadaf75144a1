fn main() -> anyhow::Result<()> {
    movies_api::cli::run_cli()
}
