fn main() -> anyhow::Result<()> {
    coalesced::cli::run_cli()
}
