fn main() -> anyhow::Result<()> {
    clubdeck::cli::run()
}
