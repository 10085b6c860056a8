fn main() -> anyhow::Result<()> {
    ratbot::cli::main()
}
