use anyhow::Result;

fn main() -> Result<()> {
    pretty_env_logger::init();

    pollster::block_on(arbor::window::run())?;

    Ok(())
}
