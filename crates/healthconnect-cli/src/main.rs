mod command;
mod config;
mod generator;
mod markdown;
mod model;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
