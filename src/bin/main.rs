use dotenv::dotenv;

use article_catalog::{app::*, error::*};

fn main() -> Result<()> {
  dotenv().ok();
  env_logger::init();

  let cli = build_cli().get_matches();

  let config = AppConfig::new_clap(&cli)?;

  match cli.subcommand_name() {
    // default to 'serve' command.
    _ => serve::execute(config)?,
  }
  log::info!("Main finished");
  Ok(())
}
