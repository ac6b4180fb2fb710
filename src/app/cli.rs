use clap::{crate_version, Arg, Command};

pub fn build_cli() -> Command {
  Command::new("article-catalog")
    .version(crate_version!())
    .about("Article catalog http service")
    .arg(Arg::new("config")
      .short('c')
      .long("config")
      .value_name("FILE")
      .help("Config file, replaces conf/<RUN_MODE> and APP_* environment overrides"))
    .subcommand(Command::new("serve")
      .about("Start the configured http servers (default)"))
}
