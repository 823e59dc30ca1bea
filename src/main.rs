// SPDX-License-Identifier: MPL-2.0
use matrix_lens::app::{self, Flags};
use matrix_lens::logging;

const HELP: &str = "\
MatrixLens - confusion matrix viewer

USAGE:
  matrix_lens [OPTIONS] [FILE_ID]

OPTIONS:
  --lang <id>          UI language (e.g. en-US, fr)
  --server <url>       Lab server base URL, overrides settings.toml
  --config-dir <dir>   Directory holding settings.toml
  -h, --help           Print this help
";

fn parse_flags() -> Result<Option<Flags>, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let lang = args.opt_value_from_str("--lang")?;
    let server = args.opt_value_from_str("--server")?;
    let config_dir = args.opt_value_from_str("--config-dir")?;
    let file_id = args
        .finish()
        .into_iter()
        .next()
        .and_then(|s| s.into_string().ok());

    Ok(Some(Flags {
        lang,
        server,
        config_dir,
        file_id,
    }))
}

fn main() -> iced::Result {
    logging::init();

    let flags = match parse_flags() {
        Ok(Some(flags)) => flags,
        Ok(None) => {
            print!("{HELP}");
            return Ok(());
        }
        Err(err) => {
            tracing::error!(%err, "invalid arguments");
            eprint!("{HELP}");
            std::process::exit(2);
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting MatrixLens");
    app::run(flags)
}
