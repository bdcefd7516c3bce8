use std::env;
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub status_only: bool,
    pub verbose: u8,
}

pub fn parse_args() -> Result<CliArgs, String> {
    parse_from(env::args().skip(1))
}

fn parse_from(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut args = args.into_iter();
    let mut parsed = CliArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --config".to_string())?;
                parsed.config = Some(PathBuf::from(value));
            }
            "--status" => {
                parsed.status_only = true;
            }
            "--verbose" | "-v" => {
                parsed.verbose = parsed.verbose.saturating_add(1);
            }
            "-vv" => {
                parsed.verbose = parsed.verbose.saturating_add(2);
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                return Err(format!("unknown argument: {arg}"));
            }
        }
    }

    Ok(parsed)
}

pub fn print_help() {
    println!(
        "tinybatch\n\n\
Compress a folder of images through the TinyPNG API, rotating API keys as their quota fills.\n\n\
Usage:\n  tinybatch [--config <path>] [--status] [-v]\n\n\
Options:\n  -c, --config <path>  Config file to use (default: tinybatch.toml)\n  --status             Print API key usage and exit\n  -v, --verbose        More log output, repeat for trace\n  -h, --help           Show this help message\n"
    );
}
