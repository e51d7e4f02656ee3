//! Issue a token from the command line, signed with the same secret the
//! service would use.

use clap::Parser;
use profiles::auth::Claims;
use profiles::config::AppConfig;
use profiles::jwt::TokenCodec;

#[derive(Debug, Parser)]
#[command(name = "mint-token", about = "Issue a signed access token for a subject")]
struct Args {
    /// Principal the token asserts, e.g. an email address
    subject: String,

    /// Lifetime in seconds (defaults to 15 minutes)
    #[arg(long, env = "TOKEN_TTL_SECONDS")]
    ttl_seconds: Option<i64>,

    /// Extra string claims as key=value, repeatable
    #[arg(long = "claim", value_parser = parse_claim)]
    claims: Vec<(String, String)>,
}

fn parse_claim(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got {raw:?}")),
    }
}

fn main() {
    let args = Args::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    if config.using_dev_secret {
        eprintln!("warning: JWT_SECRET is not set; using the development secret");
    }

    let mut claims = Claims::with_subject(args.subject);
    for (key, value) in args.claims {
        claims.insert(key, value);
    }

    let ttl = match args.ttl_seconds {
        Some(secs) if secs <= 0 => {
            eprintln!("--ttl-seconds must be positive");
            std::process::exit(2);
        }
        Some(secs) => Some(time::Duration::seconds(secs)),
        None => None,
    };

    match TokenCodec::new(&config.jwt_secret).issue(&claims, ttl) {
        Ok(token) => println!("{token}"),
        Err(e) => {
            eprintln!("failed to issue token: {e}");
            std::process::exit(1);
        }
    }
}
