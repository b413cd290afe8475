use std::path::PathBuf;
use std::process::exit;

use clap::{App, Arg, ArgMatches};
use env_logger::Env;
use headex::{extract_heads, Options};
use log::error;

fn include(matches: &ArgMatches, what: &str) -> bool {
    // everything is included by default; an include flag wins over its
    // exclude twin
    matches.is_present(format!("include-{}", what).as_str())
        || !matches.is_present(format!("exclude-{}", what).as_str())
}

fn main() {
    let matches = App::new("headex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract the player profiles from the player heads in a Minecraft world")
        .arg(
            Arg::with_name("world")
                .help("World directories to scan")
                .required(true)
                .multiple(true),
        )
        .arg(
            Arg::with_name("exclude-entities")
                .long("exclude-entities")
                .help("Exclude heads carried by entities"),
        )
        .arg(
            Arg::with_name("exclude-region")
                .long("exclude-region")
                .help("Exclude heads placed in the world and in containers"),
        )
        .arg(
            Arg::with_name("exclude-playerdata")
                .long("exclude-playerdata")
                .help("Exclude heads in players' inventories"),
        )
        .arg(
            Arg::with_name("exclude-datapacks")
                .long("exclude-datapacks")
                .help("Exclude base64-encoded profiles in .json or .mcfunction files in datapacks"),
        )
        .arg(
            Arg::with_name("include-entities")
                .long("include-entities")
                .help("Include heads carried by entities (default)"),
        )
        .arg(
            Arg::with_name("include-region")
                .long("include-region")
                .help("Include heads placed in the world and in containers (default)"),
        )
        .arg(
            Arg::with_name("include-playerdata")
                .long("include-playerdata")
                .help("Include heads in players' inventories (default)"),
        )
        .arg(
            Arg::with_name("include-datapacks")
                .long("include-datapacks")
                .help("Include profiles in data pack files (default)"),
        )
        .get_matches();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let opts = Options {
        entities: include(&matches, "entities"),
        region: include(&matches, "region"),
        player_data: include(&matches, "playerdata"),
        data_packs: include(&matches, "datapacks"),
    };

    let mut worlds = Vec::new();
    for path in matches.values_of("world").unwrap() {
        let path = PathBuf::from(path);
        if !path.is_dir() {
            eprintln!("world path {} is not a directory", path.display());
            exit(1);
        }
        worlds.push(path);
    }

    match extract_heads(&worlds, &opts) {
        Ok(heads) => {
            for head in heads {
                println!("{}", head);
            }
        }
        Err(e) => {
            error!("extraction failed: {}", e);
            exit(1);
        }
    }
}
