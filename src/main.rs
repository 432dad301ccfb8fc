use std::env;
use std::fs;

use failure::Error;
use log::info;

use trailmap::bootstrap::bootstrap;
use trailmap::config::Config;
use trailmap::fetch::{DirFetcher, HttpFetcher};
use trailmap::render;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        help();
        return Ok(());
    }

    let config = Config::load()?;
    let site = &args[1];
    let map = if site.starts_with("http://") || site.starts_with("https://") {
        bootstrap(&config, &HttpFetcher::new(site)?).await
    } else {
        bootstrap(&config, &DirFetcher::new(site)).await
    };

    let out = args.get(2);
    let content = match out {
        Some(out) if out.ends_with(".geojson") => {
            serde_json::to_string_pretty(&render::geojson(&map))?
        }
        _ => render::page(&map, &config.title)?,
    };

    match out {
        Some(out) => {
            fs::write(out, content)?;
            info!("wrote {}", out);
        }
        None => println!("{}", content),
    }

    Ok(())
}

fn help() {
    println!("usage: trailmap <site-dir|base-url> [output.html|output.geojson]");
}
