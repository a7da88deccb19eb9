//! Debug tool: print a deployment layer, includes expanded, as JSON.

use std::path::PathBuf;

use vss_compiler::deploy::{load_layer, DeployFlatMap};

fn main() {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        eprintln!("usage: deploy2json <layer.depl> [--flat]");
        std::process::exit(2);
    };
    let flat = args.next().as_deref() == Some("--flat");

    let layer = match load_layer(&path) {
        Ok(layer) => layer,
        Err(e) => {
            eprintln!("Error: {:?}", e);
            std::process::exit(1);
        }
    };

    if flat {
        let map = DeployFlatMap::from_tree(&layer);
        for (name, entry) in map.iter() {
            let kind = if entry.is_many() { "list" } else { "entry" };
            println!("{name} ({kind})");
        }
        return;
    }

    match serde_json::to_string_pretty(&layer) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
