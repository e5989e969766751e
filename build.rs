use camino::Utf8Path;
use feishu_relay_cfg::Config;
use std::{error::Error, fs};

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=feishu-relay-cfg/src/config.rs");
    let cfg = Config::default();

    let toml_path = Utf8Path::new("demos/config.toml");
    let toml = toml::to_string(&cfg)?;
    fs::write(toml_path, toml)?;

    Ok(())
}
