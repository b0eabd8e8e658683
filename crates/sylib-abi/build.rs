#[path = "build/version_script.rs"]
mod version_script;

use std::path::PathBuf;
use std::{env, fs};

fn main() {
    println!("cargo:rerun-if-changed=version_scripts/sylib.map");
    println!("cargo:rerun-if-changed=build/version_script.rs");

    let manifest_dir = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").unwrap());
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").unwrap());
    let template = fs::read_to_string(manifest_dir.join("version_scripts/sylib.map")).unwrap();
    let c_variadic = env::var_os("CARGO_FEATURE_C_VARIADIC").is_some();

    let map = out_dir.join("sylib.map");
    fs::write(&map, version_script::render(&template, c_variadic)).unwrap();
    println!("cargo:rustc-cdylib-link-arg=-Wl,--version-script={}", map.display());
}
