use std::error::Error;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
	let root_dir: PathBuf = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?);

	println!("cargo:rerun-if-changed=cbindgen.toml");
	println!("cargo:rerun-if-changed=src/c_interface.rs");

	let config: cbindgen::Config = cbindgen::Config::from_file(root_dir.join("cbindgen.toml"))?;

	match cbindgen::Builder::new().with_config(config).with_crate(&root_dir).generate() {
		Ok(bindings) => {
			bindings.write_to_file(root_dir.join("include").join("tnfa_match.h"));
		},
		Err(err) => {
			println!("cargo:warning=skipping C header generation: {err}");
		},
	}

	Ok(())
}
