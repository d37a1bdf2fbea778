//! Build-script helper that writes the generated mapping functions to
//! `OUT_DIR/mappings.rs`. Include them with
//! `include!(concat!(env!("OUT_DIR"), "/mappings.rs"));`.
#[macro_export]
macro_rules! build {
    ($metadata:expr) => {
        $crate::build!($metadata, "rowgraph.toml")
    };
    ($metadata:expr, $config:expr) => {{
        use std::{env::var, fs::File, io::Write, path::PathBuf};

        //
        // CARGO
        //

        println!("cargo:rerun-if-changed=build.rs");
        println!("cargo:rerun-if-changed={}", $metadata);
        println!("cargo:rerun-if-changed={}", $config);

        let out_dir = var("OUT_DIR").expect("OUT_DIR not set");

        //
        // MAPPING CODE
        //

        let output = ::rowgraph::build::generate_file($metadata, $config)?;

        let mappings_file = PathBuf::from(out_dir).join("mappings.rs");
        let mut file = File::create(mappings_file)?;
        file.write_all(output.as_bytes())?;
    }};
}
