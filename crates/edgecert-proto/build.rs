use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generated code is committed under src/gen; regenerating needs protoc.
    println!("cargo:rerun-if-env-changed=EDGECERT_REGENERATE_PROTO");
    if env::var_os("EDGECERT_REGENERATE_PROTO").is_none() {
        return Ok(());
    }

    // Get the project root (workspace root)
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let workspace_root = manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .ok_or("crate must live two levels below the workspace root")?;
    let proto_dir = workspace_root.join("proto");

    let proto_files = [proto_dir.join("eva/v1/lookup.proto")];

    // Tell Cargo to rerun if proto files change
    for proto in &proto_files {
        println!("cargo:rerun-if-changed={}", proto.display());
    }

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .out_dir("src/gen")
        .compile_protos(&proto_files, &[proto_dir])?;

    Ok(())
}
