//! Build script for autodeal-proto
//!
//! Compiles protobuf definitions using tonic-build.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_root = "../../proto";

    let protos = [
        "autodeal/v1/listing.proto",
        "autodeal/v1/negotiation.proto",
        "autodeal/v1/profile.proto",
        "autodeal/v1/auth.proto",
        "autodeal/v1/health.proto",
    ];

    let proto_paths: Vec<_> = protos
        .iter()
        .map(|p| format!("{}/{}", proto_root, p))
        .collect();

    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&proto_paths, &[proto_root.to_string()])?;

    Ok(())
}
