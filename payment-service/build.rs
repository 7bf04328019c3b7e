fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = std::path::PathBuf::from(std::env::var("OUT_DIR")?);

    // Supply a protoc binary when one isn't available on PATH (offline builds).
    if std::env::var_os("PROTOC").is_none() {
        if let Ok(protoc) = protoc_bin_vendored::protoc_bin_path() {
            std::env::set_var("PROTOC", protoc);
        }
    }

    // Compile the payment proto with a file descriptor set for reflection
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .file_descriptor_set_path(out_dir.join("payment_descriptor.bin"))
        .compile_protos(&["../proto/payment/v1/payment.proto"], &["../proto"])?;

    println!("cargo:rerun-if-changed=../proto/payment/v1/payment.proto");

    Ok(())
}
