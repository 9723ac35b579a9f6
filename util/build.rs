use vergen::EmitBuilder;

fn main() {
    EmitBuilder::builder().all_build().all_rustc().emit().unwrap_or_else(|e| {
        eprintln!("vergen failed: {}", e);
    });
}
