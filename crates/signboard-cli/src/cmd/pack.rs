use crate::output::print_json;
use anyhow::Context;
use signboard_core::pack;
use std::path::Path;

pub fn run(input: &Path, output: &Path, json: bool) -> anyhow::Result<()> {
    let frame = pack::pack_file(input)
        .with_context(|| format!("failed to pack {}", input.display()))?;
    signboard_core::io::atomic_write(output, frame.as_bytes())
        .with_context(|| format!("failed to write {}", output.display()))?;

    if json {
        return print_json(&serde_json::json!({
            "input": input,
            "output": output,
            "bytes": frame.len(),
        }));
    }
    println!("Packed {} → {} ({} bytes)", input.display(), output.display(), frame.len());
    Ok(())
}
