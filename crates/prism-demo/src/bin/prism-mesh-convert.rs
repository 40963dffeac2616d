//! Offline converter from Wavefront OBJ to the engine's binary mesh format.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};

use prism_engine::mesh::MeshFile;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("prism-mesh-convert: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let mut args = std::env::args_os().skip(1);
    let (Some(input), Some(output)) = (args.next(), args.next()) else {
        bail!("usage: prism-mesh-convert <input.obj> <output.mesh>");
    };
    if args.next().is_some() {
        bail!("usage: prism-mesh-convert <input.obj> <output.mesh>");
    }
    let input = PathBuf::from(input);
    let output = PathBuf::from(output);

    let text = std::fs::read_to_string(&input)
        .with_context(|| format!("unable to read {}", input.display()))?;
    let mesh = MeshFile::from_obj_str(&text)
        .with_context(|| format!("failed to convert {}", input.display()))?;
    mesh.write_to(&output)?;

    println!(
        "{}: {} vertices, {} triangles -> {}",
        input.display(),
        mesh.vertices.len(),
        mesh.indices.len() / 3,
        output.display()
    );
    Ok(())
}
