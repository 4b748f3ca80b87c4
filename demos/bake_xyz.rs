#![allow(clippy::cast_precision_loss)]
//! Loads an XYZ scan, bakes ambient occlusion and prints a summary.
//!
//! Usage:
//!   cargo run --example bake_xyz -- [scan.xyz] [--gpu] [--options opts.json] [--dump-depth dir]
//!
//! Without a file a synthetic crater is generated. Set `RUST_LOG=info` to see
//! timings.

use std::path::PathBuf;

use clap::Parser;
use heightscan::{
    bake_ambient_occlusion, bake_ambient_occlusion_gpu, drop_shadow_quad, save_depth_image,
    HeightscanOptions, Measurement, Sample, ViewCamera,
};

#[derive(Parser, Debug)]
#[command(name = "bake_xyz")]
#[command(about = "Bake ambient occlusion for an XYZ height scan")]
#[command(version)]
struct Args {
    /// Tab-separated XYZ file in millimetres; a synthetic crater when omitted
    input: Option<PathBuf>,

    /// Bake on a headless GPU instead of the software rasterizer
    #[arg(long)]
    gpu: bool,

    /// JSON file with bake and shading options
    #[arg(long)]
    options: Option<PathBuf>,

    /// Directory to write one greyscale PNG per baked view
    #[arg(long)]
    dump_depth: Option<PathBuf>,
}

/// A 10 mm crater on a 64x64 grid, in metres.
fn synthetic_crater() -> Vec<Sample> {
    let n = 64;
    let mut samples = Vec::with_capacity(n * n);
    for r in 0..n {
        for c in 0..n {
            let x = (c as f32 - 31.5) * 0.0002;
            let y = (r as f32 - 31.5) * 0.0002;
            let d = (x * x + y * y).sqrt() / 0.004;
            let z = 0.001 * ((d * 3.0).cos() * (-d).exp() - 0.5 * (-d * d * 4.0).exp());
            samples.push(Sample::new(x, y, z));
        }
    }
    samples
}

fn main() -> heightscan::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = match &args.options {
        Some(path) => HeightscanOptions::from_json_file(path)?,
        None => HeightscanOptions::default(),
    };

    let mut measurement = match &args.input {
        Some(path) => Measurement::from_file(path)?,
        None => Measurement::from_samples(&synthetic_crater())?,
    };

    let views = if args.gpu {
        bake_ambient_occlusion_gpu(measurement.mesh_mut(), &options.bake)?
    } else {
        bake_ambient_occlusion(measurement.mesh_mut(), &options.bake)?
    };

    if let Some(dir) = &args.dump_depth {
        std::fs::create_dir_all(dir)?;
        for (i, buffer) in views.depth_buffers().iter().enumerate() {
            save_depth_image(dir.join(format!("view_{i}.png")), buffer)?;
        }
        println!("Wrote {} depth images to {}", views.len(), dir.display());
    }

    let mesh = measurement.mesh();
    let (lo, hi) = mesh
        .vertices
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v.occlusion), hi.max(v.occlusion))
        });
    let mean = mesh.vertices.iter().map(|v| v.occlusion).sum::<f32>() / mesh.vertices.len() as f32;

    println!(
        "{}: {}x{} grid, {} triangles",
        measurement
            .filename()
            .map_or_else(|| "synthetic crater".to_string(), |p| p.display().to_string()),
        measurement.grid().rows(),
        measurement.grid().cols(),
        mesh.num_triangles()
    );
    println!("occlusion min {lo:.3} mean {mean:.3} max {hi:.3}");

    let camera = ViewCamera::new(1280.0, 720.0);
    let mvp = camera.model_view_projection(measurement.diagonal(), options.shading.z_scale);
    let shadow = drop_shadow_quad(measurement.bounding_box());
    println!("view diagonal {:.4} m, shadow plane z {:.5} m", measurement.diagonal(), shadow.positions[0].z);
    println!("light {:?}, mvp finite: {}", options.shading.normalized_light_dir(), mvp.is_finite());

    Ok(())
}
