use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use waterline_assets::{AssetLibrary, TextureImage};
use waterline_render::shaders::WaterShader;
use waterline_render::{
    BrightFilter, GraphicsContext, Loader, RecordingContext, WAVE_SPEED, WaterFrameBufferTextures,
    WaterRenderer, WaveAnimation,
};

mod scene;

use scene::SceneFile;

#[derive(Parser)]
#[command(name = "waterline-cli", about = "CLI tool for the waterline renderer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run frames of a scene through the recording backend and print every GPU call
    Trace {
        /// Scene description (YAML)
        scene: PathBuf,
        /// Number of frames to render
        #[arg(short, long, default_value = "1")]
        frames: u32,
        /// Seconds between frames
        #[arg(short, long, default_value = "0.016")]
        delta: f32,
        /// Asset root; overrides the scene's settings
        #[arg(long)]
        assets: Option<PathBuf>,
        /// Also run the bloom bright-pass over the refraction texture
        #[arg(long)]
        bright_filter: bool,
    },
    /// Print the wave animation phase over a number of frames
    Phase {
        /// Number of frames to step
        #[arg(short, long, default_value = "10")]
        frames: u32,
        /// Seconds between frames
        #[arg(short, long, default_value = "1.0")]
        delta: f32,
        /// Phase advance per second
        #[arg(short, long, default_value_t = WAVE_SPEED)]
        speed: f32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("waterline-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", waterline_common::crate_info());
            println!("assets: {}", waterline_assets::crate_info());
            println!("render: {}", waterline_render::crate_info());
            println!("wave speed: {WAVE_SPEED}");
        }
        Commands::Trace {
            scene,
            frames,
            delta,
            assets,
            bright_filter,
        } => trace(&SceneFile::load(&scene)?, frames, delta, assets, bright_filter)?,
        Commands::Phase {
            frames,
            delta,
            speed,
        } => {
            let mut animation = WaveAnimation::new(speed);
            println!("frame  phase");
            for frame in 1..=frames {
                println!("{frame:>5}  {:.6}", animation.advance(delta));
            }
        }
    }

    Ok(())
}

fn trace(
    scene: &SceneFile,
    frames: u32,
    delta: f32,
    assets: Option<PathBuf>,
    bright_filter: bool,
) -> anyhow::Result<()> {
    let root = assets.unwrap_or_else(|| scene.settings.asset_root.clone());
    let mut library = AssetLibrary::new(root);
    let mut ctx = RecordingContext::new();
    let mut loader = Loader::new();

    // Stand-ins for the reflection/refraction render targets.
    let fbos = WaterFrameBufferTextures {
        reflection: ctx.create_texture(&TextureImage::solid([40, 80, 160, 255]), false)?,
        refraction: ctx.create_texture(&TextureImage::solid([20, 60, 90, 255]), false)?,
        refraction_depth: ctx.create_texture(&TextureImage::solid([255, 255, 255, 255]), false)?,
    };

    let shader = WaterShader::new(&mut ctx, &mut library)?;
    let mut water = WaterRenderer::new(
        &mut ctx,
        &mut loader,
        &mut library,
        shader,
        scene.settings.projection_matrix(),
        fbos,
        &scene.settings,
    )?;
    let bright = if bright_filter {
        Some(BrightFilter::new(&mut ctx, &mut loader, &mut library)?)
    } else {
        None
    };

    println!("--- setup ---");
    print!("{}", ctx.trace());

    for frame in 1..=frames {
        ctx.clear();
        water.render(&mut ctx, &scene.tiles, &scene.camera, &scene.light, delta);
        if let Some(bright) = &bright {
            bright.render(&mut ctx, fbos.refraction);
        }
        println!("--- frame {frame} (moveFactor={:.4}) ---", water.move_factor());
        print!("{}", ctx.trace());
    }

    ctx.clear();
    water.clean_up(&mut ctx);
    if let Some(bright) = &bright {
        bright.clean_up(&mut ctx);
    }
    loader.clean_up(&mut ctx);
    println!("--- teardown ---");
    print!("{}", ctx.trace());

    tracing::info!(
        frames,
        tiles = scene.tiles.len(),
        assets_read = library.len(),
        "trace complete"
    );
    Ok(())
}
