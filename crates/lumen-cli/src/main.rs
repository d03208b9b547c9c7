//! lumen CLI - build and probe acceleration structures
//!
//! Generates procedural scenes, builds an acceleration structure over them on
//! a worker pool and reports on its shape or traces camera rays through it.

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use lumen_raytrace::{build_structure, Bvh, Cancellation, Hit, Primitive, StructureKind, WorkerPool};

mod config;
mod scene;

use config::Config;
use scene::{camera_rays, Scene, ShapeKind};

#[derive(Parser)]
#[command(name = "lumen")]
#[command(about = "Build and probe lumen acceleration structures", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a BVH over a generated scene and print its statistics
    Build {
        #[command(flatten)]
        setup: Setup,
        /// Cancel the build after this many milliseconds
        #[arg(long)]
        time_limit_ms: Option<u64>,
    },
    /// Trace camera rays through a generated scene
    Trace {
        #[command(flatten)]
        setup: Setup,
        /// Image width in rays
        #[arg(long, default_value_t = 256)]
        width: usize,
        /// Image height in rays
        #[arg(long, default_value_t = 256)]
        height: usize,
        /// Check every answer against testing all primitives directly
        #[arg(long)]
        verify: bool,
    },
    /// Print the default configuration as TOML
    Config,
}

/// Scene and build options shared by all commands.
#[derive(Args)]
struct Setup {
    /// Number of primitives to generate
    #[arg(short, long, default_value_t = 100_000)]
    count: usize,
    /// Shape the scene is made of
    #[arg(long, value_enum, default_value_t = ShapeKind::Spheres)]
    shape: ShapeKind,
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Worker threads (overrides the config file)
    #[arg(short, long)]
    threads: Option<usize>,
    /// Acceleration structure (overrides the config file)
    #[arg(long)]
    structure: Option<StructureKind>,
}

impl Setup {
    fn resolve(&self) -> Result<(Config, WorkerPool)> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(threads) = self.threads {
            config.threads = Some(threads);
        }
        if let Some(structure) = self.structure {
            config.structure = structure;
        }

        let pool = match config.threads {
            Some(threads) => WorkerPool::new(threads)?,
            None => WorkerPool::with_default_size()?,
        };
        log::debug!("using {} worker threads", pool.num_threads());
        Ok((config, pool))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            setup,
            time_limit_ms,
        } => {
            run_build(&setup, time_limit_ms.map(Duration::from_millis))?;
        }
        Commands::Trace {
            setup,
            width,
            height,
            verify,
        } => {
            run_trace(&setup, width, height, verify)?;
        }
        Commands::Config => {
            print!("{}", toml::to_string(&Config::default())?);
        }
    }

    Ok(())
}

fn run_build(setup: &Setup, time_limit: Option<Duration>) -> Result<()> {
    let (config, pool) = setup.resolve()?;
    let scene = Scene::generate(setup.shape, setup.count);
    let cancellation = Cancellation::new();

    let bvh = with_time_limit(&cancellation, time_limit, || {
        Bvh::build(scene.primitives(), &cancellation, &pool, &config.build)
    });

    if cancellation.is_cancelled() {
        println!("Build cancelled by time limit; the hierarchy is coarser than usual.");
    }
    println!("BVH over {} {:?}:", scene.len(), setup.shape);
    println!("{}", bvh.stats());
    Ok(())
}

/// Run `op`, raising `cancellation` if it takes longer than `limit`.
fn with_time_limit<R>(
    cancellation: &Cancellation,
    limit: Option<Duration>,
    op: impl FnOnce() -> R,
) -> R {
    let Some(limit) = limit else {
        return op();
    };

    let (done, finished) = mpsc::channel::<()>();
    std::thread::scope(|s| {
        s.spawn(move || {
            if let Err(mpsc::RecvTimeoutError::Timeout) = finished.recv_timeout(limit) {
                log::debug!("time limit of {limit:?} reached, cancelling");
                cancellation.cancel();
            }
        });
        let result = op();
        drop(done);
        result
    })
}

fn run_trace(setup: &Setup, width: usize, height: usize, verify: bool) -> Result<()> {
    let (config, pool) = setup.resolve()?;
    let scene = Scene::generate(setup.shape, setup.count);
    let primitives = scene.primitives();

    let started = Instant::now();
    let structure = build_structure(
        config.structure,
        primitives.clone(),
        &Cancellation::new(),
        &pool,
        &config.build,
    );
    let build_time = started.elapsed();

    let rays = camera_rays(width, height);
    let started = Instant::now();
    let mut hits = 0usize;
    let mut occluded = 0usize;
    let mut total_t = 0.0;
    for ray in &rays {
        let mut hit = Hit::new();
        if structure.closest_hit(ray, &mut hit) {
            hits += 1;
            total_t += hit.t;
        }
        if structure.occludes(ray) {
            occluded += 1;
        }
    }
    let trace_time = started.elapsed();

    println!("Structure      : {}", config.structure);
    println!("Primitives     : {}", scene.len());
    println!("Build time     : {build_time:?}");
    println!("Rays           : {}", rays.len());
    println!("Trace time     : {trace_time:?}");
    println!("Hits           : {hits}");
    println!("Occluded       : {occluded}");
    if hits > 0 {
        println!("Mean distance  : {:.4}", total_t / hits as f64);
    }

    if verify {
        let mismatches = count_mismatches(structure.as_ref(), &primitives, &rays);
        if mismatches > 0 {
            bail!("{mismatches} of {} rays disagree with brute force", rays.len());
        }
        println!("Verified       : all rays match brute force");
    }

    Ok(())
}

/// Number of rays for which `structure` answers differently from testing
/// every primitive.
fn count_mismatches(
    structure: &dyn Primitive,
    primitives: &[&dyn Primitive],
    rays: &[lumen_math::Ray],
) -> usize {
    rays.iter()
        .filter(|ray| {
            let mut expected = Hit::new();
            for primitive in primitives {
                primitive.closest_hit(ray, &mut expected);
            }
            let mut hit = Hit::new();
            let found = structure.closest_hit(ray, &mut hit);
            found != expected.is_hit() || hit.t != expected.t || structure.occludes(ray) != found
        })
        .count()
}
