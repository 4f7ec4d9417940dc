use anyhow::{bail, Context, Result};
use indicatif::ParallelProgressIterator;
use log::{info, warn};
use quadmosaic_lib::{BlockSet, Params, PixelBuffer, Session, Source, Stats};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde_json::{json, Value};

const USAGE: &str = "usage: quadmosaic <frames-dir> [--quality low|med|high|ultra] [--scale F] \
                     [--boxes N] [--skip-background]";

const BACKGROUND_SIMILARITY: f64 = 30.0;

#[derive(Debug)]
struct Args {
    dir: String,
    scale: f64,
    max_boxes: usize,
    skip_background: bool,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut dir = None;
        let mut quality = "med".to_string();
        let mut scale: Option<f64> = None;
        let mut max_boxes: usize = 0;
        let mut skip_background = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--quality" => quality = args.next().context(USAGE)?,
                "--scale" => {
                    scale = Some(args.next().context(USAGE)?.parse().context("Invalid --scale")?)
                }
                "--boxes" => max_boxes = args.next().context(USAGE)?.parse().context("Invalid --boxes")?,
                "--skip-background" => skip_background = true,
                _ if arg.starts_with("--") => bail!("Unknown option: {}\n{}", arg, USAGE),
                _ if dir.is_none() => dir = Some(arg),
                _ => bail!(USAGE),
            }
        }

        let scale = match scale {
            Some(scale) => scale,
            None => quality_scale(&quality)?,
        };

        Ok(Self {
            dir: dir.context(USAGE)?,
            scale,
            max_boxes,
            skip_background,
        })
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse(std::env::args().skip(1))?;
    let source = Source::from_dir(&args.dir, args.scale).context("Couldn't load frames")?;
    let frames = source
        .images()
        .map(PixelBuffer::from_rgb)
        .collect::<Result<Vec<_>>>()?;

    info!("Loaded {} frames from {}", frames.len(), args.dir);

    let results = perform_sessions(&frames, prepare_params_sets());
    let (params, stats, sets) = pick(results, args.max_boxes).context("No parameters to try")?;

    eprintln!("{:#?}", params);
    eprintln!("{:#?}", stats);
    eprintln!(
        "(mean {:.1} blocks per frame, {} recomputed, {} reused)",
        stats.mean_blocks(),
        stats.recomputed,
        stats.reused
    );

    let output: Vec<Value> = sets
        .iter()
        .zip(source.images().zip(source.canvases()))
        .map(|(set, (image, (cw, ch)))| {
            let sx = cw as f64 / image.width() as f64;
            let sy = ch as f64 / image.height() as f64;

            render(set, &args, sx, sy)
        })
        .collect();

    println!("{}", Value::Array(output));

    Ok(())
}

fn quality_scale(quality: &str) -> Result<f64> {
    Ok(match quality {
        "low" => 0.25,
        "med" => 0.125,
        "high" => 0.0625,
        "ultra" => 0.03125,
        _ => bail!("Unknown quality: {}", quality),
    })
}

fn prepare_params_sets() -> Vec<Params> {
    let mut params_sets = Vec::new();

    for &variance_threshold in &[5.0, 10.0, 20.0, 30.0, 45.0, 60.0] {
        for &min_leaf_size in &[1, 2, 4, 8, 20] {
            let params = Params::new(variance_threshold, min_leaf_size, 8, 10.0);

            if let Ok(params) = params {
                params_sets.push(params);
            }
        }
    }

    params_sets
}

fn perform_sessions(
    frames: &[PixelBuffer],
    params_sets: Vec<Params>,
) -> Vec<(Params, Stats, Vec<BlockSet>)> {
    let len = params_sets.len();

    params_sets
        .into_par_iter()
        .progress_count(len as u64)
        .filter_map(|params| match perform_session(frames, &params) {
            Ok((stats, sets)) => Some((params, stats, sets)),
            Err(err) => {
                warn!("Skipping {:?}: {:#}", params, err);
                None
            }
        })
        .collect()
}

fn perform_session(frames: &[PixelBuffer], params: &Params) -> Result<(Stats, Vec<BlockSet>)> {
    let mut session = Session::new(params);
    let mut sets = Vec::with_capacity(frames.len());

    for frame in frames {
        sets.push(session.add(frame.clone())?.clone());
    }

    Ok((session.finish(), sets))
}

/// Most detailed run whose busiest frame fits into `max_boxes`; with no
/// fit, the coarsest run, pruned later.
fn pick(
    results: Vec<(Params, Stats, Vec<BlockSet>)>,
    max_boxes: usize,
) -> Option<(Params, Stats, Vec<BlockSet>)> {
    let fits = |stats: &Stats| max_boxes == 0 || stats.max_blocks <= max_boxes;

    if results.iter().any(|(_, stats, _)| fits(stats)) {
        results
            .into_iter()
            .filter(|(_, stats, _)| fits(stats))
            .max_by_key(|(_, stats, _)| stats.blocks)
    } else {
        results
            .into_iter()
            .min_by_key(|(_, stats, _)| stats.max_blocks)
    }
}

fn render(set: &BlockSet, args: &Args, sx: f64, sy: f64) -> Value {
    let set = if args.max_boxes > 0 {
        set.largest(args.max_boxes)
    } else {
        set.clone()
    };

    let background = if args.skip_background {
        set.dominant_color()
    } else {
        None
    };

    let blocks = set
        .iter()
        .filter(|block| match background {
            Some(color) => !block.is_similar(color, BACKGROUND_SIMILARITY),
            None => true,
        })
        .map(|block| {
            let [x, y, w, h] = block.scaled(sx, sy);
            json!([x, y, w, h, block.hex()])
        })
        .collect();

    Value::Array(blocks)
}
