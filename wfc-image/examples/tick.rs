use meap::Parser;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use std::time::Duration;
use wfc_overlap_image::*;

struct Args {
    config: Config,
    seed: u64,
    input_image: image::DynamicImage,
    output_dir: String,
    tick_ms: u64,
    frame_every: usize,
}

impl Args {
    fn parser() -> impl Parser<Item = Self> {
        meap::let_map! {
            let {
                width = opt_opt("INT", 'x').name("width").desc("output width").with_default(48);
                height = opt_opt("INT", 'y').name("height").desc("output height").with_default(48);
                pattern_size = opt_opt("INT", 'p').name("pattern-size").desc("pattern size").with_default(3);
                seed_opt = opt_opt("INT", 's').name("seed").desc("rng seed");
                input_path = opt_req::<String, _>("PATH", 'i').name("input-path").desc("input path");
                output_dir = opt_req::<String, _>("PATH", 'o').name("output-dir").desc("directory to write frames to");
                all_orientations = flag('a').name("all-orientations").desc("include all orientations");
                ground = opt_opt("INT", 'g').name("ground").desc("pattern to pin to the bottom row").with_default(0);
                tick_ms = opt_opt("MS", 't').name("tick").desc("time budget of a single tick").with_default(22);
                frame_every = opt_opt("INT", 'f').name("frame-every").desc("ticks between saved frames").with_default(10);
            } in {
                Self {
                    config: Config {
                        pattern_size,
                        symmetry: if all_orientations {
                            Symmetry::All
                        } else {
                            Symmetry::None
                        },
                        output_width: width,
                        output_height: height,
                        ground,
                        ..Config::default()
                    },
                    seed: seed_opt.unwrap_or_else(|| rand::thread_rng().gen()),
                    input_image: image::open(input_path).unwrap(),
                    output_dir,
                    tick_ms,
                    frame_every,
                }
            }
        }
    }
}

fn app(args: Args) -> Result<(), ()> {
    println!("seed: {}", args.seed);
    let mut rng = XorShiftRng::seed_from_u64(args.seed);
    let image_patterns =
        ImagePatterns::new(&args.input_image, &args.config).map_err(|e| eprintln!("{}", e))?;
    let tick_config = TickConfig {
        target: Duration::from_millis(args.tick_ms),
        ..TickConfig::default()
    };
    let mut run = Run::with_tick_config(image_patterns.model(), tick_config);
    let frame_every = args.frame_every.max(1);
    let mut num_ticks = 0;
    let mut num_frames = 0;
    let mut save_frame = |wave: &Wave| {
        let path = format!("{}/frame-{:05}.png", args.output_dir, num_frames);
        num_frames += 1;
        image_patterns
            .image_from_wave(wave)
            .save(path)
            .map_err(|e| eprintln!("{}", e))
    };
    loop {
        match run.tick(&mut rng) {
            Status::InProgress(_) => (),
            Status::Contradiction => println!("contradiction; restarting (attempt {})", run.attempts()),
            Status::Done => break,
            Status::Cancelled => return Err(()),
        }
        num_ticks += 1;
        if num_ticks % frame_every == 0 {
            save_frame(run.wave())?;
        }
    }
    save_frame(run.wave())?;
    println!(
        "done after {} ticks and {} attempts; {} propagation steps per tick",
        num_ticks,
        run.attempts(),
        run.propagation_steps_per_tick()
    );
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parser().with_help_default().parse_env_or_exit();
    ::std::process::exit(match app(args) {
        Ok(()) => 0,
        Err(()) => 1,
    })
}
