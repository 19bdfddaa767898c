use meap::Parser;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use wfc_overlap_image::retry::NumTimes;
use wfc_overlap_image::*;

struct Args {
    output_size: Size,
    pattern_size: u32,
    seed: u64,
    input_image: image::DynamicImage,
    output_path: String,
    symmetry: Symmetry,
    retries: usize,
    ground: i32,
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
                output_path = opt_req::<String, _>("PATH", 'o').name("output-path").desc("output path");
                all_orientations = flag('a').name("all-orientations").desc("include all orientations");
                retries = opt_opt("INT", 'r').name("retries").desc("number of retries").with_default(10);
                ground = opt_opt("INT", 'g').name("ground").desc("pattern to pin to the bottom row (negative counts from the end)").with_default(-1);
            } in {
                Self {
                    output_size: Size::new(width, height),
                    pattern_size,
                    seed: seed_opt.unwrap_or_else(|| rand::thread_rng().gen()),
                    input_image: image::open(input_path).unwrap(),
                    output_path,
                    symmetry: if all_orientations {
                        Symmetry::All
                    } else {
                        Symmetry::None
                    },
                    retries,
                    ground,
                }
            }
        }
    }
}

fn app(args: Args) -> Result<(), ()> {
    println!("{}", args.seed);
    let mut rng = XorShiftRng::seed_from_u64(args.seed);
    let config = Config {
        pattern_size: args.pattern_size,
        symmetry: args.symmetry,
        output_width: args.output_size.width(),
        output_height: args.output_size.height(),
        ground: args.ground,
        ..Config::default()
    };
    let image_patterns =
        ImagePatterns::new(&args.input_image, &config).map_err(|e| eprintln!("{}", e))?;
    let model = image_patterns.model();
    let ground_pattern_id =
        wfc_overlap::ground::ground_pattern_id(args.ground, model.num_patterns());
    println!(
        "{} patterns, ground pattern {:?}",
        model.num_patterns(),
        ground_pattern_id
    );
    let run = Run::new(model);
    match run.collapse_retrying(NumTimes(args.retries), &mut rng) {
        Err(_) => {
            eprintln!("Too many contradictions!");
            Err(())
        }
        Ok(wave) => {
            debug_assert!(model.wave_is_consistent(&wave));
            image_patterns
                .image_from_wave(&wave)
                .save(args.output_path)
                .map_err(|e| eprintln!("{}", e))
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parser().with_help_default().parse_env_or_exit();
    ::std::process::exit(match app(args) {
        Ok(()) => 0,
        Err(()) => 1,
    })
}
