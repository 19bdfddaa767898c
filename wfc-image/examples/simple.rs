use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::convert::TryFrom;
use wfc_overlap_image::*;

fn app() -> Result<(), ()> {
    let (
        seed_opt,
        input_path,
        output_path,
        symmetry,
        pattern_size,
        width,
        height,
        bounded_input,
        bounded_output,
        parallel,
    ) = meap::all! {
        opt_opt("INT", 's').name("seed").desc("rng seed"),
        opt_req::<String, _>("PATH", 'i').name("input").desc("input path"),
        opt_req::<String, _>("PATH", 'o').name("output").desc("output path"),
        opt_opt::<u32, _>("INT", 'm').name("symmetry").desc("number of orientations (1, 2 or 8)").with_default(8),
        opt_opt::<u32, _>("INT", 'p').name("pattern-size").desc("size of patterns in pixels").with_default(3),
        opt_opt::<u32, _>("INT", 'x').name("width").desc("width").with_default(48),
        opt_opt::<u32, _>("INT", 'y').name("height").desc("height").with_default(48),
        flag("bounded-input").desc("don't sample windows that wrap around the input"),
        flag("bounded-output").desc("don't wrap the output around its edges"),
        flag("parallel").desc("run multiple attempts in parallel"),
    }
    .with_help_default()
    .parse_env_or_exit();
    env_logger::init();
    let seed = seed_opt.unwrap_or_else(|| rand::thread_rng().gen());
    println!("seed: {}", seed);
    let symmetry = Symmetry::try_from(symmetry).map_err(|e| eprintln!("{}", e))?;
    let config = Config {
        pattern_size,
        periodic_input: !bounded_input,
        symmetry,
        periodic_output: !bounded_output,
        output_width: width,
        output_height: height,
        ..Config::default()
    };
    let input_image = image::open(input_path).map_err(|e| eprintln!("{}", e))?;
    let mut rng = StdRng::seed_from_u64(seed);
    let start_time = ::std::time::Instant::now();
    let result = if parallel {
        #[cfg(feature = "parallel")]
        {
            generate_image_with_rng(&input_image, &config, retry::ParNumTimes(10), &mut rng)
        }
        #[cfg(not(feature = "parallel"))]
        panic!("Recompile with `--features=parallel` to enable parallel retry")
    } else {
        generate_image_with_rng(&input_image, &config, retry::NumTimes(10), &mut rng)
    };
    match result {
        Err(e) => {
            eprintln!("{}", e);
            Err(())
        }
        Ok(Err(_)) => {
            eprintln!("Too many contradictions");
            Err(())
        }
        Ok(Ok(output_image)) => {
            let end_time = ::std::time::Instant::now();
            println!("{:?}", end_time - start_time);
            output_image.save(output_path).map_err(|e| eprintln!("{}", e))
        }
    }
}

fn main() {
    ::std::process::exit(match app() {
        Ok(()) => 0,
        Err(()) => 1,
    })
}
