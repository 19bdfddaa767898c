extern crate image;
extern crate wfc_overlap_image;

use wfc_overlap_image::*;

fn main() {
    let args = ::std::env::args().collect::<Vec<_>>();
    if args.len() != 3 {
        println!("usage: {} INPUT_PATH OUTPUT_PATH", args[0]);
        ::std::process::exit(1);
    }
    let input_path = &args[1];
    let output_path = &args[2];
    let input_image = image::open(input_path).unwrap();
    let config = Config {
        symmetry: Symmetry::None,
        ..Config::default()
    };
    let output_image = wfc_overlap_image::generate_image(&input_image, &config, retry::NumTimes(10))
        .expect("Invalid configuration")
        .expect("Too many contradictions");
    output_image.save(output_path).expect("Failed to save");
}
