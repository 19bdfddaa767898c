extern crate coord_2d;
extern crate image;
extern crate rand;
extern crate wfc_overlap;

use coord_2d::Coord;
pub use coord_2d::Size;
use image::{DynamicImage, Rgba, RgbaImage};
use log::debug;
use rand::Rng;
use wfc_overlap::bitmap::unpack_rgba;
pub use wfc_overlap::orientation::{self, Orientation, Symmetry};
use wfc_overlap::wrap::Wrap;
use wfc_overlap::Result;
pub use wfc_overlap::{
    Bitmap, Config, Error, Model, PatternId, PropagateError, Run, Status, TickConfig, Wave,
    WaveCellRef,
};

pub mod retry {
    #[cfg(feature = "parallel")]
    pub use wfc_overlap::retry::ParNumTimes;
    pub use wfc_overlap::retry::Retry;
    pub use wfc_overlap::retry::{Forever, NumTimes};

    pub trait ImageRetry: Retry {
        type ImageReturn;
        #[doc(hidden)]
        fn image_return(
            r: Self::Return,
            image_patterns: &super::ImagePatterns,
        ) -> Self::ImageReturn;
    }
}

/// Converts a decoded image into the solver's source bitmap.
pub fn bitmap_from_image(image: &DynamicImage) -> Result<Bitmap> {
    let rgba_image = image.to_rgba8();
    Bitmap::from_rgba_bytes(rgba_image.width(), rgba_image.height(), rgba_image.as_raw())
}

pub struct ImagePatterns {
    model: Model,
    empty_colour: Rgba<u8>,
}

impl ImagePatterns {
    pub fn new(image: &DynamicImage, config: &Config) -> Result<Self> {
        let bitmap = bitmap_from_image(image)?;
        let model = Model::new(&bitmap, config)?;
        debug!(
            "{} patterns over {} colours",
            model.num_patterns(),
            model.palette().len()
        );
        Ok(Self::from_model(model))
    }

    pub fn from_model(model: Model) -> Self {
        Self {
            model,
            empty_colour: Rgba([0, 0, 0, 0]),
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn set_empty_colour(&mut self, empty_colour: Rgba<u8>) {
        self.empty_colour = empty_colour;
    }

    /// The cell whose pattern covers `coord`, and the position of `coord` inside that pattern.
    /// Outside the last `pattern_size - 1` rows and columns of a bounded wave this is the cell
    /// itself at local position (0, 0).
    fn covering_cell(&self, wave: &Wave, coord: Coord) -> (Coord, Coord) {
        let size = wave.size();
        let pattern_size = self.model.catalog().pattern_size() as i32;
        match wave.wrap() {
            Wrap::WrapXY => (coord, Coord::new(0, 0)),
            Wrap::WrapNone => {
                let anchor = Coord::new(
                    coord.x.min(size.width() as i32 - pattern_size).max(0),
                    coord.y.min(size.height() as i32 - pattern_size).max(0),
                );
                (anchor, coord - anchor)
            }
        }
    }

    /// The colour of a single output pixel: the colour its covering pattern has there if that
    /// pattern is decided, the weighted average over the possible patterns if not, and the
    /// empty colour if there are none.
    pub fn cell_colour(&self, wave: &Wave, coord: Coord) -> Rgba<u8> {
        let (anchor, local) = self.covering_cell(wave, coord);
        let cell = self
            .model
            .wave_cell_ref(wave.cell(wave.index_of_coord(anchor)));
        self.weighted_average_colour_at(&cell, local)
    }

    pub fn image_from_wave(&self, wave: &Wave) -> DynamicImage {
        let size = wave.size();
        let mut rgba_image = RgbaImage::new(size.width(), size.height());
        wave.grid().enumerate().for_each(|(coord, _)| {
            let colour = self.cell_colour(wave, coord);
            rgba_image.put_pixel(coord.x as u32, coord.y as u32, colour);
        });
        DynamicImage::ImageRgba8(rgba_image)
    }

    pub fn weighted_average_colour(&self, cell: &WaveCellRef) -> Rgba<u8> {
        self.weighted_average_colour_at(cell, Coord::new(0, 0))
    }

    fn pattern_colour_at(&self, pattern_id: PatternId, local: Coord) -> [u8; 4] {
        let colour_id = self.model.pattern(pattern_id).get(local);
        unpack_rgba(self.model.palette().colour(colour_id))
    }

    fn weighted_average_colour_at(&self, cell: &WaveCellRef, local: Coord) -> Rgba<u8> {
        if let Ok(pattern_id) = cell.chosen_pattern_id() {
            return Rgba(self.pattern_colour_at(pattern_id, local));
        }
        let mut total_weight = 0u64;
        let mut sums = [0u64; 4];
        for (pattern_id, weight) in cell.enumerate_compatible_pattern_weights() {
            let colour = self.pattern_colour_at(pattern_id, local);
            for (sum, channel) in sums.iter_mut().zip(colour.iter()) {
                *sum += *channel as u64 * weight as u64;
            }
            total_weight += weight as u64;
        }
        if total_weight == 0 {
            return self.empty_colour;
        }
        Rgba(sums.map(|sum| (sum / total_weight) as u8))
    }

    pub fn collapse_wave_retrying<RT, R>(&self, retry: RT, rng: &mut R) -> RT::Return
    where
        RT: retry::Retry,
        R: Rng,
    {
        Run::new(&self.model).collapse_retrying(retry, rng)
    }
}

impl retry::ImageRetry for retry::Forever {
    type ImageReturn = DynamicImage;
    fn image_return(
        r: Self::Return,
        image_patterns: &ImagePatterns,
    ) -> Self::ImageReturn {
        image_patterns.image_from_wave(&r)
    }
}

impl retry::ImageRetry for retry::NumTimes {
    type ImageReturn = std::result::Result<DynamicImage, PropagateError>;
    fn image_return(
        r: Self::Return,
        image_patterns: &ImagePatterns,
    ) -> Self::ImageReturn {
        match r {
            Ok(r) => Ok(image_patterns.image_from_wave(&r)),
            Err(e) => Err(e),
        }
    }
}

#[cfg(feature = "parallel")]
impl retry::ImageRetry for retry::ParNumTimes {
    type ImageReturn = std::result::Result<DynamicImage, PropagateError>;
    fn image_return(
        r: Self::Return,
        image_patterns: &ImagePatterns,
    ) -> Self::ImageReturn {
        match r {
            Ok(r) => Ok(image_patterns.image_from_wave(&r)),
            Err(e) => Err(e),
        }
    }
}

pub fn generate_image_with_rng<IR, R>(
    image: &DynamicImage,
    config: &Config,
    retry: IR,
    rng: &mut R,
) -> Result<IR::ImageReturn>
where
    IR: retry::ImageRetry,
    R: Rng,
{
    let image_patterns = ImagePatterns::new(image, config)?;
    Ok(IR::image_return(
        image_patterns.collapse_wave_retrying(retry, rng),
        &image_patterns,
    ))
}

pub fn generate_image<IR>(
    image: &DynamicImage,
    config: &Config,
    retry: IR,
) -> Result<IR::ImageReturn>
where
    IR: retry::ImageRetry,
{
    generate_image_with_rng(image, config, retry, &mut rand::thread_rng())
}
