//! Image transforms attachable to datasets and dataset splits.

use image::DynamicImage;
use image::imageops::FilterType;

use std::fmt;

/// A post-processing step applied to every image a dataset returns.
pub trait ImageTransform: fmt::Debug + Send + Sync {
    fn apply(&self, image: DynamicImage) -> DynamicImage;
}

/// Resizes to an exact size with bilinear filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resize {
    pub width: u32,
    pub height: u32,
}

impl ImageTransform for Resize {
    fn apply(&self, image: DynamicImage) -> DynamicImage {
        image.resize_exact(self.width, self.height, FilterType::Triangle)
    }
}

/// Crops the center region. Images smaller than the crop are returned whole
/// along the short dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenterCrop {
    pub width: u32,
    pub height: u32,
}

impl ImageTransform for CenterCrop {
    fn apply(&self, image: DynamicImage) -> DynamicImage {
        let width = self.width.min(image.width());
        let height = self.height.min(image.height());
        let x = (image.width() - width) / 2;
        let y = (image.height() - height) / 2;
        image.crop_imm(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
    }

    #[test]
    fn test_resize() {
        let out = Resize { width: 100, height: 66 }.apply(image(580, 326));
        assert_eq!((out.width(), out.height()), (100, 66));
    }

    #[test]
    fn test_center_crop() {
        let out = CenterCrop { width: 10, height: 10 }.apply(image(580, 326));
        assert_eq!((out.width(), out.height()), (10, 10));

        let small = CenterCrop { width: 10, height: 10 }.apply(image(4, 20));
        assert_eq!((small.width(), small.height()), (4, 10));
    }
}
