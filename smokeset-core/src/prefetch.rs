// ============================================================================
// smokeset-core/src/prefetch.rs
// ============================================================================
//
// PREFETCH: Parallel Local Copies of Dataset Images
//
// Training reads every image many times. Prefetching copies the images of a
// dataset to a local directory once, shrinking large ones on the way, and
// hands back the same dataset pointed at the copies.
//
// KEY COMPONENTS:
// - parallel_map: runs a fallible function over items on a bounded pool
// - prefetch: resizes or copies every image of a dataset

use crate::dataset::WildfireDataset;
use crate::error::{CoreError, CoreResult};

use image::imageops::FilterType;
use log::{debug, info};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Applies `f` to every item on a pool of `num_threads` workers.
///
/// `None` uses one worker per CPU. Results come back in input order; the
/// first error aborts the whole call.
pub fn parallel_map<T, R, F>(items: &[T], num_threads: Option<usize>, f: F) -> CoreResult<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> CoreResult<R> + Sync + Send,
{
    let pool = ThreadPoolBuilder::new()
        .num_threads(num_threads.unwrap_or(0))
        .build()
        .map_err(|e| CoreError::OperationFailed(format!("Failed to start worker pool: {}", e)))?;

    pool.install(|| items.par_iter().map(&f).collect())
}

/// Copies the images of `dataset` into `dest_dir`.
///
/// Images whose sides both exceed `max_size` are resized so the shorter side
/// becomes `max_size`, keeping the aspect ratio; the rest are copied as is.
/// Returns the dataset reading from `dest_dir`.
pub fn prefetch(
    dataset: &WildfireDataset,
    dest_dir: &Path,
    max_size: u32,
    num_threads: Option<usize>,
) -> CoreResult<WildfireDataset> {
    if max_size == 0 {
        return Err(CoreError::Configuration(
            "Prefetch max size must be positive".to_string(),
        ));
    }
    fs::create_dir_all(dest_dir)?;

    // Rows sharing an image file are fetched once
    let mut seen = HashSet::new();
    let mut indices = Vec::new();
    for index in 0..dataset.len() {
        if seen.insert(dataset.image_file(index)?) {
            indices.push(index);
        }
    }

    let resized = parallel_map(&indices, num_threads, |&index| {
        let source = dataset.image_path(index)?;
        let target = dest_dir.join(dataset.image_file(index)?);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fetch_image(&source, &target, max_size)
    })?;

    info!(
        "Prefetched {} images to {} ({} resized)",
        indices.len(),
        dest_dir.display(),
        resized.iter().filter(|&&r| r).count()
    );
    Ok(dataset.clone().with_frames_dir(dest_dir))
}

/// Returns whether the image was resized rather than copied.
fn fetch_image(source: &Path, target: &Path, max_size: u32) -> CoreResult<bool> {
    let (width, height) = image::image_dimensions(source)?;
    if width <= max_size || height <= max_size {
        fs::copy(source, target)?;
        return Ok(false);
    }

    let (new_width, new_height) = scaled_size(width, height, max_size);
    debug!(
        "Resizing {} from {}x{} to {}x{}",
        source.display(),
        width,
        height,
        new_width,
        new_height
    );
    image::open(source)?
        .resize_exact(new_width, new_height, FilterType::Triangle)
        .save(target)?;
    Ok(true)
}

/// Size with the shorter side set to `max_size`.
fn scaled_size(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    let scale = max_size as f64 / width.min(height) as f64;
    let scale_side = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    if width <= height {
        (max_size, scale_side(height))
    } else {
        (scale_side(width), max_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn test_parallel_map_keeps_order() {
        let items: Vec<u32> = (0..100).collect();
        let doubled = parallel_map(&items, Some(4), |&x| Ok(x * 2)).unwrap();
        assert_eq!(doubled, (0..100).map(|x| x * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_parallel_map_propagates_errors() {
        let items: Vec<u32> = (0..10).collect();
        let result: CoreResult<Vec<u32>> = parallel_map(&items, Some(2), |&x| {
            if x == 7 {
                Err(CoreError::OperationFailed("seven".to_string()))
            } else {
                Ok(x)
            }
        });
        assert!(matches!(result, Err(CoreError::OperationFailed(_))));
    }

    #[test]
    fn test_scaled_size() {
        assert_eq!(scaled_size(580, 326, 100), (178, 100));
        assert_eq!(scaled_size(326, 580, 100), (100, 178));
        assert_eq!(scaled_size(200, 200, 50), (50, 50));
    }

    #[test]
    fn test_prefetch_resizes_large_and_copies_small() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        RgbImage::from_pixel(580, 326, Rgb([1, 2, 3]))
            .save(source.path().join("large.png"))
            .unwrap();
        RgbImage::from_pixel(580, 64, Rgb([1, 2, 3]))
            .save(source.path().join("wide.png"))
            .unwrap();

        let metadata = Table::from_reader("imgFile,fire\nlarge.png,1\nwide.png,0\n".as_bytes()).unwrap();
        let dataset = WildfireDataset::from_table(metadata, source.path()).unwrap();

        let fetched = prefetch(&dataset, dest.path(), 100, Some(2)).unwrap();
        assert_eq!(fetched.frames_dir(), dest.path());
        assert_eq!(fetched.len(), 2);

        assert_eq!(image::image_dimensions(dest.path().join("large.png")).unwrap(), (178, 100));
        assert_eq!(image::image_dimensions(dest.path().join("wide.png")).unwrap(), (580, 64));
        assert_eq!(
            fs::read(source.path().join("wide.png")).unwrap(),
            fs::read(dest.path().join("wide.png")).unwrap()
        );
    }

    #[test]
    fn test_prefetch_missing_image_fails() {
        let dest = tempdir().unwrap();
        let metadata = Table::from_reader("imgFile,fire\nmissing.png,1\n".as_bytes()).unwrap();
        let dataset = WildfireDataset::from_table(metadata, dest.path().join("nowhere")).unwrap();
        assert!(prefetch(&dataset, dest.path(), 100, None).is_err());
    }

    #[test]
    fn test_prefetch_fetches_shared_images_once() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        RgbImage::from_pixel(580, 326, Rgb([9, 9, 9]))
            .save(source.path().join("0_frame10.png"))
            .unwrap();

        let metadata = Table::from_reader(
            "imgFile,fire\n0_frame10.png,0\n0_frame10.png,1\n".as_bytes(),
        )
        .unwrap();
        let dataset = WildfireDataset::from_table(metadata, source.path()).unwrap();

        let fetched = prefetch(&dataset, dest.path(), 100, Some(4)).unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(
            image::image_dimensions(dest.path().join("0_frame10.png")).unwrap(),
            (178, 100)
        );
        assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 1);
    }
}
