use crate::error::Result;
use crate::image::RasterImage;
use crate::mask::MaskSet;
use crate::portion::portions;

use super::config::StackOrdering;

/// Indices of `images` in stack order. Equal keys keep input order.
pub fn stack_order<M>(images: &[RasterImage], masks: &[M], ordering: &StackOrdering) -> Result<Vec<usize>>
where
    M: AsRef<MaskSet>,
{
    let mut order: Vec<usize> = (0..images.len()).collect();
    match ordering {
        StackOrdering::DateProximity { target } => {
            order.sort_by_key(|&i| (images[i].timestamp - *target).abs());
        }
        StackOrdering::RegionPortion { region } => {
            let cloudless = images
                .iter()
                .zip(masks)
                .map(|(image, m)| {
                    portions(image, m.as_ref(), Some(region))
                        .map(|p| p.effective_cloudless(image.variant))
                })
                .collect::<Result<Vec<f64>>>()?;
            order.sort_by(|&a, &b| cloudless[b].total_cmp(&cloudless[a]));
        }
        StackOrdering::CaptureOrder => {
            order.sort_by_key(|&i| images[i].timestamp);
        }
    }
    Ok(order)
}
