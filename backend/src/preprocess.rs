use image::RgbImage;
use tract_onnx::prelude::tract_ndarray::Array4;

use crate::error::{ZoneError, ZoneResult};

pub const INPUT_SIZE: usize = 512;
pub const CHANNELS: usize = 3;
pub const INPUT_SHAPE: [usize; 4] = [1, INPUT_SIZE, INPUT_SIZE, CHANNELS];

/// `[1, 512, 512, 3]` float tensor in NHWC layout, raw 0..=255 pixel values.
#[derive(Debug, Clone)]
pub struct InputTensor(Array4<f32>);

impl InputTensor {
    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    pub fn as_array(&self) -> &Array4<f32> {
        &self.0
    }
}

impl TryFrom<Array4<f32>> for InputTensor {
    type Error = ZoneError;

    fn try_from(array: Array4<f32>) -> ZoneResult<Self> {
        if array.shape() != INPUT_SHAPE {
            return Err(ZoneError::decode(format!(
                "tensor shape {:?} does not match {:?}",
                array.shape(),
                INPUT_SHAPE
            )));
        }
        Ok(InputTensor(array))
    }
}

pub fn preprocess(bytes: &[u8]) -> ZoneResult<InputTensor> {
    let rgb = decode_rgb(bytes)?;
    InputTensor::try_from(resize_nearest_to_tensor(&rgb, INPUT_SIZE, INPUT_SIZE))
}

fn decode_rgb(bytes: &[u8]) -> ZoneResult<RgbImage> {
    let img = image::load_from_memory(bytes).map_err(|e| ZoneError::decode(e.to_string()))?;

    let channels = img.color().channel_count();
    if channels as usize != CHANNELS {
        return Err(ZoneError::decode(format!(
            "expected {CHANNELS} channels, image has {channels} ({:?})",
            img.color()
        )));
    }
    if img.width() == 0 || img.height() == 0 {
        return Err(ZoneError::decode("image has no pixels"));
    }
    Ok(img.to_rgb8())
}

/// Nearest-neighbor resample straight into the batch tensor. Source index is
/// `floor(dst * src / dst_len)`, no half-pixel offset, no blending.
fn resize_nearest_to_tensor(img: &RgbImage, out_h: usize, out_w: usize) -> Array4<f32> {
    let (in_w, in_h) = (img.width() as usize, img.height() as usize);

    Array4::from_shape_fn((1, out_h, out_w, CHANNELS), |(_, y, x, c)| {
        let sy = (y * in_h / out_h).min(in_h - 1);
        let sx = (x * in_w / out_w).min(in_w - 1);
        img.get_pixel(sx as u32, sy as u32)[c] as f32
    })
}
