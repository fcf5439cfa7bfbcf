//! Typed n-dimensional image arrays.

use ndarray::ArrayD;

/// Image pixels stored with their native element type.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    /// 8-bit unsigned
    U8(ArrayD<u8>),
    /// 16-bit unsigned
    U16(ArrayD<u16>),
    /// 16-bit signed (e.g. CT Hounsfield units)
    I16(ArrayD<i16>),
    /// 32-bit signed
    I32(ArrayD<i32>),
    /// 32-bit float
    F32(ArrayD<f32>),
    /// 64-bit float
    F64(ArrayD<f64>),
}

/// Run an expression against the inner array, whatever its element type.
macro_rules! with_array {
    ($data:expr, $arr:ident => $body:expr) => {
        match $data {
            $crate::data::ImageData::U8($arr) => $body,
            $crate::data::ImageData::U16($arr) => $body,
            $crate::data::ImageData::I16($arr) => $body,
            $crate::data::ImageData::I32($arr) => $body,
            $crate::data::ImageData::F32($arr) => $body,
            $crate::data::ImageData::F64($arr) => $body,
        }
    };
}

pub(crate) use with_array;

impl ImageData {
    /// Array shape.
    pub fn shape(&self) -> &[usize] {
        with_array!(self, arr => arr.shape())
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        with_array!(self, arr => arr.ndim())
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        with_array!(self, arr => arr.len())
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// NumPy-style name of the element type.
    pub fn dtype(&self) -> &'static str {
        match self {
            ImageData::U8(_) => "uint8",
            ImageData::U16(_) => "uint16",
            ImageData::I16(_) => "int16",
            ImageData::I32(_) => "int32",
            ImageData::F32(_) => "float32",
            ImageData::F64(_) => "float64",
        }
    }

    /// Convert to floating point the way `img_as_float` does.
    ///
    /// Unsigned integers map to 0.0-1.0, signed integers to -1.0-1.0 and
    /// floats are passed through unchanged.
    pub fn to_float(&self) -> ArrayD<f32> {
        with_array!(self, arr => arr.mapv(PixelValue::to_unit_f32))
    }

    /// Cast every value to `f32` without rescaling.
    pub fn to_f32(&self) -> ArrayD<f32> {
        with_array!(self, arr => arr.mapv(PixelValue::to_f32))
    }
}

macro_rules! impl_from_array {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<ArrayD<$ty>> for ImageData {
                fn from(array: ArrayD<$ty>) -> Self {
                    ImageData::$variant(array)
                }
            }
        )*
    };
}

impl_from_array!(u8 => U8, u16 => U16, i16 => I16, i32 => I32, f32 => F32, f64 => F64);

/// Conversions of a pixel element type to floating point.
pub trait PixelValue: Copy {
    /// Scale to 0.0-1.0 (unsigned) or -1.0-1.0 (signed); floats unchanged.
    fn to_unit_f32(self) -> f32;

    /// Plain numeric cast.
    fn to_f32(self) -> f32;
}

impl PixelValue for u8 {
    fn to_f32(self) -> f32 {
        f32::from(self)
    }

    fn to_unit_f32(self) -> f32 {
        f32::from(self) / 255.0
    }
}

impl PixelValue for u16 {
    fn to_f32(self) -> f32 {
        f32::from(self)
    }

    fn to_unit_f32(self) -> f32 {
        f32::from(self) / 65535.0
    }
}

impl PixelValue for i16 {
    fn to_f32(self) -> f32 {
        f32::from(self)
    }

    fn to_unit_f32(self) -> f32 {
        (f32::from(self) / f32::from(i16::MAX)).max(-1.0)
    }
}

impl PixelValue for i32 {
    fn to_f32(self) -> f32 {
        self as f32
    }

    fn to_unit_f32(self) -> f32 {
        (f64::from(self) / f64::from(i32::MAX)).max(-1.0) as f32
    }
}

impl PixelValue for f32 {
    fn to_f32(self) -> f32 {
        self
    }

    fn to_unit_f32(self) -> f32 {
        self
    }
}

impl PixelValue for f64 {
    fn to_f32(self) -> f32 {
        self as f32
    }

    fn to_unit_f32(self) -> f32 {
        self as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn test_unit_float_unsigned() {
        assert!((0u8.to_unit_f32() - 0.0).abs() < f32::EPSILON);
        assert!((255u8.to_unit_f32() - 1.0).abs() < f32::EPSILON);
        assert!((65535u16.to_unit_f32() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unit_float_signed() {
        assert!((i16::MAX.to_unit_f32() - 1.0).abs() < f32::EPSILON);
        assert!((i16::MIN.to_unit_f32() + 1.0).abs() < f32::EPSILON);
        assert!((i32::MIN.to_unit_f32() + 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_to_float_keeps_shape() {
        let data = ImageData::from(ArrayD::<u8>::from_elem(IxDyn(&[2, 3, 4]), 51));
        let float = data.to_float();

        assert_eq!(float.shape(), &[2, 3, 4]);
        assert!(float.iter().all(|v| (v - 0.2).abs() < 1e-6));
        assert_eq!(data.dtype(), "uint8");
        assert_eq!(data.ndim(), 3);
        assert_eq!(data.len(), 24);
    }

    #[test]
    fn test_float_passthrough() {
        let data = ImageData::from(ArrayD::<f64>::from_elem(IxDyn(&[2]), 1500.0));
        assert_eq!(data.to_float()[[0]], 1500.0);
    }
}
