//! Conversion from application bitmaps into the controller's RAM layout.
//!
//! The controller stores each plane as rows of [ROW_BYTES] bytes, most significant bit first,
//! with inverted polarity: a `1` bit means "no mark". Source bitmaps use `BinaryColor::On` for
//! foreground pixels, which therefore become `0` bits.

use embedded_graphics::{
    image::GetPixel,
    pixelcolor::BinaryColor,
    prelude::{OriginDimensions, Point, Size},
};

use crate::{
    epd2in13b::{DISPLAY_HEIGHT, DISPLAY_WIDTH, FRAME_LENGTH, ROW_BYTES},
    error::ConvertError,
};

/// How a source bitmap is laid out relative to the controller's RAM.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The bitmap is [DISPLAY_WIDTH] wide and [DISPLAY_HEIGHT] tall, matching RAM rows.
    Native,
    /// The bitmap is [DISPLAY_HEIGHT] wide and [DISPLAY_WIDTH] tall, i.e. landscape, and is
    /// rotated by 90 degrees on conversion.
    Rotated,
}

impl Orientation {
    /// Classifies a bitmap size, or returns `None` if it fits neither orientation.
    pub fn of(size: Size) -> Option<Self> {
        if size == Self::Native.source_size() {
            Some(Self::Native)
        } else if size == Self::Rotated.source_size() {
            Some(Self::Rotated)
        } else {
            None
        }
    }

    /// The bitmap size expected for this orientation.
    pub const fn source_size(&self) -> Size {
        match self {
            Orientation::Native => Size::new(DISPLAY_WIDTH as u32, DISPLAY_HEIGHT as u32),
            Orientation::Rotated => Size::new(DISPLAY_HEIGHT as u32, DISPLAY_WIDTH as u32),
        }
    }
}

/// Converts a monochrome bitmap into a RAM image ready for
/// [Epd2In13b::paint](crate::epd2in13b::Epd2In13b::paint).
///
/// The bitmap must be either 104x212 or 212x104. Landscape bitmaps are rotated: RAM position
/// `(x, y)` takes the source pixel at `(212 - y, x)`. Source reads outside the bitmap count as
/// unset.
pub fn to_ram_format<B>(bitmap: &B) -> Result<[u8; FRAME_LENGTH], ConvertError>
where
    B: GetPixel<Color = BinaryColor> + OriginDimensions + ?Sized,
{
    let size = bitmap.size();
    let orientation = Orientation::of(size).ok_or(ConvertError::SizeMismatch {
        width: size.width,
        height: size.height,
    })?;

    let is_set = |x: i32, y: i32| bitmap.pixel(Point::new(x, y)) == Some(BinaryColor::On);

    let mut ram = [0u8; FRAME_LENGTH];
    for y in 0..DISPLAY_HEIGHT as usize {
        for x in 0..DISPLAY_WIDTH as usize {
            let set = match orientation {
                Orientation::Native => is_set(x as i32, y as i32),
                Orientation::Rotated => is_set(size.width as i32 - y as i32, x as i32),
            };
            if !set {
                ram[y * ROW_BYTES + x / 8] |= 1 << (7 - x % 8);
            }
        }
    }
    Ok(ram)
}

#[cfg(test)]
mod tests {
    use embedded_graphics::{
        image::ImageRaw,
        prelude::{DrawTarget, Primitive},
        primitives::{Line, PrimitiveStyle, Rectangle},
        Drawable, Pixel,
    };

    use super::*;
    use crate::buffer::{binary_buffer_length, BinaryBuffer};

    const NATIVE: Size = Size::new(DISPLAY_WIDTH as u32, DISPLAY_HEIGHT as u32);
    const ROTATED: Size = Size::new(DISPLAY_HEIGHT as u32, DISPLAY_WIDTH as u32);

    type NativeBitmap = BinaryBuffer<{ binary_buffer_length(NATIVE) }>;
    type RotatedBitmap = BinaryBuffer<{ binary_buffer_length(ROTATED) }>;

    #[test]
    fn test_orientation_of() {
        assert_eq!(Orientation::of(Size::new(104, 212)), Some(Orientation::Native));
        assert_eq!(Orientation::of(Size::new(212, 104)), Some(Orientation::Rotated));
        assert_eq!(Orientation::of(Size::new(104, 104)), None);
        assert_eq!(Orientation::of(Size::new(296, 128)), None);
    }

    #[test]
    fn test_output_length_for_both_orientations() {
        let native = to_ram_format(&NativeBitmap::new(NATIVE)).unwrap();
        let rotated = to_ram_format(&RotatedBitmap::new(ROTATED)).unwrap();
        assert_eq!(native.len(), FRAME_LENGTH);
        assert_eq!(rotated.len(), FRAME_LENGTH);
        assert_eq!(FRAME_LENGTH, 13 * 212);
    }

    #[test]
    fn test_size_mismatch() {
        const SIZE: Size = Size::new(128, 296);
        let bitmap = BinaryBuffer::<{ binary_buffer_length(SIZE) }>::new(SIZE);
        assert_eq!(
            to_ram_format(&bitmap),
            Err(ConvertError::SizeMismatch {
                width: 128,
                height: 296
            })
        );
    }

    #[test]
    fn test_polarity_is_inverted() {
        let mut bitmap = NativeBitmap::new(NATIVE);
        let all_clear = to_ram_format(&bitmap).unwrap();
        assert!(all_clear.iter().all(|&b| b == 0xFF));

        bitmap.clear(BinaryColor::On).unwrap();
        let all_set = to_ram_format(&bitmap).unwrap();
        assert!(all_set.iter().all(|&b| b == 0x00));
    }

    #[test]
    fn test_single_pixel_at_origin() {
        let mut bitmap = NativeBitmap::new(NATIVE);
        bitmap
            .draw_iter([Pixel(Point::zero(), BinaryColor::On)])
            .unwrap();

        let ram = to_ram_format(&bitmap).unwrap();
        assert_eq!(ram[0], 0x7F);
        assert!(ram[1..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_native_bit_order() {
        let mut bitmap = NativeBitmap::new(NATIVE);
        bitmap
            .draw_iter([
                Pixel(Point::new(9, 0), BinaryColor::On),
                Pixel(Point::new(103, 1), BinaryColor::On),
            ])
            .unwrap();

        let ram = to_ram_format(&bitmap).unwrap();
        assert_eq!(ram[1], 0b1011_1111);
        assert_eq!(ram[ROW_BYTES + 12], 0b1111_1110);
    }

    #[test]
    fn test_rotated_pixel_position() {
        let mut bitmap = RotatedBitmap::new(ROTATED);
        bitmap
            .draw_iter([Pixel(Point::new(211, 0), BinaryColor::On)])
            .unwrap();

        let ram = to_ram_format(&bitmap).unwrap();
        // Source (211, 0) lands at RAM (x = 0, y = 212 - 211).
        assert_eq!(ram[ROW_BYTES], 0x7F);
        assert_eq!(ram.iter().filter(|&&b| b != 0xFF).count(), 1);
    }

    #[test]
    fn test_rotated_never_reads_first_source_column() {
        let mut bitmap = RotatedBitmap::new(ROTATED);
        Line::new(Point::new(0, 0), Point::new(0, 103))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut bitmap)
            .unwrap();

        // RAM row 0 reads source column 212, which is out of bounds, and source column 0 would
        // need row 212. Neither exists, so the column is dropped.
        let ram = to_ram_format(&bitmap).unwrap();
        assert!(ram.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_rotation_matches_pre_rotated_bitmap() {
        let mut landscape = RotatedBitmap::new(ROTATED);
        Rectangle::new(Point::new(20, 10), Size::new(50, 30))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut landscape)
            .unwrap();
        Line::new(Point::new(1, 0), Point::new(211, 103))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut landscape)
            .unwrap();

        let mut portrait = NativeBitmap::new(NATIVE);
        for y in 1..DISPLAY_HEIGHT as i32 {
            for x in 0..DISPLAY_WIDTH as i32 {
                if landscape.pixel(Point::new(DISPLAY_HEIGHT as i32 - y, x))
                    == Some(BinaryColor::On)
                {
                    portrait
                        .draw_iter([Pixel(Point::new(x, y), BinaryColor::On)])
                        .unwrap();
                }
            }
        }

        assert_eq!(
            to_ram_format(&landscape).unwrap(),
            to_ram_format(&portrait).unwrap()
        );
    }

    #[test]
    fn test_accepts_image_raw() {
        // 104 pixels per row is exactly 13 bytes; set the first pixel of every row.
        let mut data = [0u8; FRAME_LENGTH];
        for row in data.chunks_mut(ROW_BYTES) {
            row[0] = 0x80;
        }
        let image = ImageRaw::<BinaryColor>::new(&data, DISPLAY_WIDTH as u32);

        let ram = to_ram_format(&image).unwrap();
        for row in ram.chunks(ROW_BYTES) {
            assert_eq!(row[0], 0x7F);
            assert!(row[1..].iter().all(|&b| b == 0xFF));
        }
    }
}
