use core::convert::Infallible;

use embedded_graphics::{
    image::GetPixel,
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, OriginDimensions, Point, Size},
    Pixel,
};

/// A compact buffer for storing binary coloured bitmaps, e.g. a rendered black or red layer.
///
/// Each byte holds 8 pixels, most significant bit first. Rows are padded to a whole number of
/// bytes, so any width is supported. `BinaryColor::On` marks a set (foreground) pixel.
pub struct BinaryBuffer<const L: usize> {
    size: Size,
    bytes_per_row: usize,
    data: [u8; L],
}

/// Computes the correct size for the binary buffer based on the given dimensions.
pub const fn binary_buffer_length(size: Size) -> usize {
    (size.width as usize).div_ceil(8) * size.height as usize
}

/// Splits a 16-bit value into the two bytes the controller expects, low byte first.
pub(crate) const fn split_low_and_high(value: u16) -> (u8, u8) {
    let [low, high] = value.to_le_bytes();
    (low, high)
}

impl<const L: usize> BinaryBuffer<L> {
    /// Creates a new [BinaryBuffer] with all pixels set to `BinaryColor::Off`.
    ///
    /// The dimensions must match the buffer length `L`.
    ///
    /// ```
    /// use embedded_graphics::prelude::Size;
    /// use epd2in13b_async::buffer::{binary_buffer_length, BinaryBuffer};
    ///
    /// const DIMENSIONS: Size = Size::new(212, 104);
    /// let buffer = BinaryBuffer::<{ binary_buffer_length(DIMENSIONS) }>::new(DIMENSIONS);
    /// ```
    pub fn new(dimensions: Size) -> Self {
        debug_assert_eq!(
            binary_buffer_length(dimensions),
            L,
            "Size must match given dimensions"
        );
        Self {
            bytes_per_row: (dimensions.width as usize).div_ceil(8),
            size: dimensions,
            data: [0; L],
        }
    }

    /// Access the packed buffer data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn index_of(&self, point: Point) -> Option<(usize, u8)> {
        if point.x < 0
            || point.x >= self.size.width as i32
            || point.y < 0
            || point.y >= self.size.height as i32
        {
            return None;
        }
        let byte_index = (point.x as usize) / 8 + (point.y as usize * self.bytes_per_row);
        let mask = 0x80 >> ((point.x as usize) % 8);
        Some((byte_index, mask))
    }
}

impl<const L: usize> OriginDimensions for BinaryBuffer<L> {
    fn size(&self) -> Size {
        self.size
    }
}

impl<const L: usize> DrawTarget for BinaryBuffer<L> {
    type Color = BinaryColor;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels.into_iter() {
            let Some((byte_index, mask)) = self.index_of(point) else {
                continue; // Skip out-of-bounds pixels
            };

            if color == BinaryColor::On {
                self.data[byte_index] |= mask;
            } else {
                self.data[byte_index] &= !mask;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        // Padding bits are never read, so whole bytes can be filled.
        let fill = match color {
            BinaryColor::On => 0xFF,
            BinaryColor::Off => 0x00,
        };
        self.data.fill(fill);
        Ok(())
    }
}

impl<const L: usize> GetPixel for BinaryBuffer<L> {
    type Color = BinaryColor;

    fn pixel(&self, point: Point) -> Option<Self::Color> {
        let (byte_index, mask) = self.index_of(point)?;
        Some(BinaryColor::from(self.data[byte_index] & mask != 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::{
        prelude::Primitive,
        primitives::{PrimitiveStyle, Rectangle},
        Drawable,
    };

    #[test]
    fn test_binary_buffer_length_rounds_rows_up() {
        assert_eq!(binary_buffer_length(Size::new(16, 4)), 8);
        assert_eq!(binary_buffer_length(Size::new(12, 4)), 8);
        assert_eq!(binary_buffer_length(Size::new(104, 212)), 13 * 212);
        assert_eq!(binary_buffer_length(Size::new(212, 104)), 27 * 104);
    }

    #[test]
    fn test_binary_buffer_draw_iter_singles() {
        const SIZE: Size = Size::new(12, 4);
        const BUFFER_LENGTH: usize = binary_buffer_length(SIZE);
        let mut buffer = BinaryBuffer::<{ BUFFER_LENGTH }>::new(SIZE);

        // Draw a pixel at the beginning.
        buffer
            .draw_iter([Pixel(Point::new(0, 0), BinaryColor::On)])
            .unwrap();
        assert_eq!(buffer.data[0], 0b10000000);

        // Draw a pixel in the padded byte of a middle row.
        buffer
            .draw_iter([Pixel(Point::new(10, 2), BinaryColor::On)])
            .unwrap();
        assert_eq!(buffer.data[5], 0b00100000);

        // Draw a pixel at the end.
        buffer
            .draw_iter([Pixel(Point::new(11, 3), BinaryColor::On)])
            .unwrap();
        assert_eq!(buffer.data[7], 0b00010000);
    }

    #[test]
    fn test_binary_buffer_draw_iter_multiple() {
        const SIZE: Size = Size::new(16, 4);
        const BUFFER_LENGTH: usize = binary_buffer_length(SIZE);
        let mut buffer = BinaryBuffer::<{ BUFFER_LENGTH }>::new(SIZE);

        buffer
            .draw_iter([
                Pixel(Point::new(1, 0), BinaryColor::On),
                Pixel(Point::new(2, 0), BinaryColor::On),
                Pixel(Point::new(3, 0), BinaryColor::On),
                Pixel(Point::new(2, 0), BinaryColor::Off),
                Pixel(Point::new(1, 1), BinaryColor::On),
            ])
            .unwrap();

        assert_eq!(buffer.data[0], 0b01010000);
        assert_eq!(buffer.data[2], 0b01000000);
    }

    #[test]
    fn test_binary_buffer_draw_iter_out_of_bounds() {
        const SIZE: Size = Size::new(12, 4);
        const BUFFER_LENGTH: usize = binary_buffer_length(SIZE);
        let mut buffer = BinaryBuffer::<{ BUFFER_LENGTH }>::new(SIZE);
        let previous_data = buffer.data;

        buffer
            .draw_iter([
                Pixel(Point::new(-1, 0), BinaryColor::On),
                Pixel(Point::new(0, -1), BinaryColor::On),
                // Lands in row padding; must not be written.
                Pixel(Point::new(12, 0), BinaryColor::On),
                Pixel(Point::new(0, 4), BinaryColor::On),
            ])
            .unwrap();

        assert_eq!(
            buffer.data, previous_data,
            "Data should not change when drawing out-of-bounds pixels."
        );
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic]
    fn test_binary_buffer_size_must_match_dimensions() {
        let _ = BinaryBuffer::<16>::new(Size::new(16, 10));
    }

    #[test]
    fn test_binary_buffer_get_pixel() {
        const SIZE: Size = Size::new(12, 4);
        const BUFFER_LENGTH: usize = binary_buffer_length(SIZE);
        let mut buffer = BinaryBuffer::<{ BUFFER_LENGTH }>::new(SIZE);

        Rectangle::new(Point::new(9, 1), Size::new(2, 2))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut buffer)
            .unwrap();

        assert_eq!(buffer.pixel(Point::new(9, 1)), Some(BinaryColor::On));
        assert_eq!(buffer.pixel(Point::new(10, 2)), Some(BinaryColor::On));
        assert_eq!(buffer.pixel(Point::new(8, 1)), Some(BinaryColor::Off));
        assert_eq!(buffer.pixel(Point::new(11, 3)), Some(BinaryColor::Off));
        assert_eq!(buffer.pixel(Point::new(12, 0)), None);
        assert_eq!(buffer.pixel(Point::new(0, -1)), None);
    }

    #[test]
    fn test_binary_buffer_clear() {
        const SIZE: Size = Size::new(12, 2);
        const BUFFER_LENGTH: usize = binary_buffer_length(SIZE);
        let mut buffer = BinaryBuffer::<{ BUFFER_LENGTH }>::new(SIZE);

        buffer.clear(BinaryColor::On).unwrap();
        assert_eq!(buffer.data(), &[0xFF; 4]);
        assert_eq!(buffer.pixel(Point::new(11, 1)), Some(BinaryColor::On));

        buffer.clear(BinaryColor::Off).unwrap();
        assert_eq!(buffer.data(), &[0x00; 4]);
    }
}
