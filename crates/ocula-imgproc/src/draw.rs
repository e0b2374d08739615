use ocula_image::Image;
use std::cmp::{max, min};
use std::f64::consts::PI;

/// Errors raised when a shape cannot be drawn.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    /// A shape dimension must be strictly positive.
    #[error("{shape} {name} must be positive, got {value}")]
    InvalidDimension {
        /// The shape kind.
        shape: &'static str,
        /// The offending dimension.
        name: &'static str,
        /// The value that was given.
        value: i64,
    },
}

/// A shape to draw, centered on the pixel at `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A plus sign with arms spanning `len` pixels vertically and horizontally.
    Plus {
        /// Center row.
        row: i64,
        /// Center column.
        col: i64,
        /// Arm length.
        len: i64,
    },
    /// A rectangle outline of the given size.
    Rectangle {
        /// Center row.
        row: i64,
        /// Center column.
        col: i64,
        /// Width in pixels.
        width: i64,
        /// Height in pixels.
        height: i64,
    },
    /// A circle outline.
    Circle {
        /// Center row.
        row: i64,
        /// Center column.
        col: i64,
        /// Radius in pixels.
        radius: i64,
    },
    /// An ellipse outline with semi-axis `a` along the rows and `b` along the columns.
    Ellipse {
        /// Center row.
        row: i64,
        /// Center column.
        col: i64,
        /// Semi-axis along the rows.
        a: i64,
        /// Semi-axis along the columns.
        b: i64,
    },
}

impl Shape {
    /// The shape keyword used in shape scripts.
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Plus { .. } => "plus",
            Shape::Rectangle { .. } => "rectangle",
            Shape::Circle { .. } => "circle",
            Shape::Ellipse { .. } => "ellipse",
        }
    }

    /// Check that every dimension of the shape is strictly positive.
    pub fn validate(&self) -> Result<(), DrawError> {
        let dimensions: &[(&'static str, i64)] = match self {
            Shape::Plus { len, .. } => &[("len", *len)],
            Shape::Rectangle { width, height, .. } => &[("width", *width), ("height", *height)],
            Shape::Circle { radius, .. } => &[("radius", *radius)],
            Shape::Ellipse { a, b, .. } => &[("a", *a), ("b", *b)],
        };

        for &(name, value) in dimensions {
            if value <= 0 {
                return Err(DrawError::InvalidDimension {
                    shape: self.name(),
                    name,
                    value,
                });
            }
        }

        Ok(())
    }
}

/// Helper function to set a pixel's color, skipping pixels outside the image.
#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x >= 0 && x < img.cols() as i64 && y >= 0 && y < img.rows() as i64 {
        let start = (y as usize * img.cols() + x as usize) * C;
        img.as_slice_mut()[start..start + C].copy_from_slice(&color);
    }
}

/// Draws a line on an image inplace using a standard Bresenham's line algorithm.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as a tuple of (x, y).
/// * `p1` - The end point of the line as a tuple of (x, y).
/// * `color` - The color of the line as an array of `C` elements.
/// * `thickness` - The thickness of the line. (Note: thickness > 1 is approximate).
pub fn draw_line<const C: usize>(
    img: &mut Image<u8, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [u8; C],
    thickness: usize,
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    let half_thickness = if thickness > 1 {
        thickness as i64 / 2
    } else {
        0
    };

    loop {
        for i in -half_thickness..=half_thickness {
            for j in -half_thickness..=half_thickness {
                set_pixel(img, x0 + i, y0 + j, color);
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draws a rectangle outline on an image inplace.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `top_left` - The top-left corner coordinates (x, y).
/// * `bottom_right` - The bottom-right corner coordinates (x, y).
/// * `color` - The color of the rectangle outline.
/// * `thickness` - The thickness of the lines.
pub fn draw_rect<const C: usize>(
    img: &mut Image<u8, C>,
    top_left: (i64, i64),
    bottom_right: (i64, i64),
    color: [u8; C],
    thickness: usize,
) {
    let (x0, y0) = top_left;
    let (x1, y1) = bottom_right;

    let (lx0, lx1) = (min(x0, x1), max(x0, x1));
    let (ly0, ly1) = (min(y0, y1), max(y0, y1));

    draw_line(img, (lx0, ly0), (lx1, ly0), color, thickness); // Top
    draw_line(img, (lx0, ly1), (lx1, ly1), color, thickness); // Bottom
    draw_line(img, (lx0, ly0), (lx0, ly1), color, thickness); // Left
    draw_line(img, (lx1, ly0), (lx1, ly1), color, thickness); // Right
}

/// Draws the outline of a box given by its top-left pixel and its size.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `row` - The top row of the box.
/// * `col` - The left column of the box.
/// * `width` - The box width in pixels.
/// * `height` - The box height in pixels.
/// * `color` - The outline color.
pub fn draw_box<const C: usize>(
    img: &mut Image<u8, C>,
    row: usize,
    col: usize,
    width: usize,
    height: usize,
    color: [u8; C],
) {
    if width == 0 || height == 0 {
        return;
    }
    let top_left = (col as i64, row as i64);
    let bottom_right = ((col + width - 1) as i64, (row + height - 1) as i64);
    draw_rect(img, top_left, bottom_right, color, 1);
}

/// Sample 360 points of an axis-aligned ellipse and paint them.
fn draw_conic<const C: usize>(
    img: &mut Image<u8, C>,
    center: (i64, i64),
    semi_axes: (i64, i64),
    color: [u8; C],
) {
    let (row, col) = center;
    let (a, b) = semi_axes;
    for degree in 0..360 {
        let theta = PI * degree as f64 / 180.0;
        let r = row + (a as f64 * theta.cos()) as i64;
        let c = col + (b as f64 * theta.sin()) as i64;
        set_pixel(img, c, r, color);
    }
}

/// Draw a [`Shape`] inplace.
///
/// # Errors
///
/// Returns [`DrawError::InvalidDimension`] if a shape dimension is not positive.
///
/// # Example
///
/// ```
/// use ocula_image::{Image, ImageSize};
/// use ocula_imgproc::draw::{draw_shape, Shape};
///
/// let mut img = Image::<u8, 1>::from_size_val(ImageSize { width: 9, height: 9 }, 0).unwrap();
/// draw_shape(&mut img, &Shape::Plus { row: 4, col: 4, len: 4 }, [255]).unwrap();
/// assert_eq!(img.as_slice().iter().filter(|&&v| v == 255).count(), 9);
/// ```
pub fn draw_shape<const C: usize>(
    img: &mut Image<u8, C>,
    shape: &Shape,
    color: [u8; C],
) -> Result<(), DrawError> {
    shape.validate()?;

    match *shape {
        Shape::Plus { row, col, len } => {
            for i in -len / 2..=len / 2 {
                set_pixel(img, col, row + i, color);
                set_pixel(img, col + i, row, color);
            }
        }
        Shape::Rectangle {
            row,
            col,
            width,
            height,
        } => {
            let top_left = (col - width / 2, row - height / 2);
            let bottom_right = (col + width / 2, row + height / 2);
            draw_rect(img, top_left, bottom_right, color, 1);
        }
        Shape::Circle { row, col, radius } => {
            draw_conic(img, (row, col), (radius, radius), color);
        }
        Shape::Ellipse { row, col, a, b } => {
            draw_conic(img, (row, col), (a, b), color);
        }
    }

    Ok(())
}
