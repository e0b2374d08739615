/// Errors related to kernel construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KernelError {
    /// The kernel has a zero dimension.
    #[error("Kernel width and height must be positive")]
    EmptyKernel,

    /// The kernel must have odd dimensions so it has a center pixel.
    #[error("Kernel size ({0}, {1}) must be odd")]
    EvenSizedKernel(usize, usize),

    /// The number of weights does not match the kernel size.
    #[error("Kernel data length ({0}) does not match the kernel size ({1})")]
    InvalidDataLength(usize, usize),
}

/// A 2D kernel with signed integer weights stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kernel {
    width: usize,
    height: usize,
    data: Vec<i16>,
}

impl Kernel {
    /// Create a new kernel.
    ///
    /// # Arguments
    ///
    /// * `width` - The kernel width. Must be odd.
    /// * `height` - The kernel height. Must be odd.
    /// * `data` - The `width * height` weights, row-major.
    ///
    /// # Example
    ///
    /// ```
    /// use ocula_imgproc::filter::Kernel;
    ///
    /// let kernel = Kernel::new(3, 1, vec![1, 2, 1]).unwrap();
    /// assert_eq!(kernel.weight_sum(), 4);
    /// assert_eq!(kernel.radius(), (0, 1));
    /// ```
    pub fn new(width: usize, height: usize, data: Vec<i16>) -> Result<Self, KernelError> {
        if width == 0 || height == 0 {
            return Err(KernelError::EmptyKernel);
        }

        if width % 2 == 0 || height % 2 == 0 {
            return Err(KernelError::EvenSizedKernel(width, height));
        }

        if data.len() != width * height {
            return Err(KernelError::InvalidDataLength(data.len(), width * height));
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a box kernel of the given odd size with all weights set to one.
    pub fn box_kernel(size: usize) -> Result<Self, KernelError> {
        Self::new(size, size, vec![1; size * size])
    }

    /// A 3x3 kernel with every weight set to `value`.
    pub fn square3(value: i16) -> Self {
        Self {
            width: 3,
            height: 3,
            data: vec![value; 9],
        }
    }

    /// The kernel width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The kernel height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The kernel weights, row-major.
    pub fn data(&self) -> &[i16] {
        &self.data
    }

    /// The half sizes `(rows, cols)` of the kernel around its center.
    pub fn radius(&self) -> (usize, usize) {
        (self.height / 2, self.width / 2)
    }

    /// The sum of the kernel weights.
    pub fn weight_sum(&self) -> i32 {
        self.data.iter().map(|&w| w as i32).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_validation() {
        assert_eq!(Kernel::new(0, 3, vec![]), Err(KernelError::EmptyKernel));
        assert_eq!(
            Kernel::new(2, 3, vec![0; 6]),
            Err(KernelError::EvenSizedKernel(2, 3))
        );
        assert_eq!(
            Kernel::new(3, 3, vec![0; 8]),
            Err(KernelError::InvalidDataLength(8, 9))
        );
    }

    #[test]
    fn kernel_box() -> Result<(), KernelError> {
        let kernel = Kernel::box_kernel(5)?;
        assert_eq!(kernel.width(), 5);
        assert_eq!(kernel.height(), 5);
        assert_eq!(kernel.weight_sum(), 25);
        assert_eq!(kernel.radius(), (2, 2));
        Ok(())
    }

    #[test]
    fn kernel_square3_signed() {
        let kernel = Kernel::square3(-2);
        assert_eq!(kernel.data().len(), 9);
        assert_eq!(kernel.weight_sum(), -18);
    }
}
