//! 16-bit single-channel images (depth and infrared)

/// Row-major grid of 16-bit samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthImage {
    width: u32,
    height: u32,
    samples: Vec<u16>,
}

impl DepthImage {
    /// Zero-filled image.
    pub fn zeros(width: u32, height: u32) -> Self {
        Self { width, height, samples: vec![0; width as usize * height as usize] }
    }

    /// Wrap existing samples. Returns `None` when the sample count does not
    /// match `width * height`.
    pub fn from_samples(width: u32, height: u32, samples: Vec<u16>) -> Option<Self> {
        (samples.len() == width as usize * height as usize).then_some(Self { width, height, samples })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [u16] {
        &mut self.samples
    }

    /// Sample at column `x`, row `y`.
    pub fn get(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples.get(y as usize * self.width as usize + x as usize).copied()
    }

    /// Set the sample at column `x`, row `y`. Returns false when out of bounds.
    pub fn set(&mut self, x: u32, y: u32, value: u16) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.samples[idx] = value;
        true
    }

    /// One row of samples.
    pub fn row(&self, y: u32) -> Option<&[u16]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.width as usize;
        Some(&self.samples[start..start + self.width as usize])
    }
}
