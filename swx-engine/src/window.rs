//! Analysis/synthesis window shapes

use std::f32::consts::PI;

/// Window applied to each FFT frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// Raised cosine, the usual choice for overlap-add
    #[default]
    Hann,
    Hamming,
    Blackman,
    /// 4-term Blackman-Harris, lowest side lobes
    BlackmanHarris,
    Triangle,
}

impl Window {
    /// All supported windows
    pub const ALL: [Window; 5] = [
        Window::Hann,
        Window::Hamming,
        Window::Blackman,
        Window::BlackmanHarris,
        Window::Triangle,
    ];

    /// Name used in configuration files
    pub fn name(self) -> &'static str {
        match self {
            Window::Hann => "hann",
            Window::Hamming => "hamming",
            Window::Blackman => "blackman",
            Window::BlackmanHarris => "blackman-harris",
            Window::Triangle => "triangle",
        }
    }

    /// Look up a window by its configuration name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|window| window.name().eq_ignore_ascii_case(name))
    }

    /// Periodic window coefficients for a frame of `size` samples
    pub fn coefficients(self, size: usize) -> Vec<f32> {
        let n = size as f32;
        (0..size)
            .map(|i| {
                let x = 2.0 * PI * i as f32 / n;
                match self {
                    Window::Hann => 0.5 - 0.5 * x.cos(),
                    Window::Hamming => 0.54 - 0.46 * x.cos(),
                    Window::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
                    Window::BlackmanHarris => {
                        0.35875 - 0.48829 * x.cos() + 0.14128 * (2.0 * x).cos()
                            - 0.01168 * (3.0 * x).cos()
                    }
                    Window::Triangle => 1.0 - (2.0 * i as f32 / n - 1.0).abs(),
                }
            })
            .collect()
    }
}
