pub mod book;
#[cfg(feature = "pdf")]
pub mod pdf;

use std::str::FromStr;

use crate::RenderError;

/// File format of rendered pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    #[cfg(feature = "pdf")]
    Pdf,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            #[cfg(feature = "pdf")]
            Self::Pdf => "pdf",
        }
    }

    /// Convert a finished SVG document.
    pub fn encode(self, svg: String) -> crate::Result<Vec<u8>> {
        match self {
            Self::Svg => Ok(svg.into_bytes()),
            #[cfg(feature = "pdf")]
            Self::Pdf => pdf::svg_to_pdf(&svg),
        }
    }

    /// Format named by a path's extension.
    pub fn from_path(path: &std::path::Path) -> crate::Result<Self> {
        path.extension().and_then(|e| e.to_str()).unwrap_or("svg").parse()
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            #[cfg(feature = "pdf")]
            "pdf" => Ok(Self::Pdf),
            other => Err(RenderError::UnknownKind(format!("format: {other}"))),
        }
    }
}
