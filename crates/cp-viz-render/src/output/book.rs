use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// Multi-page output as numbered files: `<stem>_01.pdf`, `<stem>_02.pdf`, ...
pub struct PageBook {
    dir: PathBuf,
    stem: String,
    format: OutputFormat,
    written: Vec<PathBuf>,
}

impl PageBook {
    pub fn new(dir: impl AsRef<Path>, stem: impl Into<String>, format: OutputFormat) -> Self {
        Self { dir: dir.as_ref().to_path_buf(), stem: stem.into(), format, written: Vec::new() }
    }

    /// Path the next page will be written to.
    pub fn next_path(&self) -> PathBuf {
        self.dir.join(format!("{}_{:02}.{}", self.stem, self.written.len() + 1, self.format.extension()))
    }

    /// Encode and write one page.
    pub fn add_page(&mut self, svg: String) -> crate::Result<&Path> {
        let path = self.next_path();
        let bytes = self.format.encode(svg)?;
        std::fs::write(&path, bytes)?;
        log::debug!("wrote {}", path.display());
        self.written.push(path);
        Ok(self.written[self.written.len() - 1].as_path())
    }

    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }

    /// Written files in page order.
    pub fn finish(self) -> Vec<PathBuf> {
        self.written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_numbered_from_one() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = PageBook::new(dir.path(), "mon", OutputFormat::Svg);
        assert_eq!(book.next_path(), dir.path().join("mon_01.svg"));
        book.add_page("<svg/>".into()).unwrap();
        book.add_page("<svg/>".into()).unwrap();
        let files = book.finish();
        assert_eq!(files[1], dir.path().join("mon_02.svg"));
        assert_eq!(std::fs::read_to_string(&files[0]).unwrap(), "<svg/>");
    }
}
