//! A paginated plain-text summary of a report, ready for printing

use std::{fmt::Display, io::Write, path::Path};

use qcreport::Report;

use super::{PresentError, create};

/// separates pages, as understood by printers and pagers
const FORM_FEED: char = '\x0c';

pub struct Summary<'a> {
    title: &'a str,
    report: &'a Report,
    page_lines: usize,
}

impl<'a> Summary<'a> {
    /// `page_lines` is the number of spectral lines on each page and is
    /// treated as 1 if it is 0
    pub fn new(title: &'a str, report: &'a Report, page_lines: usize) -> Self {
        Self {
            title,
            report,
            page_lines: page_lines.max(1),
        }
    }

    pub fn page_count(&self) -> usize {
        self.report.lines.len().div_ceil(self.page_lines).max(1)
    }

    /// the text of each page, each ending with its page number
    pub fn pages(&self) -> Vec<String> {
        let n = self.page_count();
        let mut chunks = self.report.lines.chunks(self.page_lines);
        (1..=n)
            .map(|i| {
                let mut page = String::new();
                if i == 1 {
                    page.push_str(&self.header());
                } else {
                    page.push_str(&format!("{} (continued)\n", self.title));
                }
                page.push('\n');
                match chunks.next() {
                    Some(lines) => {
                        for line in lines {
                            page.push_str(&format!(
                                "{:.2} cm-1 (intensity: {:.2}){}\n",
                                line.frequency,
                                line.intensity,
                                if line.synthetic { "*" } else { "" }
                            ));
                        }
                    }
                    None => page.push_str("No vibrational lines found\n"),
                }
                page.push_str(&format!("\nPage {i} of {n}\n"));
                page
            })
            .collect()
    }

    fn header(&self) -> String {
        let mut ret = format!("{}\n\n", self.title);
        match self.report.energy {
            Some(e) => ret.push_str(&format!("Total energy: {e:.6} Eh\n")),
            None => ret.push_str("Warning: total energy not found\n"),
        }
        ret.push_str(&format!(
            "Vibrational lines: {}\n",
            self.report.lines.len()
        ));
        if self.report.synthetic_intensities() {
            ret.push_str(
                "* intensity not reported, placeholder value shown\n",
            );
        }
        ret
    }

    pub fn write(&self, path: &Path) -> Result<(), PresentError> {
        let mut f = create(path)?;
        write!(f, "{self}")
            .and_then(|_| f.flush())
            .map_err(|e| PresentError::Io(path.display().to_string(), e))
    }
}

impl Display for Summary<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, page) in self.pages().iter().enumerate() {
            if i > 0 {
                write!(f, "{FORM_FEED}")?;
            }
            f.write_str(page)?;
        }
        Ok(())
    }
}
