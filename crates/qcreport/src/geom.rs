//! Cartesian structures read from XYZ files

use std::{error::Error, fmt::Display, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq)]
pub enum GeomError {
    /// the file could not be read
    ReadFile(String, std::io::ErrorKind),
    /// an atom line had fewer than four fields or a non-numeric coordinate.
    /// contains the 1-based line number and the line itself
    BadAtom(usize, String),
}

impl Display for GeomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeomError::ReadFile(file, kind) => {
                write!(f, "failed to read {file}: {kind}")
            }
            GeomError::BadAtom(line, s) => {
                write!(f, "malformed atom on line {line}: `{s}`")
            }
        }
    }
}

impl Error for GeomError {}

/// One atom of a [Structure]. The symbol is kept as written; no attempt is
/// made to check that it names a real element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub symbol: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Atom {
    pub fn new(symbol: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            symbol: symbol.into(),
            x,
            y,
            z,
        }
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:2} {:15.10} {:15.10} {:15.10}",
            self.symbol, self.x, self.y, self.z
        )
    }
}

impl FromStr for Atom {
    type Err = ();

    /// parse an Atom from a line like
    ///  C 1.0 1.0 1.0
    /// trailing fields, such as charges, are ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split_whitespace();
        let symbol = fields.next().ok_or(())?;
        let mut coord = [0.0; 3];
        for c in &mut coord {
            *c = fields.next().ok_or(())?.parse().map_err(|_| ())?;
        }
        let [x, y, z] = coord;
        Ok(Self::new(symbol, x, y, z))
    }
}

/// A molecule as read from an XYZ file: an atom count, a comment line, and
/// one `symbol x y z` line per atom.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub comment: String,
    pub atoms: Vec<Atom>,
}

impl Structure {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GeomError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GeomError::ReadFile(path.display().to_string(), e.kind())
        })?;
        contents.parse()
    }

    /// the atom lines alone, as pasted into a program input file
    pub fn coords(&self) -> String {
        use std::fmt::Write;
        let mut ret = String::with_capacity(50 * self.atoms.len());
        for atom in &self.atoms {
            writeln!(ret, "{atom}").unwrap();
        }
        ret
    }

    /// render `self` as a complete XYZ file
    pub fn to_xyz(&self) -> String {
        format!("{}\n{}\n{}", self.atoms.len(), self.comment, self.coords())
    }
}

impl FromStr for Structure {
    type Err = GeomError;

    /// The count line is optional and, like blank lines, is skipped. When the
    /// count is present the line after it is taken as the comment.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ret = Self::default();
        let mut lines = s.lines().enumerate().peekable();
        while let Some((_, line)) = lines.peek() {
            if line.trim().is_empty() {
                lines.next();
                continue;
            }
            if line.trim().parse::<usize>().is_ok() {
                lines.next();
                if let Some((_, comment)) = lines.next() {
                    ret.comment = comment.trim().to_owned();
                }
            }
            break;
        }
        for (i, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            let atom = line
                .parse()
                .map_err(|_| GeomError::BadAtom(i + 1, line.to_owned()))?;
            ret.atoms.push(atom);
        }
        Ok(ret)
    }
}
