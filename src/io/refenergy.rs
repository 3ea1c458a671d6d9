//! Reference-energy file reader: extracts the last numeric token on the
//! first line matching `E +=.+`.

use std::{
    fs::File,
    io::Read,
    path::Path,
};

use flate2::read::GzDecoder;
use regex::Regex;

use crate::error::{
    Error,
    Result,
};

fn read_contents(path: &Path) -> Result<String> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    if extension == "bz2" {
        return Err(Error::InvalidIntegralFile {
            msg: "bz2-compressed reference-energy files are not supported (no bzip2 decoder in this build)"
                .to_owned(),
        });
    }
    let file = File::open(path).map_err(|e| Error::InvalidIntegralFile {
        msg: format!("cannot open {}: {e}", path.display()),
    })?;
    let mut contents = String::new();
    if extension == "gz" {
        GzDecoder::new(file).read_to_string(&mut contents)
    } else {
        std::io::BufReader::new(file).read_to_string(&mut contents)
    }
    .map_err(|e| Error::InvalidIntegralFile {
        msg: format!("cannot read {}: {e}", path.display()),
    })?;
    Ok(contents)
}

/// Read a reference-energy file and return the energy value following the
/// first `E =` marker found anywhere in the file.
pub fn read_reference_energy(path: &Path) -> Result<f64> {
    let contents = read_contents(path)?;
    let re = Regex::new(r"E\s*=.+").unwrap();
    let matched = re.find(&contents).ok_or_else(|| Error::InvalidIntegralFile {
        msg: format!("no 'E =' marker found in {}", path.display()),
    })?;
    let last_token = matched.as_str().split_whitespace().last().ok_or_else(|| Error::InvalidIntegralFile {
        msg: format!("empty 'E =' line in {}", path.display()),
    })?;
    last_token.parse().map_err(|_| Error::InvalidIntegralFile {
        msg: format!("malformed reference energy: {last_token}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn extracts_trailing_energy_value() {
        let mut file = tempfile::Builder::new().suffix(".ref").tempfile().unwrap();
        write!(file, "Some header\nVariational E = -198.646096743145\nmore text\n").unwrap();

        let energy = read_reference_energy(file.path()).unwrap();
        assert!((energy - (-198.646096743145)).abs() < 1e-9);
    }

    #[test]
    fn missing_marker_is_an_error() {
        let mut file = tempfile::Builder::new().suffix(".ref").tempfile().unwrap();
        write!(file, "no energy here\n").unwrap();
        let err = read_reference_energy(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidIntegralFile { .. }));
    }
}
