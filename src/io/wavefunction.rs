//! Wavefunction-file reader: whitespace-delimited triples of
//! `coefficient det_alpha_str det_beta_str`, where each determinant string
//! marks occupied orbitals with `+` at the corresponding character
//! position. The resulting coefficient vector is L2-normalized.

use std::{
    fs::File,
    io::Read,
    path::Path,
};

use flate2::read::GzDecoder;

use crate::{
    determinant::{
        Determinant,
        SpinDet,
    },
    error::{
        Error,
        Result,
    },
    wavefunction::Wavefunction,
};

fn read_contents(path: &Path) -> Result<String> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    if extension == "bz2" {
        return Err(Error::InvalidIntegralFile {
            msg: "bz2-compressed wavefunction files are not supported (no bzip2 decoder in this build)".to_owned(),
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

fn decode_spindet(marks: &str) -> SpinDet {
    SpinDet::from_orbitals(marks.char_indices().filter(|&(_, c)| c == '+').map(|(i, _)| i as u32))
}

/// Read a wavefunction file (optionally `.gz`-compressed) and return it
/// L2-normalized.
pub fn read_wavefunction(path: &Path) -> Result<Wavefunction> {
    let contents = read_contents(path)?;
    let tokens: Vec<&str> = contents.split_whitespace().collect();
    if tokens.len() % 3 != 0 {
        return Err(Error::InvalidIntegralFile {
            msg: format!("wavefunction file {} has a truncated record", path.display()),
        });
    }

    let mut det = Vec::with_capacity(tokens.len() / 3);
    let mut coef = Vec::with_capacity(tokens.len() / 3);
    for chunk in tokens.chunks_exact(3) {
        let [coef_str, alpha_str, beta_str] = chunk else {
            unreachable!("chunks_exact(3) always yields length-3 slices");
        };
        let c: f64 = coef_str.parse().map_err(|_| Error::InvalidIntegralFile {
            msg: format!("malformed coefficient: {coef_str}"),
        })?;
        coef.push(c);
        det.push(Determinant::new(decode_spindet(alpha_str), decode_spindet(beta_str)));
    }

    let mut wf = Wavefunction::new(det, coef);
    wf.normalize();
    Ok(wf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_and_normalizes_two_determinants() {
        let mut file = tempfile::Builder::new().suffix(".wf").tempfile().unwrap();
        write!(file, "3.0 ++-- ++--\n4.0 -++- -++-\n").unwrap();

        let wf = read_wavefunction(file.path()).unwrap();
        assert_eq!(wf.len(), 2);
        assert!((wf.norm() - 1.0).abs() < 1e-12);
        assert!((wf.coef[0] - 0.6).abs() < 1e-12);
        assert!((wf.coef[1] - 0.8).abs() < 1e-12);
        assert_eq!(wf.det[0].alpha, SpinDet::from_orbitals([0, 1]));
        assert_eq!(wf.det[1].alpha, SpinDet::from_orbitals([1, 2]));
    }

    #[test]
    fn rejects_bz2_extension() {
        let path = Path::new("nonexistent.wf.bz2");
        let err = read_wavefunction(path).unwrap_err();
        assert!(matches!(err, Error::InvalidIntegralFile { .. }));
    }
}
